mod chart_source;
mod input;
mod record_store;
mod sink;
mod transport;

pub(crate) use chart_source::ensure_path_segment;
pub use chart_source::{ChartSource, DirChartSource, music_name};
pub use input::{InputSource, ScriptedInput};
pub use record_store::{MemoryRecordStore, RecordStore};
pub use sink::JudgmentSink;
pub use transport::{AudioTransport, ManualClock, ManualTransport, TransportState};
