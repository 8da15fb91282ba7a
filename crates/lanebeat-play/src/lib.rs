// Play session: judgment engine, event queue, collaborators and records

mod autoplay;
mod config;
mod engine;
mod error;
mod event;
mod json_store;
mod queue;
mod records;
mod score;
mod session;
pub mod traits;

pub use autoplay::{autoplay_events, autoplay_inputs};
pub use config::{EngineConfig, PlayerSettings};
pub use engine::{JudgmentEngine, NoteState, Phase};
pub use error::{InputError, SessionStateError};
pub use event::{InputEvent, JudgmentEvent, JudgmentResult};
pub use json_store::JsonRecordStore;
pub use queue::{EventQueue, EventSender, PlayEvent};
pub use records::{
    PlayRecord, PublicRanking, PublicRecord, RecordOutcome, ResultEntry, record_play,
};
pub use score::{PlaySummary, ScoreState};
pub use session::PlaySession;
