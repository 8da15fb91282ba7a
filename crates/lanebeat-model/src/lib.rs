// Chart data model: parser, lanes, notes, per-lane timeline

mod builder;
mod chart;
mod error;
mod lane;
mod music_info;
mod note;
mod parse;
mod timeline;

pub use builder::TimelineBuilder;
pub use chart::{Chart, ChartMetadata, ChartRow, LaneValue};
pub use error::ChartError;
pub use lane::{LaneId, LaneLayout};
pub use music_info::MusicInfo;
pub use note::{Note, NoteKind};
pub use parse::{ChartFormat, ChartParser, parse_chart};
pub use timeline::{NoteTimeline, Totals};
