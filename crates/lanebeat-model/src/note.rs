use serde::{Deserialize, Serialize};

use crate::lane::LaneId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoteKind {
    Tap,
    /// Long note held for `duration_ms` after its just time.
    Hold { duration_ms: f64 },
}

/// A single note in the timeline. Play state lives in the judgment engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub lane: LaneId,
    /// Index of the chart row the note came from.
    pub row: usize,
    pub just_time_ms: f64,
    pub kind: NoteKind,
}

impl Note {
    pub fn tap(lane: LaneId, row: usize, just_time_ms: f64) -> Self {
        Self {
            lane,
            row,
            just_time_ms,
            kind: NoteKind::Tap,
        }
    }

    pub fn hold(lane: LaneId, row: usize, just_time_ms: f64, duration_ms: f64) -> Self {
        Self {
            lane,
            row,
            just_time_ms,
            kind: NoteKind::Hold { duration_ms },
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self.kind, NoteKind::Hold { .. })
    }

    /// Hold length, 0 for taps.
    pub fn duration_ms(&self) -> f64 {
        match self.kind {
            NoteKind::Tap => 0.0,
            NoteKind::Hold { duration_ms } => duration_ms,
        }
    }

    pub fn end_time_ms(&self) -> f64 {
        self.just_time_ms + self.duration_ms()
    }
}
