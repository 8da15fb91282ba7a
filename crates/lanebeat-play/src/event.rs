use lanebeat_model::LaneId;
use lanebeat_rule::Grade;
use serde::{Deserialize, Serialize};

use crate::score::PlaySummary;

/// Raw key transition as delivered by an input device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Lane index (0-based), not yet validated.
    pub lane: usize,
    /// true = pressed, false = released.
    pub pressed: bool,
    /// Audio clock time of the transition.
    pub timestamp_ms: f64,
}

impl InputEvent {
    pub fn down(lane: usize, timestamp_ms: f64) -> Self {
        Self {
            lane,
            pressed: true,
            timestamp_ms,
        }
    }

    pub fn up(lane: usize, timestamp_ms: f64) -> Self {
        Self {
            lane,
            pressed: false,
            timestamp_ms,
        }
    }
}

/// A press judged against a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    pub lane: LaneId,
    pub grade: Grade,
    pub just_time_ms: f64,
    pub actual_time_ms: f64,
    /// Combo after this judgment.
    pub combo: u32,
    /// Score after this judgment.
    pub score: u64,
}

impl JudgmentResult {
    /// Positive when late.
    pub fn delta_ms(&self) -> f64 {
        self.actual_time_ms - self.just_time_ms
    }
}

/// Everything the engine reports to the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JudgmentEvent {
    Judged(JudgmentResult),
    /// A note passed its window without a press.
    Missed { lane: LaneId, just_time_ms: f64 },
    /// One hold tick credited. `tick` is 1-based within the note.
    HoldTick {
        lane: LaneId,
        tick: u32,
        combo: u32,
        score: u64,
    },
    /// A hold was kept down to its end; `ticks` is the note's full tick count.
    HoldCompleted { lane: LaneId, ticks: u32 },
    /// A hold was let go before its end.
    HoldReleased {
        lane: LaneId,
        ticks_kept: u32,
        ticks_forfeited: u32,
    },
    /// Press with no note in reach.
    Phantom { lane: LaneId, time_ms: f64 },
    Finished(PlaySummary),
}

impl JudgmentEvent {
    pub fn lane(&self) -> Option<LaneId> {
        match self {
            JudgmentEvent::Judged(result) => Some(result.lane),
            JudgmentEvent::Missed { lane, .. }
            | JudgmentEvent::HoldTick { lane, .. }
            | JudgmentEvent::HoldCompleted { lane, .. }
            | JudgmentEvent::HoldReleased { lane, .. }
            | JudgmentEvent::Phantom { lane, .. } => Some(*lane),
            JudgmentEvent::Finished(_) => None,
        }
    }
}
