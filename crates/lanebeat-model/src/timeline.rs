use lanebeat_rule::{Grade, ScoreRule};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::lane::{LaneId, LaneLayout};
use crate::note::Note;

/// Best achievable combo and score for a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub max_combo: u32,
    pub max_score: u64,
}

/// Notes grouped per lane, each lane sorted by just time.
///
/// Ties keep their original order. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTimeline {
    layout: LaneLayout,
    lanes: Vec<Vec<Note>>,
}

impl NoteTimeline {
    /// Group `notes` by lane. Notes whose lane is outside `layout` are dropped.
    pub fn from_notes(layout: LaneLayout, notes: impl IntoIterator<Item = Note>) -> Self {
        let mut lanes: Vec<Vec<Note>> = vec![Vec::new(); layout.len()];
        for note in notes {
            match lanes.get_mut(note.lane.index()) {
                Some(lane) => lane.push(note),
                None => warn!(
                    "Dropping note on {} (layout has {} lanes)",
                    note.lane,
                    layout.len()
                ),
            }
        }
        for lane in &mut lanes {
            lane.sort_by(|a, b| a.just_time_ms.total_cmp(&b.just_time_ms));
        }
        Self { layout, lanes }
    }

    pub fn layout(&self) -> &LaneLayout {
        &self.layout
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Notes of one lane; empty for an unknown lane.
    pub fn lane(&self, lane: LaneId) -> &[Note] {
        self.lanes
            .get(lane.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lanes(&self) -> impl Iterator<Item = (LaneId, &[Note])> + '_ {
        self.lanes
            .iter()
            .enumerate()
            .map(|(i, notes)| (LaneId::new(i), notes.as_slice()))
    }

    /// All notes, lane by lane.
    pub fn notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.lanes.iter().flatten()
    }

    pub fn note_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn hold_count(&self) -> usize {
        self.notes().filter(|n| n.is_hold()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.note_count() == 0
    }

    /// Latest end time over all notes, 0 for an empty timeline.
    pub fn last_end_time_ms(&self) -> f64 {
        self.notes().map(Note::end_time_ms).fold(0.0, f64::max)
    }

    /// Max combo and score under `rule`: one combo and a Perfect score per
    /// note plus every hold tick.
    pub fn totals(&self, rule: &ScoreRule) -> Totals {
        let mut totals = Totals::default();
        for note in self.notes() {
            let ticks = rule.hold_tick_count(note.duration_ms());
            totals.max_combo = totals.max_combo.saturating_add(ticks).saturating_add(1);
            totals.max_score = totals
                .max_score
                .saturating_add(rule.tap_score(Grade::Perfect))
                .saturating_add(rule.hold_score(ticks));
        }
        totals
    }
}
