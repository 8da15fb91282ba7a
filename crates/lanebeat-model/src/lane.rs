use std::fmt;

use serde::{Deserialize, Serialize};

/// Labels of the default six-lane layout, left to right.
const SIX_KEY_LABELS: [&str; 6] = ["S", "D", "F", "J", "K", "L"];

/// A lane in the play area (0-based, left to right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(usize);

impl LaneId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the lane index (0-based).
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane{}", self.0)
    }
}

/// Declared lane set: how many lanes a chart has and what each one is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneLayout {
    labels: Vec<String>,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self::six_key()
    }
}

impl LaneLayout {
    /// The standard S/D/F/J/K/L layout.
    pub fn six_key() -> Self {
        Self::from_labels(SIX_KEY_LABELS.iter().map(|s| s.to_string()).collect())
    }

    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Layout for an arbitrary lane count. Six lanes get the standard
    /// labels, other counts are labelled `1..=n`.
    pub fn for_lane_count(lane_count: usize) -> Self {
        if lane_count == SIX_KEY_LABELS.len() {
            return Self::six_key();
        }
        Self::from_labels((1..=lane_count).map(|i| i.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Validate a raw lane index against this layout.
    pub fn lane(&self, index: usize) -> Option<LaneId> {
        (index < self.labels.len()).then_some(LaneId(index))
    }

    /// All lanes in declared order.
    pub fn ids(&self) -> impl Iterator<Item = LaneId> + '_ {
        (0..self.labels.len()).map(LaneId)
    }

    pub fn label(&self, lane: LaneId) -> Option<&str> {
        self.labels.get(lane.0).map(String::as_str)
    }

    /// Find a lane by its label (case-insensitive).
    pub fn find(&self, label: &str) -> Option<LaneId> {
        self.labels
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .map(LaneId)
    }
}
