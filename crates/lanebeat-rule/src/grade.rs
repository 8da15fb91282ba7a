use serde::{Deserialize, Serialize};

/// Judgment grade for a single key press against a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    Perfect,
    Great,
    Good,
    Miss,
}

impl Grade {
    /// All grades, best first.
    pub fn all() -> &'static [Grade] {
        &[Grade::Perfect, Grade::Great, Grade::Good, Grade::Miss]
    }

    /// Index into per-grade count arrays (0 = Perfect .. 3 = Miss).
    pub fn index(self) -> usize {
        match self {
            Grade::Perfect => 0,
            Grade::Great => 1,
            Grade::Good => 2,
            Grade::Miss => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Grade> {
        match index {
            0 => Some(Grade::Perfect),
            1 => Some(Grade::Great),
            2 => Some(Grade::Good),
            3 => Some(Grade::Miss),
            _ => None,
        }
    }

    /// Returns true if this grade resets the running combo.
    pub fn is_combo_break(self) -> bool {
        matches!(self, Grade::Miss)
    }

    /// Text shown by the judgment effect.
    pub fn label(self) -> &'static str {
        match self {
            Grade::Perfect => "PERFECT",
            Grade::Great => "GREAT",
            Grade::Good => "GOOD",
            Grade::Miss => "MISS",
        }
    }
}
