use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Symmetric judgment windows in milliseconds.
///
/// A press is graded by `|actual - just|`: within `perfect_ms` is Perfect,
/// within `great_ms` Great, within `good_ms` Good. Presses further out but
/// still within `miss_ms` consume the note as a Miss; anything beyond
/// `miss_ms` does not touch the note at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindows {
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub good_ms: f64,
    pub miss_ms: f64,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            perfect_ms: 50.0,
            great_ms: 100.0,
            good_ms: 150.0,
            miss_ms: 200.0,
        }
    }
}

impl JudgeWindows {
    pub fn new(perfect_ms: f64, great_ms: f64, good_ms: f64, miss_ms: f64) -> Self {
        Self {
            perfect_ms,
            great_ms,
            good_ms,
            miss_ms,
        }
    }

    /// Scale every window by `rate` (1.0 = unchanged).
    pub fn scaled(&self, rate: f64) -> Self {
        Self {
            perfect_ms: self.perfect_ms * rate,
            great_ms: self.great_ms * rate,
            good_ms: self.good_ms * rate,
            miss_ms: self.miss_ms * rate,
        }
    }

    /// Classify a press. `delta_ms` = actual press time - note just time.
    pub fn classify_tap_grade(&self, delta_ms: f64) -> Grade {
        let abs_delta = delta_ms.abs();

        if abs_delta <= self.perfect_ms {
            Grade::Perfect
        } else if abs_delta <= self.great_ms {
            Grade::Great
        } else if abs_delta <= self.good_ms {
            Grade::Good
        } else {
            Grade::Miss
        }
    }

    /// Whether a press at `delta_ms` is close enough to act on the note.
    pub fn contains(&self, delta_ms: f64) -> bool {
        delta_ms.abs() <= self.miss_ms
    }

    /// Whether the note can no longer be hit at `delta_ms` (too late).
    pub fn is_late_miss(&self, delta_ms: f64) -> bool {
        delta_ms > self.miss_ms
    }

    /// Windows must be non-negative and widen from Perfect to Miss.
    pub fn is_ordered(&self) -> bool {
        self.perfect_ms >= 0.0
            && self.perfect_ms <= self.great_ms
            && self.great_ms <= self.good_ms
            && self.good_ms <= self.miss_ms
    }
}
