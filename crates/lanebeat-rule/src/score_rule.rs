use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Score values per grade and the hold-note tick rule.
///
/// The tick formula is `floor(duration_ms / hold_tick_ms)` with no grace
/// offset. Both the max-score precomputation and live judgment go through
/// `hold_tick_count`, so a perfect play lands exactly on the precomputed
/// maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRule {
    pub perfect_score: u64,
    pub great_score: u64,
    pub good_score: u64,
    /// Score per hold tick.
    pub hold_tick_score: u64,
    /// Hold duration covered by one tick.
    pub hold_tick_ms: f64,
}

impl Default for ScoreRule {
    fn default() -> Self {
        Self {
            perfect_score: 2000,
            great_score: 1500,
            good_score: 1000,
            hold_tick_score: 100,
            hold_tick_ms: 200.0,
        }
    }
}

impl ScoreRule {
    pub fn tap_score(&self, grade: Grade) -> u64 {
        match grade {
            Grade::Perfect => self.perfect_score,
            Grade::Great => self.great_score,
            Grade::Good => self.good_score,
            Grade::Miss => 0,
        }
    }

    /// Number of ticks a fully held note of `duration_ms` is worth.
    pub fn hold_tick_count(&self, duration_ms: f64) -> u32 {
        if self.hold_tick_ms <= 0.0 || duration_ms <= 0.0 || !duration_ms.is_finite() {
            return 0;
        }
        (duration_ms / self.hold_tick_ms).floor() as u32
    }

    /// Ticks earned after holding for `elapsed_ms` past the note's just time.
    /// Never exceeds `hold_tick_count(duration_ms)`.
    pub fn hold_ticks_elapsed(&self, elapsed_ms: f64, duration_ms: f64) -> u32 {
        if self.hold_tick_ms <= 0.0 || elapsed_ms <= 0.0 {
            return 0;
        }
        let earned = (elapsed_ms / self.hold_tick_ms).floor() as u32;
        earned.min(self.hold_tick_count(duration_ms))
    }

    /// Score of `ticks` hold ticks.
    pub fn hold_score(&self, ticks: u32) -> u64 {
        self.hold_tick_score.saturating_mul(u64::from(ticks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tap_score_per_grade() {
        let rule = ScoreRule::default();
        assert_eq!(rule.tap_score(Grade::Perfect), 2000);
        assert_eq!(rule.tap_score(Grade::Great), 1500);
        assert_eq!(rule.tap_score(Grade::Good), 1000);
        assert_eq!(rule.tap_score(Grade::Miss), 0);
    }

    #[test]
    fn tick_count_uses_floor() {
        let rule = ScoreRule::default();
        assert_eq!(rule.hold_tick_count(1000.0), 5);
        assert_eq!(rule.hold_tick_count(999.9), 4);
        assert_eq!(rule.hold_tick_count(199.9), 0);
        assert_eq!(rule.hold_tick_count(0.0), 0);
    }

    #[test]
    fn tick_boundary_duration_counts_once() {
        let rule = ScoreRule::default();
        assert_eq!(rule.hold_tick_count(200.0), 1);
    }

    #[test]
    fn elapsed_ticks_capped_by_duration() {
        let rule = ScoreRule::default();
        assert_eq!(rule.hold_ticks_elapsed(500.0, 1000.0), 2);
        assert_eq!(rule.hold_ticks_elapsed(1000.0, 1000.0), 5);
        assert_eq!(rule.hold_ticks_elapsed(5000.0, 1000.0), 5);
        assert_eq!(rule.hold_ticks_elapsed(-30.0, 1000.0), 0);
    }

    #[test]
    fn zero_tick_length_disables_ticks() {
        let rule = ScoreRule {
            hold_tick_ms: 0.0,
            ..Default::default()
        };
        assert_eq!(rule.hold_tick_count(1000.0), 0);
        assert_eq!(rule.hold_ticks_elapsed(1000.0, 1000.0), 0);
    }

    #[test]
    fn hold_score_scales_by_ticks() {
        let rule = ScoreRule::default();
        assert_eq!(rule.hold_score(0), 0);
        assert_eq!(rule.hold_score(5), 500);
    }

    proptest! {
        #[test]
        fn elapsed_never_exceeds_full_count(elapsed in 0.0f64..20_000.0, duration in 0.0f64..10_000.0) {
            let rule = ScoreRule::default();
            prop_assert!(rule.hold_ticks_elapsed(elapsed, duration) <= rule.hold_tick_count(duration));
        }

        #[test]
        fn elapsed_is_monotonic(a in 0.0f64..10_000.0, b in 0.0f64..10_000.0, duration in 0.0f64..10_000.0) {
            let rule = ScoreRule::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rule.hold_ticks_elapsed(lo, duration) <= rule.hold_ticks_elapsed(hi, duration));
        }
    }
}
