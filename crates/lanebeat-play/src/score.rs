use lanebeat_model::Totals;
use lanebeat_rule::{GRADE_COUNT, Grade};
use serde::{Deserialize, Serialize};

/// Running combo and score of a play.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub combo: u32,
    /// Highest combo reached so far.
    pub max_combo: u32,
    pub score: u64,
    /// Notes lost: auto-missed, pressed outside the hit windows, or released early.
    pub miss_count: u32,
    /// Press judgments per grade, indexed by `Grade::index`. A hold released
    /// early moves from its head grade to Miss, so every note is counted
    /// once: the non-Miss counts plus `miss_count` cover all settled notes.
    pub grade_counts: [u32; GRADE_COUNT],
    pub hold_ticks: u32,
    pub phantom_presses: u32,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press judgment. Miss breaks the combo.
    pub fn add_judgment(&mut self, grade: Grade, score: u64) {
        let slot = &mut self.grade_counts[grade.index()];
        *slot = slot.saturating_add(1);
        if grade.is_combo_break() {
            self.break_combo();
        } else {
            self.score = self.score.saturating_add(score);
            self.bump_combo();
        }
    }

    pub fn add_hold_tick(&mut self, score: u64) {
        self.hold_ticks = self.hold_ticks.saturating_add(1);
        self.score = self.score.saturating_add(score);
        self.bump_combo();
    }

    /// A note was lost: combo resets and the miss counter goes up.
    pub fn break_combo(&mut self) {
        self.combo = 0;
        self.miss_count = self.miss_count.saturating_add(1);
    }

    /// A hold whose head was judged `grade` was let go before its end. The
    /// head judgment turns into a Miss and the combo breaks.
    pub fn release_early(&mut self, grade: Grade) {
        let head = &mut self.grade_counts[grade.index()];
        *head = head.saturating_sub(1);
        let miss = &mut self.grade_counts[Grade::Miss.index()];
        *miss = miss.saturating_add(1);
        self.break_combo();
    }

    /// Press with no note in reach.
    pub fn add_phantom(&mut self, breaks_combo: bool) {
        self.phantom_presses += 1;
        if breaks_combo {
            self.combo = 0;
        }
    }

    /// Take back the head score and ticks of a hold that counts as missed.
    pub fn revoke_hold(&mut self, head_score: u64, ticks: u32, tick_score: u64) {
        self.hold_ticks = self.hold_ticks.saturating_sub(ticks);
        let revoked = tick_score
            .saturating_mul(u64::from(ticks))
            .saturating_add(head_score);
        self.score = self.score.saturating_sub(revoked);
    }

    pub fn count(&self, grade: Grade) -> u32 {
        self.grade_counts[grade.index()]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn bump_combo(&mut self) {
        self.combo = self.combo.saturating_add(1);
        self.max_combo = self.max_combo.max(self.combo);
    }
}

/// Final numbers of a play, reported to the result screen and the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub final_combo: u32,
    pub final_score: u64,
    pub miss_count: u32,
    /// Best achievable combo for the chart.
    pub max_combo: u32,
    /// Best achievable score for the chart.
    pub max_score: u64,
    /// Highest combo reached during the play.
    pub best_combo: u32,
    pub grade_counts: [u32; GRADE_COUNT],
    pub hold_ticks: u32,
    pub aborted: bool,
}

impl PlaySummary {
    pub fn new(score: &ScoreState, totals: Totals, aborted: bool) -> Self {
        Self {
            final_combo: score.combo,
            final_score: score.score,
            miss_count: score.miss_count,
            max_combo: totals.max_combo,
            max_score: totals.max_score,
            best_combo: score.max_combo,
            grade_counts: score.grade_counts,
            hold_ticks: score.hold_ticks,
            aborted,
        }
    }

    pub fn count(&self, grade: Grade) -> u32 {
        self.grade_counts[grade.index()]
    }

    /// Score as a fraction of the chart maximum (0.0 for an empty chart).
    pub fn score_rate(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        self.final_score as f64 / self.max_score as f64
    }

    pub fn is_full_combo(&self) -> bool {
        !self.aborted && self.max_combo > 0 && self.best_combo == self.max_combo
    }
}
