// Judge windows, grades, score values and play policies

mod grade;
mod judge_window;
mod policy;
mod score_rule;

pub use grade::Grade;
pub use judge_window::JudgeWindows;
pub use policy::{EarlyRelease, PlayPolicy};
pub use score_rule::ScoreRule;

/// Number of grades: Perfect, Great, Good, Miss.
pub const GRADE_COUNT: usize = 4;
