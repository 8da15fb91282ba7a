use thiserror::Error;

/// Raw key input that cannot be mapped onto the chart. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown lane {lane} (chart has {lane_count} lanes)")]
    UnknownLane { lane: usize, lane_count: usize },
}

/// Lifecycle misuse reported by `JudgmentEngine::start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionStateError {
    #[error("session already started")]
    AlreadyStarted,
    #[error("session already finished")]
    Finished,
}
