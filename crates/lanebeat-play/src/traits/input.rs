use crate::event::InputEvent;
use crate::traits::transport::ManualClock;

/// Abstraction over key input devices.
/// Implementations: ScriptedInput (autoplay, testing).
pub trait InputSource {
    /// Key transitions since the last call, oldest first.
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// Replays a fixed list of input events as the clock reaches them.
#[derive(Debug)]
pub struct ScriptedInput {
    events: Vec<InputEvent>,
    next: usize,
    clock: ManualClock,
}

impl ScriptedInput {
    /// Events are replayed in timestamp order; equal timestamps keep their order.
    pub fn new(mut events: Vec<InputEvent>, clock: ManualClock) -> Self {
        events.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));
        Self {
            events,
            next: 0,
            clock,
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let now = self.clock.now_ms();
        let start = self.next;
        while self
            .events
            .get(self.next)
            .is_some_and(|e| e.timestamp_ms <= now)
        {
            self.next += 1;
        }
        self.events[start..self.next].to_vec()
    }
}
