use crate::event::JudgmentEvent;

/// Receiver of engine output (judgment effects, result screen, logging).
pub trait JudgmentSink {
    fn on_event(&mut self, event: &JudgmentEvent);
}

impl JudgmentSink for Vec<JudgmentEvent> {
    fn on_event(&mut self, event: &JudgmentEvent) {
        self.push(event.clone());
    }
}

/// Discards everything.
impl JudgmentSink for () {
    fn on_event(&mut self, _event: &JudgmentEvent) {}
}
