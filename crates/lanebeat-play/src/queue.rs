use std::sync::mpsc::{self, Receiver, Sender};

use crate::event::InputEvent;

/// Work item for a play session. Ticks and key events share one queue so
/// they are judged in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayEvent {
    Tick(f64),
    Input(InputEvent),
    Abort,
}

/// Producer handle. Cheap to clone; usable from other threads.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<PlayEvent>,
}

impl EventSender {
    /// Returns false once the session is gone.
    pub fn send(&self, event: PlayEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn tick(&self, now_ms: f64) -> bool {
        self.send(PlayEvent::Tick(now_ms))
    }

    pub fn input(&self, input: InputEvent) -> bool {
        self.send(PlayEvent::Input(input))
    }

    pub fn abort(&self) -> bool {
        self.send(PlayEvent::Abort)
    }
}

#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<PlayEvent>,
    rx: Receiver<PlayEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, event: PlayEvent) {
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.tx.send(event);
    }

    /// Everything queued so far, in arrival order. Never blocks.
    pub fn drain(&self) -> Vec<PlayEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
