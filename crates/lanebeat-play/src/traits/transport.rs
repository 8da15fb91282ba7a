use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;

/// Abstraction over the music playback the session is timed against.
/// Implementations: ManualTransport (autoplay, testing).
pub trait AudioTransport {
    /// Playback position in milliseconds from track start.
    fn current_time_ms(&self) -> f64;

    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

/// Shared, manually driven clock.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    pub fn set_time(&self, ms: f64) {
        self.now_ms.set(ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

/// Transport whose clock only moves when told to.
#[derive(Debug)]
pub struct ManualTransport {
    clock: ManualClock,
    state: TransportState,
}

impl ManualTransport {
    pub fn new() -> Self {
        Self {
            clock: ManualClock::new(),
            state: TransportState::Stopped,
        }
    }

    /// Handle for moving the clock while the session owns the transport.
    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }
}

impl Default for ManualTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioTransport for ManualTransport {
    fn current_time_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    fn play(&mut self) -> Result<()> {
        self.state = TransportState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state == TransportState::Playing {
            self.state = TransportState::Paused;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.state == TransportState::Paused {
            self.state = TransportState::Playing;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.state = TransportState::Stopped;
        Ok(())
    }
}
