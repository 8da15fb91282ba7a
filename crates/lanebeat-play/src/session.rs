use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::engine::JudgmentEngine;
use crate::event::JudgmentEvent;
use crate::queue::{EventQueue, EventSender, PlayEvent};
use crate::score::PlaySummary;
use crate::traits::{AudioTransport, InputSource, JudgmentSink};

/// One play of one chart: the judgment engine, the audio transport it is
/// timed against, and the queue feeding both.
///
/// All processing happens on the thread calling `pump` / `frame`. Other
/// threads only enqueue through an [`EventSender`].
pub struct PlaySession<T: AudioTransport> {
    chart_id: String,
    engine: JudgmentEngine,
    transport: T,
    queue: EventQueue,
    paused: bool,
    ended: bool,
}

impl<T: AudioTransport> PlaySession<T> {
    pub fn new(chart_id: impl Into<String>, engine: JudgmentEngine, transport: T) -> Self {
        Self {
            chart_id: chart_id.into(),
            engine,
            transport,
            queue: EventQueue::new(),
            paused: false,
            ended: false,
        }
    }

    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    pub fn start(&mut self) -> Result<()> {
        self.engine.start()?;
        self.transport.play().context("failed to start audio")?;
        let totals = self.engine.totals();
        info!(
            "play start: {} ({} notes, max combo {}, max score {})",
            self.chart_id,
            self.engine.timeline().note_count(),
            totals.max_combo,
            totals.max_score
        );
        Ok(())
    }

    /// Process every queued event in arrival order. Returns true once the
    /// play has finished.
    pub fn pump<S: JudgmentSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        for event in self.queue.drain() {
            if self.engine.is_finished() {
                break;
            }
            match event {
                PlayEvent::Tick(now_ms) => {
                    if !self.paused {
                        emit(sink, &self.engine.tick(now_ms));
                    }
                }
                PlayEvent::Input(input) => {
                    if self.paused {
                        debug!("Paused; dropping input {:?}", input);
                        continue;
                    }
                    match self.engine.handle_input(input) {
                        Ok(events) => emit(sink, &events),
                        Err(err) => warn!("Ignoring input: {}", err),
                    }
                }
                PlayEvent::Abort => {
                    let summary = self.abort();
                    sink.on_event(&JudgmentEvent::Finished(summary));
                }
            }
        }
        self.finish_if_done();
        self.engine.is_finished()
    }

    /// Sample the input source and the audio clock, then pump.
    /// Input is queued ahead of the tick so presses are judged before the
    /// clock can expire their notes.
    pub fn frame<I, S>(&mut self, input: &mut I, sink: &mut S) -> bool
    where
        I: InputSource + ?Sized,
        S: JudgmentSink + ?Sized,
    {
        for event in input.poll_events() {
            self.queue.push(PlayEvent::Input(event));
        }
        if !self.paused {
            self.queue.push(PlayEvent::Tick(self.transport.current_time_ms()));
        }
        self.pump(sink)
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.paused || self.engine.is_finished() {
            return Ok(());
        }
        self.transport.pause().context("failed to pause audio")?;
        self.paused = true;
        info!("play paused: {}", self.chart_id);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if !self.paused {
            return Ok(());
        }
        self.transport.resume().context("failed to resume audio")?;
        self.paused = false;
        info!("play resumed: {}", self.chart_id);
        Ok(())
    }

    /// Stop now. Safe to call more than once.
    pub fn abort(&mut self) -> PlaySummary {
        let summary = self.engine.abort();
        self.finish_if_done();
        summary
    }

    pub fn summary(&self) -> PlaySummary {
        self.engine.summary()
    }

    pub fn chart_id(&self) -> &str {
        &self.chart_id
    }

    pub fn engine(&self) -> &JudgmentEngine {
        &self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    fn finish_if_done(&mut self) {
        if self.ended || !self.engine.is_finished() {
            return;
        }
        self.ended = true;
        if let Err(err) = self.transport.stop() {
            warn!("Failed to stop audio: {:#}", err);
        }
        let summary = self.engine.summary();
        info!(
            "play end: {} score={}/{} combo={} best_combo={}/{} miss={} aborted={}",
            self.chart_id,
            summary.final_score,
            summary.max_score,
            summary.final_combo,
            summary.best_combo,
            summary.max_combo,
            summary.miss_count,
            summary.aborted
        );
    }
}

impl<T: AudioTransport> Drop for PlaySession<T> {
    fn drop(&mut self) {
        if !self.ended
            && let Err(err) = self.transport.stop()
        {
            warn!("Failed to stop audio on drop: {:#}", err);
        }
    }
}

fn emit<S: JudgmentSink + ?Sized>(sink: &mut S, events: &[JudgmentEvent]) {
    for event in events {
        sink.on_event(event);
    }
}
