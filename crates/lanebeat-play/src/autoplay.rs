use lanebeat_model::NoteTimeline;

use crate::event::InputEvent;
use crate::queue::PlayEvent;

const FALLBACK_TICK_MS: f64 = 16.0;

/// Perfectly timed key transitions for every note: press at the just time,
/// release at the note's end (immediately for taps). Sorted by time; within
/// a lane, each release stays ahead of the next press at the same instant.
pub fn autoplay_inputs(timeline: &NoteTimeline) -> Vec<InputEvent> {
    let mut inputs = Vec::with_capacity(timeline.note_count() * 2);
    for (lane, notes) in timeline.lanes() {
        for note in notes {
            inputs.push(InputEvent::down(lane.index(), note.just_time_ms));
            inputs.push(InputEvent::up(lane.index(), note.end_time_ms()));
        }
    }
    inputs.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));
    inputs
}

/// Autoplay inputs interleaved with clock ticks every `tick_interval_ms`,
/// ending with the first tick past the last note plus `finish_grace_ms`.
/// Inputs come before a tick with the same timestamp.
pub fn autoplay_events(
    timeline: &NoteTimeline,
    tick_interval_ms: f64,
    finish_grace_ms: f64,
) -> Vec<PlayEvent> {
    let interval = if tick_interval_ms.is_finite() && tick_interval_ms > 0.0 {
        tick_interval_ms
    } else {
        FALLBACK_TICK_MS
    };
    let end_ms = timeline.last_end_time_ms() + finish_grace_ms.max(0.0);

    let mut inputs = autoplay_inputs(timeline).into_iter().peekable();
    let mut events = Vec::new();
    let mut step: u64 = 0;
    loop {
        let now_ms = step as f64 * interval;
        while let Some(input) = inputs.next_if(|i| i.timestamp_ms <= now_ms) {
            events.push(PlayEvent::Input(input));
        }
        events.push(PlayEvent::Tick(now_ms));
        if now_ms > end_ms {
            break;
        }
        step += 1;
    }
    events
}
