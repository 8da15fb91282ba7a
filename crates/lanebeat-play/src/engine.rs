//! Live judgment of key input against a note timeline.
//!
//! The engine is driven from outside: `tick` advances the audio clock,
//! `key_down` / `key_up` report lane transitions. Each call returns the
//! events it produced. Per lane, notes are judged strictly in time order;
//! everything before a lane's cursor is already settled.

use lanebeat_model::{LaneId, Note, NoteTimeline, Totals};
use lanebeat_rule::{EarlyRelease, Grade, JudgeWindows, PlayPolicy, ScoreRule};
use log::debug;

use crate::config::EngineConfig;
use crate::error::{InputError, SessionStateError};
use crate::event::{InputEvent, JudgmentEvent, JudgmentResult};
use crate::score::{PlaySummary, ScoreState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Pending,
    Judged(Grade),
    Missed,
}

impl NoteState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// A hold note whose head was hit and whose key is still down.
#[derive(Debug, Clone, Copy)]
struct ActiveHold {
    /// Index into the lane's notes.
    note: usize,
    grade: Grade,
    head_score: u64,
    ticks: u32,
    total_ticks: u32,
}

/// Per-lane judgment state.
#[derive(Debug, Clone)]
struct LaneState {
    /// Next note that can still be judged. Everything before it is settled.
    cursor: usize,
    states: Vec<NoteState>,
    holding: Option<ActiveHold>,
}

impl LaneState {
    fn new(note_count: usize) -> Self {
        Self {
            cursor: 0,
            states: vec![NoteState::Pending; note_count],
            holding: None,
        }
    }
}

pub struct JudgmentEngine {
    timeline: NoteTimeline,
    windows: JudgeWindows,
    rule: ScoreRule,
    policy: PlayPolicy,
    finish_grace_ms: f64,
    totals: Totals,
    end_time_ms: f64,

    lanes: Vec<LaneState>,
    score: ScoreState,
    phase: Phase,
    last_tick_ms: f64,
    summary: Option<PlaySummary>,
}

impl JudgmentEngine {
    pub fn new(timeline: NoteTimeline, config: &EngineConfig) -> Self {
        let lanes = timeline
            .lanes()
            .map(|(_, notes)| LaneState::new(notes.len()))
            .collect();
        let totals = timeline.totals(&config.rule);
        let end_time_ms = timeline.last_end_time_ms();

        Self {
            timeline,
            windows: config.windows,
            rule: config.rule,
            policy: config.policy,
            finish_grace_ms: config.finish_grace_ms,
            totals,
            end_time_ms,
            lanes,
            score: ScoreState::new(),
            phase: Phase::Idle,
            last_tick_ms: f64::NEG_INFINITY,
            summary: None,
        }
    }

    pub fn start(&mut self) -> Result<(), SessionStateError> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Running;
                Ok(())
            }
            Phase::Running => Err(SessionStateError::AlreadyStarted),
            Phase::Finished => Err(SessionStateError::Finished),
        }
    }

    /// Advance the clock to `now_ms`: miss expired notes, credit hold ticks,
    /// and finish once the last note plus the grace period has passed.
    /// Timestamps earlier than the last processed tick are ignored.
    pub fn tick(&mut self, now_ms: f64) -> Vec<JudgmentEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Running || !now_ms.is_finite() || now_ms < self.last_tick_ms {
            return events;
        }
        self.last_tick_ms = now_ms;

        for lane in 0..self.lanes.len() {
            self.expire_stale(lane, now_ms, &mut events);
            self.advance_hold(lane, now_ms, &mut events);
        }

        if now_ms > self.end_time_ms + self.finish_grace_ms {
            self.miss_remaining(&mut events);
            let summary = self.finish(false);
            events.push(JudgmentEvent::Finished(summary));
        }
        events
    }

    pub fn key_down(&mut self, lane: LaneId, timestamp_ms: f64) -> Vec<JudgmentEvent> {
        let mut events = Vec::new();
        let index = lane.index();
        if self.phase != Phase::Running || index >= self.lanes.len() {
            return events;
        }
        if self.lanes[index].holding.is_some() {
            debug!("{} pressed again while holding; ignored", lane);
            return events;
        }

        self.expire_stale(index, timestamp_ms, &mut events);

        let notes = self.timeline.lane(lane);
        let state = &mut self.lanes[index];
        let candidate = notes
            .get(state.cursor)
            .copied()
            .filter(|note| self.windows.contains(timestamp_ms - note.just_time_ms));

        let Some(note) = candidate else {
            self.score.add_phantom(self.policy.phantom_press_breaks_combo);
            debug!("{} phantom press at {:.1}ms", lane, timestamp_ms);
            events.push(JudgmentEvent::Phantom {
                lane,
                time_ms: timestamp_ms,
            });
            return events;
        };

        let note_index = state.cursor;
        state.cursor += 1;

        let grade = self
            .windows
            .classify_tap_grade(timestamp_ms - note.just_time_ms);
        let head_score = self.rule.tap_score(grade);
        self.score.add_judgment(grade, head_score);

        if grade.is_combo_break() {
            state.states[note_index] = NoteState::Missed;
        } else {
            state.states[note_index] = NoteState::Judged(grade);
            if note.is_hold() {
                state.holding = Some(ActiveHold {
                    note: note_index,
                    grade,
                    head_score,
                    ticks: 0,
                    total_ticks: self.rule.hold_tick_count(note.duration_ms()),
                });
            }
        }

        debug!(
            "{} {} (delta {:+.1}ms)",
            lane,
            grade.label(),
            timestamp_ms - note.just_time_ms
        );
        events.push(JudgmentEvent::Judged(JudgmentResult {
            lane,
            grade,
            just_time_ms: note.just_time_ms,
            actual_time_ms: timestamp_ms,
            combo: self.score.combo,
            score: self.score.score,
        }));
        events
    }

    pub fn key_up(&mut self, lane: LaneId, timestamp_ms: f64) -> Vec<JudgmentEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Running {
            return events;
        }
        let index = lane.index();
        let Some(mut hold) = self.lanes.get_mut(index).and_then(|s| s.holding.take()) else {
            return events;
        };
        let Some(note) = self.timeline.lane(lane).get(hold.note).copied() else {
            return events;
        };

        if timestamp_ms >= note.end_time_ms() {
            self.complete_hold(lane, &mut hold, &mut events);
            return events;
        }

        let earned = self
            .rule
            .hold_ticks_elapsed(timestamp_ms - note.just_time_ms, note.duration_ms());
        self.credit_ticks(lane, &mut hold, earned, &mut events);

        self.lanes[index].states[hold.note] = NoteState::Missed;
        self.score.release_early(hold.grade);

        let (ticks_kept, ticks_forfeited) = match self.policy.early_release {
            EarlyRelease::KeepAccrued => (hold.ticks, hold.total_ticks.saturating_sub(hold.ticks)),
            EarlyRelease::ForfeitAll => {
                self.score
                    .revoke_hold(hold.head_score, hold.ticks, self.rule.hold_tick_score);
                (0, hold.total_ticks)
            }
        };

        debug!(
            "{} hold released early at {:.1}ms ({} kept, {} forfeited)",
            lane, timestamp_ms, ticks_kept, ticks_forfeited
        );
        events.push(JudgmentEvent::HoldReleased {
            lane,
            ticks_kept,
            ticks_forfeited,
        });
        events
    }

    /// Map a raw input event onto a lane and dispatch it.
    pub fn handle_input(&mut self, input: InputEvent) -> Result<Vec<JudgmentEvent>, InputError> {
        let lane = self
            .timeline
            .layout()
            .lane(input.lane)
            .ok_or(InputError::UnknownLane {
                lane: input.lane,
                lane_count: self.timeline.lane_count(),
            })?;

        Ok(if input.pressed {
            self.key_down(lane, input.timestamp_ms)
        } else {
            self.key_up(lane, input.timestamp_ms)
        })
    }

    /// Stop immediately. Pending notes are left as they are.
    pub fn abort(&mut self) -> PlaySummary {
        match &self.summary {
            Some(summary) => summary.clone(),
            None => self.finish(true),
        }
    }

    /// Final summary once finished, otherwise a snapshot of the running score.
    pub fn summary(&self) -> PlaySummary {
        self.summary
            .clone()
            .unwrap_or_else(|| PlaySummary::new(&self.score, self.totals, false))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn timeline(&self) -> &NoteTimeline {
        &self.timeline
    }

    pub fn note_state(&self, lane: LaneId, index: usize) -> Option<NoteState> {
        self.lanes.get(lane.index())?.states.get(index).copied()
    }

    pub fn is_holding(&self, lane: LaneId) -> bool {
        self.lanes
            .get(lane.index())
            .is_some_and(|s| s.holding.is_some())
    }

    /// Notes of `lane` paired with their current state.
    pub fn lane_notes(&self, lane: LaneId) -> impl Iterator<Item = (&Note, NoteState)> + '_ {
        self.timeline
            .lane(lane)
            .iter()
            .enumerate()
            .filter_map(move |(i, note)| self.note_state(lane, i).map(|state| (note, state)))
    }

    /// Notes not yet judged or missed.
    pub fn pending_count(&self) -> usize {
        self.lanes
            .iter()
            .map(|s| s.states.len() - s.cursor)
            .sum()
    }

    /// Miss every note in `lane` whose window closed before `now_ms`.
    fn expire_stale(&mut self, lane: usize, now_ms: f64, events: &mut Vec<JudgmentEvent>) {
        let id = LaneId::new(lane);
        let notes = self.timeline.lane(id);
        let state = &mut self.lanes[lane];
        while let Some(note) = notes.get(state.cursor) {
            if !self.windows.is_late_miss(now_ms - note.just_time_ms) {
                break;
            }
            state.states[state.cursor] = NoteState::Missed;
            state.cursor += 1;
            self.score.break_combo();
            debug!("{} missed note at {:.1}ms", id, note.just_time_ms);
            events.push(JudgmentEvent::Missed {
                lane: id,
                just_time_ms: note.just_time_ms,
            });
        }
    }

    fn advance_hold(&mut self, lane: usize, now_ms: f64, events: &mut Vec<JudgmentEvent>) {
        let id = LaneId::new(lane);
        let Some(mut hold) = self.lanes[lane].holding else {
            return;
        };
        let Some(note) = self.timeline.lane(id).get(hold.note).copied() else {
            self.lanes[lane].holding = None;
            return;
        };

        if now_ms >= note.end_time_ms() {
            self.lanes[lane].holding = None;
            self.complete_hold(id, &mut hold, events);
        } else {
            let earned = self
                .rule
                .hold_ticks_elapsed(now_ms - note.just_time_ms, note.duration_ms());
            self.credit_ticks(id, &mut hold, earned, events);
            self.lanes[lane].holding = Some(hold);
        }
    }

    fn complete_hold(
        &mut self,
        lane: LaneId,
        hold: &mut ActiveHold,
        events: &mut Vec<JudgmentEvent>,
    ) {
        let total = hold.total_ticks;
        self.credit_ticks(lane, hold, total, events);
        events.push(JudgmentEvent::HoldCompleted { lane, ticks: total });
    }

    fn credit_ticks(
        &mut self,
        lane: LaneId,
        hold: &mut ActiveHold,
        up_to: u32,
        events: &mut Vec<JudgmentEvent>,
    ) {
        while hold.ticks < up_to {
            hold.ticks += 1;
            self.score.add_hold_tick(self.rule.hold_tick_score);
            events.push(JudgmentEvent::HoldTick {
                lane,
                tick: hold.ticks,
                combo: self.score.combo,
                score: self.score.score,
            });
        }
    }

    fn miss_remaining(&mut self, events: &mut Vec<JudgmentEvent>) {
        for lane in 0..self.lanes.len() {
            self.expire_stale(lane, f64::INFINITY, events);
        }
    }

    fn finish(&mut self, aborted: bool) -> PlaySummary {
        for lane in &mut self.lanes {
            lane.holding = None;
        }
        self.phase = Phase::Finished;
        let summary = PlaySummary::new(&self.score, self.totals, aborted);
        self.summary = Some(summary.clone());
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanebeat_model::LaneLayout;

    fn engine_with(notes: Vec<Note>, config: &EngineConfig) -> JudgmentEngine {
        let timeline = NoteTimeline::from_notes(LaneLayout::six_key(), notes);
        let mut engine = JudgmentEngine::new(timeline, config);
        engine.start().unwrap();
        engine
    }

    fn lane(i: usize) -> LaneId {
        LaneId::new(i)
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut engine = engine_with(Vec::new(), &EngineConfig::default());
        assert_eq!(engine.start(), Err(SessionStateError::AlreadyStarted));
        engine.abort();
        assert_eq!(engine.start(), Err(SessionStateError::Finished));
    }

    #[test]
    fn idle_engine_ignores_everything() {
        let timeline =
            NoteTimeline::from_notes(LaneLayout::six_key(), vec![Note::tap(lane(0), 0, 100.0)]);
        let mut engine = JudgmentEngine::new(timeline, &EngineConfig::default());
        assert!(engine.key_down(lane(0), 100.0).is_empty());
        assert!(engine.tick(10_000.0).is_empty());
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.pending_count(), 1);
    }

    #[test]
    fn perfect_tap() {
        let mut engine = engine_with(vec![Note::tap(lane(2), 0, 1000.0)], &EngineConfig::default());
        let events = engine.key_down(lane(2), 1010.0);
        assert_eq!(events.len(), 1);
        let JudgmentEvent::Judged(result) = &events[0] else {
            panic!("expected judgment, got {:?}", events[0]);
        };
        assert_eq!(result.grade, Grade::Perfect);
        assert_eq!(result.combo, 1);
        assert_eq!(result.score, 2000);
        assert!((result.delta_ms() - 10.0).abs() < f64::EPSILON);
        assert_eq!(
            engine.note_state(lane(2), 0),
            Some(NoteState::Judged(Grade::Perfect))
        );
    }

    #[test]
    fn grades_follow_windows() {
        let notes = vec![
            Note::tap(lane(0), 0, 1000.0),
            Note::tap(lane(0), 1, 2000.0),
            Note::tap(lane(0), 2, 3000.0),
        ];
        let mut engine = engine_with(notes, &EngineConfig::default());
        engine.key_down(lane(0), 1080.0);
        engine.key_down(lane(0), 1880.0);
        engine.key_down(lane(0), 3180.0);
        assert_eq!(engine.score().count(Grade::Great), 1);
        assert_eq!(engine.score().count(Grade::Good), 1);
        assert_eq!(engine.score().count(Grade::Miss), 1);
        assert_eq!(engine.score().combo, 0);
        assert_eq!(engine.score().max_combo, 2);
        assert_eq!(engine.score().score, 2500);
        assert_eq!(engine.note_state(lane(0), 2), Some(NoteState::Missed));
    }

    #[test]
    fn press_far_from_note_is_phantom() {
        let mut engine = engine_with(
            vec![Note::tap(lane(0), 0, 100.0), Note::tap(lane(0), 1, 6000.0)],
            &EngineConfig::default(),
        );
        engine.key_down(lane(0), 100.0);
        let events = engine.key_down(lane(0), 5000.0);
        assert!(matches!(events.last(), Some(JudgmentEvent::Phantom { .. })));
        assert_eq!(engine.score().combo, 1);
        assert_eq!(engine.score().phantom_presses, 1);
        assert_eq!(engine.note_state(lane(0), 1), Some(NoteState::Pending));
    }

    #[test]
    fn stale_note_is_expired_before_press() {
        let mut engine = engine_with(
            vec![Note::tap(lane(0), 0, 100.0), Note::tap(lane(0), 1, 1000.0)],
            &EngineConfig::default(),
        );
        let events = engine.key_down(lane(0), 1000.0);
        assert!(matches!(events[0], JudgmentEvent::Missed { .. }));
        assert!(matches!(events[1], JudgmentEvent::Judged(_)));
        assert_eq!(engine.score().miss_count, 1);
        assert_eq!(engine.score().combo, 1);
    }

    #[test]
    fn tick_auto_misses_after_window() {
        let mut engine = engine_with(vec![Note::tap(lane(0), 0, 1000.0)], &EngineConfig::default());
        assert!(engine.tick(1200.0).is_empty());
        let events = engine.tick(1200.5);
        assert_eq!(
            events,
            vec![JudgmentEvent::Missed {
                lane: lane(0),
                just_time_ms: 1000.0
            }]
        );
        assert_eq!(engine.pending_count(), 0);
    }

    #[test]
    fn earlier_tick_is_ignored() {
        let mut engine = engine_with(vec![Note::tap(lane(0), 0, 1000.0)], &EngineConfig::default());
        engine.tick(500.0);
        assert_eq!(engine.tick(1500.0).len(), 1);
        assert!(engine.tick(400.0).is_empty());
    }

    #[test]
    fn hold_ticks_accrue_with_clock() {
        let mut engine = engine_with(
            vec![Note::hold(lane(1), 0, 1000.0, 1000.0)],
            &EngineConfig::default(),
        );
        engine.key_down(lane(1), 1000.0);
        assert!(engine.is_holding(lane(1)));
        let events = engine.tick(1450.0);
        assert_eq!(events.len(), 2);
        assert_eq!(engine.score().hold_ticks, 2);
        let events = engine.tick(2000.0);
        assert!(matches!(
            events.last(),
            Some(JudgmentEvent::HoldCompleted { ticks: 5, .. })
        ));
        assert!(!engine.is_holding(lane(1)));
        assert_eq!(engine.score().combo, 6);
        assert_eq!(engine.score().score, 2500);
        // key up after completion is a no-op
        assert!(engine.key_up(lane(1), 2050.0).is_empty());
    }

    #[test]
    fn repeated_press_while_holding_is_ignored() {
        let mut engine = engine_with(
            vec![
                Note::hold(lane(1), 0, 1000.0, 1000.0),
                Note::tap(lane(1), 1, 1100.0),
            ],
            &EngineConfig::default(),
        );
        engine.key_down(lane(1), 1000.0);
        assert!(engine.key_down(lane(1), 1100.0).is_empty());
        assert_eq!(engine.note_state(lane(1), 1), Some(NoteState::Pending));
    }

    #[test]
    fn finish_after_grace() {
        let config = EngineConfig {
            finish_grace_ms: 500.0,
            ..Default::default()
        };
        let mut engine = engine_with(vec![Note::tap(lane(0), 0, 1000.0)], &config);
        engine.key_down(lane(0), 1000.0);
        assert!(engine.tick(1500.0).is_empty());
        let events = engine.tick(1500.1);
        let Some(JudgmentEvent::Finished(summary)) = events.last() else {
            panic!("expected finish, got {:?}", events);
        };
        assert_eq!(summary.final_score, 2000);
        assert!(!summary.aborted);
        assert!(engine.is_finished());
        assert!(engine.tick(9000.0).is_empty());
        assert!(engine.key_down(lane(0), 9000.0).is_empty());
    }

    #[test]
    fn short_grace_still_misses_remaining_notes() {
        let config = EngineConfig {
            finish_grace_ms: 0.0,
            ..Default::default()
        };
        let mut engine = engine_with(vec![Note::tap(lane(0), 0, 1000.0)], &config);
        let events = engine.tick(1001.0);
        assert!(matches!(events[0], JudgmentEvent::Missed { .. }));
        assert!(matches!(events[1], JudgmentEvent::Finished(_)));
        assert_eq!(engine.summary().miss_count, 1);
    }

    #[test]
    fn abort_freezes_summary() {
        let mut engine = engine_with(vec![Note::tap(lane(0), 0, 1000.0)], &EngineConfig::default());
        engine.key_down(lane(0), 1000.0);
        let summary = engine.abort();
        assert!(summary.aborted);
        assert_eq!(summary.final_combo, 1);
        assert_eq!(engine.abort(), summary);
        assert_eq!(engine.summary(), summary);
    }

    #[test]
    fn unknown_lane_input_is_error() {
        let mut engine = engine_with(Vec::new(), &EngineConfig::default());
        let err = engine.handle_input(InputEvent::down(7, 0.0)).unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownLane {
                lane: 7,
                lane_count: 6
            }
        );
    }

    #[test]
    fn lane_notes_pairs_states() {
        let mut engine = engine_with(
            vec![Note::tap(lane(0), 0, 100.0), Note::tap(lane(0), 1, 900.0)],
            &EngineConfig::default(),
        );
        engine.key_down(lane(0), 100.0);
        let states: Vec<NoteState> = engine.lane_notes(lane(0)).map(|(_, s)| s).collect();
        assert_eq!(
            states,
            vec![NoteState::Judged(Grade::Perfect), NoteState::Pending]
        );
    }
}
