use lanebeat_rule::ScoreRule;
use log::{debug, warn};

use crate::chart::{Chart, LaneValue};
use crate::lane::{LaneId, LaneLayout};
use crate::note::Note;
use crate::timeline::{NoteTimeline, Totals};

/// Converts a parsed chart into an absolute-time note timeline.
#[derive(Debug, Clone, Default)]
pub struct TimelineBuilder {
    rule: ScoreRule,
    layout: Option<LaneLayout>,
}

impl TimelineBuilder {
    pub fn new(rule: ScoreRule) -> Self {
        Self { rule, layout: None }
    }

    /// Use `layout` instead of one derived from the chart's lane count.
    /// Chart lanes beyond the layout are dropped.
    pub fn with_layout(mut self, layout: LaneLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn rule(&self) -> &ScoreRule {
        &self.rule
    }

    pub fn build(&self, chart: &Chart) -> NoteTimeline {
        let layout = self
            .layout
            .clone()
            .unwrap_or_else(|| LaneLayout::for_lane_count(chart.lane_count));

        if !chart.is_ordered() {
            warn!("Chart rows are out of order; sorting notes per lane");
        }

        let meta = &chart.metadata;
        let mut notes = Vec::with_capacity(chart.note_count());
        for (row_index, row) in chart.rows.iter().enumerate() {
            let just_time_ms = meta.just_time_ms(row.measure, row.beat);
            for (lane_index, value) in row.lanes.iter().enumerate() {
                let lane = LaneId::new(lane_index);
                match *value {
                    LaneValue::Empty => {}
                    LaneValue::Tap => notes.push(Note::tap(lane, row_index, just_time_ms)),
                    LaneValue::Hold { beats } => notes.push(Note::hold(
                        lane,
                        row_index,
                        just_time_ms,
                        meta.beats_to_ms(beats),
                    )),
                }
            }
        }

        let timeline = NoteTimeline::from_notes(layout, notes);
        debug!(
            "Built timeline: {} notes ({} holds) across {} lanes, ends at {:.1}ms",
            timeline.note_count(),
            timeline.hold_count(),
            timeline.lane_count(),
            timeline.last_end_time_ms()
        );
        timeline
    }

    /// Max combo and max score of the chart, without keeping the timeline.
    pub fn precompute_totals(&self, chart: &Chart) -> Totals {
        self.build(chart).totals(&self.rule)
    }
}
