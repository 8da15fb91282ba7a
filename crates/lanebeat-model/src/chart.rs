use serde::{Deserialize, Serialize};

/// Raw content of one lane cell in a chart row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LaneValue {
    /// No note in this lane at this row.
    Empty,
    /// `0`: a tap note.
    Tap,
    /// A positive number: a hold note lasting `beats` beats.
    Hold { beats: f64 },
}

impl LaneValue {
    pub fn is_note(&self) -> bool {
        !matches!(self, LaneValue::Empty)
    }
}

/// One vertical slice of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    /// 1-based source line.
    pub line: usize,
    pub measure: f64,
    pub beat: f64,
    /// One entry per lane.
    pub lanes: Vec<LaneValue>,
}

impl ChartRow {
    /// Musical position in beats from the start of the chart.
    pub fn position_beats(&self, beats_per_measure: f64) -> f64 {
        self.measure * beats_per_measure + self.beat
    }
}

/// Chart header values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub music_name: Option<String>,
    pub composer: Option<String>,
    pub mode: Option<String>,
    pub level: Option<u32>,
    /// Track length, only present in legacy charts.
    pub full_time_ms: Option<f64>,
    pub bpm: f64,
    pub beats_per_measure: f64,
    /// Shifts every note; may be negative.
    pub offset_seconds: f64,
}

impl ChartMetadata {
    pub fn time_per_beat_ms(&self) -> f64 {
        60_000.0 / self.bpm
    }

    /// Absolute time of a musical position, in milliseconds from track start.
    pub fn just_time_ms(&self, measure: f64, beat: f64) -> f64 {
        (measure * self.beats_per_measure + beat) * self.time_per_beat_ms()
            + self.offset_seconds * 1000.0
    }

    /// Convert a hold length in beats to milliseconds.
    pub fn beats_to_ms(&self, beats: f64) -> f64 {
        beats * self.time_per_beat_ms()
    }
}

/// A parsed chart: header plus note rows in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub metadata: ChartMetadata,
    pub lane_count: usize,
    pub rows: Vec<ChartRow>,
}

impl Chart {
    /// Number of non-empty lane cells.
    pub fn note_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.lanes.iter().filter(|v| v.is_note()).count())
            .sum()
    }

    /// Whether rows are in non-decreasing musical order.
    pub fn is_ordered(&self) -> bool {
        let bpm = self.metadata.beats_per_measure;
        self.rows
            .windows(2)
            .all(|w| w[0].position_beats(bpm) <= w[1].position_beats(bpm))
    }
}
