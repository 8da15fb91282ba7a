use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::chart::{Chart, ChartMetadata, ChartRow, LaneValue};
use crate::error::ChartError;

/// Chart text layout version. Decides how many header lines precede the
/// note rows and what each of them holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartFormat {
    /// full time (s), bpm, beats per measure, offset (s)
    Legacy,
    /// music name, composer, mode, level, bpm, beats per measure, offset (s)
    #[default]
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    FullTime,
    MusicName,
    Composer,
    Mode,
    Level,
    Bpm,
    BeatsPerMeasure,
    OffsetSeconds,
}

const LEGACY_HEADER: [HeaderField; 4] = [
    HeaderField::FullTime,
    HeaderField::Bpm,
    HeaderField::BeatsPerMeasure,
    HeaderField::OffsetSeconds,
];

const STANDARD_HEADER: [HeaderField; 7] = [
    HeaderField::MusicName,
    HeaderField::Composer,
    HeaderField::Mode,
    HeaderField::Level,
    HeaderField::Bpm,
    HeaderField::BeatsPerMeasure,
    HeaderField::OffsetSeconds,
];

impl HeaderField {
    fn name(self) -> &'static str {
        match self {
            HeaderField::FullTime => "full time",
            HeaderField::MusicName => "music name",
            HeaderField::Composer => "composer",
            HeaderField::Mode => "mode",
            HeaderField::Level => "level",
            HeaderField::Bpm => "bpm",
            HeaderField::BeatsPerMeasure => "beats per measure",
            HeaderField::OffsetSeconds => "offset",
        }
    }
}

impl ChartFormat {
    fn header(self) -> &'static [HeaderField] {
        match self {
            ChartFormat::Legacy => &LEGACY_HEADER,
            ChartFormat::Standard => &STANDARD_HEADER,
        }
    }

    /// Number of header lines before the first note row.
    pub fn header_lines(self) -> usize {
        self.header().len()
    }
}

/// Chart text decoder.
#[derive(Debug, Clone, Default)]
pub struct ChartParser {
    format: ChartFormat,
    skip_malformed_rows: bool,
}

/// Parse chart text in the standard format, failing on any malformed row.
pub fn parse_chart(raw: &str, lane_count: usize) -> Result<Chart, ChartError> {
    ChartParser::default().parse(raw, lane_count)
}

impl ChartParser {
    pub fn new(format: ChartFormat) -> Self {
        Self {
            format,
            skip_malformed_rows: false,
        }
    }

    /// Skip malformed note rows instead of failing. Header errors stay fatal.
    pub fn lenient(mut self) -> Self {
        self.skip_malformed_rows = true;
        self
    }

    pub fn format(&self) -> ChartFormat {
        self.format
    }

    pub fn parse(&self, raw: &str, lane_count: usize) -> Result<Chart, ChartError> {
        if lane_count == 0 {
            return Err(ChartError::InvalidLaneCount);
        }

        let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

        let mut metadata = ChartMetadata {
            music_name: None,
            composer: None,
            mode: None,
            level: None,
            full_time_ms: None,
            bpm: 0.0,
            beats_per_measure: 0.0,
            offset_seconds: 0.0,
        };

        for (index, field) in self.format.header().iter().enumerate() {
            let Some((line_no, line)) = lines.next() else {
                return Err(ChartError::MalformedHeader {
                    line: index + 1,
                    field: field.name(),
                });
            };
            let value = line.split(',').next().unwrap_or("").trim();
            apply_header_field(&mut metadata, *field, value).ok_or(
                ChartError::MalformedHeader {
                    line: line_no,
                    field: field.name(),
                },
            )?;
        }

        let mut rows = Vec::new();
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }

            match parse_row(line_no, &fields, lane_count, &metadata) {
                Ok(row) => rows.push(row),
                Err(err) if self.skip_malformed_rows => warn!("Skipping chart row: {}", err),
                Err(err) => return Err(err),
            }
        }

        debug!(
            "Parsed chart: bpm={} beats_per_measure={} offset={}s rows={}",
            metadata.bpm,
            metadata.beats_per_measure,
            metadata.offset_seconds,
            rows.len()
        );

        Ok(Chart {
            metadata,
            lane_count,
            rows,
        })
    }
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Returns `None` if the value is not acceptable for the field.
fn apply_header_field(meta: &mut ChartMetadata, field: HeaderField, value: &str) -> Option<()> {
    match field {
        HeaderField::FullTime => {
            let seconds = parse_finite(value).filter(|v| *v >= 0.0)?;
            meta.full_time_ms = Some(seconds * 1000.0);
        }
        HeaderField::MusicName => meta.music_name = Some(value.to_string()),
        HeaderField::Composer => meta.composer = Some(value.to_string()),
        HeaderField::Mode => meta.mode = Some(value.to_string()),
        HeaderField::Level => meta.level = Some(value.parse::<u32>().ok()?),
        HeaderField::Bpm => meta.bpm = parse_finite(value).filter(|v| *v > 0.0)?,
        HeaderField::BeatsPerMeasure => {
            meta.beats_per_measure = parse_finite(value).filter(|v| *v > 0.0)?
        }
        HeaderField::OffsetSeconds => meta.offset_seconds = parse_finite(value)?,
    }
    Some(())
}

fn parse_row(
    line: usize,
    fields: &[&str],
    lane_count: usize,
    meta: &ChartMetadata,
) -> Result<ChartRow, ChartError> {
    if fields.len() < 2 {
        return Err(ChartError::MalformedRow {
            line,
            reason: "expected measure and beat".to_string(),
        });
    }

    let measure = parse_finite(fields[0]).ok_or_else(|| ChartError::MalformedRow {
        line,
        reason: format!("invalid measure `{}`", fields[0]),
    })?;
    let beat = parse_finite(fields[1]).ok_or_else(|| ChartError::MalformedRow {
        line,
        reason: format!("invalid beat `{}`", fields[1]),
    })?;
    if !meta.just_time_ms(measure, beat).is_finite() {
        return Err(ChartError::MalformedRow {
            line,
            reason: format!("position {measure}:{beat} is out of range"),
        });
    }

    let mut lanes = Vec::with_capacity(lane_count);
    for lane in 0..lane_count {
        let cell = fields.get(2 + lane).copied().unwrap_or("");
        let value = parse_lane_value(cell).ok_or_else(|| ChartError::MalformedRow {
            line,
            reason: format!("invalid value `{}` in lane {}", cell, lane + 1),
        })?;
        if let LaneValue::Hold { beats } = value
            && !meta.beats_to_ms(beats).is_finite()
        {
            return Err(ChartError::MalformedRow {
                line,
                reason: format!("hold length `{}` in lane {} is out of range", cell, lane + 1),
            });
        }
        lanes.push(value);
    }

    Ok(ChartRow {
        line,
        measure,
        beat,
        lanes,
    })
}

fn parse_lane_value(cell: &str) -> Option<LaneValue> {
    if cell.is_empty() {
        return Some(LaneValue::Empty);
    }
    let value = parse_finite(cell)?;
    if value == 0.0 {
        Some(LaneValue::Tap)
    } else if value > 0.0 {
        Some(LaneValue::Hold { beats: value })
    } else {
        None
    }
}
