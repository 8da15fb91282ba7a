use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::timeline::Totals;

/// Song-select entry for a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicInfo {
    pub chart_id: String,
    pub name: String,
    pub composer: String,
    pub mode: String,
    pub level: u32,
    pub bpm: f64,
    pub max_combo: u32,
    pub max_score: u64,
}

impl MusicInfo {
    /// Missing header text falls back to the chart id (name) or an empty string.
    pub fn from_chart(chart_id: &str, chart: &Chart, totals: Totals) -> Self {
        let meta = &chart.metadata;
        Self {
            chart_id: chart_id.to_string(),
            name: meta
                .music_name
                .clone()
                .unwrap_or_else(|| chart_id.to_string()),
            composer: meta.composer.clone().unwrap_or_default(),
            mode: meta.mode.clone().unwrap_or_default(),
            level: meta.level.unwrap_or(0),
            bpm: meta.bpm,
            max_combo: totals.max_combo,
            max_score: totals.max_score,
        }
    }
}
