use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use lanebeat_model::{LaneLayout, TimelineBuilder};
use lanebeat_rule::{JudgeWindows, PlayPolicy, ScoreRule};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "lanebeat.json";

/// Per-player preferences carried alongside the engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerSettings {
    /// Note scroll speed multiplier.
    pub notes_speed: f64,
    /// 0.0..=1.0
    pub bgm_volume: f64,
    /// 0.0..=1.0
    pub se_volume: f64,
    pub current_chart: Option<String>,
    pub current_mode: Option<String>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            notes_speed: 1.0,
            bgm_volume: 0.5,
            se_volume: 0.5,
            current_chart: None,
            current_mode: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub windows: JudgeWindows,
    pub rule: ScoreRule,
    pub policy: PlayPolicy,
    pub layout: LaneLayout,
    /// How long after the last note ends the session keeps running.
    pub finish_grace_ms: f64,
    /// Clock sampling interval for autoplay and frame-driven play.
    pub tick_interval_ms: f64,
    /// Entries kept in a chart's public ranking.
    pub ranking_size: usize,
    pub player: PlayerSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            windows: JudgeWindows::default(),
            rule: ScoreRule::default(),
            policy: PlayPolicy::default(),
            layout: LaneLayout::default(),
            finish_grace_ms: 2000.0,
            tick_interval_ms: 16.0,
            ranking_size: 10,
            player: PlayerSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Loads config from the default config file.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Saves config to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(CONFIG_FILE)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.windows.is_ordered() {
            bail!("judge windows must widen from perfect to miss");
        }
        if self.layout.is_empty() {
            bail!("lane layout must have at least one lane");
        }
        if !(self.tick_interval_ms > 0.0) {
            bail!("tick interval must be positive");
        }
        if !(self.finish_grace_ms >= 0.0) {
            bail!("finish grace must not be negative");
        }
        Ok(())
    }

    /// Timeline builder matching this config's score rule and lane layout.
    pub fn timeline_builder(&self) -> TimelineBuilder {
        TimelineBuilder::new(self.rule).with_layout(self.layout.clone())
    }
}
