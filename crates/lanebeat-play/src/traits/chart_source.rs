use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Where chart text and music come from.
/// Implementations: DirChartSource (local directory).
pub trait ChartSource {
    fn chart_text(&self, chart_id: &str) -> Result<String>;
    fn audio_url(&self, chart_id: &str) -> Result<String>;
}

/// Reject ids that could escape the directory they are joined onto.
pub(crate) fn ensure_path_segment(kind: &str, value: &str) -> Result<()> {
    if value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\'])
    {
        bail!("invalid {kind} `{value}`");
    }
    Ok(())
}

/// Song name part of a chart id: everything before the first `-`.
/// `sample_sound-hard` and `sample_sound-normal` share `sample_sound`.
pub fn music_name(chart_id: &str) -> &str {
    chart_id.split('-').next().unwrap_or(chart_id)
}

/// Charts stored as `<root>/csv/<chart_id>.csv`.
#[derive(Debug, Clone)]
pub struct DirChartSource {
    root: PathBuf,
    audio_base: String,
    allowed: Option<Vec<String>>,
}

impl DirChartSource {
    pub fn new(root: impl Into<PathBuf>, audio_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            audio_base: audio_base.into(),
            allowed: None,
        }
    }

    /// Only serve the given chart ids.
    pub fn with_allowed<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    fn check_id(&self, chart_id: &str) -> Result<()> {
        ensure_path_segment("chart id", chart_id)?;
        if let Some(allowed) = &self.allowed
            && !allowed.iter().any(|id| id == chart_id)
        {
            bail!("unknown chart id `{chart_id}`");
        }
        Ok(())
    }

    pub fn chart_path(&self, chart_id: &str) -> PathBuf {
        self.root.join("csv").join(format!("{chart_id}.csv"))
    }

    /// Ids of every chart in the directory (or the allow-list), sorted.
    pub fn chart_ids(&self) -> Result<Vec<String>> {
        if let Some(allowed) = &self.allowed {
            return Ok(allowed.clone());
        }
        let dir = self.root.join("csv");
        let mut ids = Vec::new();
        for entry in
            fs::read_dir(&dir).with_context(|| format!("failed to list {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl ChartSource for DirChartSource {
    fn chart_text(&self, chart_id: &str) -> Result<String> {
        self.check_id(chart_id)?;
        let path = self.chart_path(chart_id);
        fs::read_to_string(&path).with_context(|| format!("failed to read chart {}", path.display()))
    }

    fn audio_url(&self, chart_id: &str) -> Result<String> {
        self.check_id(chart_id)?;
        Ok(format!(
            "{}/{}.mp3",
            self.audio_base.trim_end_matches('/'),
            music_name(chart_id)
        ))
    }
}
