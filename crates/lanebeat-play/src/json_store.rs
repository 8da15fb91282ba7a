use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::records::{PlayRecord, PublicRanking, ResultEntry};
use crate::traits::{RecordStore, ensure_path_segment};

/// Record store backed by a directory of JSON files:
///
/// - `results/<chart>/<uid>/<result_id>.json`
/// - `users/<uid>/records/<chart>.json`
/// - `public/<chart>.json`
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    root: PathBuf,
}

impl JsonRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn result_path(&self, entry: &ResultEntry) -> Result<PathBuf> {
        ensure_path_segment("chart id", &entry.chart_id)?;
        ensure_path_segment("uid", &entry.uid)?;
        Ok(self
            .root
            .join("results")
            .join(&entry.chart_id)
            .join(&entry.uid)
            .join(format!("{}.json", entry.result_id)))
    }

    fn own_record_path(&self, uid: &str, chart_id: &str) -> Result<PathBuf> {
        ensure_path_segment("uid", uid)?;
        ensure_path_segment("chart id", chart_id)?;
        Ok(self
            .root
            .join("users")
            .join(uid)
            .join("records")
            .join(format!("{chart_id}.json")))
    }

    fn ranking_path(&self, chart_id: &str) -> Result<PathBuf> {
        ensure_path_segment("chart id", chart_id)?;
        Ok(self.root.join("public").join(format!("{chart_id}.json")))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

impl RecordStore for JsonRecordStore {
    fn save_result(&mut self, entry: &ResultEntry) -> Result<()> {
        write_json(&self.result_path(entry)?, entry)
    }

    fn own_record(&self, uid: &str, chart_id: &str) -> Result<Option<PlayRecord>> {
        read_json(&self.own_record_path(uid, chart_id)?)
    }

    fn save_own_record(&mut self, uid: &str, chart_id: &str, record: &PlayRecord) -> Result<()> {
        write_json(&self.own_record_path(uid, chart_id)?, record)
    }

    fn public_ranking(&self, chart_id: &str) -> Result<PublicRanking> {
        Ok(read_json(&self.ranking_path(chart_id)?)?.unwrap_or_default())
    }

    fn save_public_ranking(&mut self, chart_id: &str, ranking: &PublicRanking) -> Result<()> {
        write_json(&self.ranking_path(chart_id)?, ranking)
    }
}
