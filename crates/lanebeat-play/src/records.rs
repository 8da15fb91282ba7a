use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::score::PlaySummary;
use crate::traits::RecordStore;

/// One finished play, stored under `results/<chart>/<uid>/<result_id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub result_id: Uuid,
    pub chart_id: String,
    pub uid: String,
    pub combo: u32,
    pub score: u64,
    pub created_at: DateTime<Utc>,
}

impl ResultEntry {
    pub fn new(chart_id: &str, uid: &str, summary: &PlaySummary) -> Self {
        Self {
            result_id: Uuid::new_v4(),
            chart_id: chart_id.to_string(),
            uid: uid.to_string(),
            combo: summary.best_combo,
            score: summary.final_score,
            created_at: Utc::now(),
        }
    }
}

/// A player's best on one chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRecord {
    pub best_combo: u32,
    pub best_score: u64,
    pub play_count: u32,
}

impl PlayRecord {
    /// Fold a new result into the record.
    pub fn merge(&self, entry: &ResultEntry) -> Self {
        Self {
            best_combo: self.best_combo.max(entry.combo),
            best_score: self.best_score.max(entry.score),
            play_count: self.play_count + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRecord {
    pub uid: String,
    pub score: u64,
    pub created_at: DateTime<Utc>,
}

/// Best records of a chart across players: highest score first, one entry per uid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicRanking {
    records: Vec<PublicRecord>,
}

impl PublicRanking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PublicRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 1-based rank of `uid`, if listed.
    pub fn position(&self, uid: &str) -> Option<usize> {
        self.records.iter().position(|r| r.uid == uid).map(|i| i + 1)
    }

    /// Offer a record. It replaces the player's existing entry only if it
    /// scores higher; ties rank behind older entries. The list is cut to
    /// `capacity`. Returns the new 1-based rank when the ranking changed.
    pub fn submit(&mut self, record: PublicRecord, capacity: usize) -> Option<usize> {
        if self
            .records
            .iter()
            .any(|r| r.uid == record.uid && r.score >= record.score)
        {
            return None;
        }

        let mut records: Vec<PublicRecord> = self
            .records
            .iter()
            .filter(|r| r.uid != record.uid)
            .cloned()
            .collect();
        let at = records
            .iter()
            .position(|r| r.score < record.score)
            .unwrap_or(records.len());
        if at >= capacity {
            return None;
        }
        records.insert(at, record);
        records.truncate(capacity);
        self.records = records;
        Some(at + 1)
    }
}

/// What `record_play` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub result_id: Uuid,
    /// The play beat the player's previous best score (or was the first play).
    pub new_best: bool,
    /// 1-based public rank, when the play entered or moved up the ranking.
    pub ranking_position: Option<usize>,
}

/// Store a finished play: the result entry, the player's best record, and
/// the chart's public ranking.
pub fn record_play<S: RecordStore + ?Sized>(
    store: &mut S,
    chart_id: &str,
    uid: &str,
    summary: &PlaySummary,
    ranking_size: usize,
) -> Result<RecordOutcome> {
    let entry = ResultEntry::new(chart_id, uid, summary);
    store.save_result(&entry)?;

    let previous = store.own_record(uid, chart_id)?;
    let new_best = previous.is_none_or(|p| entry.score > p.best_score);
    let merged = previous.unwrap_or_default().merge(&entry);
    store.save_own_record(uid, chart_id, &merged)?;

    let mut ranking = store.public_ranking(chart_id)?;
    let ranking_position = ranking.submit(
        PublicRecord {
            uid: uid.to_string(),
            score: entry.score,
            created_at: entry.created_at,
        },
        ranking_size,
    );
    if ranking_position.is_some() {
        store.save_public_ranking(chart_id, &ranking)?;
    }

    info!(
        "Recorded play {} on {}: score={} combo={} best={} rank={:?}",
        entry.result_id, chart_id, entry.score, entry.combo, new_best, ranking_position
    );

    Ok(RecordOutcome {
        result_id: entry.result_id,
        new_best,
        ranking_position,
    })
}
