use std::collections::HashMap;

use anyhow::Result;

use crate::records::{PlayRecord, PublicRanking, ResultEntry};

/// Persistence for play results, personal bests and public rankings.
/// Implementations: MemoryRecordStore (testing), JsonRecordStore (local files).
pub trait RecordStore {
    fn save_result(&mut self, entry: &ResultEntry) -> Result<()>;

    fn own_record(&self, uid: &str, chart_id: &str) -> Result<Option<PlayRecord>>;
    fn save_own_record(&mut self, uid: &str, chart_id: &str, record: &PlayRecord) -> Result<()>;

    /// Empty ranking when the chart has none yet.
    fn public_ranking(&self, chart_id: &str) -> Result<PublicRanking>;
    fn save_public_ranking(&mut self, chart_id: &str, ranking: &PublicRanking) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    results: Vec<ResultEntry>,
    own_records: HashMap<(String, String), PlayRecord>,
    rankings: HashMap<String, PublicRanking>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }
}

impl RecordStore for MemoryRecordStore {
    fn save_result(&mut self, entry: &ResultEntry) -> Result<()> {
        self.results.push(entry.clone());
        Ok(())
    }

    fn own_record(&self, uid: &str, chart_id: &str) -> Result<Option<PlayRecord>> {
        Ok(self
            .own_records
            .get(&(uid.to_string(), chart_id.to_string()))
            .copied())
    }

    fn save_own_record(&mut self, uid: &str, chart_id: &str, record: &PlayRecord) -> Result<()> {
        self.own_records
            .insert((uid.to_string(), chart_id.to_string()), *record);
        Ok(())
    }

    fn public_ranking(&self, chart_id: &str) -> Result<PublicRanking> {
        Ok(self.rankings.get(chart_id).cloned().unwrap_or_default())
    }

    fn save_public_ranking(&mut self, chart_id: &str, ranking: &PublicRanking) -> Result<()> {
        self.rankings.insert(chart_id.to_string(), ranking.clone());
        Ok(())
    }
}
