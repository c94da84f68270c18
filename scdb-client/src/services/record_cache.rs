//! Record Cache: id → last fetched record, for exports without refetching

use scdb_common::citation;
use scdb_common::models::PaperRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared in-memory cache; clones point at the same map
#[derive(Debug, Clone, Default)]
pub struct RecordCache {
    records: Arc<RwLock<HashMap<i64, PaperRecord>>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace records in one critical section (last write wins)
    pub async fn upsert_all<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = PaperRecord>,
    {
        let mut map = self.records.write().await;
        let mut written = 0;
        for record in records {
            map.insert(record.id, record);
            written += 1;
        }
        written
    }

    pub async fn get(&self, id: i64) -> Option<PaperRecord> {
        self.records.read().await.get(&id).cloned()
    }

    /// Cached records in request order; unknown ids are skipped
    pub async fn get_many(&self, ids: &[i64]) -> Vec<PaperRecord> {
        let map = self.records.read().await;
        ids.iter().filter_map(|id| map.get(id).cloned()).collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// RIS export of cached records, in request order
    pub async fn export_ris(&self, ids: &[i64]) -> String {
        let records = self.get_many(ids).await;
        citation::to_ris_batch(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = RecordCache::new();
        cache
            .upsert_all(vec![PaperRecord::new(1, "10.1000/a", "first")])
            .await;
        cache
            .upsert_all(vec![PaperRecord::new(1, "10.1000/a", "second")])
            .await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(1).await.unwrap().title, "second");
    }

    #[tokio::test]
    async fn test_get_many_keeps_request_order() {
        let cache = RecordCache::new();
        cache
            .upsert_all((1..=3).map(|id| PaperRecord::new(id, "", format!("p{}", id))))
            .await;

        let titles: Vec<String> = cache
            .get_many(&[3, 99, 1])
            .await
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["p3", "p1"]);
    }

    #[tokio::test]
    async fn test_export_ris_and_clear() {
        let cache = RecordCache::new();
        cache
            .upsert_all(vec![PaperRecord::new(5, "10.1000/x", "Title")])
            .await;
        let ris = cache.export_ris(&[5]).await;
        assert!(ris.contains("TI  - Title"));

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.export_ris(&[5]).await, "");
    }
}
