//! Aggregation over a scripted in-memory catalog

use async_trait::async_trait;
use scdb_client::api::types::{CompoundInfo, SearchMode};
use scdb_client::api::CatalogApi;
use scdb_client::services::{
    AggregationOrchestrator, CombinationResolver, LoadOutcome, LoadPhase, LoadRequest,
    PaperFetcher, PaperFilters, RecordCache, ViewMode,
};
use scdb_client::{ClientError, ClientResult};
use scdb_common::models::{ElementCombination, PaperRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Held fetch: `started` fires when the fetch begins, `release` lets it finish
struct Gate {
    symbols: String,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[derive(Default)]
struct FakeCatalog {
    combinations: Vec<ElementCombination>,
    search_fails: bool,
    papers: HashMap<String, ClientResult<Vec<PaperRecord>>>,
    gate: Option<Gate>,
    search_calls: AtomicUsize,
    fetched: Mutex<Vec<(String, PaperFilters)>>,
}

impl FakeCatalog {
    fn with_papers(mut self, symbols: &str, records: Vec<PaperRecord>) -> Self {
        self.papers.insert(symbols.to_string(), Ok(records));
        self
    }

    fn with_failure(mut self, symbols: &str, status: u16) -> Self {
        self.papers.insert(
            symbols.to_string(),
            Err(ClientError::fetch_failed(Some(status), "backend exploded")),
        );
        self
    }

    fn with_combinations(mut self, keys: &[&str]) -> Self {
        self.combinations = keys
            .iter()
            .filter_map(|k| ElementCombination::parse(k))
            .collect();
        self
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn compound_info(&self, symbols: &str) -> ClientResult<CompoundInfo> {
        Err(ClientError::fetch_failed(Some(404), format!("{} not found", symbols)))
    }

    async fn search_combinations(
        &self,
        _elements: &[String],
        _mode: SearchMode,
    ) -> ClientResult<Vec<ElementCombination>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.search_fails {
            return Err(ClientError::fetch_failed(Some(500), "search unavailable"));
        }
        Ok(self.combinations.clone())
    }

    async fn papers_for_combination(
        &self,
        symbols: &str,
        filters: &PaperFilters,
    ) -> ClientResult<Vec<PaperRecord>> {
        self.fetched
            .lock()
            .unwrap()
            .push((symbols.to_string(), filters.clone()));

        if let Some(gate) = self.gate.as_ref().filter(|g| g.symbols == symbols) {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        match self.papers.get(symbols) {
            Some(Ok(records)) => Ok(records.clone()),
            Some(Err(e)) => Err(ClientError::fetch_failed(e.status(), e.to_string())),
            None => Ok(Vec::new()),
        }
    }
}

fn paper(id: i64, tc: f64) -> PaperRecord {
    let mut record = PaperRecord::new(id, format!("10.1103/PhysRevB.{}", id), format!("Paper {}", id));
    record.tc = Some(tc);
    record.pressure = Some(0.0);
    record
}

fn orchestrator(api: Arc<FakeCatalog>) -> AggregationOrchestrator {
    AggregationOrchestrator::new(
        CombinationResolver::new(api.clone()),
        PaperFetcher::new(api),
        RecordCache::new(),
    )
}

#[tokio::test]
async fn test_only_mode_is_selection_order_independent() {
    let api = Arc::new(FakeCatalog::default().with_papers("Fe-Se", vec![paper(1, 8.0)]));
    let orch = orchestrator(api.clone());

    let first = orch
        .load(&LoadRequest::new(["Se", "Fe"], ViewMode::Only))
        .await
        .unwrap()
        .into_snapshot()
        .unwrap();
    let second = orch
        .load(&LoadRequest::new(["Fe", "Se"], ViewMode::Only))
        .await
        .unwrap()
        .into_snapshot()
        .unwrap();

    assert_eq!(first.sections.len(), 1);
    assert_eq!(first.sections[0].combination.key(), "Fe-Se");
    assert_eq!(first.sections, second.sections);
    assert_eq!(second.generation, 2);

    // Only mode never asks the backend to resolve
    assert_eq!(api.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_selection_loads_nothing() {
    let api = Arc::new(FakeCatalog::default().with_combinations(&["Fe-Se"]));
    let orch = orchestrator(api.clone());

    let snapshot = orch
        .load(&LoadRequest::new(Vec::<String>::new(), ViewMode::Contains))
        .await
        .unwrap()
        .into_snapshot()
        .unwrap();

    assert!(snapshot.sections.is_empty());
    assert_eq!(snapshot.total_count, 0);
    assert_eq!(api.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_records_are_ingested_and_cached() {
    let api = Arc::new(
        FakeCatalog::default()
            .with_combinations(&["Fe-Se", "Fe-Se-Te"])
            .with_papers("Fe-Se", vec![paper(1, 8.0), paper(2, 37.0)])
            .with_papers("Fe-Se-Te", vec![paper(3, 14.0)]),
    );
    let orch = orchestrator(api);

    let snapshot = orch
        .load(&LoadRequest::new(["Fe", "Se"], ViewMode::Contains))
        .await
        .unwrap()
        .into_snapshot()
        .unwrap();

    assert_eq!(snapshot.total_count, 3);
    assert_eq!(snapshot.record_ids(), vec![1, 2, 3]);
    assert!(snapshot.is_complete());
    assert_eq!(orch.phase().await, LoadPhase::Aggregated);

    // Flat tc/pressure folded into a single data point with an S-factor
    let cached = orch.cache().get(2).await.unwrap();
    assert_eq!(cached.data.len(), 1);
    assert!(cached.data[0].s_factor().is_some());
    assert_eq!(orch.cache().len().await, 3);
}

#[tokio::test]
async fn test_failed_section_is_isolated() {
    let api = Arc::new(
        FakeCatalog::default()
            .with_combinations(&["Cu-O", "Ba-Cu-O"])
            .with_failure("Cu-O", 500)
            .with_papers("Ba-Cu-O", vec![paper(10, 35.0), paper(11, 30.0)]),
    );
    let orch = orchestrator(api);

    let snapshot = orch
        .load(&LoadRequest::new(["Cu", "O"], ViewMode::Contains))
        .await
        .unwrap()
        .into_snapshot()
        .unwrap();

    assert_eq!(snapshot.sections.len(), 2);
    assert!(snapshot.sections[0].error().is_some());
    assert_eq!(snapshot.sections[1].records().len(), 2);
    assert_eq!(snapshot.total_count, 2);

    let failed: Vec<&str> = snapshot.failed_combinations().iter().map(|c| c.key()).collect();
    assert_eq!(failed, vec!["Cu-O"]);
    assert!(!snapshot.is_complete());

    match snapshot.into_complete() {
        Err(ClientError::PartialAggregationFailure { failed }) => {
            assert_eq!(failed, vec!["Cu-O".to_string()]);
        }
        other => panic!("expected partial failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolver_failure_aborts_load() {
    let api = Arc::new(FakeCatalog {
        search_fails: true,
        ..FakeCatalog::default()
    });
    let orch = orchestrator(api.clone());

    let err = orch
        .load(&LoadRequest::new(["Mg", "B"], ViewMode::Combination))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::FetchFailed { status: Some(500), .. }));
    assert_eq!(orch.phase().await, LoadPhase::Idle);
    assert!(api.fetched.lock().unwrap().is_empty());
    assert!(orch.cache().is_empty().await);
}

#[tokio::test]
async fn test_filters_reach_every_fetch() {
    let api = Arc::new(FakeCatalog::default().with_combinations(&["H-S", "H-La"]));
    let orch = orchestrator(api.clone());

    let filters = PaperFilters {
        keyword: Some("hydride".to_string()),
        year_min: Some(2015),
        ..PaperFilters::default()
    };
    orch.load(&LoadRequest::new(["H"], ViewMode::Contains).with_filters(filters.clone()))
        .await
        .unwrap();

    let fetched = api.fetched.lock().unwrap().clone();
    assert_eq!(fetched.len(), 2);
    assert!(fetched.iter().all(|(_, f)| *f == filters));
}

#[tokio::test]
async fn test_superseded_load_leaves_cache_untouched() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let api = Arc::new(
        FakeCatalog {
            gate: Some(Gate {
                symbols: "Fe-Se".to_string(),
                started: started.clone(),
                release: release.clone(),
            }),
            ..FakeCatalog::default()
        }
        .with_papers("Fe-Se", vec![paper(1, 8.0)])
        .with_papers("Cu-O", vec![paper(2, 90.0)]),
    );
    let orch = orchestrator(api);

    let slow = {
        let orch = orch.clone();
        tokio::spawn(async move { orch.load(&LoadRequest::new(["Fe", "Se"], ViewMode::Only)).await })
    };
    started.notified().await;

    let fast = orch
        .load(&LoadRequest::new(["Cu", "O"], ViewMode::Only))
        .await
        .unwrap();
    assert_eq!(fast.snapshot().map(|s| s.generation), Some(2));

    release.notify_one();
    let outcome = slow.await.unwrap().unwrap();

    assert_eq!(outcome, LoadOutcome::Superseded { generation: 1 });
    assert!(orch.cache().get(1).await.is_none());
    assert!(orch.cache().get(2).await.is_some());
    assert_eq!(orch.current_generation(), 2);
    assert_eq!(orch.phase().await, LoadPhase::Aggregated);
}

#[tokio::test]
async fn test_record_in_two_sections_keeps_later_copy() {
    let mut earlier = paper(7, 8.0);
    earlier.title = "From Fe-Se".to_string();
    let mut later = paper(7, 14.0);
    later.title = "From Fe-Se-Te".to_string();

    let api = Arc::new(
        FakeCatalog::default()
            .with_combinations(&["Fe-Se", "Fe-Se-Te"])
            .with_papers("Fe-Se", vec![earlier])
            .with_papers("Fe-Se-Te", vec![later]),
    );
    let orch = orchestrator(api);

    let snapshot = orch
        .load(&LoadRequest::new(["Fe", "Se"], ViewMode::Contains))
        .await
        .unwrap()
        .into_snapshot()
        .unwrap();

    // Both sections show the record; the cache holds one copy
    assert_eq!(snapshot.record_ids(), vec![7, 7]);
    assert_eq!(snapshot.total_count, 2);
    assert_eq!(orch.cache().len().await, 1);
    assert_eq!(orch.cache().get(7).await.unwrap().title, "From Fe-Se-Te");
}
