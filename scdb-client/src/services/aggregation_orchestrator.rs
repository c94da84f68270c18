//! Aggregation Orchestrator
//!
//! One load runs `Idle → Resolving → Fetching → Aggregated`:
//! 1. The generation counter is bumped and the load remembers its value.
//! 2. The resolver turns the selection into combinations. A resolver failure
//!    aborts the load.
//! 3. One fetch per combination, all concurrent and joined. A failed fetch
//!    becomes a failed section; siblings are unaffected.
//! 4. If a newer load started meanwhile, the result is discarded and the
//!    Record Cache is left alone. In-flight requests are never cancelled.
//! 5. Otherwise records are ingested, written to the Record Cache in one
//!    critical section, and returned as an immutable snapshot.

use super::combination_resolver::{CombinationResolver, ViewMode};
use super::paper_fetcher::{PaperFetcher, PaperFilters};
use super::record_cache::RecordCache;
use crate::error::{ClientError, ClientResult};
use futures::future::join_all;
use scdb_common::derivation::ingest_record;
use scdb_common::models::{ElementCombination, PaperRecord};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Progress of the most recent load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Resolving,
    Fetching,
    Aggregated,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadPhase::Idle => "idle",
            LoadPhase::Resolving => "resolving",
            LoadPhase::Fetching => "fetching",
            LoadPhase::Aggregated => "aggregated",
        };
        f.write_str(name)
    }
}

/// What one load asks for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadRequest {
    pub selection: Vec<String>,
    pub mode: ViewMode,
    pub filters: PaperFilters,
}

impl LoadRequest {
    pub fn new<I, S>(selection: I, mode: ViewMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selection: selection.into_iter().map(Into::into).collect(),
            mode,
            filters: PaperFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: PaperFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Result of one combination's fetch
#[derive(Debug, Clone, PartialEq)]
pub enum SectionResult {
    Loaded(Vec<PaperRecord>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSection {
    pub combination: ElementCombination,
    pub result: SectionResult,
}

impl AggregateSection {
    pub fn records(&self) -> &[PaperRecord] {
        match &self.result {
            SectionResult::Loaded(records) => records,
            SectionResult::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.result {
            SectionResult::Failed(message) => Some(message),
            SectionResult::Loaded(_) => None,
        }
    }
}

/// Immutable outcome of a completed load, sections in resolver order
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSnapshot {
    pub generation: u64,
    pub mode: ViewMode,
    pub sections: Vec<AggregateSection>,
    /// Records across successful sections only
    pub total_count: usize,
}

impl AggregateSnapshot {
    pub fn failed_combinations(&self) -> Vec<&ElementCombination> {
        self.sections
            .iter()
            .filter(|s| s.error().is_some())
            .map(|s| &s.combination)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.sections.iter().all(|s| s.error().is_none())
    }

    /// All loaded records in section order
    pub fn records(&self) -> impl Iterator<Item = &PaperRecord> {
        self.sections.iter().flat_map(|s| s.records().iter())
    }

    pub fn record_ids(&self) -> Vec<i64> {
        self.records().map(|r| r.id).collect()
    }

    /// All-or-nothing view: any failed section becomes `PartialAggregationFailure`
    pub fn into_complete(self) -> ClientResult<Self> {
        let failed: Vec<String> = self
            .failed_combinations()
            .into_iter()
            .map(|c| c.key().to_string())
            .collect();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(ClientError::PartialAggregationFailure { failed })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Completed(AggregateSnapshot),
    /// A newer load started before this one finished; nothing was cached
    Superseded { generation: u64 },
}

impl LoadOutcome {
    pub fn snapshot(&self) -> Option<&AggregateSnapshot> {
        match self {
            LoadOutcome::Completed(snapshot) => Some(snapshot),
            LoadOutcome::Superseded { .. } => None,
        }
    }

    pub fn into_snapshot(self) -> Option<AggregateSnapshot> {
        match self {
            LoadOutcome::Completed(snapshot) => Some(snapshot),
            LoadOutcome::Superseded { .. } => None,
        }
    }
}

/// Composes resolver, fetcher and derivation over many combinations
///
/// Clones share the generation counter, phase and cache.
#[derive(Clone)]
pub struct AggregationOrchestrator {
    resolver: CombinationResolver,
    fetcher: PaperFetcher,
    cache: RecordCache,
    generation: Arc<AtomicU64>,
    phase: Arc<RwLock<LoadPhase>>,
    commit_lock: Arc<Mutex<()>>,
}

impl AggregationOrchestrator {
    pub fn new(resolver: CombinationResolver, fetcher: PaperFetcher, cache: RecordCache) -> Self {
        Self {
            resolver,
            fetcher,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
            phase: Arc::new(RwLock::new(LoadPhase::Idle)),
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Generation of the most recently started load (0 before any load)
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn phase(&self) -> LoadPhase {
        *self.phase.read().await
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Phase belongs to the newest load; stale loads do not touch it
    async fn set_phase(&self, generation: u64, phase: LoadPhase) {
        let mut guard = self.phase.write().await;
        if self.is_current(generation) {
            *guard = phase;
        }
    }

    pub async fn load(&self, request: &LoadRequest) -> ClientResult<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.set_phase(generation, LoadPhase::Resolving).await;

        let combinations = match self
            .resolver
            .resolve(&request.selection, request.mode)
            .await
        {
            Ok(combinations) => combinations,
            Err(e) => {
                warn!(generation, error = %e, "Combination resolution failed, load aborted");
                self.set_phase(generation, LoadPhase::Idle).await;
                return Err(match e {
                    fetch @ ClientError::FetchFailed { .. } => fetch,
                    other => ClientError::fetch_failed(None, other.to_string()),
                });
            }
        };

        self.set_phase(generation, LoadPhase::Fetching).await;

        debug!(
            generation,
            mode = %request.mode,
            combinations = combinations.len(),
            "Fetching combinations"
        );

        let fetches = combinations.into_iter().map(|combination| {
            let fetcher = self.fetcher.clone();
            let filters = &request.filters;
            async move {
                let result = match fetcher.fetch(&combination, filters).await {
                    Ok(records) => {
                        SectionResult::Loaded(records.into_iter().map(ingest_record).collect())
                    }
                    Err(e) => {
                        warn!(
                            generation,
                            combination = %combination,
                            error = %e,
                            "Combination fetch failed (section isolated)"
                        );
                        SectionResult::Failed(e.to_string())
                    }
                };
                AggregateSection {
                    combination,
                    result,
                }
            }
        });

        let sections = join_all(fetches).await;

        let _commit = self.commit_lock.lock().await;
        if !self.is_current(generation) {
            info!(
                generation,
                current = self.current_generation(),
                "Discarding superseded load"
            );
            return Ok(LoadOutcome::Superseded { generation });
        }

        let total_count = sections.iter().map(|s| s.records().len()).sum();
        self.cache
            .upsert_all(sections.iter().flat_map(|s| s.records().iter().cloned()))
            .await;

        self.set_phase(generation, LoadPhase::Aggregated).await;

        let snapshot = AggregateSnapshot {
            generation,
            mode: request.mode,
            sections,
            total_count,
        };

        info!(
            generation,
            sections = snapshot.sections.len(),
            failed = snapshot.failed_combinations().len(),
            total_count,
            "Load aggregated"
        );

        Ok(LoadOutcome::Completed(snapshot))
    }
}
