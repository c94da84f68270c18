//! Client-side services composed by [`crate::ClientContext`]

pub mod admin_papers;
pub mod aggregation_orchestrator;
pub mod combination_resolver;
pub mod paper_fetcher;
pub mod record_cache;
pub mod session_cache;

pub use admin_papers::{AdminFilters, AdminPaperList, AdminPapersService};
pub use aggregation_orchestrator::{
    AggregateSection, AggregateSnapshot, AggregationOrchestrator, LoadOutcome, LoadPhase,
    LoadRequest, SectionResult,
};
pub use combination_resolver::{CombinationResolver, ViewMode};
pub use paper_fetcher::{PaperFetcher, PaperFilters};
pub use record_cache::RecordCache;
pub use session_cache::SessionCache;
