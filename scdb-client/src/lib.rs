//! # SCDB Client
//!
//! Client-side aggregation engine for the superconductor literature catalog:
//! - Session cache backed by the local settings database
//! - Combination resolver and per-combination paper fetcher
//! - Record cache and aggregation orchestrator with stale-load detection
//! - Admin review/edit workflow
//!
//! [`ClientContext`] wires the services together; there is no global state.

pub mod api;
pub mod config;
pub mod error;
pub mod pagination;
pub mod services;

pub use error::{ClientError, ClientResult};

use api::{AdminApi, CatalogApi, HttpCatalogClient};
use config::ClientConfig;
use services::{
    AdminPapersService, AggregationOrchestrator, CombinationResolver, PaperFetcher, RecordCache,
    SessionCache,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Explicit context object holding every client service
#[derive(Clone)]
pub struct ClientContext {
    pub session: SessionCache,
    pub records: RecordCache,
    pub fetcher: PaperFetcher,
    pub orchestrator: AggregationOrchestrator,
    pub admin: AdminPapersService,
}

impl ClientContext {
    /// Build on arbitrary backend implementations (fakes in tests)
    pub fn with_backends(
        catalog: Arc<dyn CatalogApi>,
        admin: Arc<dyn AdminApi>,
        db: SqlitePool,
        admin_page_size: u32,
    ) -> Self {
        let session = SessionCache::new(db);
        let records = RecordCache::new();
        let fetcher = PaperFetcher::new(Arc::clone(&catalog));
        let orchestrator = AggregationOrchestrator::new(
            CombinationResolver::new(catalog),
            fetcher.clone(),
            records.clone(),
        );
        let admin = AdminPapersService::new(admin, session.clone(), admin_page_size);

        Self {
            session,
            records,
            fetcher,
            orchestrator,
            admin,
        }
    }

    /// Build on the HTTP backend described by `config`
    pub fn connect(config: &ClientConfig, db: SqlitePool) -> ClientResult<Self> {
        let http = Arc::new(HttpCatalogClient::new(config)?);
        Ok(Self::with_backends(
            http.clone(),
            http,
            db,
            config.admin_page_size,
        ))
    }
}
