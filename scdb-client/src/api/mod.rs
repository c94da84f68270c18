//! Catalog backend seam
//!
//! Services talk to the backend only through these traits so they can be
//! driven by [`http::HttpCatalogClient`] in production and by in-memory fakes
//! in tests.

pub mod http;
pub mod types;

use crate::error::ClientResult;
use crate::services::paper_fetcher::PaperFilters;
use async_trait::async_trait;
use scdb_common::models::{ElementCombination, PaperRecord};
use types::{
    AdminPaperPage, AdminPaperQuery, BatchDeleteRequest, BatchReviewRequest,
    ChartVisibilityRequest, CompoundInfo, MutationAck, PaperImage, PaperUpdate, ReviewRequest,
    SearchMode,
};

pub use http::HttpCatalogClient;

/// Public catalog endpoints
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /api/compounds/{symbols}`
    async fn compound_info(&self, symbols: &str) -> ClientResult<CompoundInfo>;

    /// `POST /api/compounds/search`, backend order preserved
    async fn search_combinations(
        &self,
        elements: &[String],
        mode: SearchMode,
    ) -> ClientResult<Vec<ElementCombination>>;

    /// `GET /api/papers/compound/{symbols}`
    async fn papers_for_combination(
        &self,
        symbols: &str,
        filters: &PaperFilters,
    ) -> ClientResult<Vec<PaperRecord>>;
}

/// Privileged endpoints; every call carries the bearer token
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_papers(&self, token: &str, query: &AdminPaperQuery)
        -> ClientResult<AdminPaperPage>;

    async fn get_paper(&self, token: &str, paper_id: i64) -> ClientResult<PaperRecord>;

    async fn update_paper(
        &self,
        token: &str,
        paper_id: i64,
        update: &PaperUpdate,
    ) -> ClientResult<MutationAck>;

    async fn review_paper(
        &self,
        token: &str,
        paper_id: i64,
        review: &ReviewRequest,
    ) -> ClientResult<MutationAck>;

    async fn batch_review(&self, token: &str, request: &BatchReviewRequest)
        -> ClientResult<MutationAck>;

    async fn batch_chart_visibility(
        &self,
        token: &str,
        request: &ChartVisibilityRequest,
    ) -> ClientResult<MutationAck>;

    async fn batch_delete(&self, token: &str, request: &BatchDeleteRequest)
        -> ClientResult<MutationAck>;

    async fn delete_paper(&self, token: &str, paper_id: i64) -> ClientResult<MutationAck>;

    async fn list_images(&self, token: &str, paper_id: i64) -> ClientResult<Vec<PaperImage>>;

    async fn delete_image(&self, token: &str, paper_id: i64, image_id: i64)
        -> ClientResult<MutationAck>;
}
