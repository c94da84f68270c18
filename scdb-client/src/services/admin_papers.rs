//! Admin review and edit workflow
//!
//! Every call reads the session at call time. Client-side preconditions (an
//! empty selection, missing data points, deleting without super-admin rights,
//! removing a paper's last image) are rejected before any request is sent.

use super::session_cache::SessionCache;
use crate::api::types::{
    AdminPaperQuery, BatchDeleteRequest, BatchReviewRequest, ChartVisibilityRequest, MutationAck,
    PaperImage, PaperUpdate, ReviewRequest,
};
use crate::api::AdminApi;
use crate::error::{ClientError, ClientResult};
use crate::pagination::{calculate_pagination, Pagination};
use scdb_common::derivation::{ingest_record, validate_entry_points};
use scdb_common::models::{
    ArticleType, PaperRecord, PhysicalDataPoint, ReviewStatus, SuperconductorType,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Earliest and latest publication years accepted on edit
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Filters for the admin paper list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminFilters {
    pub review_status: Option<ReviewStatus>,
    pub article_type: Option<ArticleType>,
    pub superconductor_type: Option<SuperconductorType>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub keyword: Option<String>,
}

/// One page of the admin list
#[derive(Debug, Clone)]
pub struct AdminPaperList {
    pub papers: Vec<PaperRecord>,
    pub total: u64,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct AdminPapersService {
    api: Arc<dyn AdminApi>,
    session: SessionCache,
    page_size: u32,
}

fn require_selection(paper_ids: &[i64]) -> ClientResult<Vec<i64>> {
    if paper_ids.is_empty() {
        return Err(ClientError::ValidationFailed(
            "select at least one paper".to_string(),
        ));
    }
    let mut ids = paper_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

impl AdminPapersService {
    pub fn new(api: Arc<dyn AdminApi>, session: SessionCache, page_size: u32) -> Self {
        Self {
            api,
            session,
            page_size: page_size.max(1),
        }
    }

    /// One page (1-indexed) of papers, ingested for display
    pub async fn list(&self, filters: &AdminFilters, page: u64) -> ClientResult<AdminPaperList> {
        let session = self.session.require().await?;

        let requested = calculate_pagination(u64::MAX, page, self.page_size);
        let mut query = AdminPaperQuery {
            review_status: filters.review_status,
            article_type: filters.article_type,
            superconductor_type: filters.superconductor_type,
            year_min: filters.year_min,
            year_max: filters.year_max,
            keyword: filters.keyword.clone(),
            limit: self.page_size,
            offset: requested.offset,
        };

        let mut result = self.api.list_papers(&session.token, &query).await?;
        let pagination = calculate_pagination(result.total, requested.page, self.page_size);

        // Past the end: fetch the clamped page so rows and metadata agree
        if pagination.offset != query.offset {
            debug!(
                requested = requested.page,
                page = pagination.page,
                total = result.total,
                "Requested page out of range, refetching last page"
            );
            query.offset = pagination.offset;
            result = self.api.list_papers(&session.token, &query).await?;
        }

        Ok(AdminPaperList {
            papers: result.papers.into_iter().map(ingest_record).collect(),
            total: result.total,
            pagination,
        })
    }

    pub async fn get(&self, paper_id: i64) -> ClientResult<PaperRecord> {
        let session = self.session.require().await?;
        let record = self.api.get_paper(&session.token, paper_id).await?;
        Ok(ingest_record(record))
    }

    /// Validate and submit an edit
    ///
    /// Data points are rebuilt so their S-factors are derived with the same
    /// function used on display.
    pub async fn update(&self, paper_id: i64, mut update: PaperUpdate) -> ClientResult<MutationAck> {
        if let Some(points) = update.physical_data.take() {
            validate_entry_points(&points)?;
            update.physical_data = Some(
                points
                    .into_iter()
                    .map(|p| {
                        PhysicalDataPoint::new(p.pressure(), p.tc())
                            .with_lambda_val(p.lambda_val())
                            .with_omega_log(p.omega_log())
                            .with_n_ef(p.n_ef())
                    })
                    .collect(),
            );
        }

        if let Some(year) = update.year {
            if !YEAR_RANGE.contains(&year) {
                return Err(ClientError::ValidationFailed(format!(
                    "year must be between {} and {}",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                )));
            }
        }

        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(ClientError::ValidationFailed("title cannot be blank".to_string()));
            }
        }

        let session = self.session.require().await?;
        let ack = self.api.update_paper(&session.token, paper_id, &update).await?;
        info!(paper_id, "Paper updated");
        Ok(ack)
    }

    pub async fn review(
        &self,
        paper_id: i64,
        status: ReviewStatus,
        comment: Option<String>,
    ) -> ClientResult<MutationAck> {
        let session = self.session.require().await?;
        let request = ReviewRequest {
            status,
            comment: comment.filter(|c| !c.trim().is_empty()),
        };
        let ack = self.api.review_paper(&session.token, paper_id, &request).await?;
        info!(paper_id, status = %status, "Paper reviewed");
        Ok(ack)
    }

    /// Mark a selection as approved
    pub async fn batch_review(&self, paper_ids: &[i64]) -> ClientResult<MutationAck> {
        self.batch_set_status(paper_ids, ReviewStatus::Approved).await
    }

    pub async fn batch_set_status(
        &self,
        paper_ids: &[i64],
        status: ReviewStatus,
    ) -> ClientResult<MutationAck> {
        let paper_ids = require_selection(paper_ids)?;
        let session = self.session.require().await?;
        let count = paper_ids.len();
        let ack = self
            .api
            .batch_review(&session.token, &BatchReviewRequest { paper_ids, status })
            .await?;
        info!(count, status = %status, "Batch review submitted");
        Ok(ack)
    }

    pub async fn batch_chart_visibility(
        &self,
        paper_ids: &[i64],
        show: bool,
    ) -> ClientResult<MutationAck> {
        let paper_ids = require_selection(paper_ids)?;
        let session = self.session.require_super_admin().await?;
        let count = paper_ids.len();
        let ack = self
            .api
            .batch_chart_visibility(&session.token, &ChartVisibilityRequest { paper_ids, show })
            .await?;
        info!(count, show, "Chart visibility updated");
        Ok(ack)
    }

    pub async fn batch_delete(&self, paper_ids: &[i64]) -> ClientResult<MutationAck> {
        let paper_ids = require_selection(paper_ids)?;
        let session = self.session.require_super_admin().await?;
        let count = paper_ids.len();
        let ack = self
            .api
            .batch_delete(&session.token, &BatchDeleteRequest { paper_ids })
            .await?;
        info!(count, "Papers deleted");
        Ok(ack)
    }

    pub async fn delete(&self, paper_id: i64) -> ClientResult<MutationAck> {
        let session = self.session.require_super_admin().await?;
        let ack = self.api.delete_paper(&session.token, paper_id).await?;
        info!(paper_id, "Paper deleted");
        Ok(ack)
    }

    pub async fn list_images(&self, paper_id: i64) -> ClientResult<Vec<PaperImage>> {
        let session = self.session.require().await?;
        let mut images = self.api.list_images(&session.token, paper_id).await?;
        images.sort_by_key(|img| img.order);
        Ok(images)
    }

    /// Delete one image, refusing to remove a paper's last one
    pub async fn delete_image(&self, paper_id: i64, image_id: i64) -> ClientResult<MutationAck> {
        let session = self.session.require().await?;
        let images = self.api.list_images(&session.token, paper_id).await?;

        if !images.iter().any(|img| img.id == image_id) {
            return Err(ClientError::ValidationFailed(format!(
                "image {} does not belong to paper {}",
                image_id, paper_id
            )));
        }
        if images.len() <= 1 {
            return Err(ClientError::ValidationFailed(
                "a paper must keep at least one image".to_string(),
            ));
        }

        let ack = self
            .api
            .delete_image(&session.token, paper_id, image_id)
            .await?;
        info!(paper_id, image_id, remaining = images.len() - 1, "Image deleted");
        Ok(ack)
    }
}
