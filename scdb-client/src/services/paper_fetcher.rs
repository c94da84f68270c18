//! Paper Fetcher: literature records for one combination

use crate::api::types::CompoundInfo;
use crate::api::CatalogApi;
use crate::error::ClientResult;
use scdb_common::models::{ElementCombination, PaperRecord, ReviewStatus};
use std::sync::Arc;

/// Optional constraints on a paper listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperFilters {
    pub keyword: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub review_status: Option<ReviewStatus>,
}

impl PaperFilters {
    /// Query pairs; absent values and a blank keyword are not sent at all
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(keyword) = self
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            pairs.push(("keyword", keyword.to_string()));
        }
        if let Some(year) = self.year_min {
            pairs.push(("year_min", year.to_string()));
        }
        if let Some(year) = self.year_max {
            pairs.push(("year_max", year.to_string()));
        }
        if let Some(status) = self.review_status {
            pairs.push(("review_status", status.as_str().to_string()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.to_query_pairs().is_empty()
    }
}

#[derive(Clone)]
pub struct PaperFetcher {
    api: Arc<dyn CatalogApi>,
}

impl PaperFetcher {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Raw records for one combination (not yet ingested)
    pub async fn fetch(
        &self,
        combination: &ElementCombination,
        filters: &PaperFilters,
    ) -> ClientResult<Vec<PaperRecord>> {
        let records = self
            .api
            .papers_for_combination(combination.key(), filters)
            .await?;

        tracing::debug!(
            combination = %combination,
            records = records.len(),
            "Fetched papers"
        );

        Ok(records)
    }

    /// Combination summary with its paper count
    pub async fn compound_info(&self, combination: &ElementCombination) -> ClientResult<CompoundInfo> {
        self.api.compound_info(combination.key()).await
    }
}
