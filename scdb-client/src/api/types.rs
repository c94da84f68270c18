//! Request and response bodies exchanged with the catalog backend

use chrono::{DateTime, Utc};
use scdb_common::models::wire;
use scdb_common::models::{
    ArticleType, ElementCombination, PaperRecord, PhysicalDataPoint, ReviewStatus,
    SuperconductorType,
};
use serde::{Deserialize, Serialize, Serializer};

/// Backend search mode for `POST /api/compounds/search`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Combination,
    Contains,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Combination => "combination",
            SearchMode::Contains => "contains",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinationSearchRequest {
    pub elements: Vec<String>,
    pub mode: SearchMode,
}

/// `GET /api/compounds/{symbols}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompoundInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub combination: ElementCombination,
    #[serde(default)]
    pub paper_count: u64,
}

/// Error body shape shared by every endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// A string detail, or the first `msg` of a validation error list
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg")?.as_str().map(str::to_string)),
            _ => None,
        }
    }
}

/// Filters and window for `GET /api/admin/papers/all`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminPaperQuery {
    pub review_status: Option<ReviewStatus>,
    pub article_type: Option<ArticleType>,
    pub superconductor_type: Option<SuperconductorType>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub keyword: Option<String>,
    pub limit: u32,
    pub offset: u64,
}

impl AdminPaperQuery {
    /// Query pairs with absent and blank filters left out
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.review_status {
            pairs.push(("review_status", status.as_str().to_string()));
        }
        if let Some(article_type) = self.article_type {
            pairs.push(("article_type", article_type.as_str().to_string()));
        }
        if let Some(sc_type) = self.superconductor_type {
            pairs.push(("superconductor_type", sc_type.as_str().to_string()));
        }
        if let Some(year) = self.year_min {
            pairs.push(("year_min", year.to_string()));
        }
        if let Some(year) = self.year_max {
            pairs.push(("year_max", year.to_string()));
        }
        if let Some(keyword) = self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            pairs.push(("keyword", keyword.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

/// `GET /api/admin/papers/all` response
#[derive(Debug, Clone, Deserialize)]
pub struct AdminPaperPage {
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
    #[serde(default)]
    pub total: u64,
}

fn authors_as_json_text<S>(authors: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match authors {
        Some(list) => {
            let text = serde_json::to_string(list).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&text)
        }
        None => serializer.serialize_none(),
    }
}

/// Partial update for `PUT /api/admin/papers/{id}`; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaperUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Sent as a JSON-encoded array, the form the backend stores
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "authors_as_json_text"
    )]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_type: Option<ArticleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superconductor_type: Option<SuperconductorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chemical_formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crystal_structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_data: Option<Vec<PhysicalDataPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_chart: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReviewRequest {
    pub paper_ids: Vec<i64>,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartVisibilityRequest {
    pub paper_ids: Vec<i64>,
    pub show: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchDeleteRequest {
    pub paper_ids: Vec<i64>,
}

/// Acknowledgement returned by mutation endpoints
///
/// The count field name differs per endpoint; any of them lands in `affected`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "reviewed_count", alias = "updated_count", alias = "deleted_count")]
    pub affected: Option<u64>,
}

/// One stored screenshot of a paper
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaperImage {
    pub id: i64,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default, deserialize_with = "wire::lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `GET /api/admin/papers/{id}/images`
#[derive(Debug, Clone, Deserialize)]
pub struct PaperImageList {
    #[serde(default)]
    pub paper_id: Option<i64>,
    #[serde(default)]
    pub images: Vec<PaperImage>,
}
