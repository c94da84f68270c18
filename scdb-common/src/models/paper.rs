//! Literature records and their physical data points

use super::classification::{ArticleType, ReviewStatus, SuperconductorType};
use super::wire;
use crate::derivation::{compute_s_factor, validate_doi};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One measured or computed (pressure, Tc) pair with optional coupling data
///
/// `s_factor` is derived at construction and on deserialization; a value sent
/// by the backend is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DataPointWire")]
pub struct PhysicalDataPoint {
    pressure: Option<f64>,
    tc: Option<f64>,
    lambda_val: Option<f64>,
    omega_log: Option<f64>,
    n_ef: Option<f64>,
    s_factor: Option<f64>,
}

#[derive(Deserialize)]
struct DataPointWire {
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    pressure: Option<f64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    tc: Option<f64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    lambda_val: Option<f64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    omega_log: Option<f64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    n_ef: Option<f64>,
}

impl From<DataPointWire> for PhysicalDataPoint {
    fn from(wire: DataPointWire) -> Self {
        PhysicalDataPoint::new(wire.pressure, wire.tc)
            .with_lambda_val(wire.lambda_val)
            .with_omega_log(wire.omega_log)
            .with_n_ef(wire.n_ef)
    }
}

impl PhysicalDataPoint {
    pub fn new(pressure: Option<f64>, tc: Option<f64>) -> Self {
        let pressure = pressure.filter(|p| p.is_finite());
        let tc = tc.filter(|t| t.is_finite());
        Self {
            pressure,
            tc,
            lambda_val: None,
            omega_log: None,
            n_ef: None,
            s_factor: compute_s_factor(tc, pressure),
        }
    }

    pub fn with_lambda_val(mut self, value: Option<f64>) -> Self {
        self.lambda_val = value.filter(|v| v.is_finite());
        self
    }

    pub fn with_omega_log(mut self, value: Option<f64>) -> Self {
        self.omega_log = value.filter(|v| v.is_finite());
        self
    }

    pub fn with_n_ef(mut self, value: Option<f64>) -> Self {
        self.n_ef = value.filter(|v| v.is_finite());
        self
    }

    pub fn pressure(&self) -> Option<f64> {
        self.pressure
    }

    pub fn tc(&self) -> Option<f64> {
        self.tc
    }

    pub fn lambda_val(&self) -> Option<f64> {
        self.lambda_val
    }

    pub fn omega_log(&self) -> Option<f64> {
        self.omega_log
    }

    pub fn n_ef(&self) -> Option<f64> {
        self.n_ef
    }

    pub fn s_factor(&self) -> Option<f64> {
        self.s_factor
    }

    /// Both required quantities present
    pub fn is_valid(&self) -> bool {
        self.tc.is_some() && self.pressure.is_some()
    }
}

/// Snapshot of one literature entry as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: i64,

    #[serde(default)]
    pub compound_id: Option<i64>,

    /// Owning combination key (admin rows call it `compound_symbols`)
    #[serde(default, alias = "compound_symbols", deserialize_with = "wire::lenient_text")]
    pub element_symbols: Option<String>,

    #[serde(default, deserialize_with = "wire::text_or_empty")]
    pub doi: String,

    #[serde(default, deserialize_with = "wire::text_or_empty")]
    pub title: String,

    #[serde(default, deserialize_with = "wire::authors")]
    pub authors: Vec<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub journal: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub volume: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub issue: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub pages: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_i32")]
    pub year: Option<i32>,

    #[serde(default, rename = "abstract", deserialize_with = "wire::lenient_text")]
    pub abstract_text: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub citation_aps: Option<String>,

    #[serde(default)]
    pub article_type: ArticleType,

    #[serde(default)]
    pub superconductor_type: SuperconductorType,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub chemical_formula: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub crystal_structure: Option<String>,

    #[serde(default)]
    pub data: Vec<PhysicalDataPoint>,

    /// Flat first-point values carried by admin list rows
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "wire::lenient_f64")]
    pub tc: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "wire::lenient_f64")]
    pub pressure: Option<f64>,

    #[serde(default)]
    pub review_status: ReviewStatus,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub review_comment: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub reviewer_name: Option<String>,

    #[serde(default, alias = "images_count", deserialize_with = "wire::lenient_count")]
    pub image_count: u32,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub contributor_name: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub contributor_affiliation: Option<String>,

    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub notes: Option<String>,

    #[serde(default)]
    pub show_in_chart: Option<bool>,

    #[serde(default, deserialize_with = "wire::lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PaperRecord {
    /// Minimal record, mostly for tests and fixtures
    pub fn new(id: i64, doi: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            compound_id: None,
            element_symbols: None,
            doi: doi.into(),
            title: title.into(),
            authors: Vec::new(),
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            year: None,
            abstract_text: None,
            citation_aps: None,
            article_type: ArticleType::default(),
            superconductor_type: SuperconductorType::default(),
            chemical_formula: None,
            crystal_structure: None,
            data: Vec::new(),
            tc: None,
            pressure: None,
            review_status: ReviewStatus::default(),
            review_comment: None,
            reviewer_name: None,
            image_count: 0,
            contributor_name: None,
            contributor_affiliation: None,
            notes: None,
            show_in_chart: None,
            created_at: None,
        }
    }

    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Corresponding author by catalog convention: the last listed author
    pub fn corresponding_author(&self) -> Option<&str> {
        self.authors.last().map(String::as_str)
    }

    /// Points usable for charting (tc and pressure present)
    pub fn valid_points(&self) -> impl Iterator<Item = &PhysicalDataPoint> {
        self.data.iter().filter(|p| p.is_valid())
    }

    /// Highest Tc across all points
    pub fn max_tc(&self) -> Option<f64> {
        self.data
            .iter()
            .filter_map(PhysicalDataPoint::tc)
            .fold(None, |acc, tc| Some(acc.map_or(tc, |m: f64| m.max(tc))))
    }

    /// Resolver link, only for a well-formed DOI
    pub fn doi_url(&self) -> Option<String> {
        let doi = self.doi.trim();
        validate_doi(doi)
            .ok()
            .map(|_| format!("https://doi.org/{}", doi))
    }
}
