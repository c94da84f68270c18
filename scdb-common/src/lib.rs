//! # SCDB Common Library
//!
//! Shared code for the superconductor literature catalog client:
//! - Domain models (element combinations, paper records, classification enums)
//! - Derivation engine (S-factor, record ingestion, entry validation)
//! - Citation export (RIS, BibTeX, APS)
//! - Configuration loading and root folder resolution
//! - SQLite settings store backing the durable session cache

pub mod citation;
pub mod config;
pub mod db;
pub mod derivation;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{
    ArticleType, ElementCombination, PaperRecord, PhysicalDataPoint, ReviewStatus, Session,
    SessionUser, SuperconductorType,
};
