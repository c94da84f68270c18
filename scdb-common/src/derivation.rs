//! Derived physical quantities and record ingestion
//!
//! The S-factor is `tc / sqrt(1521 + pressure^2)`. Display (record ingestion)
//! and data entry (admin edits) both go through [`compute_s_factor`], so the
//! two paths always agree for the same inputs.

use crate::models::{PaperRecord, PhysicalDataPoint};
use crate::{Error, Result};

/// Offset under the square root, 39² (K²)
pub const S_FACTOR_OFFSET: f64 = 1521.0;

/// Parse user- or wire-supplied numeric text; non-finite values are rejected
pub fn parse_measurement(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `tc / sqrt(1521 + pressure^2)`, absent unless both inputs are finite
pub fn compute_s_factor(tc: Option<f64>, pressure: Option<f64>) -> Option<f64> {
    match (tc, pressure) {
        (Some(tc), Some(p)) if tc.is_finite() && p.is_finite() => {
            Some(tc / (S_FACTOR_OFFSET + p * p).sqrt())
        }
        _ => None,
    }
}

/// Bring a freshly fetched record into display form
///
/// Admin list rows carry only the first point as flat `tc`/`pressure`; when a
/// record has no `data` those values become its single point. Every point is
/// rebuilt so its S-factor is re-derived. Running this twice is a no-op.
pub fn ingest_record(mut record: PaperRecord) -> PaperRecord {
    if record.data.is_empty() && (record.tc.is_some() || record.pressure.is_some()) {
        record.data.push(PhysicalDataPoint::new(record.pressure, record.tc));
    }

    record.data = record
        .data
        .into_iter()
        .map(|p| {
            PhysicalDataPoint::new(p.pressure(), p.tc())
                .with_lambda_val(p.lambda_val())
                .with_omega_log(p.omega_log())
                .with_n_ef(p.n_ef())
        })
        .collect();

    record
}

/// Reject a data-entry submission unless every point is complete
pub fn validate_entry_points(points: &[PhysicalDataPoint]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::InvalidInput(
            "at least one data point (pressure and Tc) is required".to_string(),
        ));
    }

    for (index, point) in points.iter().enumerate() {
        if point.tc().is_none() {
            return Err(Error::InvalidInput(format!(
                "data point {}: Tc is required",
                index + 1
            )));
        }
        if point.pressure().is_none() {
            return Err(Error::InvalidInput(format!(
                "data point {}: pressure is required",
                index + 1
            )));
        }
    }

    Ok(())
}

/// DOI shape accepted by the catalog: `10.` + at least four digits + `/` + suffix
pub fn validate_doi(doi: &str) -> Result<()> {
    let invalid = || Error::InvalidInput(format!("invalid DOI: {:?}", doi));

    let rest = doi.strip_prefix("10.").ok_or_else(invalid)?;
    let (registrant, suffix) = rest.split_once('/').ok_or_else(invalid)?;

    if registrant.len() < 4 || !registrant.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if suffix.is_empty() || suffix.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(())
}
