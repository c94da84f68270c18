//! Lenient field deserializers for backend payloads
//!
//! The backend and older exports disagree on scalar encodings: numbers arrive
//! as numbers or strings, blank strings mean "absent", authors arrive as a JSON
//! array or as a JSON-encoded string. These helpers accept all of them.

use crate::derivation::parse_measurement;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(f64),
    Text(String),
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumOrText::Num(n)) if n.is_finite() => Some(n),
        Some(NumOrText::Num(_)) => None,
        Some(NumOrText::Text(s)) => parse_measurement(&s),
        None => None,
    })
}

pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumOrText::Num(n)) if n.is_finite() && n.fract() == 0.0 => {
            i32::try_from(n as i64).ok()
        }
        Some(NumOrText::Num(_)) => None,
        Some(NumOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumOrText::Num(n)) if n.is_finite() && n >= 0.0 => n as u32,
        Some(NumOrText::Text(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Optional text; numbers are rendered, blank strings become `None`
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumOrText::Num(n)) if n.fract() == 0.0 && n.abs() < 1e15 => {
            Some(format!("{}", n as i64))
        }
        Some(NumOrText::Num(n)) => Some(n.to_string()),
        Some(NumOrText::Text(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        None => None,
    })
}

/// Required text where null means empty
pub fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorsWire {
    List(Vec<Option<String>>),
    Text(String),
}

/// Decode an author list from any of its wire encodings
///
/// A string is first tried as a JSON array; otherwise it is split on commas.
pub fn decode_authors(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(list) = serde_json::from_str::<Vec<Option<String>>>(trimmed) {
        return clean_authors(list);
    }

    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_authors(list: Vec<Option<String>>) -> Vec<String> {
    list.into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn authors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<AuthorsWire> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(AuthorsWire::List(list)) => clean_authors(list),
        Some(AuthorsWire::Text(text)) => decode_authors(&text),
        None => Vec::new(),
    })
}

/// Parse RFC 3339, or a naive ISO timestamp taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
