//! Classification enums with total normalization
//!
//! Values accreted over the catalog's lifetime (retired superconductor
//! families, bulk-upload shorthands, the old `reviewed` status) are folded into
//! the canonical sets here. Parsing never fails: unrecognized input lands on
//! the documented fallback variant.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Canonical superconductor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SuperconductorType {
    Cuprate,
    IronBased,
    NickelBased,
    Hydride,
    Carbon,
    Organic,
    #[default]
    Others,
}

/// Retired and shorthand spellings, matched after trimming and lowercasing
const SUPERCONDUCTOR_ALIASES: &[(&str, SuperconductorType)] = &[
    ("carbon_organic", SuperconductorType::Carbon),
    ("conventional", SuperconductorType::Others),
    ("other_conventional", SuperconductorType::Others),
    ("unconventional", SuperconductorType::Others),
    ("other_unconventional", SuperconductorType::Others),
    ("unknown", SuperconductorType::Others),
    ("c", SuperconductorType::Cuprate),
    ("i", SuperconductorType::IronBased),
    ("n", SuperconductorType::NickelBased),
    ("h", SuperconductorType::Hydride),
    ("cb", SuperconductorType::Carbon),
    ("or", SuperconductorType::Organic),
    ("ot", SuperconductorType::Others),
];

impl SuperconductorType {
    pub const ALL: [SuperconductorType; 7] = [
        SuperconductorType::Cuprate,
        SuperconductorType::IronBased,
        SuperconductorType::NickelBased,
        SuperconductorType::Hydride,
        SuperconductorType::Carbon,
        SuperconductorType::Organic,
        SuperconductorType::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuperconductorType::Cuprate => "cuprate",
            SuperconductorType::IronBased => "iron_based",
            SuperconductorType::NickelBased => "nickel_based",
            SuperconductorType::Hydride => "hydride",
            SuperconductorType::Carbon => "carbon",
            SuperconductorType::Organic => "organic",
            SuperconductorType::Others => "others",
        }
    }

    /// Map any raw value onto the canonical set (total, idempotent)
    pub fn normalize(raw: &str) -> Self {
        let key = raw.trim().to_ascii_lowercase();

        if let Some(canonical) = Self::ALL.iter().find(|t| t.as_str() == key) {
            return *canonical;
        }

        SUPERCONDUCTOR_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(SuperconductorType::Others)
    }

    /// Absent values normalize to `Others`
    pub fn normalize_opt(raw: Option<&str>) -> Self {
        raw.map(Self::normalize).unwrap_or_default()
    }
}

/// Experimental or theoretical article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArticleType {
    #[default]
    Experimental,
    Theoretical,
}

impl ArticleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::Experimental => "experimental",
            ArticleType::Theoretical => "theoretical",
        }
    }

    /// `theoretical`/`t` → Theoretical, everything else → Experimental
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "theoretical" | "t" => ArticleType::Theoretical,
            _ => ArticleType::Experimental,
        }
    }
}

/// Moderation state of a submitted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReviewStatus {
    #[default]
    Unreviewed,
    Approved,
    Rejected,
    Modifying,
    AdminOnly,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 5] = [
        ReviewStatus::Unreviewed,
        ReviewStatus::Approved,
        ReviewStatus::Rejected,
        ReviewStatus::Modifying,
        ReviewStatus::AdminOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Unreviewed => "unreviewed",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Modifying => "modifying",
            ReviewStatus::AdminOnly => "admin_only",
        }
    }

    /// Exact match, accepting the deprecated `reviewed` synonym for `approved`
    pub fn parse_strict(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        if key == "reviewed" {
            return Some(ReviewStatus::Approved);
        }
        Self::ALL.iter().copied().find(|s| s.as_str() == key)
    }

    /// Lenient read used for wire data: unknown values become `Unreviewed`
    pub fn normalize(raw: &str) -> Self {
        Self::parse_strict(raw).unwrap_or_default()
    }
}

macro_rules! canonical_string_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw: Option<String> = Option::deserialize(deserializer)?;
                Ok(raw.as_deref().map(<$ty>::normalize).unwrap_or_default())
            }
        }
    };
}

canonical_string_serde!(SuperconductorType);
canonical_string_serde!(ArticleType);
canonical_string_serde!(ReviewStatus);

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_AND_CANONICAL: &[&str] = &[
        "cuprate",
        "iron_based",
        "nickel_based",
        "hydride",
        "carbon",
        "organic",
        "others",
        "carbon_organic",
        "conventional",
        "other_conventional",
        "unconventional",
        "other_unconventional",
        "unknown",
        "",
        "  Hydride ",
        "definitely-not-a-type",
    ];

    #[test]
    fn test_normalize_is_idempotent_and_canonical() {
        for raw in LEGACY_AND_CANONICAL {
            let once = SuperconductorType::normalize(raw);
            let twice = SuperconductorType::normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {:?}", raw);
            assert!(SuperconductorType::ALL.contains(&once));
        }
    }

    #[test]
    fn test_legacy_values_map_deterministically() {
        assert_eq!(SuperconductorType::normalize("carbon_organic"), SuperconductorType::Carbon);
        assert_eq!(SuperconductorType::normalize("conventional"), SuperconductorType::Others);
        assert_eq!(SuperconductorType::normalize("other_unconventional"), SuperconductorType::Others);
        assert_eq!(SuperconductorType::normalize("unknown"), SuperconductorType::Others);
        assert_eq!(SuperconductorType::normalize("cb"), SuperconductorType::Carbon);
        assert_eq!(SuperconductorType::normalize("IRON_BASED"), SuperconductorType::IronBased);
    }

    #[test]
    fn test_absent_superconductor_type_is_others() {
        assert_eq!(SuperconductorType::normalize_opt(None), SuperconductorType::Others);
        let parsed: SuperconductorType = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, SuperconductorType::Others);
    }

    #[test]
    fn test_serializes_canonical_form() {
        let json = serde_json::to_string(&SuperconductorType::normalize("n")).unwrap();
        assert_eq!(json, "\"nickel_based\"");
    }

    #[test]
    fn test_reviewed_reads_as_approved() {
        let status: ReviewStatus = serde_json::from_str("\"reviewed\"").unwrap();
        assert_eq!(status, ReviewStatus::Approved);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"approved\"");
    }

    #[test]
    fn test_review_status_strict_parse_rejects_typos() {
        assert_eq!(ReviewStatus::parse_strict("admin_only"), Some(ReviewStatus::AdminOnly));
        assert_eq!(ReviewStatus::parse_strict("aproved"), None);
        assert_eq!(ReviewStatus::normalize("aproved"), ReviewStatus::Unreviewed);
    }

    #[test]
    fn test_article_type_shorthand() {
        assert_eq!(ArticleType::normalize("t"), ArticleType::Theoretical);
        assert_eq!(ArticleType::normalize("e"), ArticleType::Experimental);
        assert_eq!(ArticleType::normalize("whatever"), ArticleType::Experimental);
    }
}
