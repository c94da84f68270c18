//! Combination Resolver: selection + view mode → combinations to display

use crate::api::types::SearchMode;
use crate::api::CatalogApi;
use crate::error::ClientResult;
use scdb_common::models::{canonical_symbols, ElementCombination};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// How the selected elements map onto catalog combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Exactly the selected set
    #[default]
    Only,
    /// Every existing non-empty subset of the selection
    Combination,
    /// Every existing superset of the selection
    Contains,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Only => "only",
            ViewMode::Combination => "combination",
            ViewMode::Contains => "contains",
        }
    }

    /// Total parse: unrecognized text falls back to `Only`
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "only" => ViewMode::Only,
            "combination" => ViewMode::Combination,
            "contains" => ViewMode::Contains,
            other => {
                debug!(mode = %other, "Unknown view mode normalized to 'only'");
                ViewMode::Only
            }
        }
    }

    fn search_mode(&self) -> Option<SearchMode> {
        match self {
            ViewMode::Only => None,
            ViewMode::Combination => Some(SearchMode::Combination),
            ViewMode::Contains => Some(SearchMode::Contains),
        }
    }
}

impl FromStr for ViewMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ViewMode::parse_lenient(s))
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct CombinationResolver {
    api: Arc<dyn CatalogApi>,
}

impl CombinationResolver {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Resolve in backend order; `Only` never calls the backend
    pub async fn resolve<S: AsRef<str>>(
        &self,
        selection: &[S],
        mode: ViewMode,
    ) -> ClientResult<Vec<ElementCombination>> {
        let elements = canonical_symbols(selection);
        if elements.is_empty() {
            return Ok(Vec::new());
        }

        let Some(search_mode) = mode.search_mode() else {
            return Ok(ElementCombination::from_symbols(&elements)
                .into_iter()
                .collect());
        };

        let combinations = self.api.search_combinations(&elements, search_mode).await?;

        debug!(
            selection = ?elements,
            mode = %mode,
            resolved = combinations.len(),
            "Resolved combinations"
        );

        Ok(combinations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_mode_fallback() {
        assert_eq!(ViewMode::parse_lenient("contains"), ViewMode::Contains);
        assert_eq!(ViewMode::parse_lenient(" Combination "), ViewMode::Combination);
        assert_eq!(ViewMode::parse_lenient("superset"), ViewMode::Only);
        assert_eq!(ViewMode::parse_lenient(""), ViewMode::Only);
        assert_eq!("bogus".parse::<ViewMode>().unwrap(), ViewMode::Only);
    }
}
