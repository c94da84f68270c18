//! Element combinations, the catalog's primary index key

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Separator between symbols in the canonical key (`Fe-Se`)
pub const SYMBOL_SEPARATOR: char = '-';

/// Trim, drop empties, de-duplicate and sort symbols
pub fn canonical_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A set of chemical elements identified by its sorted symbol string
///
/// Two combinations are equal iff their sorted symbol sets match; the order of
/// `element_list` is informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CombinationWire")]
pub struct ElementCombination {
    element_symbols: String,
    element_list: Vec<String>,
}

#[derive(Deserialize)]
struct CombinationWire {
    #[serde(default)]
    element_symbols: String,
    #[serde(default)]
    element_list: Option<Vec<String>>,
}

impl From<CombinationWire> for ElementCombination {
    fn from(wire: CombinationWire) -> Self {
        let listed = wire
            .element_list
            .filter(|list| list.iter().any(|s| !s.trim().is_empty()));

        let sorted = match &listed {
            Some(list) => canonical_symbols(list),
            None => canonical_symbols(wire.element_symbols.split(SYMBOL_SEPARATOR)),
        };

        let mut element_list = Vec::new();
        for symbol in listed.unwrap_or_else(|| sorted.clone()) {
            let symbol = symbol.trim().to_string();
            if !symbol.is_empty() && !element_list.contains(&symbol) {
                element_list.push(symbol);
            }
        }

        Self {
            element_symbols: sorted.join(&SYMBOL_SEPARATOR.to_string()),
            element_list,
        }
    }
}

impl ElementCombination {
    /// Build from any symbol collection; `None` when no symbol survives trimming
    pub fn from_symbols<I, S>(symbols: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted = canonical_symbols(symbols);
        if sorted.is_empty() {
            return None;
        }

        Some(Self {
            element_symbols: sorted.join(&SYMBOL_SEPARATOR.to_string()),
            element_list: sorted,
        })
    }

    /// Parse a canonical (or unsorted) key such as `Se-Fe`
    pub fn parse(key: &str) -> Option<Self> {
        Self::from_symbols(key.split(SYMBOL_SEPARATOR))
    }

    /// Canonical sorted-symbol key
    pub fn key(&self) -> &str {
        &self.element_symbols
    }

    pub fn element_list(&self) -> &[String] {
        &self.element_list
    }

    pub fn len(&self) -> usize {
        self.element_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_list.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.element_list.iter().any(|s| s == symbol.trim())
    }

    pub fn is_subset_of(&self, other: &ElementCombination) -> bool {
        self.element_list.iter().all(|s| other.contains(s))
    }
}

impl PartialEq for ElementCombination {
    fn eq(&self, other: &Self) -> bool {
        self.element_symbols == other.element_symbols
    }
}

impl Eq for ElementCombination {}

impl Hash for ElementCombination {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.element_symbols.hash(state);
    }
}

impl fmt::Display for ElementCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_symbols)
    }
}
