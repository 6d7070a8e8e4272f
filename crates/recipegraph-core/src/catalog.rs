//! Loading the recipe catalog produced by the scraper.
//!
//! The catalog is a JSON array with one entry per craftable element:
//!
//! ```json
//! [{ "Result": "Steam", "Asset": "steam.svg", "Tier": 1,
//!    "Combinations": [{ "First": "Fire", "Second": "Water" }] }]
//! ```

use crate::{element, CombinationIndex, Pair, Result, Tier};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "Result")]
    pub result: String,

    #[serde(rename = "Asset", default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    #[serde(rename = "Tier")]
    pub tier: Tier,

    #[serde(rename = "Combinations", default)]
    pub combinations: Option<Vec<CatalogPair>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPair {
    #[serde(rename = "First")]
    pub first: String,

    #[serde(rename = "Second")]
    pub second: String,
}

/// Parsed catalog, ready to be frozen into a [`CombinationIndex`].
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl RecipeCatalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            entries = catalog.entries.len(),
            "recipe catalog loaded"
        );
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Build the index, seeding `base_elements` as tier-0 starting points.
    ///
    /// Catalog rows that list a base element as their result are skipped
    /// (starting elements have no recipe), as are combinations with a
    /// blank ingredient.
    pub fn into_index<I, S>(self, base_elements: I) -> Result<CombinationIndex>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base: Vec<String> = base_elements
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let mut builder = CombinationIndex::builder().base_elements(&base);

        for entry in self.entries {
            if base.iter().any(|b| *b == entry.result) {
                continue;
            }

            let product = element(&entry.result);
            builder.add_tier(product.clone(), entry.tier);

            for combo in entry.combinations.unwrap_or_default() {
                let (first, second) = (combo.first.trim(), combo.second.trim());
                if first.is_empty() || second.is_empty() {
                    warn!(result = %entry.result, "skipping combination with a blank ingredient");
                    continue;
                }
                builder.add_combination(Pair::new(first, second), product.clone());
            }
        }

        builder.build()
    }
}
