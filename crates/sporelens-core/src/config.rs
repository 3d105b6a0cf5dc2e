//! Sporelens configuration.
//!
//! All tables the core needs (perspective taxonomy, field-to-perspective
//! table, field weights) and the search tuning knobs are configuration data,
//! supplied once at startup. Every field has a default, so an empty or
//! missing file yields the built-in fungus setup.
//!
//! ```toml
//! [search]
//! min_query_len = 2
//! substring_min_len = 3
//! name_match_factor = 0.5
//! hide_unmatched = true
//!
//! [weights]
//! default = 1
//!
//! [weights.fields]
//! commonName = 10
//! genus = 8
//!
//! [taxonomy.field_perspectives]
//! substrate = "ecologyAndHabitat"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::perspective::{default_field_perspectives, default_perspectives};
use crate::util::resolver::ConfigLocator;
use crate::{Error, PerspectiveDef, PerspectiveTaxonomy, Result};

/// Project name used for config path resolution.
pub const PROJECT_NAME: &str = "sporelens";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SporelensConfig {
    /// Perspective taxonomy.
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,

    /// Search tuning.
    #[serde(default)]
    pub search: SearchSettings,

    /// Field weights.
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Perspective names and the field-to-perspective table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Known perspectives, in display order.
    #[serde(default = "default_perspectives")]
    pub perspectives: Vec<PerspectiveDef>,

    /// Bare field name → perspective name.
    #[serde(default = "default_field_perspectives")]
    pub field_perspectives: BTreeMap<String, String>,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            perspectives: default_perspectives(),
            field_perspectives: default_field_perspectives(),
        }
    }
}

/// Search and ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Queries shorter than this (after trimming) do not filter.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Minimum query length for the plain-substring fallback match.
    #[serde(default = "default_substring_min_len")]
    pub substring_min_len: usize,

    /// Multiplier applied to a field-name match relative to a value match.
    #[serde(default = "default_name_match_factor")]
    pub name_match_factor: f64,

    /// Maximum object nesting depth the search traversal descends into.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// A document is visible only if its score is strictly above this.
    #[serde(default)]
    pub min_score: f64,

    /// Hide non-matching documents (`true`) or dim them (`false`).
    #[serde(default = "default_true")]
    pub hide_unmatched: bool,
}

fn default_min_query_len() -> usize {
    2
}

fn default_substring_min_len() -> usize {
    3
}

fn default_name_match_factor() -> f64 {
    0.5
}

fn default_max_depth() -> usize {
    32
}

fn default_true() -> bool {
    true
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
            substring_min_len: default_substring_min_len(),
            name_match_factor: default_name_match_factor(),
            max_depth: default_max_depth(),
            min_score: 0.0,
            hide_unmatched: default_true(),
        }
    }
}

/// Field weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Weight for field names absent from `fields`.
    #[serde(default = "default_weight")]
    pub default: u32,

    /// Bare field name → weight.
    #[serde(default = "default_field_weights")]
    pub fields: BTreeMap<String, u32>,
}

fn default_weight() -> u32 {
    1
}

/// Built-in weights: identity fields first, then classification and safety.
pub fn default_field_weights() -> BTreeMap<String, u32> {
    [
        ("commonName", 10),
        ("scientificName", 10),
        ("name", 8),
        ("commonNames", 8),
        ("genus", 7),
        ("species", 7),
        ("family", 5),
        ("edibility", 6),
        ("toxicity", 6),
        ("synonyms", 5),
        ("similarSpecies", 4),
        ("habitat", 3),
        ("substrate", 3),
        ("hostTrees", 3),
        ("compounds", 3),
        ("description", 2),
        ("summary", 2),
        ("notes", 1),
    ]
    .into_iter()
    .map(|(field, weight)| (field.to_string(), weight))
    .collect()
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            default: default_weight(),
            fields: default_field_weights(),
        }
    }
}

impl SporelensConfig {
    /// Load configuration.
    ///
    /// The path is resolved by [`ConfigLocator`]. A resolved path that does
    /// not exist yields the defaults; a file that exists must parse and
    /// validate.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let locator = ConfigLocator::new(PROJECT_NAME);
        match locator.resolve(explicit) {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) if explicit.is_some() => Err(Error::config(format!(
                "config file not found: {}",
                path.display()
            ))),
            Some(path) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                log::debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read, parse, and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::parse("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check values the algorithms rely on.
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.min_query_len == 0 {
            return Err(Error::config("search.min_query_len must be at least 1"));
        }
        if search.substring_min_len == 0 {
            return Err(Error::config("search.substring_min_len must be at least 1"));
        }
        if !search.name_match_factor.is_finite() || search.name_match_factor < 0.0 {
            return Err(Error::config(
                "search.name_match_factor must be a non-negative number",
            ));
        }
        if search.max_depth == 0 {
            return Err(Error::config("search.max_depth must be at least 1"));
        }
        if !search.min_score.is_finite() || search.min_score < 0.0 {
            return Err(Error::config("search.min_score must be a non-negative number"));
        }
        self.build_taxonomy().map(|_| ())
    }

    /// Build the runtime taxonomy from `[taxonomy]`.
    pub fn build_taxonomy(&self) -> Result<PerspectiveTaxonomy> {
        PerspectiveTaxonomy::new(
            self.taxonomy.perspectives.clone(),
            self.taxonomy.field_perspectives.clone(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
