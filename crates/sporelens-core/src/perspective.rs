//! Perspective taxonomy.
//!
//! A perspective is a named top-level section of a document that represents
//! one lens on the same entity (`taxonomy`, `ecologyAndHabitat`, ...). The set
//! of perspective names is fixed configuration: any top-level key that is not
//! a known perspective is a root-level field.
//!
//! The taxonomy also carries the field-to-perspective table used to translate
//! a matched field path back into a human-facing perspective, regardless of
//! where in the tree the match physically happened.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sentinel key for values found directly on the document root.
pub const ROOT_KEY: &str = "root";

/// The default fungus perspectives, in display order.
const FUNGUS_PERSPECTIVES: &[(&str, &str)] = &[
    ("taxonomy", "Taxonomy"),
    ("morphology", "Morphology"),
    ("ecologyAndHabitat", "Ecology & Habitat"),
    ("distribution", "Distribution"),
    ("edibilityAndSafety", "Edibility & Safety"),
    ("chemistry", "Chemistry"),
    ("medicinalUses", "Medicinal Uses"),
    ("culinaryUses", "Culinary Uses"),
    ("cultivation", "Cultivation"),
    ("lookalikes", "Lookalikes"),
    ("culturalSignificance", "Cultural Significance"),
    ("research", "Research"),
];

/// Default bare-field-name to perspective table.
const FUNGUS_FIELD_PERSPECTIVES: &[(&str, &str)] = &[
    // taxonomy
    ("kingdom", "taxonomy"),
    ("phylum", "taxonomy"),
    ("class", "taxonomy"),
    ("order", "taxonomy"),
    ("family", "taxonomy"),
    ("genus", "taxonomy"),
    ("species", "taxonomy"),
    ("synonyms", "taxonomy"),
    ("authority", "taxonomy"),
    // morphology
    ("capShape", "morphology"),
    ("capColor", "morphology"),
    ("capDiameter", "morphology"),
    ("gillAttachment", "morphology"),
    ("gillColor", "morphology"),
    ("stipe", "morphology"),
    ("sporePrintColor", "morphology"),
    ("sporeSize", "morphology"),
    ("odor", "morphology"),
    ("texture", "morphology"),
    // ecologyAndHabitat
    ("substrate", "ecologyAndHabitat"),
    ("habitat", "ecologyAndHabitat"),
    ("season", "ecologyAndHabitat"),
    ("hostTrees", "ecologyAndHabitat"),
    ("trophicMode", "ecologyAndHabitat"),
    ("mycorrhizal", "ecologyAndHabitat"),
    // distribution
    ("regions", "distribution"),
    ("countries", "distribution"),
    ("continents", "distribution"),
    ("elevation", "distribution"),
    ("abundance", "distribution"),
    // edibilityAndSafety
    ("edibility", "edibilityAndSafety"),
    ("toxicity", "edibilityAndSafety"),
    ("toxins", "edibilityAndSafety"),
    ("symptoms", "edibilityAndSafety"),
    ("warnings", "edibilityAndSafety"),
    // chemistry
    ("compounds", "chemistry"),
    ("bioactiveCompounds", "chemistry"),
    ("nutrients", "chemistry"),
    // medicinalUses
    ("traditionalUses", "medicinalUses"),
    ("therapeuticEffects", "medicinalUses"),
    ("preparation", "medicinalUses"),
    ("dosage", "medicinalUses"),
    // culinaryUses
    ("flavor", "culinaryUses"),
    ("recipes", "culinaryUses"),
    ("cookingMethods", "culinaryUses"),
    ("pairings", "culinaryUses"),
    // cultivation
    ("growingMedium", "cultivation"),
    ("fruitingTemperature", "cultivation"),
    ("difficulty", "cultivation"),
    ("yield", "cultivation"),
    // lookalikes
    ("similarSpecies", "lookalikes"),
    ("distinguishingFeatures", "lookalikes"),
    // culturalSignificance
    ("folklore", "culturalSignificance"),
    ("history", "culturalSignificance"),
    ("art", "culturalSignificance"),
    // research
    ("studies", "research"),
    ("publications", "research"),
    ("researchAreas", "research"),
];

/// One perspective: machine name and display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveDef {
    /// Top-level document key (e.g. `"ecologyAndHabitat"`).
    pub name: String,
    /// Human-facing label (e.g. `"Ecology & Habitat"`).
    pub label: String,
}

impl PerspectiveDef {
    /// Create a perspective definition.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// The fixed perspective enumeration plus the field-to-perspective table.
///
/// Built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct PerspectiveTaxonomy {
    perspectives: Vec<PerspectiveDef>,
    positions: HashMap<String, usize>,
    field_perspectives: HashMap<String, String>,
}

impl PerspectiveTaxonomy {
    /// Build a taxonomy, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty or duplicate perspective name,
    /// or for a field mapped to a perspective that does not exist.
    pub fn new(
        perspectives: Vec<PerspectiveDef>,
        field_perspectives: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut positions = HashMap::with_capacity(perspectives.len());
        for (i, def) in perspectives.iter().enumerate() {
            if def.name.trim().is_empty() {
                return Err(Error::config("perspective name must not be empty"));
            }
            if def.name == ROOT_KEY {
                return Err(Error::config(format!(
                    "'{ROOT_KEY}' is reserved and cannot name a perspective"
                )));
            }
            if positions.insert(def.name.clone(), i).is_some() {
                return Err(Error::config(format!(
                    "duplicate perspective '{}'",
                    def.name
                )));
            }
        }

        for (field, perspective) in &field_perspectives {
            if !positions.contains_key(perspective) {
                return Err(Error::config(format!(
                    "field '{field}' maps to unknown perspective '{perspective}'"
                )));
            }
        }

        Ok(Self {
            perspectives,
            positions,
            field_perspectives: field_perspectives.into_iter().collect(),
        })
    }

    /// The built-in fungus taxonomy (twelve perspectives).
    pub fn fungi() -> Self {
        let perspectives = default_perspectives();
        let positions = perspectives
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name.clone(), i))
            .collect();
        Self {
            perspectives,
            positions,
            field_perspectives: default_field_perspectives().into_iter().collect(),
        }
    }

    /// All perspectives, in taxonomy order.
    pub fn perspectives(&self) -> &[PerspectiveDef] {
        &self.perspectives
    }

    /// All perspective names, in taxonomy order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.perspectives.iter().map(|p| p.name.as_str())
    }

    /// Number of perspectives.
    pub fn len(&self) -> usize {
        self.perspectives.len()
    }

    /// Returns `true` if the taxonomy has no perspectives.
    pub fn is_empty(&self) -> bool {
        self.perspectives.is_empty()
    }

    /// Returns `true` if `name` is a known perspective.
    pub fn is_perspective(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Taxonomy position of a perspective.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Display label of a perspective.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|i| self.perspectives[i].label.as_str())
    }

    /// Perspective a bare field name belongs to.
    ///
    /// A perspective name maps to itself, so a path rooted at a perspective
    /// translates through its first segment.
    pub fn perspective_for_field(&self, field: &str) -> Option<&str> {
        if let Some(i) = self.position(field) {
            return Some(self.perspectives[i].name.as_str());
        }
        self.field_perspectives.get(field).map(String::as_str)
    }

    /// Resolve the candidate perspectives for an active set.
    ///
    /// Unknown names are ignored. Known names come back in taxonomy order,
    /// de-duplicated. An empty result falls back to every known perspective.
    pub fn candidates<S: AsRef<str>>(&self, active: &[S]) -> Vec<&str> {
        let mut selected: Vec<usize> = active
            .iter()
            .filter_map(|name| self.position(name.as_ref()))
            .collect();
        selected.sort_unstable();
        selected.dedup();

        if selected.is_empty() {
            return self.names().collect();
        }
        selected
            .into_iter()
            .map(|i| self.perspectives[i].name.as_str())
            .collect()
    }
}

impl Default for PerspectiveTaxonomy {
    fn default() -> Self {
        Self::fungi()
    }
}

/// The built-in perspective list, as configuration data.
pub fn default_perspectives() -> Vec<PerspectiveDef> {
    FUNGUS_PERSPECTIVES
        .iter()
        .map(|(name, label)| PerspectiveDef::new(*name, *label))
        .collect()
}

/// The built-in field-to-perspective table, as configuration data.
pub fn default_field_perspectives() -> BTreeMap<String, String> {
    FUNGUS_FIELD_PERSPECTIVES
        .iter()
        .map(|(field, perspective)| (field.to_string(), perspective.to_string()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fungi_has_twelve_perspectives() {
        let taxonomy = PerspectiveTaxonomy::fungi();
        assert_eq!(taxonomy.len(), 12);
        assert!(taxonomy.is_perspective("taxonomy"));
        assert!(taxonomy.is_perspective("ecologyAndHabitat"));
        assert!(!taxonomy.is_perspective("commonName"));
    }

    #[test]
    fn test_fungi_matches_validated_construction() {
        let built =
            PerspectiveTaxonomy::new(default_perspectives(), default_field_perspectives())
                .unwrap();
        let fungi = PerspectiveTaxonomy::fungi();
        assert_eq!(built.perspectives(), fungi.perspectives());
        assert_eq!(
            built.perspective_for_field("substrate"),
            fungi.perspective_for_field("substrate")
        );
    }

    #[test]
    fn test_label_lookup() {
        let taxonomy = PerspectiveTaxonomy::fungi();
        assert_eq!(taxonomy.label("ecologyAndHabitat"), Some("Ecology & Habitat"));
        assert_eq!(taxonomy.label("nope"), None);
    }

    #[test]
    fn test_perspective_for_field() {
        let taxonomy = PerspectiveTaxonomy::fungi();
        assert_eq!(taxonomy.perspective_for_field("family"), Some("taxonomy"));
        assert_eq!(
            taxonomy.perspective_for_field("substrate"),
            Some("ecologyAndHabitat")
        );
        assert_eq!(taxonomy.perspective_for_field("chemistry"), Some("chemistry"));
        assert_eq!(taxonomy.perspective_for_field("commonName"), None);
    }

    #[test]
    fn test_candidates_empty_active_falls_back_to_all() {
        let taxonomy = PerspectiveTaxonomy::fungi();
        let none: [&str; 0] = [];
        assert_eq!(taxonomy.candidates(&none).len(), 12);
    }

    #[test]
    fn test_candidates_taxonomy_order_and_dedup() {
        let taxonomy = PerspectiveTaxonomy::fungi();
        let active = ["chemistry", "taxonomy", "chemistry"];
        assert_eq!(taxonomy.candidates(&active), vec!["taxonomy", "chemistry"]);
    }

    #[test]
    fn test_candidates_unknown_only_falls_back_to_all() {
        let taxonomy = PerspectiveTaxonomy::fungi();
        let active = vec!["astrology".to_string()];
        assert_eq!(taxonomy.candidates(&active).len(), 12);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = PerspectiveTaxonomy::new(
            vec![PerspectiveDef::new("a", "A"), PerspectiveDef::new("a", "A2")],
            BTreeMap::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate perspective 'a'"));
    }

    #[test]
    fn test_new_rejects_reserved_root() {
        let err = PerspectiveTaxonomy::new(vec![PerspectiveDef::new("root", "Root")], BTreeMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_new_rejects_unknown_field_target() {
        let mut table = BTreeMap::new();
        table.insert("genus".to_string(), "taxa".to_string());
        let err = PerspectiveTaxonomy::new(vec![PerspectiveDef::new("taxonomy", "Taxonomy")], table)
            .unwrap_err();
        assert!(err.to_string().contains("unknown perspective 'taxa'"));
    }
}
