//! Field weight lookup.

use std::collections::HashMap;

use sporelens_core::WeightsConfig;

/// Bare field name → weight, with a fallback for unlisted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWeights {
    weights: HashMap<String, u32>,
    default: u32,
}

impl FieldWeights {
    /// An empty table where every field weighs `default`.
    pub fn new(default: u32) -> Self {
        Self {
            weights: HashMap::new(),
            default,
        }
    }

    /// Builder-style weight assignment.
    pub fn with(mut self, field: impl Into<String>, weight: u32) -> Self {
        self.weights.insert(field.into(), weight);
        self
    }

    /// Weight for a bare field name.
    pub fn get(&self, field: &str) -> u32 {
        self.weights.get(field).copied().unwrap_or(self.default)
    }

    /// Weight of unlisted fields.
    pub fn default_weight(&self) -> u32 {
        self.default
    }
}

impl From<&WeightsConfig> for FieldWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            weights: config
                .fields
                .iter()
                .map(|(field, weight)| (field.clone(), *weight))
                .collect(),
            default: config.default,
        }
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self::from(&WeightsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let weights = FieldWeights::default();
        assert_eq!(weights.get("commonName"), 10);
        assert_eq!(weights.get("genus"), 7);
        assert_eq!(weights.get("somethingElse"), 1);
        assert_eq!(weights.default_weight(), 1);
    }

    #[test]
    fn test_builder() {
        let weights = FieldWeights::new(2).with("title", 9);
        assert_eq!(weights.get("title"), 9);
        assert_eq!(weights.get("body"), 2);
    }

    #[test]
    fn test_from_config() {
        let mut config = WeightsConfig::default();
        config.default = 0;
        config.fields.insert("spores".to_string(), 4);

        let weights = FieldWeights::from(&config);
        assert_eq!(weights.get("spores"), 4);
        assert_eq!(weights.get("unlisted"), 0);
    }
}
