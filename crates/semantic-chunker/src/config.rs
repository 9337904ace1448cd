use crate::error::{ChunkerError, Result};
use crate::types::DecoratorTag;
use serde::{Deserialize, Serialize};

/// Configuration for semantic chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Top-level gap content smaller than this is merged (soft lower bound)
    pub min_unit_size: usize,

    /// Chunks larger than this are split into fragments (hard upper bound)
    pub max_unit_size: usize,

    /// Unit in which `min_unit_size` and `max_unit_size` are measured
    pub size_unit: SizeUnit,

    /// Fold trivial top-level gap content into synthetic module chunks
    pub merge_adjacent_trivial: bool,

    /// Turn inline function literals (lambdas, closures, arrow functions) into chunks
    pub chunk_anonymous_literals: bool,

    /// How module-level guarded execution blocks (`if __name__ == "__main__":`) are treated
    pub guarded_blocks: StatementPolicy,

    /// How module-level lambda assignments (`square = lambda x: x * x`) are treated
    pub lambda_assignments: StatementPolicy,

    /// Extra decorator classification rules, evaluated before the built-in table
    pub decorator_rules: Vec<DecoratorRuleConfig>,

    /// Languages to support (empty = all supported languages)
    pub supported_languages: Vec<String>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_unit_size: 64,
            max_unit_size: 4096,
            size_unit: SizeUnit::Chars,
            merge_adjacent_trivial: true,
            chunk_anonymous_literals: false,
            guarded_blocks: StatementPolicy::Chunk,
            lambda_assignments: StatementPolicy::Chunk,
            decorator_rules: Vec::new(),
            supported_languages: Vec::new(),
        }
    }
}

impl ChunkerConfig {
    /// Create config optimized for embeddings (smaller, focused chunks)
    pub fn for_embeddings() -> Self {
        Self {
            min_unit_size: 48,
            max_unit_size: 2048,
            ..Default::default()
        }
    }

    /// Create config optimized for LLM context (larger, comprehensive chunks)
    pub fn for_llm_context() -> Self {
        Self {
            min_unit_size: 128,
            max_unit_size: 8192,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ChunkerError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_unit_size == 0 {
            return Err(ChunkerError::invalid_config("max_unit_size must be > 0"));
        }

        if self.min_unit_size > self.max_unit_size {
            return Err(ChunkerError::invalid_config(format!(
                "min_unit_size ({}) cannot exceed max_unit_size ({})",
                self.min_unit_size, self.max_unit_size
            )));
        }

        for rule in &self.decorator_rules {
            if rule.pattern.trim().is_empty() {
                return Err(ChunkerError::invalid_config(
                    "decorator rule pattern must not be empty",
                ));
            }
        }

        Ok(())
    }
}

/// Unit used to measure chunk size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    /// Grapheme clusters of the span text
    Chars,
    /// Lines touched by the span
    Lines,
}

/// Whether a special module-level statement gets its own chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementPolicy {
    /// Emit as a dedicated chunk
    Chunk,
    /// Treat as ordinary gap content (may be merged into the preamble)
    Fold,
}

/// User-supplied decorator rule: regex over the decorator's callee path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorRuleConfig {
    pub pattern: String,
    pub tag: DecoratorTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preset_configs_valid() {
        assert!(ChunkerConfig::for_embeddings().validate().is_ok());
        assert!(ChunkerConfig::for_llm_context().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ChunkerConfig {
            min_unit_size: 1000,
            max_unit_size: 500,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChunkerError::InvalidConfig(_))
        ));

        config.min_unit_size = 0;
        config.max_unit_size = 0;
        assert!(config.validate().is_err());

        config.max_unit_size = 10;
        assert!(config.validate().is_ok());

        // Equal bounds are allowed
        config.min_unit_size = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_decorator_pattern_rejected() {
        let config = ChunkerConfig {
            decorator_rules: vec![DecoratorRuleConfig {
                pattern: "  ".to_string(),
                tag: DecoratorTag::Property,
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ChunkerConfig::from_toml_str(
            r#"
max_unit_size = 300
size_unit = "lines"
guarded_blocks = "fold"

[[decorator_rules]]
pattern = "^app\\.route$"
tag = "static"
"#,
        )
        .unwrap();

        assert_eq!(config.max_unit_size, 300);
        assert_eq!(config.min_unit_size, 64);
        assert_eq!(config.size_unit, SizeUnit::Lines);
        assert_eq!(config.guarded_blocks, StatementPolicy::Fold);
        assert_eq!(config.lambda_assignments, StatementPolicy::Chunk);
        assert_eq!(config.decorator_rules.len(), 1);
        assert_eq!(config.decorator_rules[0].tag, DecoratorTag::Static);
    }

    #[test]
    fn test_from_toml_rejects_inverted_bounds() {
        let result = ChunkerConfig::from_toml_str("min_unit_size = 10\nmax_unit_size = 5\n");
        assert!(matches!(result, Err(ChunkerError::InvalidConfig(_))));
    }
}
