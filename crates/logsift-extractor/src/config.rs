//! Configuration for the Extractor

use logsift_chunker::ChunkStrategy;
use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum number of chunks processed at the same time
    pub max_concurrency: usize,

    /// Maximum chunk size (characters) when chunking raw log text
    pub chunk_size: usize,

    /// Trailing window (characters) repeated between adjacent chunks
    pub chunk_overlap: usize,

    /// Chunking strategy used by [`extract_from_log`](crate::Extractor::extract_from_log)
    pub chunk_strategy: ChunkStrategy,
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            chunk_size: 4000,
            chunk_overlap: 200,
            chunk_strategy: ChunkStrategy::default(),
        }
    }
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err("chunk_overlap must be smaller than chunk_size".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.chunk_size, 4000);
        assert_eq!(config.chunk_overlap, 200);
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let config = ExtractorConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let config = ExtractorConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.max_concurrency, parsed.max_concurrency);
        assert_eq!(config.chunk_size, parsed.chunk_size);
        assert_eq!(config.chunk_overlap, parsed.chunk_overlap);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("max_concurrency = 2").unwrap();
        assert_eq!(parsed.max_concurrency, 2);
        assert_eq!(parsed.chunk_size, 4000);
    }
}
