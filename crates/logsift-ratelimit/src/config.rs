//! Configuration for rate limiting

use serde::{Deserialize, Serialize};

/// Rate limiter configuration
///
/// Both limits are optional; a missing limit means that constraint is not
/// enforced. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// TPM (transactions per minute) limit; `None` disables the sliding window
    #[serde(default)]
    pub tpm_limit: Option<u32>,

    /// RPM (requests per minute) limit; `None` disables the token bucket
    #[serde(default)]
    pub rpm_limit: Option<u32>,

    /// Token bucket capacity (burst allowance)
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// Master switch; when false every operation is a no-op success
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_burst_size() -> u32 {
    10
}

fn default_enabled() -> bool {
    true
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tpm_limit: None,
            rpm_limit: None,
            burst_size: default_burst_size(),
            enabled: default_enabled(),
        }
    }
}

impl RateLimitConfig {
    /// A configuration with rate limiting switched off entirely
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.burst_size == 0 {
            return Err("burst_size must be greater than 0".to_string());
        }
        if self.rpm_limit == Some(0) {
            return Err("rpm_limit must be greater than 0 when set".to_string());
        }
        if self.tpm_limit == Some(0) {
            return Err("tpm_limit must be greater than 0 when set".to_string());
        }
        Ok(())
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
