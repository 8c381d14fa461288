use crate::error::ConfigError;
use serde::Deserialize;

/// Runtime tuning, read from TOML by hosts that want to override defaults.
///
/// ```
/// use beagle_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::from_toml_str("cache_capacity = 8").unwrap();
/// assert_eq!(config.cache_capacity, 8);
/// assert!(!config.warn_unresolved_bindings);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Entries kept per context evaluation cache before the oldest is dropped.
    pub cache_capacity: usize,
    /// Log queued (unresolved) bindings at `warn` instead of `debug`.
    pub warn_unresolved_bindings: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            warn_unresolved_bindings: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(text)?;
        if config.cache_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(RuntimeConfig::from_toml_str("").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RuntimeConfig::from_toml_str("cache_capacity = 0"),
            Err(ConfigError::ZeroCapacity)
        ));
        assert!(matches!(
            RuntimeConfig::from_toml_str("unknown = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
