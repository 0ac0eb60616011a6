//! Checker configuration loaded from TOML

use crate::types::OptionalReferencePolicy;
use facet_core::{FacetError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables of a repair pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Upper bound on rows a single scan may examine
    pub max_rows: usize,
    /// Repair applied to broken optional feature references
    pub optional_reference_policy: OptionalReferencePolicy,
    /// Re-run the feature and relationship checks after classifiers were deleted
    pub cascade_sweep: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_rows: 65_536,
            optional_reference_policy: OptionalReferencePolicy::Delete,
            cascade_sweep: true,
        }
    }
}

impl CheckConfig {
    /// Load a configuration from a TOML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::load_string(&content)
    }

    /// Load a configuration from a TOML string; missing keys take defaults
    pub fn load_string(content: &str) -> Result<Self> {
        let config: CheckConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(FacetError::ConfigError(
                "max_rows must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CheckConfig::load_string("").unwrap();
        assert_eq!(config, CheckConfig::default());
        assert!(config.cascade_sweep);
    }

    #[test]
    fn test_load_from_string() {
        let config = CheckConfig::load_string(
            r#"
max_rows = 500
optional_reference_policy = "clear"
cascade_sweep = false
"#,
        )
        .unwrap();
        assert_eq!(config.max_rows, 500);
        assert_eq!(config.optional_reference_policy, OptionalReferencePolicy::Clear);
        assert!(!config.cascade_sweep);
    }

    #[test]
    fn test_zero_row_ceiling_rejected() {
        let err = CheckConfig::load_string("max_rows = 0").unwrap_err();
        assert!(matches!(err, FacetError::ConfigError(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CheckConfig::load_string("max_row = 10").unwrap_err();
        assert!(matches!(err, FacetError::TomlParseError(_)));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facet.toml");
        fs::write(&path, "max_rows = 42\n").unwrap();
        assert_eq!(CheckConfig::load_file(&path).unwrap().max_rows, 42);

        let missing = CheckConfig::load_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(FacetError::IoError(_))));
    }
}
