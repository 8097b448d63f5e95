//! Engine configuration.
//!
//! A single `ListConfig` document controls the knobs every section shares:
//! which page sizes the UI offers, which one is the default, and how many
//! recent searches are kept. Hosts embed the defaults or load overrides from
//! a `castlist.toml`:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! page_sizes = [24, 48, 72, 100]  # Page sizes the UI may offer
//! default_page_size = 48          # Used when the URL carries none
//! max_recent_searches = 10        # Cap for the persisted recent-search list
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown keys
//! are rejected to catch typos early.
//!
//! The config participates directly in URL decoding: a `pageSize` query
//! parameter outside `page_sizes` falls back to `default_page_size`, and the
//! default value is what gets *omitted* from encoded URLs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from `castlist.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    /// Page sizes the UI may offer. URL `pageSize` values outside this set
    /// fall back to `default_page_size`.
    pub page_sizes: Vec<u32>,
    /// Page size used when the URL carries none. Must be a member of
    /// `page_sizes`.
    pub default_page_size: u32,
    /// Maximum number of entries kept in the persisted recent-search list.
    pub max_recent_searches: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_sizes: vec![24, 48, 72, 100],
            default_page_size: 48,
            max_recent_searches: 10,
        }
    }
}

impl ListConfig {
    /// Load from a TOML file, falling back to defaults when the file does
    /// not exist. Parse and validation errors are real errors — a present
    /// but broken config should fail loudly, not silently default.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_sizes.is_empty() {
            return Err(ConfigError::Validation(
                "page_sizes must not be empty".into(),
            ));
        }
        if !self.page_sizes.contains(&self.default_page_size) {
            return Err(ConfigError::Validation(format!(
                "default_page_size {} must be one of page_sizes {:?}",
                self.default_page_size, self.page_sizes
            )));
        }
        if self.page_sizes.iter().any(|&s| s == 0) {
            return Err(ConfigError::Validation(
                "page_sizes values must be non-zero".into(),
            ));
        }
        if self.max_recent_searches == 0 {
            return Err(ConfigError::Validation(
                "max_recent_searches must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Clamp a requested page size to the allowed set, falling back to the
    /// default for anything outside it.
    pub fn sanitize_page_size(&self, size: u32) -> u32 {
        if self.page_sizes.contains(&size) {
            size
        } else {
            self.default_page_size
        }
    }

    /// Render the stock config with all options documented, for `gen-config`.
    pub fn stock_toml() -> String {
        let d = Self::default();
        format!(
            "\
# castlist configuration
# All options are optional - defaults shown below

# Page sizes the UI may offer. URL pageSize values outside this set
# fall back to default_page_size.
page_sizes = {:?}

# Page size used when the URL carries none. Must be one of page_sizes.
default_page_size = {}

# Cap for the persisted recent-search list.
max_recent_searches = {}
",
            d.page_sizes, d.default_page_size, d.max_recent_searches
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ListConfig::default().validate().is_ok());
    }

    #[test]
    fn sparse_override_keeps_other_defaults() {
        let config = ListConfig::from_toml("default_page_size = 72").unwrap();
        assert_eq!(config.default_page_size, 72);
        assert_eq!(config.page_sizes, vec![24, 48, 72, 100]);
        assert_eq!(config.max_recent_searches, 10);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = ListConfig::from_toml("page_size = 24");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn default_size_outside_set_rejected() {
        let result = ListConfig::from_toml("page_sizes = [10, 20]\ndefault_page_size = 24");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_sizes_rejected() {
        let result = ListConfig::from_toml("page_sizes = []");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_size_rejected() {
        let result = ListConfig::from_toml("page_sizes = [0, 24]\ndefault_page_size = 24");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn sanitize_accepts_member_sizes() {
        let config = ListConfig::default();
        assert_eq!(config.sanitize_page_size(24), 24);
    }

    #[test]
    fn sanitize_rejects_out_of_set_sizes() {
        let config = ListConfig::default();
        assert_eq!(config.sanitize_page_size(25), 48);
        assert_eq!(config.sanitize_page_size(0), 48);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ListConfig::load(&tmp.path().join("castlist.toml")).unwrap();
        assert_eq!(config, ListConfig::default());
    }

    #[test]
    fn load_broken_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("castlist.toml");
        std::fs::write(&path, "page_sizes = \"not a list\"").unwrap();
        assert!(ListConfig::load(&path).is_err());
    }

    #[test]
    fn stock_toml_parses_to_defaults() {
        let config = ListConfig::from_toml(&ListConfig::stock_toml()).unwrap();
        assert_eq!(config, ListConfig::default());
    }
}
