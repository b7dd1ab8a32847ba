//! Engine configuration
//!
//! `DsmConfig` carries the few knobs the façade consults. It can be built in
//! code or parsed from TOML:
//!
//! ```
//! use dsmx_core::config::DsmConfig;
//! use dsmx_core::sorting::SortAlgorithmId;
//!
//! let config = DsmConfig::from_toml_str(
//!     r#"
//!     default_sort_algorithm = "Alphabetical"
//!     auto_partition = true
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.default_sort_algorithm, SortAlgorithmId::Alphabetical);
//! assert!(config.auto_partition);
//! ```

use serde::Deserialize;

use crate::errors::Result;
use crate::sorting::SortAlgorithmId;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DsmConfig {
    /// Algorithm used by `finalize_import` when `auto_partition` is set
    pub default_sort_algorithm: SortAlgorithmId,
    /// Sort every sibling set once the import is finalized
    pub auto_partition: bool,
    /// Whether `search_elements` compares case-sensitively
    pub case_sensitive_search: bool,
    /// Emit a warning for each relation skipped during import
    pub warn_on_skipped_relations: bool,
}

impl Default for DsmConfig {
    fn default() -> Self {
        Self {
            default_sort_algorithm: SortAlgorithmId::Partition,
            auto_partition: false,
            case_sensitive_search: false,
            warn_on_skipped_relations: true,
        }
    }
}

impl DsmConfig {
    /// Parse a configuration from TOML text; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `DsmError::Config` for malformed TOML, unknown keys or
    /// unknown algorithm names.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DsmError;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = DsmConfig::from_toml_str("").unwrap();
        assert_eq!(config, DsmConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = DsmConfig::from_toml_str("colour = \"red\"");
        assert!(matches!(result, Err(DsmError::Config { .. })));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let result = DsmConfig::from_toml_str("default_sort_algorithm = \"Bogus\"");
        assert!(matches!(result, Err(DsmError::Config { .. })));
    }

    #[test]
    fn test_case_sensitive_search_flag() {
        let config = DsmConfig::from_toml_str("case_sensitive_search = true").unwrap();
        assert!(config.case_sensitive_search);
        assert!(config.warn_on_skipped_relations);
    }
}
