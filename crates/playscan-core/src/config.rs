//! Analysis configuration.
//!
//! Loaded from an optional YAML file; every field has a default so an empty
//! file is a valid configuration:
//!
//! ```yaml
//! rules:
//!   select: []
//!   disable: [unnamed-task]
//! failure_policy: isolate   # or fail-fast
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigSource, Error, Result};
use crate::rules::eval::FailurePolicy;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub rules: RuleSelection,
    pub failure_policy: FailurePolicy,
}

/// Which registered rules run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSelection {
    /// When non-empty, only these rule ids run.
    pub select: Vec<String>,
    /// Rule ids removed after `select` is applied.
    pub disable: Vec<String>,
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config_error = |source: ConfigSource| Error::Config {
            path: path.to_path_buf(),
            source,
        };

        let text = fs::read_to_string(path).map_err(|e| config_error(e.into()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&text).map_err(|e| config_error(e.into()))?;

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn full_configuration_loads() {
        let file = write("rules:\n  select: [unnamed-task, deprecated-raw-module]\n  disable: [deprecated-raw-module]\nfailure_policy: fail-fast\n");
        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.rules.select, vec!["unnamed-task", "deprecated-raw-module"]);
        assert_eq!(config.rules.disable, vec!["deprecated-raw-module"]);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn empty_and_partial_files_use_defaults() {
        let empty = write("");
        assert_eq!(AnalysisConfig::load(empty.path()).unwrap(), AnalysisConfig::default());

        let partial = write("rules:\n  disable: [unnamed-task]\n");
        let config = AnalysisConfig::load(partial.path()).unwrap();
        assert!(config.rules.select.is_empty());
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
    }

    #[test]
    fn unknown_keys_and_missing_files_are_config_errors() {
        let typo = write("rule:\n  disable: []\n");
        let err = AnalysisConfig::load(typo.path()).unwrap_err();
        assert!(matches!(err, Error::Config { source: ConfigSource::Yaml(_), .. }));
        assert!(err.to_string().starts_with("config:"));

        let err = AnalysisConfig::load(Path::new("/definitely/not/here.yml")).unwrap_err();
        assert!(matches!(err, Error::Config { source: ConfigSource::Io(_), .. }));
    }
}
