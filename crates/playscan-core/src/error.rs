use std::path::PathBuf;

use thiserror::Error;

/// Terminal failures of one analysis run.
///
/// Each variant names the pipeline stage that failed so callers can report
/// a single, self-describing error instead of a partial report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("read: failed to read playbook {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read: playbook {} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("parse: malformed YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("parse: expected a list of plays, found {found}")]
    NotAPlaybook { found: String },

    #[error("config: invalid configuration file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigSource,
    },

    #[error("engine: rule id '{0}' is registered more than once")]
    DuplicateRuleId(String),

    #[error("engine: unknown rule id '{0}'")]
    UnknownRule(String),

    #[error("engine: rule '{rule_id}' failed: {reason}")]
    RuleFailed { rule_id: String, reason: String },
}

/// Underlying cause of a configuration failure.
#[derive(Debug, Error)]
pub enum ConfigSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
