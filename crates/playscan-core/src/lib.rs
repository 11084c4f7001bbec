//! Static analysis of automation playbooks.
//!
//! The pipeline is linear and synchronous:
//!
//! ```text
//! read_artifact -> parse_playbook -> ast::build -> Engine::run -> classify -> Report
//! ```
//!
//! Only the first step touches the filesystem; everything after it is a pure
//! function of the playbook text and the configuration.

use std::path::Path;

pub mod ast;
pub mod config;
pub mod error;
pub mod playbook;
pub mod report;
pub mod rules;
pub mod signals;
pub mod util;
pub mod value;

pub use config::{AnalysisConfig, RuleSelection};
pub use error::{Error, Result};

use crate::ast::model::Play;
use crate::report::model::{AnalysisInfo, Report, RulesCatalogInfo, ToolInfo};
use crate::rules::classify::classify;
use crate::rules::eval::Engine;
use crate::rules::registry::select_rules;

pub const TOOL_NAME: &str = "playscan";

/// JSON schema version of playscan reports.
/// Bump only when the report shape changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

pub const RULE_CATALOG_VERSION: &str = "0.1.0";

/// Parses playbook text and builds its plays.
pub fn build_plays(text: &str) -> Result<Vec<Play>> {
    let documents = playbook::parse_playbook(text)?;
    Ok(ast::build(&documents))
}

/// Analyzes the playbook at `path` with every built-in rule.
pub fn inspect(path: &Path, tool: ToolInfo) -> Result<Report> {
    inspect_with_config(path, tool, &AnalysisConfig::default())
}

/// Analyzes the playbook at `path` with the rules and failure policy of
/// `config`.
pub fn inspect_with_config(path: &Path, tool: ToolInfo, config: &AnalysisConfig) -> Result<Report> {
    let artifact = playbook::read_artifact(path)?;
    let plays = build_plays(&artifact.text)?;

    let engine = Engine::new(select_rules(&config.rules)?)?.with_policy(config.failure_policy);
    let findings = engine.run(&plays)?;
    log::debug!("{} finding(s) for {}", findings.len(), path.display());

    let signals = signals::extract_signals(&plays);
    let mut analysis = AnalysisInfo::ok();
    signals::annotate(&plays, &mut analysis);

    let ruleset = if config.rules == RuleSelection::default() {
        "default"
    } else {
        "custom"
    };
    let catalog = RulesCatalogInfo::new(RULE_CATALOG_VERSION, ruleset, &engine.rules());
    let classification = classify(&findings);

    Ok(Report::new(
        tool,
        artifact.into_artifact(),
        signals,
        analysis,
        catalog,
        findings,
        classification,
    ))
}
