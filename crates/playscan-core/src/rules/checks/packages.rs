//! Package pinning.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::model::{Play, Task};
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::checks::{quoted_list, scan};
use crate::rules::eval::{Finding, Rule};
use crate::value::Value;

const PACKAGE_MODULES: &[&str] = &["package", "apt", "yum", "dnf", "pacman", "zypper", "pip"];

/// Package states that remove instead of install.
const REMOVAL_STATES: &[&str] = &["absent", "removed"];

/// `=`, `==`, `>=`, `<`, `~=`, `@` (pip URLs and npm-style), or a dash
/// directly followed by a digit (`nginx-1.24.0`).
///
/// A bare dash is not a pin: unlike the looser "any dash" reading, names
/// such as `python3-pip` or `build-essential` are reported as unpinned.
static PIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[=<>~@]|-\d").expect("valid pin pattern"));

fn is_pinned(spec: &str) -> bool {
    PIN.is_match(spec)
}

/// Package specs named by a `name` (or `pkg`) parameter.
///
/// Comma separated strings are split; templated entries are dropped since
/// their value is unknown until runtime.
fn package_specs(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Sequence(items) => items.iter().map(Value::to_text).collect(),
        Value::Null => Vec::new(),
        other => other.to_text().split(',').map(str::to_string).collect(),
    };
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.contains("{{"))
        .collect()
}

pub struct UnpinnedPackageInstall;

impl UnpinnedPackageInstall {
    pub const INFO: RuleInfo = RuleInfo {
        id: "unpinned-package-install",
        description: "Packages installed without pinned versions",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        if !PACKAGE_MODULES.contains(&task.short_module()) {
            return None;
        }
        let params = task.parameters.as_mapping()?;
        let state = params
            .get("state")
            .map(|s| s.to_text().to_lowercase())
            .unwrap_or_default();
        if REMOVAL_STATES.contains(&state.as_str()) {
            return None;
        }

        let names = params.get("name").or_else(|| params.get("pkg"))?;
        let unpinned: Vec<String> = package_specs(names)
            .into_iter()
            .filter(|spec| !is_pinned(spec))
            .collect();
        if unpinned.is_empty() {
            return None;
        }
        Some(format!(
            "installs {} without a pinned version; pin explicit package versions.",
            quoted_list(&unpinned)
        ))
    }
}

impl Rule for UnpinnedPackageInstall {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}
