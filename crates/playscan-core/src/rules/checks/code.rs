//! Dynamic code execution.

use crate::ast::model::{Play, Task};
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::checks::scan;
use crate::rules::eval::{Finding, Rule};
use crate::value::Value;

/// Dynamic-code-execution primitives, matched against lowercased text.
const DANGEROUS_FUNCTIONS: &[&str] = &[
    "eval(",
    "exec(",
    "compile(",
    "execfile(",
    "input()",
    "subprocess.call",
    "subprocess.popen",
    "os.system",
    "popen(",
    "spawn(",
    "execve(",
    "reload(",
    "__import__",
];

/// Flattens parameters into one searchable line: `key=value` pairs for a
/// mapping, the textual form otherwise.
fn parameter_text(parameters: &Value) -> String {
    match parameters {
        Value::Mapping(entries) => entries
            .iter()
            .map(|(k, v)| format!("{k}={}", v.to_text()))
            .collect::<Vec<_>>()
            .join(" "),
        Value::Null => String::new(),
        other => other.to_text(),
    }
}

pub struct DangerousFunctionUsage;

impl DangerousFunctionUsage {
    pub const INFO: RuleInfo = RuleInfo {
        id: "dangerous-function-usage",
        description: "Dynamic code execution functions used",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        let text = parameter_text(&task.parameters).to_lowercase();
        let used: Vec<&str> = DANGEROUS_FUNCTIONS
            .iter()
            .copied()
            .filter(|f| text.contains(f))
            .collect();
        if used.is_empty() {
            return None;
        }
        Some(format!(
            "uses dynamic code execution ({}); avoid evaluating code at runtime.",
            used.join(", ")
        ))
    }
}

impl Rule for DangerousFunctionUsage {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}
