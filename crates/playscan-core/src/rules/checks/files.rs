//! File ownership, permission and temp-file rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::model::{Play, Task};
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::checks::scan;
use crate::rules::eval::{Finding, Rule};
use crate::rules::heuristics::{
    command_string, is_command_module, is_dangerous_mode, is_safe_temp_path, is_system_config_path,
    is_temp_path, is_truthy,
};
use crate::value::Value;

/// `file` states that do not leave a regular file or directory behind.
const NON_CREATING_STATES: &[&str] = &["absent", "link", "hard"];

/// Destination of a file task: `dest`, else `path`.
fn destination(task: &Task) -> String {
    ["dest", "path"]
        .iter()
        .filter_map(|k| task.param(k))
        .find(|v| !v.is_null())
        .map(Value::to_text)
        .unwrap_or_default()
}

fn creates_file(task: &Task) -> bool {
    match task.short_module() {
        "copy" | "template" => true,
        "file" => {
            let state = task
                .param("state")
                .map(|s| s.to_text().to_lowercase())
                .unwrap_or_default();
            !NON_CREATING_STATES.contains(&state.as_str())
        }
        "lineinfile" | "blockinfile" => task.param("create").is_some_and(is_truthy),
        _ => false,
    }
}

fn is_set(task: &Task, key: &str) -> bool {
    task.param(key).is_some_and(|v| !v.is_null())
}

pub struct MissingFilePermissions;

impl MissingFilePermissions {
    pub const INFO: RuleInfo = RuleInfo {
        id: "missing-file-permissions",
        description: "File created or modified without owner, group and mode",
        severity: Severity::Medium,
    };

    fn inspect(task: &Task) -> Option<String> {
        if !creates_file(task) || task.parameters.as_mapping().is_none() {
            return None;
        }

        if let Some(mode) = task.param("mode") {
            if is_dangerous_mode(mode) {
                return Some(format!(
                    "sets group- or world-writable mode {}; restrict the permissions.",
                    mode.to_text()
                ));
            }
        }

        if ["owner", "group", "mode"].iter().any(|k| is_set(task, k)) {
            return None;
        }

        let dest = destination(task);
        // Destinations computed at runtime or living in scratch space are
        // left alone.
        if dest.contains("{{") || is_safe_temp_path(&dest) {
            return None;
        }

        let target = if dest.is_empty() {
            "a file".to_string()
        } else if is_system_config_path(&dest) {
            format!("system configuration file '{dest}'")
        } else {
            format!("'{dest}'")
        };
        Some(format!(
            "writes {target} without owner, group or mode; set them explicitly."
        ))
    }
}

impl Rule for MissingFilePermissions {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}

const TEMP_FILE_MODULES: &[&str] = &["file", "copy", "template", "tempfile"];

const SECRET_MARKERS: &[&str] = &["PASSWORD=", "SECRET=", "KEY=", "TOKEN=", "PRIVATE KEY"];

static CHMOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"chmod\s+(?:-[a-z]+\s+)*([0-7]{3,4}|[ugoa]*[+=][rwxst]+)").expect("valid chmod pattern")
});

fn has_secrets(text: &str) -> bool {
    let upper = text.to_uppercase();
    SECRET_MARKERS.iter().any(|m| upper.contains(m))
}

pub struct UnsafeTempFileHandling;

impl UnsafeTempFileHandling {
    pub const INFO: RuleInfo = RuleInfo {
        id: "unsafe-temp-file-handling",
        description: "Unsafe temporary file handling",
        severity: Severity::Medium,
    };

    fn inspect(task: &Task) -> Option<String> {
        let issues = if TEMP_FILE_MODULES.contains(&task.short_module()) {
            Self::file_issues(task)
        } else if is_command_module(task) {
            Self::command_issues(task)
        } else {
            Vec::new()
        };

        if issues.is_empty() {
            return None;
        }
        Some(format!(
            "handles temporary files unsafely: {}; use private directories and restrictive modes.",
            issues.join(", ")
        ))
    }

    fn file_issues(task: &Task) -> Vec<String> {
        let mut issues = Vec::new();
        let path = destination(task);
        if !is_temp_path(&path) {
            return issues;
        }

        if let Some(mode) = task.param("mode") {
            if is_dangerous_mode(mode) {
                issues.push(format!("temporary file '{path}' has mode {}", mode.to_text()));
            }
        }
        if task.param("content").is_some_and(|c| has_secrets(&c.to_text())) {
            issues.push(format!("temporary file '{path}' contains secret material"));
        }
        issues
    }

    fn command_issues(task: &Task) -> Vec<String> {
        let mut issues = Vec::new();
        let command = command_string(task).to_lowercase();
        if !is_temp_path(&command) {
            return issues;
        }

        let dangerous_chmod = CHMOD
            .captures_iter(&command)
            .any(|caps| is_dangerous_mode(&Value::from(&caps[1])));
        if dangerous_chmod {
            issues.push("command sets dangerous permissions on a temporary path".to_string());
        }
        if command.contains("password") || command.contains("secret") {
            issues.push("command writes secrets to a temporary path".to_string());
        }
        issues
    }
}

impl Rule for UnsafeTempFileHandling {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}
