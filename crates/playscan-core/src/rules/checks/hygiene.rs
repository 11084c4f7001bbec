//! Maintainability rules: naming and change reporting.

use crate::ast::model::{Expression, Play, Task};
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::checks::scan;
use crate::rules::eval::{Finding, Rule};
use crate::rules::heuristics::{command_string, is_command_module, is_falsey};

const CHECK_NAME_HINTS: &[&str] = &[
    "status", "version", "info", "check", "verify", "test", "validate", "health", "ping",
];

const CHECK_MODULES: &[&str] = &["stat", "wait_for", "assert", "fail"];

/// First words of commands that only read state.
const READ_ONLY_COMMANDS: &[&str] = &[
    "echo", "cat", "grep", "find", "ls", "pwd", "whoami", "date", "uname", "hostname", "which",
    "type",
];

const MIGRATION_HINTS: &[&str] = &[
    "migrate", "migration", "db_schema", "alembic", "liquibase", "flyway", "django",
    "makemigrations", "manage.py",
];

pub struct ChangedWhenWithoutWhen;

impl ChangedWhenWithoutWhen {
    pub const INFO: RuleInfo = RuleInfo {
        id: "changed_when-without-when",
        description: "changed_when used without when",
        severity: Severity::Medium,
    };

    fn inspect(task: &Task) -> Option<String> {
        let changed_when = task.changed_when.as_ref()?;
        let has_when = task.when.as_ref().is_some_and(|w| !w.is_empty_list());
        if has_when || Self::is_safe_usage(task, changed_when) {
            return None;
        }
        Some("sets 'changed_when' without 'when'; add a 'when' condition to control when it runs.".to_string())
    }

    fn is_safe_usage(task: &Task, changed_when: &Expression) -> bool {
        changed_when.literal().is_some_and(is_falsey)
            || is_check_task(task)
            || is_read_only_command(task)
            || is_migration(task)
    }
}

fn is_check_task(task: &Task) -> bool {
    let name = task.name.to_lowercase();
    CHECK_NAME_HINTS.iter().any(|h| name.contains(h)) || CHECK_MODULES.contains(&task.short_module())
}

fn is_read_only_command(task: &Task) -> bool {
    if !is_command_module(task) {
        return false;
    }
    let command = command_string(task).to_lowercase();
    let command = command.trim();
    if command.starts_with("command -v") {
        return true;
    }
    command
        .split_whitespace()
        .next()
        .is_some_and(|first| READ_ONLY_COMMANDS.contains(&first))
}

fn is_migration(task: &Task) -> bool {
    let name = task.name.to_lowercase();
    let command = command_string(task).to_lowercase();
    MIGRATION_HINTS
        .iter()
        .any(|h| name.contains(h) || command.contains(h))
}

impl Rule for ChangedWhenWithoutWhen {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}

pub struct UnnamedTask;

impl UnnamedTask {
    pub const INFO: RuleInfo = RuleInfo {
        id: "unnamed-task",
        description: "Task has no name",
        severity: Severity::Low,
    };

    fn inspect(task: &Task) -> Option<String> {
        (!task.has_name())
            .then(|| "has no name; add 'name' for readable output and easier debugging.".to_string())
    }
}

impl Rule for UnnamedTask {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}
