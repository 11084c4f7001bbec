//! Rules over raw command execution.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::model::{Play, Task};
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::checks::{quoted_list, scan};
use crate::rules::eval::{Finding, Rule};
use crate::rules::heuristics::{command_string, is_command_module, unvalidated_interpolations};

static SERVICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"systemctl\s+(start|stop|restart|enable|disable)\s+",
        r"service\s+\S+\s+(start|stop|restart)",
        r"/etc/init\.d/\S+\s+(start|stop|restart)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid service pattern"))
    .collect()
});

const SERVICE_VERBS: &[&str] = &["start ", "stop ", "restart ", "enable ", "disable "];
const SERVICE_MANAGERS: &[&str] = &["systemctl", "service ", "/etc/init.d/"];

/// Status probes, existence checks and symlink creation are not lifecycle
/// changes.
const NOT_LIFECYCLE: &[&str] = &["status", "ln -sf", "ln -s", "test", "exists"];

pub struct ServiceViaCommand;

impl ServiceViaCommand {
    pub const INFO: RuleInfo = RuleInfo {
        id: "service-via-command",
        description: "Service managed through a raw command instead of the service module",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        if !is_command_module(task) {
            return None;
        }
        let command = command_string(task).to_lowercase();
        if command.is_empty() || NOT_LIFECYCLE.iter().any(|s| command.contains(s)) {
            return None;
        }

        let by_pattern = SERVICE_PATTERNS.iter().any(|re| re.is_match(&command));
        let by_keywords = SERVICE_VERBS.iter().any(|v| command.contains(v))
            && SERVICE_MANAGERS.iter().any(|m| command.contains(m));

        (by_pattern || by_keywords).then(|| {
            format!(
                "uses the '{}' module to manage a service; use the 'service' or 'systemd' module instead.",
                task.short_module()
            )
        })
    }
}

impl Rule for ServiceViaCommand {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}

static SUDO_SU: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s;&|(])(?:sudo|su)(?:\s|$)").expect("valid sudo pattern")
});

pub struct PrivilegeEscalationInCommand;

impl PrivilegeEscalationInCommand {
    pub const INFO: RuleInfo = RuleInfo {
        id: "privilege-escalation-in-command",
        description: "sudo/su used inside a command",
        severity: Severity::Medium,
    };

    fn inspect(task: &Task) -> Option<String> {
        if !is_command_module(task) {
            return None;
        }
        let command = command_string(task).to_lowercase();
        SUDO_SU
            .is_match(&command)
            .then(|| "runs sudo/su inside its command; use 'become' instead.".to_string())
    }
}

impl Rule for PrivilegeEscalationInCommand {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}

pub struct DeprecatedRawModule;

impl DeprecatedRawModule {
    pub const INFO: RuleInfo = RuleInfo {
        id: "deprecated-raw-module",
        description: "Low-level raw module used",
        severity: Severity::Medium,
    };

    fn inspect(task: &Task) -> Option<String> {
        (task.short_module() == "raw")
            .then(|| "uses the low-level 'raw' module; use 'command' or 'shell' instead.".to_string())
    }
}

impl Rule for DeprecatedRawModule {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}

pub struct CommandInjectionViaInterpolation;

impl CommandInjectionViaInterpolation {
    pub const INFO: RuleInfo = RuleInfo {
        id: "command-injection-via-interpolation",
        description: "Command built from unvalidated user-controlled variables",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        if !is_command_module(task) {
            return None;
        }
        let suspects = unvalidated_interpolations(&command_string(task));
        if suspects.is_empty() {
            return None;
        }
        Some(format!(
            "interpolates unvalidated variable(s) {} into a command; prefer a dedicated module or validate the input.",
            quoted_list(&suspects)
        ))
    }
}

impl Rule for CommandInjectionViaInterpolation {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}
