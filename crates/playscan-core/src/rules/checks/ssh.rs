//! SSH daemon hardening.

use crate::ast::model::{Play, Task};
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::checks::scan;
use crate::rules::eval::{Finding, Rule};
use crate::value::Value;

const CONFIG_MODULES: &[&str] = &["lineinfile", "blockinfile", "copy", "template"];

const SSH_INDICATORS: &[&str] = &[
    "/etc/ssh/sshd_config",
    "sshd_config",
    "PermitRootLogin",
    "PasswordAuthentication",
    "Protocol",
];

/// Directive, offending value, and what it means.
const INSECURE_DIRECTIVES: &[(&str, &str, &str)] = &[
    ("permitrootlogin", "yes", "root login permitted"),
    ("passwordauthentication", "yes", "password authentication enabled"),
    ("protocol", "1", "legacy SSHv1 protocol"),
    ("x11forwarding", "yes", "X11 forwarding enabled"),
    ("permitemptypasswords", "yes", "empty passwords permitted"),
    ("challengeresponseauthentication", "yes", "challenge-response authentication enabled"),
    ("usepam", "no", "PAM disabled"),
];

fn text_of(task: &Task, key: &str) -> String {
    task.param(key)
        .filter(|v| !v.is_null())
        .map(Value::to_text)
        .unwrap_or_default()
}

/// Insecure settings found in `config`, one per directive, in table order.
///
/// Lines are compared token-wise, so `PermitRootLogin prohibit-password` or
/// a commented-out directive never matches.
pub fn insecure_settings(config: &str) -> Vec<&'static str> {
    let lines: Vec<Vec<String>> = config
        .lines()
        .map(|line| {
            line.split_whitespace()
                .map(str::to_ascii_lowercase)
                .collect::<Vec<_>>()
        })
        .collect();

    INSECURE_DIRECTIVES
        .iter()
        .filter(|(directive, value, _)| {
            lines.iter().any(|tokens| {
                tokens.first().map(String::as_str) == Some(*directive)
                    && tokens.get(1).map(String::as_str) == Some(*value)
            })
        })
        .map(|(_, _, meaning)| *meaning)
        .collect()
}

pub struct InsecureSshConfig;

impl InsecureSshConfig {
    pub const INFO: RuleInfo = RuleInfo {
        id: "insecure-ssh-config",
        description: "Insecure SSH daemon configuration",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        if !CONFIG_MODULES.contains(&task.short_module()) {
            return None;
        }
        task.parameters.as_mapping()?;

        let target = ["path", "dest", "content"]
            .iter()
            .map(|k| text_of(task, k))
            .collect::<Vec<_>>()
            .join("\n");
        if !SSH_INDICATORS.iter().any(|i| target.contains(i)) {
            return None;
        }

        let line = text_of(task, "line");
        let config = ["content", "block"]
            .iter()
            .map(|k| text_of(task, k))
            .chain([line.clone()])
            .collect::<Vec<_>>()
            .join("\n");
        let mut issues = insecure_settings(&config);

        // A `regexp` that replaces the root login directive with a `yes`
        // value also weakens it, even when `line` is not a plain directive.
        let regexp = text_of(task, "regexp");
        let weakens_root_login = regexp.contains("PermitRootLogin")
            && line.to_ascii_lowercase().contains("yes")
            && !issues.contains(&"root login permitted");
        if weakens_root_login {
            issues.push("root login policy weakened");
        }

        (!issues.is_empty()).then(|| {
            format!(
                "configures sshd insecurely: {}; harden the SSH daemon settings.",
                issues.join(", ")
            )
        })
    }
}

impl Rule for InsecureSshConfig {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}
