//! Rules about remote content: transport security, fetched scripts and
//! download-then-run patterns.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::model::{Play, Task};
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::checks::scan;
use crate::rules::eval::{Finding, Rule};
use crate::rules::heuristics::{command_string, is_command_module, is_falsey, is_truthy};
use crate::value::Value;

/// Parameters that disable verification when falsey.
const VERIFY_FLAGS: &[&str] = &["validate_certs", "tls_verify", "verify_ssl"];

/// Parameters that disable verification when truthy.
const SKIP_FLAGS: &[&str] = &["skip_tls_verify", "insecure"];

/// Parameters that may hold a remote location, first present wins.
const URL_KEYS: &[&str] = &["url", "src", "image"];

const INSECURE_SCHEMES: &[&str] = &["http://", "ftp://", "tcp://"];

fn param_text(task: &Task, key: &str) -> Option<String> {
    task.param(key).filter(|v| !v.is_null()).map(Value::to_text)
}

pub struct TlsVerificationDisabled;

impl TlsVerificationDisabled {
    pub const INFO: RuleInfo = RuleInfo {
        id: "tls-verification-disabled",
        description: "TLS certificate verification disabled",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        task.parameters.as_mapping()?;

        if let Some(flag) = VERIFY_FLAGS
            .iter()
            .find(|k| task.param(k).is_some_and(is_falsey))
        {
            return Some(format!(
                "disables certificate verification via '{flag}'; keep verification enabled and use valid certificates."
            ));
        }
        if let Some(flag) = SKIP_FLAGS
            .iter()
            .find(|k| task.param(k).is_some_and(is_truthy))
        {
            return Some(format!(
                "skips certificate verification via '{flag}'; keep verification enabled and use valid certificates."
            ));
        }

        let url = URL_KEYS
            .iter()
            .filter_map(|k| param_text(task, k))
            .find(|u| !u.is_empty())?;
        INSECURE_SCHEMES
            .iter()
            .any(|scheme| url.to_ascii_lowercase().starts_with(scheme))
            .then(|| format!("fetches '{url}' over an unencrypted scheme; use https."))
    }
}

impl Rule for TlsVerificationDisabled {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}

const UNTRUSTED_SOURCES: &[&str] = &[
    "http://",
    "ftp://",
    "raw.githubusercontent.com",
    "pastebin.com",
    "gist.",
];

const UNVALIDATED_ARG_MARKERS: &[&str] = &["{{", "vars.", "hostvars."];

pub struct UntrustedScriptExecution;

impl UntrustedScriptExecution {
    pub const INFO: RuleInfo = RuleInfo {
        id: "untrusted-script-execution",
        description: "Script executed from an unverified source",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        if task.short_module() != "script" {
            return None;
        }
        let (source, args, has_checksum) = match &task.parameters {
            Value::String(line) => {
                let line = line.trim();
                let (source, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                (source.to_string(), args.trim().to_string(), false)
            }
            Value::Mapping(params) => {
                let source = ["src", "cmd", "_raw_params"]
                    .iter()
                    .filter_map(|k| params.get(*k))
                    .find(|v| !v.is_null())
                    .map(Value::to_text)
                    .unwrap_or_default();
                let args = params.get("args").map(Value::to_text).unwrap_or_default();
                (source, args, params.contains_key("checksum"))
            }
            _ => return None,
        };

        let mut issues = Vec::new();
        let lower = source.to_lowercase();
        if UNTRUSTED_SOURCES.iter().any(|s| lower.contains(s)) {
            issues.push(format!("script '{source}' comes from an untrusted source"));
        }
        if UNVALIDATED_ARG_MARKERS.iter().any(|m| args.contains(m)) {
            issues.push("script arguments are not validated".to_string());
        }
        if !has_checksum {
            issues.push("no checksum is verified".to_string());
        }

        (!issues.is_empty()).then(|| {
            format!(
                "runs a script unsafely: {}; verify script sources and checksums.",
                issues.join(", ")
            )
        })
    }
}

impl Rule for UntrustedScriptExecution {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}

const EXECUTABLE_EXTENSIONS: &[&str] = &["sh", "py", "pl", "rb", "exe", "bin"];

const VERIFIED_SOURCE_MARKERS: &[&str] = &["https://", "sha256:", "checksum="];

static PIPE_TO_INTERPRETER: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)curl.*\|.*sh", "curl output piped into a shell"),
        (r"(?i)wget.*\|.*sh", "wget output piped into a shell"),
        (r"(?i)curl.*\|.*bash", "curl output piped into bash"),
        (r"(?i)wget.*-O.*sh", "wget saving a script for execution"),
    ]
    .into_iter()
    .map(|(p, label)| (Regex::new(p).expect("valid download pattern"), label))
    .collect()
});

fn is_executable_file(path: &str) -> bool {
    let base = path.rsplit('/').next().unwrap_or(path);
    base.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && EXECUTABLE_EXTENSIONS.contains(&ext))
}

pub struct DownloadAndExecute;

impl DownloadAndExecute {
    pub const INFO: RuleInfo = RuleInfo {
        id: "download-and-execute",
        description: "Code downloaded and executed without verification",
        severity: Severity::High,
    };

    fn inspect(task: &Task) -> Option<String> {
        let issues = if task.short_module() == "get_url" {
            Self::download_issues(task)
        } else if is_command_module(task) {
            let command = command_string(task);
            PIPE_TO_INTERPRETER
                .iter()
                .filter(|(re, _)| re.is_match(&command))
                .map(|(_, label)| label.to_string())
                .collect()
        } else {
            Vec::new()
        };

        (!issues.is_empty()).then(|| {
            format!(
                "downloads and executes code: {}; pin a checksum and avoid piping downloads into interpreters.",
                issues.join(", ")
            )
        })
    }

    fn download_issues(task: &Task) -> Vec<String> {
        let mut issues = Vec::new();
        let dest = param_text(task, "dest").unwrap_or_default();
        if !is_executable_file(&dest) {
            return issues;
        }

        let url = param_text(task, "url").unwrap_or_default().to_lowercase();
        if !VERIFIED_SOURCE_MARKERS.iter().any(|m| url.contains(m)) {
            issues.push(format!("executable '{dest}' is fetched from an unverified source"));
        }
        if task.param("checksum").is_none() {
            issues.push("no checksum is verified".to_string());
        }
        issues
    }
}

impl Rule for DownloadAndExecute {
    fn info(&self) -> RuleInfo {
        Self::INFO
    }

    fn check(&self, plays: &[Play]) -> Vec<Finding> {
        scan(Self::INFO, plays, Self::inspect)
    }
}
