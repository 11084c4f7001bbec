//! Rule capability and the engine that runs rules over a playbook.
//!
//! The engine is a pure aggregator: it runs each rule in registration order
//! and concatenates their findings, preserving each rule's own order. It
//! performs no deduplication, filtering or reordering.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::ast::model::{Play, Task};
use crate::error::{Error, Result};
use crate::rules::catalog::{RuleInfo, Severity};

/// Rule id carried by the synthetic finding emitted when a rule fails.
pub const RULE_FAILURE_ID: &str = "rule-failure";

/// A single, independent check over a playbook.
///
/// Implementations must be pure: no mutation of the input, no state shared
/// across invocations, identical output for identical input.
pub trait Rule: Send + Sync {
    fn info(&self) -> RuleInfo;

    /// Findings in play-then-task source order.
    fn check(&self, plays: &[Play]) -> Vec<Finding>;

    fn id(&self) -> &'static str {
        self.info().id
    }
}

/// One reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub description: String,
    pub severity: Severity,
    pub play: Option<String>,
    pub task: Option<String>,
    pub message: String,
}

impl Finding {
    pub fn new(info: &RuleInfo, play: &Play, task: &Task, message: impl Into<String>) -> Self {
        Self {
            rule_id: info.id.to_string(),
            description: info.description.to_string(),
            severity: info.severity,
            play: non_blank(&play.name),
            task: non_blank(&task.name),
            message: message.into(),
        }
    }

    /// Marker finding standing in for a rule that failed to evaluate.
    pub fn rule_failure(info: &RuleInfo, reason: &str) -> Self {
        Self {
            rule_id: RULE_FAILURE_ID.to_string(),
            description: "Rule evaluation failed".to_string(),
            severity: info.severity,
            play: None,
            task: None,
            message: format!("Rule '{}' failed and produced no findings: {reason}", info.id),
        }
    }
}

fn non_blank(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// What the engine does when a rule panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record a `rule-failure` finding in the rule's slot and keep going.
    #[default]
    Isolate,
    /// Abort the run; no partial findings are returned.
    FailFast,
}

pub struct Engine {
    rules: Vec<Box<dyn Rule>>,
    policy: FailurePolicy,
}

impl Engine {
    /// Builds an engine over an explicit, ordered rule list.
    ///
    /// List order is finding order. Rule ids must be unique.
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id()) {
                return Err(Error::DuplicateRuleId(rule.id().to_string()));
            }
        }

        Ok(Self {
            rules,
            policy: FailurePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Identities of the registered rules, in registration order.
    pub fn rules(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(|r| r.info()).collect()
    }

    /// Runs every rule over `plays` and concatenates the findings.
    pub fn run(&self, plays: &[Play]) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for rule in &self.rules {
            let info = rule.info();
            match panic::catch_unwind(AssertUnwindSafe(|| rule.check(plays))) {
                Ok(mut produced) => {
                    log::debug!("rule {} produced {} finding(s)", info.id, produced.len());
                    findings.append(&mut produced);
                }
                Err(payload) => {
                    let reason = panic_reason(payload.as_ref());
                    match self.policy {
                        FailurePolicy::FailFast => {
                            return Err(Error::RuleFailed {
                                rule_id: info.id.to_string(),
                                reason,
                            });
                        }
                        FailurePolicy::Isolate => {
                            log::warn!("rule {} failed: {reason}", info.id);
                            findings.push(Finding::rule_failure(&info, &reason));
                        }
                    }
                }
            }
        }

        Ok(findings)
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PerTask(&'static str, Severity);

    impl Rule for PerTask {
        fn info(&self) -> RuleInfo {
            RuleInfo {
                id: self.0,
                description: "one finding per task",
                severity: self.1,
            }
        }

        fn check(&self, plays: &[Play]) -> Vec<Finding> {
            let info = self.info();
            plays
                .iter()
                .flat_map(|p| p.tasks.iter().map(move |t| (p, t)))
                .map(|(p, t)| Finding::new(&info, p, t, format!("{}/{}", p.name, t.name)))
                .collect()
        }
    }

    struct Exploding;

    impl Rule for Exploding {
        fn info(&self) -> RuleInfo {
            RuleInfo {
                id: "exploding",
                description: "always fails",
                severity: Severity::High,
            }
        }

        fn check(&self, _plays: &[Play]) -> Vec<Finding> {
            panic!("boom");
        }
    }

    fn task(name: &str) -> Task {
        Task {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn plays() -> Vec<Play> {
        vec![
            Play {
                name: "p1".into(),
                tasks: vec![task("a"), task("b")],
                ..Default::default()
            },
            Play {
                name: "p2".into(),
                tasks: vec![task("c")],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn findings_follow_rule_then_play_then_task_order() {
        let engine = Engine::new(vec![
            Box::new(PerTask("second", Severity::Low)),
            Box::new(PerTask("first", Severity::High)),
        ])
        .unwrap();

        let messages: Vec<(String, String)> = engine
            .run(&plays())
            .unwrap()
            .into_iter()
            .map(|f| (f.rule_id, f.message))
            .collect();

        let expected: Vec<(String, String)> = [
            ("second", "p1/a"),
            ("second", "p1/b"),
            ("second", "p2/c"),
            ("first", "p1/a"),
            ("first", "p1/b"),
            ("first", "p2/c"),
        ]
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();

        assert_eq!(messages, expected);
    }

    #[test]
    fn run_is_repeatable_and_leaves_input_untouched() {
        let engine = Engine::new(vec![Box::new(PerTask("r", Severity::Medium))]).unwrap();
        let input = plays();
        let snapshot = input.clone();

        let first = engine.run(&input).unwrap();
        let second = engine.run(&input).unwrap();

        assert_eq!(first, second);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn duplicate_rule_ids_are_rejected() {
        let result = Engine::new(vec![
            Box::new(PerTask("same", Severity::Low)),
            Box::new(PerTask("same", Severity::High)),
        ]);
        assert!(matches!(result, Err(Error::DuplicateRuleId(id)) if id == "same"));
    }

    #[test]
    fn isolated_failure_becomes_marker_finding_in_rule_slot() {
        let engine = Engine::new(vec![
            Box::new(PerTask("before", Severity::Low)),
            Box::new(Exploding),
            Box::new(PerTask("after", Severity::Low)),
        ])
        .unwrap();

        let findings = engine.run(&plays()).unwrap();
        let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();

        assert_eq!(
            ids,
            vec!["before", "before", "before", RULE_FAILURE_ID, "after", "after", "after"]
        );
        let marker = &findings[3];
        assert_eq!(marker.severity, Severity::High);
        assert!(marker.message.contains("exploding"));
        assert!(marker.message.contains("boom"));
        assert!(marker.play.is_none() && marker.task.is_none());
    }

    #[test]
    fn fail_fast_aborts_without_partial_results() {
        let engine = Engine::new(vec![Box::new(PerTask("before", Severity::Low)), Box::new(Exploding)])
            .unwrap()
            .with_policy(FailurePolicy::FailFast);

        let err = engine.run(&plays()).unwrap_err();
        assert!(matches!(err, Error::RuleFailed { ref rule_id, .. } if rule_id == "exploding"));
        assert!(err.to_string().starts_with("engine:"));
    }

    #[test]
    fn blank_names_become_none() {
        let info = PerTask("r", Severity::Low).info();
        let play = Play {
            name: "  ".into(),
            ..Default::default()
        };
        let finding = Finding::new(&info, &play, &task(""), "m");
        assert_eq!(finding.play, None);
        assert_eq!(finding.task, None);
    }

    #[test]
    fn empty_engine_yields_no_findings() {
        let engine = Engine::new(Vec::new()).unwrap();
        assert!(engine.run(&plays()).unwrap().is_empty());
        assert!(engine.rules().is_empty());
    }
}
