//! Concrete rules.
//!
//! Each rule is an identity plus one per-task predicate built from
//! `rules::heuristics`. The predicate returns the rule-specific part of the
//! message when the task violates the rule.

pub mod code;
pub mod commands;
pub mod files;
pub mod hygiene;
pub mod network;
pub mod packages;
pub mod ssh;

use crate::ast::model::{Play, Task};
use crate::rules::catalog::RuleInfo;
use crate::rules::eval::Finding;

/// Every task of every play: per play, `tasks` then `handlers`, each in
/// source order.
pub fn each_task(plays: &[Play]) -> impl Iterator<Item = (&Play, &Task)> {
    plays
        .iter()
        .flat_map(|play| play.tasks.iter().chain(&play.handlers).map(move |task| (play, task)))
}

/// Message subject naming the task and play, omitting blank names.
pub fn subject(play: &Play, task: &Task) -> String {
    let mut out = String::from("Task");
    if task.has_name() {
        out.push_str(&format!(" '{}'", task.name.trim()));
    }
    if !play.name.trim().is_empty() {
        out.push_str(&format!(" in play '{}'", play.name.trim()));
    }
    out
}

/// Runs `inspect` over every task and turns each hit into a finding.
pub(crate) fn scan<F>(info: RuleInfo, plays: &[Play], inspect: F) -> Vec<Finding>
where
    F: Fn(&Task) -> Option<String>,
{
    each_task(plays)
        .filter_map(|(play, task)| {
            inspect(task).map(|detail| {
                Finding::new(&info, play, task, format!("{} {detail}", subject(play, task)))
            })
        })
        .collect()
}

/// Quotes each item and joins them for messages.
pub(crate) fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("'{i}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
