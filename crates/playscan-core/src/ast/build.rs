//! Builds the typed playbook model from parsed documents.
//!
//! The builder is lenient: absent or oddly shaped fields fall back to their
//! defaults and never fail the build. No schema validation happens here.

use indexmap::IndexMap;

use crate::ast::model::{Expression, Play, Task, Variable};
use crate::value::Value;

/// Task keys that never designate the module.
pub const RESERVED_TASK_KEYS: &[&str] = &["name", "when", "changed_when", "loop", "register", "notify"];

/// Builds one `Play` per document, in document order.
///
/// A document that is not a mapping yields a default `Play`, keeping the
/// one-play-per-document correspondence.
pub fn build(documents: &[Value]) -> Vec<Play> {
    let plays: Vec<Play> = documents.iter().map(build_play).collect();
    log::debug!("built {} play(s)", plays.len());
    plays
}

fn build_play(document: &Value) -> Play {
    let mut play = Play::default();

    let Some(fields) = document.as_mapping() else {
        return play;
    };

    if let Some(name) = fields.get("name") {
        play.name = name.to_text();
    }
    if let Some(hosts) = fields.get("hosts") {
        play.hosts = hosts.to_text();
    }
    if let Some(vars) = fields.get("vars") {
        play.vars = build_variables(vars);
    }
    if let Some(tasks) = fields.get("tasks") {
        play.tasks = build_tasks(tasks);
    }
    if let Some(handlers) = fields.get("handlers") {
        play.handlers = build_tasks(handlers);
    }

    play
}

fn build_variables(vars: &Value) -> IndexMap<String, Variable> {
    let Some(entries) = vars.as_mapping() else {
        return IndexMap::new();
    };

    entries
        .iter()
        .map(|(name, value)| {
            (
                name.clone(),
                Variable {
                    name: name.clone(),
                    value: value.clone(),
                },
            )
        })
        .collect()
}

fn build_tasks(tasks: &Value) -> Vec<Task> {
    tasks
        .as_sequence()
        .map(|items| items.iter().map(build_task).collect())
        .unwrap_or_default()
}

/// Builds one task.
///
/// The module is the first key, in source order, that is not reserved.
/// Later non-reserved keys are ignored: a task naming two actions resolves
/// silently to the first one.
pub fn build_task(source: &Value) -> Task {
    let mut task = Task::default();

    let Some(fields) = source.as_mapping() else {
        return task;
    };

    if let Some(name) = fields.get("name") {
        task.name = name.to_text();
    }

    if let Some((module, parameters)) = fields
        .iter()
        .find(|(key, _)| !RESERVED_TASK_KEYS.contains(&key.as_str()))
    {
        task.module = module.clone();
        task.parameters = parameters.clone();
    }

    task.when = fields.get("when").map(build_expression);
    task.changed_when = fields.get("changed_when").map(build_expression);
    task.loop_ = fields.get("loop").map(build_expression);
    task.register = fields.get("register").map(Value::to_text);

    if let Some(notify) = fields.get("notify") {
        task.notify = match notify {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items.iter().map(Value::to_text).collect(),
            other => vec![other.to_text()],
        };
    }

    task
}

/// Normalizes a raw conditional or loop value.
pub fn build_expression(value: &Value) -> Expression {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Expression::Literal(value.clone())
        }
        Value::Mapping(_) => Expression::Complex(value.render()),
        Value::Sequence(items) => Expression::ListOf(items.iter().map(build_expression).collect()),
    }
}
