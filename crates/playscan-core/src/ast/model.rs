use indexmap::IndexMap;
use serde::Serialize;

use crate::value::Value;

/// One top-level unit of a playbook.
///
/// `tasks` and `handlers` keep source order; rules report findings in that
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Play {
    pub name: String,
    pub hosts: String,
    pub vars: IndexMap<String, Variable>,
    pub tasks: Vec<Task>,
    pub handlers: Vec<Task>,
}

/// One declarative step: the module to run and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Task {
    pub name: String,
    pub module: String,
    pub parameters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_when: Option<Expression>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_: Option<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register: Option<String>,
    pub notify: Vec<String>,
}

impl Task {
    /// Module name without the `ansible.builtin.` / `ansible.legacy.` prefix.
    pub fn short_module(&self) -> &str {
        let module = self.module.as_str();
        module
            .strip_prefix("ansible.builtin.")
            .or_else(|| module.strip_prefix("ansible.legacy."))
            .unwrap_or(module)
    }

    /// Looks up a named parameter when parameters are a mapping.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Conditional or loop expression, kept close to its raw form.
///
/// Heuristics work on the rendered text of structured expressions rather
/// than on their structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expression {
    /// A scalar: string, number, boolean or null.
    Literal(Value),
    /// A mapping, stored as its rendering.
    Complex(String),
    /// A sequence, each element normalized recursively.
    ListOf(Vec<Expression>),
    /// Fallback for shapes no other variant covers. The builder never
    /// produces it because `Value` is closed; other producers may.
    Unknown(String),
}

impl Expression {
    /// The scalar, if this is a literal.
    pub fn literal(&self) -> Option<&Value> {
        match self {
            Expression::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(self, Expression::ListOf(items) if items.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: Value,
}
