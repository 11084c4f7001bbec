pub mod catalog;
pub mod checks;
pub mod classify;
pub mod eval;
pub mod heuristics;
pub mod registry;

pub use catalog::{RuleInfo, Severity};
pub use eval::{Engine, FailurePolicy, Finding, Rule};
