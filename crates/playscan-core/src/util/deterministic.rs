//! Deterministic ordering helpers.
//!
//! Identical inputs must always produce identical reports. Findings are
//! deliberately absent here: their order is the engine's contract and is
//! never re-sorted.

use crate::signals::model::ModuleUsage;

/// Sort module usage by module name.
pub fn sort_module_usage(modules: &mut [ModuleUsage]) {
    modules.sort_by(|a, b| a.module.cmp(&b.module));
}

/// Sort and deduplicate analysis warnings.
pub fn sort_warnings(warnings: &mut Vec<String>) {
    warnings.sort();
    warnings.dedup();
}
