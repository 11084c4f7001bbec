use serde::{Deserialize, Serialize};

/// Raw observations extracted from a built playbook.
/// Maps to the `signals` object of the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub structure: StructureSignals,
    /// Sorted by module name.
    pub modules: Vec<ModuleUsage>,
}

/// Shape of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSignals {
    pub play_count: u32,
    pub task_count: u32,
    pub handler_count: u32,
    /// Play-level `vars` entries across all plays.
    pub variable_count: u32,
    /// Tasks and handlers with a blank or missing name.
    pub unnamed_task_count: u32,
}

/// How often one module is invoked across tasks and handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleUsage {
    /// Name as written, collection prefix included.
    pub module: String,
    pub count: u32,
}
