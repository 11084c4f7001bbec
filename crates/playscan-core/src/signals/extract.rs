use std::collections::BTreeMap;

use crate::ast::model::Play;
use crate::report::model::AnalysisInfo;
use crate::signals::model::*;
use crate::util::deterministic::{sort_module_usage, sort_warnings};

/// Counts structural facts of the built plays.
///
/// Pure structural mapping: no policy, no interpretation. Tasks without a
/// module are counted as tasks but contribute no module usage.
pub fn extract_signals(plays: &[Play]) -> Signals {
    let mut structure = StructureSignals {
        play_count: plays.len() as u32,
        ..Default::default()
    };
    let mut usage: BTreeMap<&str, u32> = BTreeMap::new();

    for play in plays {
        structure.task_count += play.tasks.len() as u32;
        structure.handler_count += play.handlers.len() as u32;
        structure.variable_count += play.vars.len() as u32;

        for task in play.tasks.iter().chain(&play.handlers) {
            if !task.has_name() {
                structure.unnamed_task_count += 1;
            }
            if !task.module.is_empty() {
                *usage.entry(task.module.as_str()).or_default() += 1;
            }
        }
    }

    let mut modules: Vec<ModuleUsage> = usage
        .into_iter()
        .map(|(module, count)| ModuleUsage {
            module: module.to_string(),
            count,
        })
        .collect();
    sort_module_usage(&mut modules);

    Signals { structure, modules }
}

/// Adds document-level warnings that are not rule findings.
///
/// Warnings are sorted so identical inputs give identical output.
pub fn annotate(plays: &[Play], analysis: &mut AnalysisInfo) {
    if plays.is_empty() {
        analysis.warnings.push("document contains no plays".to_string());
    }

    for (index, play) in plays.iter().enumerate() {
        if play.tasks.is_empty() && play.handlers.is_empty() {
            let label = if play.name.trim().is_empty() {
                format!("play #{}", index + 1)
            } else {
                format!("play '{}'", play.name.trim())
            };
            analysis.warnings.push(format!("{label} has no tasks or handlers"));
        }
        for task in play.tasks.iter().chain(&play.handlers) {
            if task.module.is_empty() {
                let label = if task.has_name() {
                    format!("task '{}'", task.name.trim())
                } else {
                    "an unnamed task".to_string()
                };
                analysis
                    .warnings
                    .push(format!("{label} in play #{} has no module", index + 1));
            }
        }
    }

    sort_warnings(&mut analysis.warnings);
}
