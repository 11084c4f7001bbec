//! Static rule registry.

use crate::config::RuleSelection;
use crate::error::{Error, Result};
use crate::rules::catalog::RuleInfo;
use crate::rules::checks::{code, commands, files, hygiene, network, packages, ssh};
use crate::rules::eval::Rule;

/// Every built-in rule, in registration (and therefore finding) order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(commands::ServiceViaCommand),
        Box::new(hygiene::ChangedWhenWithoutWhen),
        Box::new(hygiene::UnnamedTask),
        Box::new(commands::PrivilegeEscalationInCommand),
        Box::new(commands::DeprecatedRawModule),
        Box::new(files::MissingFilePermissions),
        Box::new(network::TlsVerificationDisabled),
        Box::new(packages::UnpinnedPackageInstall),
        Box::new(ssh::InsecureSshConfig),
        Box::new(commands::CommandInjectionViaInterpolation),
        Box::new(files::UnsafeTempFileHandling),
        Box::new(network::UntrustedScriptExecution),
        Box::new(network::DownloadAndExecute),
        Box::new(code::DangerousFunctionUsage),
    ]
}

/// Identities of every built-in rule, in registration order.
pub fn catalog() -> Vec<RuleInfo> {
    default_rules().iter().map(|r| r.info()).collect()
}

/// Narrows the registry to `selection`, keeping registration order.
///
/// A non-empty `select` keeps only the named rules; `disable` then removes
/// rules. Naming a rule that does not exist is an error.
pub fn select_rules(selection: &RuleSelection) -> Result<Vec<Box<dyn Rule>>> {
    let rules = default_rules();

    if let Some(unknown) = selection
        .select
        .iter()
        .chain(&selection.disable)
        .find(|id| !rules.iter().any(|r| r.id() == id.as_str()))
    {
        return Err(Error::UnknownRule(unknown.clone()));
    }

    let selected: Vec<Box<dyn Rule>> = rules
        .into_iter()
        .filter(|r| selection.select.is_empty() || selection.select.iter().any(|id| id == r.id()))
        .filter(|r| !selection.disable.iter().any(|id| id == r.id()))
        .collect();

    log::debug!(
        "selected {} rule(s): {}",
        selected.len(),
        selected.iter().map(|r| r.id()).collect::<Vec<_>>().join(", ")
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(rules: &[Box<dyn Rule>]) -> Vec<&'static str> {
        rules.iter().map(|r| r.id()).collect()
    }

    fn selection(select: &[&str], disable: &[&str]) -> RuleSelection {
        RuleSelection {
            select: select.iter().map(|s| s.to_string()).collect(),
            disable: disable.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn registry_lists_fourteen_unique_rules_in_fixed_order() {
        let all = default_rules();
        assert_eq!(all.len(), 14);
        assert_eq!(all[0].id(), "service-via-command");
        assert_eq!(all[13].id(), "dangerous-function-usage");

        let unique: HashSet<_> = ids(&all).into_iter().collect();
        assert_eq!(unique.len(), 14);
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let rules = select_rules(&RuleSelection::default()).unwrap();
        assert_eq!(ids(&rules), ids(&default_rules()));
    }

    #[test]
    fn select_keeps_registration_order_not_request_order() {
        let rules = select_rules(&selection(&["unnamed-task", "service-via-command"], &[])).unwrap();
        assert_eq!(ids(&rules), vec!["service-via-command", "unnamed-task"]);
    }

    #[test]
    fn disable_removes_rules() {
        let rules = select_rules(&selection(&[], &["unnamed-task"])).unwrap();
        assert_eq!(rules.len(), 13);
        assert!(!ids(&rules).contains(&"unnamed-task"));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let err = select_rules(&selection(&[], &["no-such-rule"])).err().unwrap();
        assert!(matches!(err, Error::UnknownRule(id) if id == "no-such-rule"));
    }
}
