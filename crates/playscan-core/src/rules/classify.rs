//! Final risk verdict for a set of findings.
//!
//! The policy is intentionally simple and explainable:
//!
//!   - Any HIGH finding   → HIGH_RISK
//!   - Else any MEDIUM    → RISK
//!   - Else               → SAFE
//!
//! It does not depend on finding order.

use crate::report::model::{ClassificationInfo, ClassificationLevel};
use crate::rules::catalog::Severity;
use crate::rules::eval::Finding;

/// Derives the classification from engine findings.
///
/// Exit code mapping:
/// - SAFE      → 0
/// - RISK      → 1
/// - HIGH_RISK → 2
pub fn classify(findings: &[Finding]) -> ClassificationInfo {
    let Some(highest) = findings.iter().map(|f| f.severity).max() else {
        return ClassificationInfo::safe("default");
    };

    let level = match highest {
        Severity::High => ClassificationLevel::HighRisk,
        Severity::Medium => ClassificationLevel::Risk,
        Severity::Low => ClassificationLevel::Safe,
    };

    let exit_code = match level {
        ClassificationLevel::Safe => 0,
        ClassificationLevel::Risk => 1,
        ClassificationLevel::HighRisk => 2,
    };

    let mut rule_ids: Vec<String> = findings.iter().map(|f| f.rule_id.clone()).collect();
    rule_ids.sort();
    rule_ids.dedup();

    ClassificationInfo {
        level,
        policy: "default".to_string(),
        reason: format!("highest finding severity is {highest}"),
        highest_severity: highest.to_string(),
        rule_ids,
        exit_code,
    }
}
