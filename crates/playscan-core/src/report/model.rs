use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::rules::catalog::{RuleInfo, Severity};
use crate::rules::eval::Finding;
use crate::signals::model::Signals;

/// Top-level playscan report.
///
/// This struct is the stable JSON contract of the tool. It must remain
/// deterministic for identical input playbooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub artifact: ArtifactInfo,
    pub signals: Signals,
    pub analysis: AnalysisInfo,
    pub rules: RulesInfo,
    pub summary: Summary,
    pub classification: ClassificationInfo,
}

impl Report {
    /// Assembles a report from pipeline outputs.
    ///
    /// `findings` are kept in engine order.
    pub fn new(
        tool: ToolInfo,
        artifact: ArtifactInfo,
        signals: Signals,
        analysis: AnalysisInfo,
        catalog: RulesCatalogInfo,
        findings: Vec<Finding>,
        classification: ClassificationInfo,
    ) -> Self {
        let summary = Summary::from_findings(&findings);

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            artifact,
            signals,
            analysis,
            rules: RulesInfo { catalog, findings },
            summary,
            classification,
        }
    }

    /// Findings of one severity, in engine order.
    pub fn findings_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.rules
            .findings
            .iter()
            .filter(move |f| f.severity == severity)
    }
}

/// Tool metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
    pub commit: Option<String>,
}

/// Playbook metadata bound to this report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: Option<String>,
    pub size_bytes: u64,
    pub hash: ArtifactHash,
}

/// Cryptographic playbook fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHash {
    pub algorithm: String,
    pub value: String,
}

/// Analysis status and document-level warnings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisInfo {
    pub status: String,
    pub warnings: Vec<String>,
}

impl AnalysisInfo {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
            warnings: vec![],
        }
    }
}

/// Rule evaluation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesInfo {
    pub catalog: RulesCatalogInfo,
    pub findings: Vec<Finding>,
}

/// Rule catalog metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesCatalogInfo {
    pub catalog_version: String,
    pub ruleset: String,
    /// Rules that ran, in registration order.
    pub enabled: Vec<String>,
}

impl RulesCatalogInfo {
    pub fn new(catalog_version: &str, ruleset: &str, rules: &[RuleInfo]) -> Self {
        Self {
            catalog_version: catalog_version.to_string(),
            ruleset: ruleset.to_string(),
            enabled: rules.iter().map(|r| r.id.to_string()).collect(),
        }
    }
}

/// Counts over the findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    /// Every severity is present, zero counts included.
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_rule: BTreeMap<String, RuleSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub description: String,
    pub severity: Severity,
    pub count: usize,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> =
            Severity::DESCENDING.iter().map(|s| (*s, 0)).collect();
        let mut by_rule: BTreeMap<String, RuleSummary> = BTreeMap::new();

        for finding in findings {
            *by_severity.entry(finding.severity).or_default() += 1;
            by_rule
                .entry(finding.rule_id.clone())
                .or_insert_with(|| RuleSummary {
                    description: finding.description.clone(),
                    severity: finding.severity,
                    count: 0,
                })
                .count += 1;
        }

        Self {
            total: findings.len(),
            by_severity,
            by_rule,
        }
    }
}

/// Final classification level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationLevel {
    Safe,
    Risk,
    HighRisk,
}

impl ClassificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLevel::Safe => "SAFE",
            ClassificationLevel::Risk => "RISK",
            ClassificationLevel::HighRisk => "HIGH_RISK",
        }
    }
}

impl fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final classification block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationInfo {
    pub level: ClassificationLevel,
    pub policy: String,
    pub reason: String,
    pub highest_severity: String,
    /// Rules with at least one finding, sorted.
    pub rule_ids: Vec<String>,
    pub exit_code: i32,
}

impl ClassificationInfo {
    pub fn safe(policy: &str) -> Self {
        Self {
            level: ClassificationLevel::Safe,
            policy: policy.into(),
            reason: "no findings".into(),
            highest_severity: "NONE".into(),
            rule_ids: vec![],
            exit_code: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: &str, severity: Severity) -> Finding {
        Finding {
            rule_id: id.into(),
            description: format!("{id} description"),
            severity,
            play: Some("Deploy".into()),
            task: None,
            message: "m".into(),
        }
    }

    fn report(findings: Vec<Finding>) -> Report {
        Report::new(
            ToolInfo {
                name: "playscan".into(),
                version: "1.0.0".into(),
                commit: None,
            },
            ArtifactInfo {
                path: None,
                size_bytes: 123,
                hash: ArtifactHash {
                    algorithm: "sha256".into(),
                    value: "abc".into(),
                },
            },
            Signals::default(),
            AnalysisInfo::ok(),
            RulesCatalogInfo::default(),
            findings,
            ClassificationInfo::safe("default"),
        )
    }

    #[test]
    fn report_keeps_engine_order() {
        let r = report(vec![
            finding("z-rule", Severity::Low),
            finding("a-rule", Severity::High),
        ]);
        let ids: Vec<&str> = r.rules.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["z-rule", "a-rule"]);
    }

    #[test]
    fn summary_counts_by_severity_and_rule() {
        let summary = Summary::from_findings(&[
            finding("unnamed-task", Severity::Low),
            finding("service-via-command", Severity::High),
            finding("unnamed-task", Severity::Low),
        ]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_severity[&Severity::High], 1);
        assert_eq!(summary.by_severity[&Severity::Medium], 0);
        assert_eq!(summary.by_severity[&Severity::Low], 2);

        let keys: Vec<&str> = summary.by_rule.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["service-via-command", "unnamed-task"]);
        assert_eq!(summary.by_rule["unnamed-task"].count, 2);
        assert_eq!(summary.by_rule["unnamed-task"].severity, Severity::Low);
    }

    #[test]
    fn findings_with_filters_by_severity() {
        let r = report(vec![
            finding("a", Severity::High),
            finding("b", Severity::Low),
            finding("c", Severity::High),
        ]);
        let high: Vec<&str> = r.findings_with(Severity::High).map(|f| f.rule_id.as_str()).collect();
        assert_eq!(high, vec!["a", "c"]);
    }

    #[test]
    fn classification_serializes_correctly() {
        let serialized = serde_json::to_string(&ClassificationLevel::HighRisk).unwrap();
        assert_eq!(serialized, "\"HIGH_RISK\"");
        assert_eq!(ClassificationLevel::HighRisk.to_string(), "HIGH_RISK");
    }

    #[test]
    fn severity_map_serializes_with_upper_case_keys() {
        let json = serde_json::to_value(Summary::from_findings(&[finding("a", Severity::Medium)])).unwrap();
        assert_eq!(json["by_severity"]["MEDIUM"], 1);
        assert_eq!(json["by_rule"]["a"]["severity"], "MEDIUM");
    }
}
