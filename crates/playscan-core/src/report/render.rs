use crate::TOOL_NAME;
use crate::report::model::Report;
use crate::rules::catalog::Severity;

/// Human-readable report: findings grouped by severity, most severe first,
/// engine order inside each group.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", TOOL_NAME, report.tool.version));
    if let Some(path) = &report.artifact.path {
        out.push_str(&format!("Playbook: {path}\n"));
    }
    out.push_str(&format!(
        "Plays: {}, tasks: {}, handlers: {}\n",
        report.signals.structure.play_count,
        report.signals.structure.task_count,
        report.signals.structure.handler_count
    ));
    for warning in &report.analysis.warnings {
        out.push_str(&format!("Warning: {warning}\n"));
    }

    if report.rules.findings.is_empty() {
        out.push_str("No findings\n");
    } else {
        for severity in Severity::DESCENDING {
            let mut group = report.findings_with(severity).peekable();
            if group.peek().is_none() {
                continue;
            }
            out.push_str(&format!("\n{severity}:\n"));
            for finding in group {
                out.push_str(&format!("  - {}: {}\n", finding.rule_id, finding.message));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!("Total findings: {}\n", report.summary.total));
    out.push_str(&format!("Classification: {}\n", report.classification.level));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::*;
    use crate::rules::eval::Finding;
    use crate::signals::model::Signals;

    fn finding(id: &str, severity: Severity, message: &str) -> Finding {
        Finding {
            rule_id: id.into(),
            description: "d".into(),
            severity,
            play: None,
            task: None,
            message: message.into(),
        }
    }

    fn report(findings: Vec<Finding>) -> Report {
        Report::new(
            ToolInfo {
                name: TOOL_NAME.into(),
                version: "0.1.0".into(),
                commit: None,
            },
            ArtifactInfo {
                path: Some("site.yml".into()),
                size_bytes: 1,
                hash: ArtifactHash {
                    algorithm: "sha256".into(),
                    value: "00".into(),
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
    fn empty_report_says_no_findings() {
        let text = render_text(&report(vec![]));
        assert!(text.contains("Playbook: site.yml"));
        assert!(text.contains("No findings"));
        assert!(text.contains("Total findings: 0"));
    }

    #[test]
    fn findings_are_grouped_high_to_low_keeping_order() {
        let text = render_text(&report(vec![
            finding("unnamed-task", Severity::Low, "first low"),
            finding("service-via-command", Severity::High, "first high"),
            finding("unnamed-task", Severity::Low, "second low"),
            finding("download-and-execute", Severity::High, "second high"),
        ]));

        let pos = |needle: &str| text.find(needle).unwrap();
        assert!(pos("HIGH:") < pos("first high"));
        assert!(pos("first high") < pos("second high"));
        assert!(pos("second high") < pos("LOW:"));
        assert!(pos("first low") < pos("second low"));
        assert!(!text.contains("MEDIUM:"));
        assert!(text.contains("  - service-via-command: first high\n"));
        assert!(text.contains("Total findings: 4"));
    }
}
