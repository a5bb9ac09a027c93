//! Report rendering

use migcheck_core::{Finding, Severity};

use crate::args::OutputFormat;

/// Renders the findings for one schema file into report text
pub struct ReportFormatter {
    format: OutputFormat,
    file_name: String,
    color: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat, file_name: String) -> Self {
        Self {
            format,
            file_name,
            color: false,
        }
    }

    /// Enable ANSI colors (human format only; off when writing to a file)
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Render findings in the configured format
    pub fn render(&self, findings: &[Finding]) -> String {
        match self.format {
            OutputFormat::Human => self.render_human(findings),
            OutputFormat::Json => self.render_json(findings),
            OutputFormat::Sarif => self.render_sarif(findings),
        }
    }

    /// One line per finding; the deterministic clean message otherwise
    fn render_human(&self, findings: &[Finding]) -> String {
        if findings.is_empty() {
            return format!("{}: no findings\n", self.file_name);
        }

        let mut out = String::new();
        for finding in findings {
            let severity_str = match (finding.severity, self.color) {
                (Severity::Error, true) => "\x1b[31merror\x1b[0m",
                (Severity::Warning, true) => "\x1b[33mwarning\x1b[0m",
                (Severity::Error, false) => "error",
                (Severity::Warning, false) => "warning",
            };

            out.push_str(&format!(
                "{}: {}[{}]: {}\n",
                self.file_name,
                severity_str,
                finding.code(),
                finding.message
            ));
        }
        out
    }

    fn render_json(&self, findings: &[Finding]) -> String {
        let output = serde_json::json!({
            "file": self.file_name,
            "findings": findings
        });
        let mut rendered =
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string());
        rendered.push('\n');
        rendered
    }

    fn render_sarif(&self, findings: &[Finding]) -> String {
        let results: Vec<serde_json::Value> = findings
            .iter()
            .map(|f| {
                serde_json::json!({
                    "ruleId": f.code(),
                    "level": match f.severity {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                    },
                    "message": {
                        "text": f.message
                    },
                    "locations": [{
                        "physicalLocation": {
                            "artifactLocation": {
                                "uri": self.file_name
                            }
                        }
                    }]
                })
            })
            .collect();

        let sarif = serde_json::json!({
            "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "migcheck",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                },
                "results": results
            }]
        });

        let mut rendered =
            serde_json::to_string_pretty(&sarif).unwrap_or_else(|_| "{}".to_string());
        rendered.push('\n');
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migcheck_core::FindingKind;

    #[test]
    fn test_clean_file_message_is_deterministic() {
        let formatter = ReportFormatter::new(OutputFormat::Human, "schema.sql".to_string());
        assert_eq!(formatter.render(&[]), "schema.sql: no findings\n");
    }

    #[test]
    fn test_human_line_identifies_rule_and_table() {
        let finding = Finding::error(
            FindingKind::ForwardReference,
            "order_items",
            "foreign key on 'order_items.order_id' references 'orders' before it is defined",
        )
        .with_column("order_id");

        let formatter = ReportFormatter::new(OutputFormat::Human, "schema.sql".to_string());
        let rendered = formatter.render(&[finding]);
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains("error[E0001]"));
        assert!(rendered.contains("order_items.order_id"));
    }
}
