//! Run summaries for the command line.
//!
//! A [`ConversionReport`] wraps the per-file results of one run; a
//! [`ReportFormatter`] turns it into text for the terminal.

use crate::convert::TransformationResult;

/// Results of one run plus the counts derived from them.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub results: Vec<TransformationResult>,
}

impl ConversionReport {
    pub fn new(results: Vec<TransformationResult>) -> Self {
        Self { results }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TransformationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Trait for formatting run reports.
/// Implement this trait to add new output formats.
pub trait ReportFormatter {
    fn format(&self, report: &ConversionReport) -> String;
}

/// Plain summary for terminal output.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// List every failed file with its error.
    pub list_failures: bool,
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &ConversionReport) -> String {
        let mut output = String::new();

        output.push_str("Transformation complete!\n");
        output.push_str(&format!("Successfully converted: {} files\n", report.succeeded()));

        let failed = report.failed();
        if failed > 0 {
            output.push_str(&format!("Failed to convert: {} files\n", failed));

            if self.list_failures {
                output.push_str("\nFailed files:\n");
                for result in report.failures() {
                    output.push_str(&format!(
                        "- {}: {}\n",
                        result.original_path.display(),
                        result.error.as_deref().unwrap_or("unknown error")
                    ));
                }
            }
        }

        output
    }
}

/// The result list as pretty-printed JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ConversionReport) -> String {
        // Plain data with string keys; serialization cannot fail.
        let mut output = serde_json::to_string_pretty(&report.results).unwrap_or_default();
        output.push('\n');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report() -> ConversionReport {
        ConversionReport::new(vec![
            TransformationResult::converted(PathBuf::from("a.js"), PathBuf::from("out/a.ts")),
            TransformationResult::failed(PathBuf::from("b.js"), "syntax error at line 2, column 1"),
            TransformationResult::converted(PathBuf::from("c.js"), PathBuf::from("out/c.ts")),
        ])
    }

    #[test]
    fn counts() {
        let report = report();
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn text_summary() {
        let text = TextFormatter::default().format(&report());
        assert!(text.contains("Successfully converted: 2 files"));
        assert!(text.contains("Failed to convert: 1 files"));
        assert!(!text.contains("b.js"));
    }

    #[test]
    fn text_lists_failures_when_asked() {
        let formatter = TextFormatter { list_failures: true };
        let text = formatter.format(&report());
        assert!(text.contains("- b.js: syntax error at line 2, column 1"));
    }

    #[test]
    fn text_without_failures_has_no_failure_line() {
        let report = ConversionReport::new(vec![TransformationResult::converted(
            PathBuf::from("a.js"),
            PathBuf::from("out/a.ts"),
        )]);
        let text = TextFormatter::default().format(&report);
        assert!(!text.contains("Failed"));
    }

    #[test]
    fn json_is_the_result_list() {
        let json = JsonFormatter.format(&report());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["originalPath"], "b.js");
        assert_eq!(items[1]["success"], false);
    }
}
