//! Expectation (data-quality check) result rendering.

use dcmctl_core::{CliError, sanitize_for_terminal};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Output, Reporter, Style, StyledText, loose_string};

const STATUS_WIDTH: usize = 11;
const DATA_KEY: &str = "expectations";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestStatus {
    #[default]
    Unknown,
    Pass,
    Fail,
}

/// One evaluated expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRow {
    pub table_name: String,
    pub expectation_name: String,
    pub status: TestStatus,
    pub expectation_expression: String,
    pub metric_name: String,
    pub actual_value: String,
}

impl TestRow {
    fn from_value(entry: &Value) -> Option<Self> {
        let Some(data) = entry.as_object() else {
            debug!("unexpected test entry type");
            return None;
        };

        let field = |key: &str| {
            sanitize_for_terminal(
                &data
                    .get(key)
                    .map(loose_string)
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
            )
        };

        // `expectation_violated` is tri-state: true, false, or absent.
        let status = match data.get("expectation_violated") {
            Some(Value::Bool(true)) => TestStatus::Fail,
            Some(Value::Bool(false)) => TestStatus::Pass,
            _ => TestStatus::Unknown,
        };

        Some(Self {
            table_name: field("table_name"),
            expectation_name: field("expectation_name"),
            status,
            expectation_expression: field("expectation_expression"),
            metric_name: field("metric_name"),
            actual_value: field("value"),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Summary {
    passed: usize,
    failed: usize,
    unknown: usize,
}

impl Summary {
    fn total(self) -> usize {
        self.passed + self.failed + self.unknown
    }
}

/// Renders expectation results; any failure or unparseable row turns into a
/// nonzero exit through `process_payload`.
#[derive(Default)]
pub struct TestReporter {
    summary: Summary,
}

impl TestReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for TestReporter {
    type Row = TestRow;

    fn extract_data(&mut self, payload: &Value) -> Result<Vec<Value>, CliError> {
        let Some(object) = payload.as_object() else {
            debug!("unexpected response type, expected object");
            return Err(CliError::could_not_process_response());
        };
        match object.get(DATA_KEY) {
            None => Ok(Vec::new()),
            Some(Value::Array(expectations)) => Ok(expectations.clone()),
            Some(_) => {
                warn!("unexpected expectations type, expected list");
                Err(CliError::could_not_process_response())
            }
        }
    }

    fn parse_data(&mut self, entries: Vec<Value>) -> Vec<TestRow> {
        let mut rows = Vec::new();
        for entry in &entries {
            if let Some(row) = TestRow::from_value(entry) {
                match row.status {
                    TestStatus::Pass => self.summary.passed += 1,
                    TestStatus::Fail => self.summary.failed += 1,
                    TestStatus::Unknown => self.summary.unknown += 1,
                }
                rows.push(row);
            }
        }
        rows
    }

    fn print_renderables(&self, rows: &[TestRow], out: &mut dyn Output) {
        for row in rows {
            let (status_text, style) = match row.status {
                TestStatus::Pass => ("✓ PASS", Style::Pass),
                TestStatus::Fail => ("✗ FAIL", Style::Fail),
                TestStatus::Unknown => ("? UNKNOWN", Style::Status),
            };

            out.styled(&format!("{status_text:<STATUS_WIDTH$} "), style);
            out.styled(&row.table_name, Style::Domain);
            out.plain(&format!(" ({})", row.expectation_name));
            out.plain("\n");

            if row.status == TestStatus::Fail {
                out.plain(&format!(
                    "  └─ Expected: {}, Got: {} (Metric: {})\n",
                    row.expectation_expression, row.actual_value, row.metric_name
                ));
            }
        }
    }

    fn is_success(&self) -> bool {
        self.summary.failed + self.summary.unknown == 0
    }

    fn summary_renderables(&self) -> Vec<StyledText> {
        let total = self.summary.total();
        if total == 0 {
            return vec![StyledText::plain("No expectations found in the project.")];
        }
        let mut result = vec![
            StyledText::new(format!("{} passed", self.summary.passed), Style::Pass),
            StyledText::plain(", "),
            StyledText::new(format!("{} failed", self.summary.failed), Style::Fail),
        ];
        if self.summary.unknown > 0 {
            result.push(StyledText::plain(", "));
            result.push(StyledText::new(
                format!("{} unknown", self.summary.unknown),
                Style::Fail,
            ));
        }
        result.push(StyledText::plain(" out of "));
        result.push(StyledText::new(total.to_string(), Style::Bold));
        result.push(StyledText::plain(" total."));
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::reports::harness::capture;

    fn run(data: Value) -> String {
        capture(&mut TestReporter::new(), Some(data))
    }

    #[test]
    fn renders_a_passing_expectation() {
        let output = run(json!({"expectations": [{
            "table_name": "MY_TABLE",
            "expectation_name": "row_count_check",
            "expectation_violated": false,
        }]}));

        assert!(output.contains("✓ PASS"));
        assert!(output.contains("MY_TABLE (row_count_check)"));
        assert!(output.contains("1 passed, 0 failed out of 1 total."));
    }

    #[test]
    fn failing_expectation_gets_a_detail_line_and_raises() {
        let output = run(json!({"expectations": [{
            "table_name": "T",
            "expectation_name": "E",
            "expectation_violated": true,
            "expectation_expression": "> 100",
            "metric_name": "row_count",
            "value": "42",
        }]}));

        assert!(output.contains("✗ FAIL"));
        assert!(output.contains("  └─ Expected: > 100, Got: 42 (Metric: row_count)"));
        // process_payload raised; the failure text is the summary itself.
        assert!(output.ends_with("\n0 passed, 1 failed out of 1 total.\n"));
    }

    #[test]
    fn mixed_statuses_summarize_all_buckets() {
        let output = run(json!({"expectations": [
            {"table_name": "A", "expectation_name": "a", "expectation_violated": false},
            {"table_name": "B", "expectation_name": "b", "expectation_violated": true},
            {"table_name": "C", "expectation_name": "c"},
        ]}));

        assert!(output.contains("? UNKNOWN"));
        assert!(output.contains("1 passed, 1 failed, 1 unknown out of 3 total."));
    }

    #[test]
    fn empty_cursor_prints_no_data() {
        let output = capture(&mut TestReporter::new(), None);
        assert!(output.contains("No data."));
    }

    #[test]
    fn no_expectations_is_a_success() {
        let output = run(json!({"expectations": []}));
        assert!(output.contains("No expectations found in the project."));
    }

    #[test]
    fn missing_expectations_key_is_a_success() {
        let output = run(json!({"some_other_key": 1}));
        assert!(output.contains("No expectations found in the project."));
    }

    #[test]
    fn non_list_expectations_is_a_processing_error() {
        let output = run(json!({"expectations": "nope"}));
        assert!(output.contains("Could not process response."));
    }

    #[test]
    fn non_object_entries_are_skipped_entirely() {
        let output = run(json!({"expectations": [
            "not_a_dict",
            {"table_name": "T", "expectation_name": "E", "expectation_violated": false},
        ]}));

        assert!(output.contains("1 passed, 0 failed out of 1 total."));
    }

    mod test_row {
        use super::*;

        #[test]
        fn reads_all_fields() {
            let row = TestRow::from_value(&json!({
                "table_name": "MY_TABLE",
                "expectation_name": "my_check",
                "expectation_violated": false,
                "expectation_expression": "> 100",
                "metric_name": "row_count",
                "value": "500",
            }))
            .unwrap();

            assert_eq!(row.table_name, "MY_TABLE");
            assert_eq!(row.expectation_name, "my_check");
            assert_eq!(row.status, TestStatus::Pass);
            assert_eq!(row.expectation_expression, "> 100");
            assert_eq!(row.metric_name, "row_count");
            assert_eq!(row.actual_value, "500");
        }

        #[test]
        fn violated_flag_maps_to_status() {
            let fail = TestRow::from_value(&json!({"expectation_violated": true})).unwrap();
            assert_eq!(fail.status, TestStatus::Fail);

            let unknown = TestRow::from_value(&json!({})).unwrap();
            assert_eq!(unknown.status, TestStatus::Unknown);
            assert_eq!(unknown.table_name, "UNKNOWN");

            let also_unknown =
                TestRow::from_value(&json!({"expectation_violated": "yes"})).unwrap();
            assert_eq!(also_unknown.status, TestStatus::Unknown);
        }

        #[test]
        fn non_object_entry_is_none() {
            assert_eq!(TestRow::from_value(&json!("not_a_dict")), None);
        }

        #[test]
        fn sanitizes_names() {
            let row = TestRow::from_value(&json!({
                "table_name": "TBL\u{1b}[31m",
                "expectation_name": "check\u{1b}[0m",
                "expectation_violated": false,
            }))
            .unwrap();

            assert!(!row.table_name.contains('\u{1b}'));
            assert!(!row.expectation_name.contains('\u{1b}'));
        }
    }
}
