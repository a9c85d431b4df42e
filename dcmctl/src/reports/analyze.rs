//! Definition analysis rendering: raw diagnostic passthrough plus an error
//! tally.

use dcmctl_core::CliError;
use serde_json::Value;
use tracing::debug;

use super::{Output, Reporter, StyledText};

const FILES_KEY: &str = "files";

/// Counts file-level and per-definition errors; the payload itself is
/// printed verbatim rather than reformatted.
#[derive(Default)]
pub struct AnalyzeReporter {
    error_count: usize,
    raw_payload: Option<String>,
}

impl AnalyzeReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn error_count(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

impl Reporter for AnalyzeReporter {
    type Row = Value;

    fn record_raw_payload(&mut self, raw: &str) {
        self.raw_payload = Some(raw.to_string());
    }

    fn extract_data(&mut self, payload: &Value) -> Result<Vec<Value>, CliError> {
        let Some(object) = payload.as_object() else {
            debug!("unexpected response type, expected object");
            return Err(CliError::could_not_process_response());
        };
        match object.get(FILES_KEY) {
            None => Ok(Vec::new()),
            Some(Value::Array(files)) => Ok(files.clone()),
            Some(other) => {
                debug!(?other, "unexpected response format, expected files to be a list");
                Err(CliError::could_not_process_response())
            }
        }
    }

    fn parse_data(&mut self, entries: Vec<Value>) -> Vec<Value> {
        for file_entry in &entries {
            self.error_count += error_count(file_entry.get("errors"));
            if let Some(definitions) = file_entry.get("definitions").and_then(Value::as_array) {
                for definition in definitions {
                    self.error_count += error_count(definition.get("errors"));
                }
            }
        }
        entries
    }

    fn print_renderables(&self, _rows: &[Value], out: &mut dyn Output) {
        if let Some(raw) = &self.raw_payload {
            out.plain(raw);
            out.plain("\n");
        }
    }

    fn is_success(&self) -> bool {
        self.error_count == 0
    }

    fn summary_renderables(&self) -> Vec<StyledText> {
        if self.error_count == 0 {
            vec![StyledText::plain("Analysis completed successfully.")]
        } else {
            vec![StyledText::plain(format!(
                "Analysis found {} error(s).",
                self.error_count
            ))]
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::reports::harness::capture;

    fn response(files: Value) -> Value {
        json!({"files": files})
    }

    #[test]
    fn no_errors_reports_success() {
        let output = capture(
            &mut AnalyzeReporter::new(),
            Some(response(json!([{
                "sourcePath": "sources/definitions/customers.sql",
                "definitions": [{"name": "CUSTOMERS", "errors": []}],
                "errors": [],
            }]))),
        );

        assert!(output.contains("Analysis completed successfully."));
    }

    #[test]
    fn file_level_errors_are_counted_and_raise() {
        let output = capture(
            &mut AnalyzeReporter::new(),
            Some(response(json!([{
                "sourcePath": "sources/definitions/bad.sql",
                "definitions": [],
                "errors": [{"message": "syntax error"}],
            }]))),
        );

        assert!(output.contains("Analysis found 1 error(s)."));
    }

    #[test]
    fn definition_level_errors_are_counted() {
        let output = capture(
            &mut AnalyzeReporter::new(),
            Some(response(json!([{
                "sourcePath": "sources/definitions/customers.sql",
                "definitions": [{
                    "name": "CUSTOMERS",
                    "errors": [{"message": "column not found"}, {"message": "type mismatch"}],
                }],
                "errors": [],
            }]))),
        );

        assert!(output.contains("Analysis found 2 error(s)."));
    }

    #[test]
    fn both_levels_are_summed() {
        let output = capture(
            &mut AnalyzeReporter::new(),
            Some(response(json!([
                {
                    "sourcePath": "sources/definitions/a.sql",
                    "definitions": [{"name": "A", "errors": [{"message": "err1"}, {"message": "err2"}]}],
                    "errors": [{"message": "file err"}],
                },
                {
                    "sourcePath": "sources/definitions/b.sql",
                    "definitions": [{"name": "B", "errors": []}],
                    "errors": [],
                },
            ]))),
        );

        assert!(output.contains("Analysis found 3 error(s)."));
    }

    #[test]
    fn raw_payload_is_printed_verbatim() {
        let payload = response(json!([]));
        let output = capture(&mut AnalyzeReporter::new(), Some(payload.clone()));

        // The passthrough line is the JSON exactly as the row carried it.
        assert!(output.contains(&payload.to_string()));
    }

    #[test]
    fn empty_file_list_is_success() {
        let output = capture(&mut AnalyzeReporter::new(), Some(response(json!([]))));
        assert!(output.contains("Analysis completed successfully."));
    }

    #[test]
    fn non_list_files_is_a_processing_error() {
        let output = capture(&mut AnalyzeReporter::new(), Some(json!({"files": "nope"})));
        assert!(output.contains("Could not process response."));
    }

    #[test]
    fn empty_cursor_prints_no_data() {
        let output = capture(&mut AnalyzeReporter::new(), None);
        assert!(output.contains("No data."));
    }
}
