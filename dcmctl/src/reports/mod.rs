//! Reporter framework: turn a raw query-result row into structured, styled
//! terminal output plus a pass/fail verdict.
//!
//! Each concrete reporter implements the extraction/parsing/printing hooks;
//! the provided `process`/`process_payload` drivers are shared. The split
//! exists so a caller can branch on response shape *before* committing to a
//! reporter (see `process_plan_result`), and so already-decoded payloads can
//! skip the cursor step.

mod analyze;
mod output;
mod plan;
mod refresh;
mod test;

pub use analyze::AnalyzeReporter;
#[cfg(test)]
pub use output::PlainBuffer;
pub use output::{Output, Style, StyledText, TerminalOutput};
pub use plan::{PlanAction, PlanReporter, PlanRow, process_plan_result};
pub use refresh::{RefreshReporter, RefreshRow, RefreshStatus};
pub use test::{TestReporter, TestRow, TestStatus};

use dcmctl_core::CliError;
use serde_json::Value;
use tracing::debug;

use crate::client::Cursor;

pub trait Reporter {
    /// Typed row this reporter renders.
    type Row;

    /// Pull the relevant entry list out of the decoded payload. Fails with
    /// the generic processing error when the top-level shape is unusable.
    fn extract_data(&mut self, payload: &Value) -> Result<Vec<Value>, CliError>;

    /// Parse raw entries into rows, accumulating summary counters.
    fn parse_data(&mut self, entries: Vec<Value>) -> Vec<Self::Row>;

    /// Write one styled line per row to the sink.
    fn print_renderables(&self, rows: &[Self::Row], out: &mut dyn Output);

    /// Whether the underlying operation passed without errors.
    fn is_success(&self) -> bool;

    /// Styled fragments printed as the success summary, or concatenated
    /// into the failure message.
    fn summary_renderables(&self) -> Vec<StyledText>;

    /// Hook for reporters that need the verbatim first-column text.
    fn record_raw_payload(&mut self, _raw: &str) {}

    /// Read one row from the cursor and report it. An exhausted cursor
    /// prints "No data." and succeeds.
    fn process(&mut self, cursor: &mut Cursor, out: &mut dyn Output) -> Result<(), CliError> {
        let Some(row) = cursor.fetch_one() else {
            out.plain("No data.\n");
            return Ok(());
        };
        let Some(first) = row.first() else {
            debug!(?row, "unexpected response row shape");
            return Err(CliError::could_not_process_response());
        };
        let payload = match first {
            Value::String(raw) => {
                self.record_raw_payload(raw);
                serde_json::from_str(raw).map_err(|error| {
                    debug!(%error, "could not decode response payload");
                    CliError::could_not_process_response()
                })?
            }
            other => {
                self.record_raw_payload(&other.to_string());
                other.clone()
            }
        };
        self.process_payload(&payload, out)
    }

    /// Report an already-decoded payload. Fails with the concatenated
    /// summary text when the operation did not succeed, which is how a
    /// "1 failed" verdict becomes a nonzero exit code.
    fn process_payload(&mut self, payload: &Value, out: &mut dyn Output) -> Result<(), CliError> {
        let entries = self.extract_data(payload)?;
        let rows = self.parse_data(entries);
        self.print_renderables(&rows, out);
        if self.is_success() {
            print_summary(&self.summary_renderables(), out);
            Ok(())
        } else {
            let message: String = self
                .summary_renderables()
                .iter()
                .map(|renderable| renderable.text.as_str())
                .collect();
            Err(CliError::new(message))
        }
    }
}

fn print_summary(renderables: &[StyledText], out: &mut dyn Output) {
    out.plain("\n");
    for renderable in renderables {
        out.styled(&renderable.text, renderable.style);
    }
    out.plain("\n");
}

/// Render a JSON value the way a human expects it in a message: strings
/// bare, everything else via its JSON encoding.
pub(crate) fn loose_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render rows that have no dedicated reporter as plain JSON lines.
pub fn render_raw_rows(cursor: &mut Cursor, out: &mut dyn Output) {
    let mut any = false;
    for row in cursor.by_ref() {
        let line = serde_json::to_string(&row).unwrap_or_else(|_| format!("{row:?}"));
        out.plain(&line);
        out.plain("\n");
        any = true;
    }
    if !any {
        out.plain("No data.\n");
    }
}
