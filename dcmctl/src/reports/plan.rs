//! Plan/deploy changeset rendering.

use dcmctl_core::{CliError, QualifiedName, sanitize_for_terminal};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Output, Reporter, Style, StyledText, loose_string};
use crate::client::Cursor;

const OPERATION_WIDTH: usize = 8;
const DOMAIN_WIDTH: usize = 20;

/// Which command produced the changeset; summary wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    Plan,
    Deploy,
}

struct SummaryLabels {
    created: &'static str,
    altered: &'static str,
    dropped: &'static str,
    header: &'static str,
}

impl PlanAction {
    fn labels(self) -> SummaryLabels {
        match self {
            PlanAction::Plan => SummaryLabels {
                created: "to create",
                altered: "to alter",
                dropped: "to drop",
                header: "Planned",
            },
            PlanAction::Deploy => SummaryLabels {
                created: "created",
                altered: "altered",
                dropped: "dropped",
                header: "Deployed",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntityChange {
    #[serde(rename = "type")]
    operation: String,
    object_id: ObjectId,
}

#[derive(Debug, Deserialize)]
struct ObjectId {
    domain: String,
    fqn: String,
}

/// One entity mutation, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    pub operation: String,
    pub domain: String,
    pub fqn: Option<QualifiedName>,
}

impl PlanRow {
    /// Strict parse first; any schema mismatch falls through to the
    /// permissive path, so one malformed entry never aborts the batch.
    pub fn from_value(entry: &Value) -> Self {
        match Self::strict(entry) {
            Ok(row) => row,
            Err(error) => {
                debug!(%error, "changeset entry failed strict validation, using fallback parser");
                Self::fallback(entry)
            }
        }
    }

    fn strict(entry: &Value) -> Result<Self, serde_json::Error> {
        let entity: EntityChange = serde_json::from_value(entry.clone())?;
        let operation = sanitize_for_terminal(&entity.operation.to_uppercase());
        let domain = sanitize_for_terminal(&entity.object_id.domain.to_uppercase());
        // A bad fqn string degrades to an unknown name, not a failed entry.
        let fqn = QualifiedName::parse(&sanitize_for_terminal(&entity.object_id.fqn)).ok();
        Ok(Self {
            operation,
            domain,
            fqn,
        })
    }

    fn fallback(entry: &Value) -> Self {
        let operation = sanitize_for_terminal(
            &entry
                .get("type")
                .map(loose_string)
                .unwrap_or_else(|| "UNKNOWN".to_string())
                .to_uppercase(),
        );
        let object_id = entry.get("object_id").and_then(Value::as_object);
        let domain = sanitize_for_terminal(
            &object_id
                .and_then(|object| object.get("domain"))
                .map(loose_string)
                .unwrap_or_else(|| "UNKNOWN".to_string())
                .to_uppercase(),
        );
        let fqn = object_id
            .and_then(|object| object.get("fqn"))
            .map(loose_string)
            .and_then(|raw| QualifiedName::parse(&sanitize_for_terminal(&raw)).ok());
        Self {
            operation,
            domain,
            fqn,
        }
    }

    /// CREATE < ALTER < DROP, anything else last.
    fn operation_rank(&self) -> u8 {
        match self.operation.as_str() {
            "CREATE" => 0,
            "ALTER" => 1,
            "DROP" => 2,
            _ => 3,
        }
    }

    pub fn display_fqn(&self) -> String {
        match &self.fqn {
            Some(fqn) => fqn.display_name(),
            None => "UNKNOWN".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Summary {
    created: usize,
    altered: usize,
    dropped: usize,
}

impl Summary {
    fn total(self) -> usize {
        self.created + self.altered + self.dropped
    }
}

/// Renders a version 2+ changeset, sorted deterministically, with a
/// per-command summary.
pub struct PlanReporter {
    action: PlanAction,
    summary: Summary,
}

impl PlanReporter {
    pub fn new(action: PlanAction) -> Self {
        Self {
            action,
            summary: Summary::default(),
        }
    }

    fn style_for_operation(operation: &str) -> Style {
        match operation {
            "CREATE" => Style::Create,
            "ALTER" => Style::Alter,
            "DROP" => Style::Drop,
            _ => Style::Unknown,
        }
    }
}

impl Reporter for PlanReporter {
    type Row = PlanRow;

    fn extract_data(&mut self, payload: &Value) -> Result<Vec<Value>, CliError> {
        let Some(object) = payload.as_object() else {
            debug!("unexpected response type, expected object");
            return Err(CliError::could_not_process_response());
        };
        let version = object.get("version").and_then(|value| {
            value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        });
        let Some(version) = version else {
            debug!("plan response is missing an integer version");
            return Err(CliError::could_not_process_response());
        };
        if version < 2 {
            return Err(CliError::new(
                "Only version 2+ plan responses are supported.",
            ));
        }
        if version > 2 {
            debug!(
                version,
                "plan response is newer than supported (v2), rendering with best effort"
            );
        }
        match object.get("changeset") {
            None => Ok(Vec::new()),
            Some(Value::Array(entries)) => Ok(entries.clone()),
            Some(_) => {
                debug!("plan changeset is not a list");
                Err(CliError::could_not_process_response())
            }
        }
    }

    fn parse_data(&mut self, entries: Vec<Value>) -> Vec<PlanRow> {
        let mut rows: Vec<PlanRow> = entries.iter().map(PlanRow::from_value).collect();
        for row in &rows {
            match row.operation.as_str() {
                "CREATE" => self.summary.created += 1,
                "ALTER" => self.summary.altered += 1,
                "DROP" => self.summary.dropped += 1,
                other => debug!(operation = other, "unknown operation type"),
            }
        }
        rows.sort_by(|a, b| {
            (a.operation_rank(), a.domain.as_str()).cmp(&(b.operation_rank(), b.domain.as_str()))
        });
        rows
    }

    fn print_renderables(&self, rows: &[PlanRow], out: &mut dyn Output) {
        for row in rows {
            out.styled(
                &format!("{:<OPERATION_WIDTH$} ", row.operation),
                Self::style_for_operation(&row.operation),
            );
            out.plain(&format!("{:<DOMAIN_WIDTH$} ", row.domain));
            out.styled(&row.display_fqn(), Style::Domain);
            out.plain("\n");
        }
    }

    fn is_success(&self) -> bool {
        // A plan listing malformed entries is still a valid plan.
        true
    }

    fn summary_renderables(&self) -> Vec<StyledText> {
        let total = self.summary.total();
        if total == 0 {
            return vec![StyledText::plain("No changes detected.")];
        }
        let labels = self.action.labels();
        let noun = if total == 1 { "entity" } else { "entities" };
        vec![
            StyledText::plain(format!("{} {} {} (", labels.header, total, noun)),
            StyledText::new(
                format!("{} {}", self.summary.created, labels.created),
                Style::Create,
            ),
            StyledText::plain(", "),
            StyledText::new(
                format!("{} {}", self.summary.altered, labels.altered),
                Style::Alter,
            ),
            StyledText::plain(", "),
            StyledText::new(
                format!("{} {}", self.summary.dropped, labels.dropped),
                Style::Drop,
            ),
            StyledText::plain(")."),
        ]
    }
}

/// Branch on the response shape before committing to a reporter: object
/// payloads carry a versioned changeset and go through [`PlanReporter`]
/// (which enforces the version gate), while a top-level array is the legacy
/// untyped format and is printed verbatim.
pub fn process_plan_result(
    cursor: &mut Cursor,
    action: PlanAction,
    out: &mut dyn Output,
) -> Result<(), CliError> {
    let Some(row) = cursor.fetch_one() else {
        out.plain("No data.\n");
        return Ok(());
    };
    let first = match row.first() {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value) => Some(value),
    };
    let Some(first) = first else {
        out.plain("No data.\n");
        return Ok(());
    };

    let payload: Value = match first {
        Value::String(raw) => serde_json::from_str(raw).map_err(|error| {
            debug!(%error, "could not decode plan response");
            CliError::could_not_process_response()
        })?,
        other => other.clone(),
    };

    if payload.is_object() {
        let mut reporter = PlanReporter::new(action);
        return reporter.process_payload(&payload, out);
    }

    // Legacy untyped changeset: raw passthrough, no reporter involvement.
    let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    out.plain(&rendered);
    out.plain("\n");
    Ok(())
}
