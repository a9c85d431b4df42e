//! Dynamic-table refresh statistics rendering.
//!
//! The service has emitted two incompatible payload shapes over time. Both
//! are normalized into one canonical entry form
//! (`{table_name, statistics: {inserted_rows, deleted_rows} | null}`) by an
//! extractor chosen from the payload itself, and a single parsing path
//! handles the rest.

use dcmctl_core::{CliError, sanitize_for_terminal};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{Output, Reporter, Style, StyledText, loose_string};

const STATUS_WIDTH: usize = 11;
const STATS_WIDTH: usize = 7;
const NEW_FORMAT_KEY: &str = "dts_refresh_result";
const EMPTY_STATISTICS_SENTINEL: &str = "No new data";

/// Normalizes one historical payload shape into canonical table entries.
trait RefreshExtractor {
    fn extract(&self, payload: &Value) -> Result<Vec<Value>, CliError>;
}

/// Pure predicate on the payload decides which extractor runs.
fn select_extractor(payload: &Value) -> &'static dyn RefreshExtractor {
    if payload.get(NEW_FORMAT_KEY).is_some() {
        &NewFormatExtractor
    } else {
        &OldFormatExtractor
    }
}

#[derive(Debug, Default, Deserialize)]
struct RefreshResponse {
    dts_refresh_result: Option<DtsRefreshResult>,
}

#[derive(Debug, Default, Deserialize)]
struct DtsRefreshResult {
    #[serde(default)]
    refreshed_tables: Vec<RefreshTableResult>,
}

#[derive(Debug, Deserialize)]
struct RefreshTableResult {
    #[serde(default = "unknown_table_name")]
    table_name: String,
    #[serde(default)]
    statistics: Option<RefreshStatistics>,
}

#[derive(Debug, Deserialize)]
struct RefreshStatistics {
    #[serde(default)]
    inserted_rows: u64,
    #[serde(default)]
    deleted_rows: u64,
}

fn unknown_table_name() -> String {
    "UNKNOWN".to_string()
}

/// Strict extractor for the `dts_refresh_result` wrapper; this shape is not
/// expected to be malformed in practice, so validation failures abort.
struct NewFormatExtractor;

impl RefreshExtractor for NewFormatExtractor {
    fn extract(&self, payload: &Value) -> Result<Vec<Value>, CliError> {
        let response: RefreshResponse = serde_json::from_value(payload.clone()).map_err(|error| {
            info!(%error, "failed to validate refresh response");
            CliError::could_not_process_response()
        })?;
        let Some(result) = response.dts_refresh_result else {
            return Ok(Vec::new());
        };
        Ok(result
            .refreshed_tables
            .into_iter()
            .map(|table| {
                let statistics = table.statistics.map(|statistics| {
                    json!({
                        "inserted_rows": statistics.inserted_rows,
                        "deleted_rows": statistics.deleted_rows,
                    })
                });
                json!({"table_name": table.table_name, "statistics": statistics})
            })
            .collect())
    }
}

/// Permissive extractor for the legacy shape, which used `dt_name` and
/// camel-cased statistics, sometimes JSON-encoded inside a string.
struct OldFormatExtractor;

impl RefreshExtractor for OldFormatExtractor {
    fn extract(&self, payload: &Value) -> Result<Vec<Value>, CliError> {
        let refreshed = payload
            .get("refreshed_tables")
            .cloned()
            .unwrap_or_else(|| json!([]));
        let Value::Array(tables) = refreshed else {
            warn!("unexpected refreshed_tables type, expected list");
            return Err(CliError::could_not_process_response());
        };
        Ok(tables.iter().map(normalize_legacy_table).collect())
    }
}

/// Rename legacy fields into the canonical entry shape. Non-object entries
/// pass through untouched and surface later as UNKNOWN rows.
fn normalize_legacy_table(table: &Value) -> Value {
    let Some(entry) = table.as_object() else {
        return table.clone();
    };

    let table_name = entry.get("dt_name").cloned().unwrap_or_else(|| json!("UNKNOWN"));
    let statistics = match entry.get("statistics") {
        None | Some(Value::Null) => Value::Null,
        Some(Value::Object(statistics)) => canonical_statistics(
            statistics.get("insertedRows"),
            statistics.get("deletedRows"),
        ),
        Some(Value::String(raw)) => legacy_statistics_from_string(raw),
        Some(other) => {
            info!(?other, "unexpected statistics type");
            Value::Null
        }
    };

    json!({"table_name": table_name, "statistics": statistics})
}

fn legacy_statistics_from_string(raw: &str) -> Value {
    if raw == EMPTY_STATISTICS_SENTINEL {
        return canonical_statistics(None, None);
    }
    if raw.starts_with('{') {
        return match serde_json::from_str::<Value>(raw) {
            Ok(decoded) => canonical_statistics(
                decoded.get("insertedRows"),
                decoded.get("deletedRows"),
            ),
            Err(error) => {
                info!(%error, %raw, "failed to parse statistics JSON");
                Value::Null
            }
        };
    }
    info!(%raw, "unexpected statistics format");
    Value::Null
}

fn canonical_statistics(inserted: Option<&Value>, deleted: Option<&Value>) -> Value {
    json!({
        "inserted_rows": inserted.cloned().unwrap_or_else(|| json!(0)),
        "deleted_rows": deleted.cloned().unwrap_or_else(|| json!(0)),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshStatus {
    #[default]
    Unknown,
    UpToDate,
    Refreshed,
}

impl RefreshStatus {
    fn label(self) -> &'static str {
        match self {
            RefreshStatus::Unknown => "UNKNOWN",
            RefreshStatus::UpToDate => "UP-TO-DATE",
            RefreshStatus::Refreshed => "REFRESHED",
        }
    }
}

/// One table row in refresh results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRow {
    pub table_name: String,
    pub status: RefreshStatus,
    inserted: u64,
    deleted: u64,
}

impl RefreshRow {
    /// `None` for entries that are not objects at all; those land in the
    /// unknown summary bucket without producing a row.
    fn from_value(entry: &Value) -> Option<Self> {
        let Some(data) = entry.as_object() else {
            info!("unexpected table entry type");
            return None;
        };

        let table_name = sanitize_for_terminal(
            &data
                .get("table_name")
                .map(loose_string)
                .unwrap_or_else(|| "UNKNOWN".to_string()),
        );
        let mut row = Self {
            table_name,
            status: RefreshStatus::Unknown,
            inserted: 0,
            deleted: 0,
        };

        let statistics = match data.get("statistics") {
            None | Some(Value::Null) => return Some(row),
            Some(Value::Object(statistics)) => statistics,
            Some(other) => {
                info!(?other, "unexpected statistics type, expected object");
                return Some(row);
            }
        };

        row.inserted = safe_count(statistics.get("inserted_rows"));
        row.deleted = safe_count(statistics.get("deleted_rows"));
        row.status = if row.inserted == 0 && row.deleted == 0 {
            RefreshStatus::UpToDate
        } else {
            RefreshStatus::Refreshed
        };
        Some(row)
    }

    fn formatted_inserted(&self) -> String {
        if self.status == RefreshStatus::Unknown {
            return String::new();
        }
        let formatted = format_count(self.inserted);
        if formatted == "0" {
            formatted
        } else {
            format!("+{formatted}")
        }
    }

    fn formatted_deleted(&self) -> String {
        if self.status == RefreshStatus::Unknown {
            return String::new();
        }
        let formatted = format_count(self.deleted);
        if formatted == "0" {
            formatted
        } else {
            format!("-{formatted}")
        }
    }
}

/// Row counts are nonnegative by contract; anything that cannot be read as
/// one becomes 0 with a log line.
fn safe_count(value: Option<&Value>) -> u64 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(number)) => {
            if let Some(count) = number.as_u64() {
                count
            } else if let Some(float) = number.as_f64().filter(|f| *f >= 0.0) {
                float as u64
            } else {
                info!(value = %number, "could not convert value to a row count");
                0
            }
        }
        Some(Value::String(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            info!(%raw, "could not convert value to a row count");
            0
        }),
        Some(other) => {
            info!(?other, "could not convert value to a row count");
            0
        }
    }
}

const UNITS: [(u64, &str); 6] = [
    (1_000_000_000_000_000_000, "E"),
    (1_000_000_000_000_000, "P"),
    (1_000_000_000_000, "T"),
    (1_000_000_000, "B"),
    (1_000_000, "M"),
    (1_000, "k"),
];

/// Abbreviate a row count with an SI-style suffix at one decimal place,
/// dropping the decimal when it rounds to a whole number.
fn format_count(count: u64) -> String {
    for (threshold, suffix) in UNITS {
        if count >= threshold {
            let value = count as f64 / threshold as f64;
            let rounded = (value * 10.0).round() / 10.0;
            if rounded >= 1000.0 {
                return format!("{}{}", value as u64, suffix);
            }
            if rounded.fract() == 0.0 {
                return format!("{}{}", rounded as u64, suffix);
            }
            return format!("{rounded:.1}{suffix}");
        }
    }
    count.to_string()
}

#[derive(Debug, Default, Clone, Copy)]
struct Summary {
    up_to_date: usize,
    refreshed: usize,
    unknown: usize,
}

impl Summary {
    fn total(self) -> usize {
        self.up_to_date + self.refreshed + self.unknown
    }
}

/// Renders refresh results for every dynamic table in the project.
#[derive(Default)]
pub struct RefreshReporter {
    summary: Summary,
}

impl RefreshReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for RefreshReporter {
    type Row = RefreshRow;

    fn extract_data(&mut self, payload: &Value) -> Result<Vec<Value>, CliError> {
        if !payload.is_object() {
            info!("unexpected response type, expected object");
            return Err(CliError::could_not_process_response());
        }
        select_extractor(payload).extract(payload)
    }

    fn parse_data(&mut self, entries: Vec<Value>) -> Vec<RefreshRow> {
        let mut rows = Vec::new();
        for entry in &entries {
            match RefreshRow::from_value(entry) {
                None => self.summary.unknown += 1,
                Some(row) => {
                    match row.status {
                        RefreshStatus::UpToDate => self.summary.up_to_date += 1,
                        RefreshStatus::Refreshed => self.summary.refreshed += 1,
                        RefreshStatus::Unknown => self.summary.unknown += 1,
                    }
                    rows.push(row);
                }
            }
        }
        rows
    }

    fn print_renderables(&self, rows: &[RefreshRow], out: &mut dyn Output) {
        for row in rows {
            out.styled(
                &format!("{:<STATUS_WIDTH$} ", row.status.label()),
                Style::Status,
            );
            out.styled(
                &format!("{:>STATS_WIDTH$} ", row.formatted_inserted()),
                Style::Inserted,
            );
            out.styled(
                &format!("{:>STATS_WIDTH$} ", row.formatted_deleted()),
                Style::Removed,
            );
            out.styled(&row.table_name, Style::Domain);
            out.plain("\n");
        }
    }

    fn is_success(&self) -> bool {
        self.summary.unknown == 0
    }

    fn summary_renderables(&self) -> Vec<StyledText> {
        if self.summary.total() == 0 {
            return vec![StyledText::plain("No dynamic tables found in the project.")];
        }
        let mut parts = Vec::new();
        if self.summary.refreshed > 0 {
            parts.push(format!("{} refreshed", self.summary.refreshed));
        }
        if self.summary.up_to_date > 0 {
            parts.push(format!("{} up-to-date", self.summary.up_to_date));
        }
        if self.summary.unknown > 0 {
            parts.push(format!("{} unknown", self.summary.unknown));
        }
        vec![StyledText::plain(format!("{}.", parts.join(", ")))]
    }
}
