//! SQL execution and artifact upload collaborators.
//!
//! Commands depend on the [`SqlClient`] trait; the HTTP implementation below
//! talks to the platform's statements API. Everything is blocking: one
//! request/response cycle per command invocation.

use std::collections::VecDeque;
use std::path::Path;

use eyre::{Context, Result, eyre};
use serde_json::Value;
use tracing::debug;

/// One result row. The payloads this tool cares about live in the first
/// column, either as a JSON-encoded string or an already-decoded structure.
pub type Row = Vec<Value>;

/// Row source for a single executed statement.
#[derive(Debug, Default)]
pub struct Cursor {
    rows: VecDeque<Row>,
}

impl Cursor {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows: rows.into() }
    }

    /// Take the next row, if any.
    pub fn fetch_one(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Iterator for Cursor {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.fetch_one()
    }
}

/// Remote execution seam.
pub trait SqlClient {
    /// Execute one SQL statement and return its rows.
    fn execute_query(&self, statement: &str) -> Result<Cursor>;

    /// Upload one artifact to the named stage, keeping its relative path.
    fn upload_file(&self, stage: &str, relative_path: &Path, contents: &[u8]) -> Result<()>;
}

pub const ENDPOINT_ENV: &str = "DCMCTL_ENDPOINT";
pub const TOKEN_ENV: &str = "DCMCTL_TOKEN";

/// Client for the platform's HTTP statements API.
pub struct HttpSqlClient {
    endpoint: String,
    token: String,
    http: reqwest::blocking::Client,
}

#[derive(serde::Deserialize)]
struct StatementResponse {
    #[serde(default)]
    data: Vec<Row>,
}

impl HttpSqlClient {
    /// Build a client from `DCMCTL_ENDPOINT` and `DCMCTL_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .map_err(|_| eyre!("{ENDPOINT_ENV} is not set; point it at the SQL API endpoint"))?;
        let token = std::env::var(TOKEN_ENV).map_err(|_| eyre!("{TOKEN_ENV} is not set"))?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            http: reqwest::blocking::Client::new(),
        })
    }
}

impl SqlClient for HttpSqlClient {
    fn execute_query(&self, statement: &str) -> Result<Cursor> {
        debug!(%statement, "executing statement");
        let response = self
            .http
            .post(format!("{}/api/v2/statements", self.endpoint))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "statement": statement }))
            .send()
            .wrap_err("could not reach the SQL API endpoint")?
            .error_for_status()
            .wrap_err("statement execution failed")?;
        let body: StatementResponse = response.json().wrap_err("malformed statement response")?;
        Ok(Cursor::new(body.data))
    }

    fn upload_file(&self, stage: &str, relative_path: &Path, contents: &[u8]) -> Result<()> {
        let path = relative_path.to_string_lossy().replace('\\', "/");
        debug!(stage, %path, "uploading artifact");
        self.http
            .put(format!(
                "{}/api/v2/stages/{}/files/{}",
                self.endpoint, stage, path
            ))
            .bearer_auth(&self.token)
            .body(contents.to_vec())
            .send()
            .wrap_err("could not reach the SQL API endpoint")?
            .error_for_status()
            .wrap_err_with(|| format!("upload of {path} failed"))?;
        Ok(())
    }
}
