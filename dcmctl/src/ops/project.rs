//! SQL statement building for project operations.
//!
//! Every operation is one statement, one request/response cycle. The remote
//! service owns idempotency; failures propagate immediately.

use dcmctl_core::{CliError, QualifiedName};
use eyre::Result;

use crate::client::{Cursor, SqlClient};

pub fn create(client: &dyn SqlClient, project: &QualifiedName) -> Result<Cursor> {
    let query = format!("CREATE DCM PROJECT {}", project.sql_identifier());
    client.execute_query(&query)
}

pub fn drop(client: &dyn SqlClient, project: &QualifiedName, if_exists: bool) -> Result<Cursor> {
    let mut query = String::from("DROP DCM PROJECT");
    if if_exists {
        query.push_str(" IF EXISTS");
    }
    query.push_str(&format!(" {}", project.sql_identifier()));
    client.execute_query(&query)
}

pub fn describe(client: &dyn SqlClient, project: &QualifiedName) -> Result<Cursor> {
    let query = format!("DESCRIBE DCM PROJECT {}", project.sql_identifier());
    client.execute_query(&query)
}

/// Whether a project with this name already exists.
pub fn exists(client: &dyn SqlClient, project: &QualifiedName) -> Result<bool> {
    let query = format!("SHOW DCM PROJECTS LIKE '{}'", project.simple_name());
    let cursor = client.execute_query(&query)?;
    Ok(!cursor.is_empty())
}

pub fn plan(
    client: &dyn SqlClient,
    project: &QualifiedName,
    from_stage: &str,
    configuration: Option<&str>,
    variables: &[String],
) -> Result<Cursor> {
    let mut query = format!("EXECUTE DCM PROJECT {} PLAN", project.sql_identifier());
    query.push_str(&using_clause(configuration, variables)?);
    query.push_str(&from_stage_clause(from_stage));
    client.execute_query(&query)
}

pub fn deploy(
    client: &dyn SqlClient,
    project: &QualifiedName,
    from_stage: &str,
    configuration: Option<&str>,
    variables: &[String],
    alias: Option<&str>,
    skip_plan: bool,
) -> Result<Cursor> {
    let mut query = format!("EXECUTE DCM PROJECT {} DEPLOY", project.sql_identifier());
    if let Some(alias) = alias {
        query.push_str(&format!(" AS \"{alias}\""));
    }
    query.push_str(&using_clause(configuration, variables)?);
    query.push_str(&from_stage_clause(from_stage));
    if skip_plan {
        query.push_str(" SKIP PLAN");
    }
    client.execute_query(&query)
}

pub fn analyze(
    client: &dyn SqlClient,
    project: &QualifiedName,
    from_stage: &str,
    configuration: Option<&str>,
    variables: &[String],
) -> Result<Cursor> {
    let mut query = format!("EXECUTE DCM PROJECT {} ANALYZE", project.sql_identifier());
    query.push_str(&using_clause(configuration, variables)?);
    query.push_str(&from_stage_clause(from_stage));
    client.execute_query(&query)
}

pub fn preview(
    client: &dyn SqlClient,
    project: &QualifiedName,
    object: &QualifiedName,
    from_stage: &str,
    configuration: Option<&str>,
    variables: &[String],
    limit: Option<u64>,
) -> Result<Cursor> {
    let mut query = format!(
        "EXECUTE DCM PROJECT {} PREVIEW {}",
        project.sql_identifier(),
        object.sql_identifier()
    );
    query.push_str(&using_clause(configuration, variables)?);
    query.push_str(&from_stage_clause(from_stage));
    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {limit}"));
    }
    client.execute_query(&query)
}

pub fn refresh(client: &dyn SqlClient, project: &QualifiedName) -> Result<Cursor> {
    let query = format!(
        "EXECUTE DCM PROJECT {} REFRESH ALL",
        project.sql_identifier()
    );
    client.execute_query(&query)
}

pub fn test(client: &dyn SqlClient, project: &QualifiedName) -> Result<Cursor> {
    let query = format!("EXECUTE DCM PROJECT {} TEST ALL", project.sql_identifier());
    client.execute_query(&query)
}

pub fn list_deployments(client: &dyn SqlClient, project: &QualifiedName) -> Result<Cursor> {
    let query = format!(
        "SHOW DEPLOYMENTS IN DCM PROJECT {}",
        project.identifier()
    );
    client.execute_query(&query)
}

pub fn drop_deployment(
    client: &dyn SqlClient,
    project: &QualifiedName,
    deployment: &str,
    if_exists: bool,
) -> Result<Cursor> {
    let mut query = format!(
        "ALTER DCM PROJECT {} DROP DEPLOYMENT",
        project.identifier()
    );
    if if_exists {
        query.push_str(" IF EXISTS");
    }
    query.push_str(&format!(" \"{deployment}\""));
    client.execute_query(&query)
}

/// `USING [CONFIGURATION <name>] [(key=>value, ...)]`, empty when neither a
/// configuration nor variables are present.
fn using_clause(configuration: Option<&str>, variables: &[String]) -> Result<String, CliError> {
    if configuration.is_none() && variables.is_empty() {
        return Ok(String::new());
    }
    let mut clause = String::from(" USING");
    if let Some(configuration) = configuration {
        clause.push_str(&format!(" CONFIGURATION {configuration}"));
    }
    if !variables.is_empty() {
        let mut pairs = Vec::with_capacity(variables.len());
        for variable in variables {
            let Some((key, value)) = variable.split_once('=') else {
                return Err(CliError::new(format!(
                    "Invalid variable '{variable}'. Expected format: key=value."
                )));
            };
            pairs.push(format!("{}=>{}", key.trim(), value.trim()));
        }
        clause.push_str(&format!(" ({})", pairs.join(", ")));
    }
    Ok(clause)
}

fn from_stage_clause(from_stage: &str) -> String {
    if from_stage.starts_with('@') {
        format!(" FROM {from_stage}")
    } else {
        format!(" FROM @{from_stage}")
    }
}
