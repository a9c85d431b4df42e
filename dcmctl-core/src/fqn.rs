//! Structured SQL object names.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FqnError {
    #[error("'{0}' is not a valid qualified name")]
    Invalid(String),
    #[error("'{0}' has too many parts; expected at most database.schema.name")]
    TooManyParts(String),
}

/// Qualified object name: optional database/schema qualifiers, the object
/// name itself, and an optional call signature for functions/procedures.
///
/// Parts keep their source quoting; the display helpers unquote on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    database: Option<String>,
    schema: Option<String>,
    name: String,
    signature: Option<String>,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: None,
            name: name.into(),
            signature: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Parse a dotted name such as `db.schema.name` or `sch."Quoted"` with
    /// an optional trailing call signature like `(varchar, number)`.
    pub fn parse(input: &str) -> Result<Self, FqnError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FqnError::Invalid(input.to_string()));
        }

        let (body, signature) = split_signature(trimmed);
        if let Some(signature) = signature {
            if !signature.ends_with(')') {
                return Err(FqnError::Invalid(input.to_string()));
            }
        }

        let parts = split_parts(body).ok_or_else(|| FqnError::Invalid(input.to_string()))?;
        if parts.iter().any(|part| !is_valid_part(part)) {
            return Err(FqnError::Invalid(input.to_string()));
        }

        let signature = signature.map(str::to_string);
        match parts.as_slice() {
            [name] => Ok(Self {
                database: None,
                schema: None,
                name: name.clone(),
                signature,
            }),
            [schema, name] => Ok(Self {
                database: None,
                schema: Some(schema.clone()),
                name: name.clone(),
                signature,
            }),
            [database, schema, name] => Ok(Self {
                database: Some(database.clone()),
                schema: Some(schema.clone()),
                name: name.clone(),
                signature,
            }),
            _ => Err(FqnError::TooManyParts(input.to_string())),
        }
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The name as written, dots and quoting preserved, for interpolation
    /// into SQL text.
    pub fn identifier(&self) -> String {
        let mut result = String::new();
        if let Some(database) = &self.database {
            result.push_str(database);
            result.push('.');
        }
        if let Some(schema) = &self.schema {
            result.push_str(schema);
            result.push('.');
        }
        result.push_str(&self.name);
        if let Some(signature) = &self.signature {
            result.push_str(signature);
        }
        result
    }

    /// The name wrapped in the platform's IDENTIFIER() construct, the form
    /// statements interpolate.
    pub fn sql_identifier(&self) -> String {
        format!("IDENTIFIER('{}')", self.identifier())
    }

    /// Human-friendly dotted form: quoted parts unquoted, bare parts folded
    /// to upper case, signature kept as-is.
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();
        if let Some(database) = &self.database {
            parts.push(unquote_identifier(database));
        }
        if let Some(schema) = &self.schema {
            parts.push(unquote_identifier(schema));
        }
        parts.push(unquote_identifier(&self.name));
        let mut result = parts.join(".");
        if let Some(signature) = &self.signature {
            result.push_str(signature);
        }
        result
    }

    /// Unquoted object name without qualifiers.
    pub fn simple_name(&self) -> String {
        unquote_identifier(&self.name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for QualifiedName {
    type Err = FqnError;

    fn from_str(s: &str) -> Result<Self, FqnError> {
        Self::parse(s)
    }
}

fn unquote_identifier(part: &str) -> String {
    if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
        part[1..part.len() - 1].replace("\"\"", "\"")
    } else {
        part.to_uppercase()
    }
}

/// Split off a trailing call signature: the first `(` outside quotes starts
/// it.
fn split_signature(input: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (idx, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => return (&input[..idx], Some(&input[idx..])),
            _ => {}
        }
    }
    (input, None)
}

/// Split on dots outside quoted sections. Returns `None` when a quoted
/// section never closes.
fn split_parts(body: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // doubled quote stays escaped inside the part
                    current.push('"');
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                    current.push('"');
                }
            }
            '"' => {
                in_quotes = true;
                current.push('"');
            }
            '.' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return None;
    }
    parts.push(current);
    Some(parts)
}

fn is_valid_part(part: &str) -> bool {
    if part.starts_with('"') {
        return part.len() >= 3 && part.ends_with('"');
    }
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_part() {
        let fqn = QualifiedName::parse("my_project").unwrap();
        assert_eq!(fqn.database(), None);
        assert_eq!(fqn.schema(), None);
        assert_eq!(fqn.name(), "my_project");
    }

    #[test]
    fn parses_fully_qualified_quoted_name() {
        let fqn = QualifiedName::parse(r#""DB"."SCH"."ORDERS""#).unwrap();
        assert_eq!(fqn.database(), Some(r#""DB""#));
        assert_eq!(fqn.schema(), Some(r#""SCH""#));
        assert_eq!(fqn.name(), r#""ORDERS""#);
    }

    #[test]
    fn parses_mixed_quoting() {
        let fqn = QualifiedName::parse(r#"db."Sales Data".orders"#).unwrap();
        assert_eq!(fqn.database(), Some("db"));
        assert_eq!(fqn.schema(), Some(r#""Sales Data""#));
        assert_eq!(fqn.name(), "orders");
    }

    #[test]
    fn parses_call_signature() {
        let fqn = QualifiedName::parse("DB.SCH.MY_FN(VARCHAR, NUMBER)").unwrap();
        assert_eq!(fqn.name(), "MY_FN");
        assert_eq!(fqn.signature(), Some("(VARCHAR, NUMBER)"));
        assert_eq!(fqn.display_name(), "DB.SCH.MY_FN(VARCHAR, NUMBER)");
    }

    #[test]
    fn rejects_garbage() {
        assert!(QualifiedName::parse("completely invalid fqn!!!").is_err());
        assert!(QualifiedName::parse("").is_err());
        assert!(QualifiedName::parse("a..b").is_err());
        assert!(QualifiedName::parse(r#""unterminated"#).is_err());
        assert!(QualifiedName::parse("1starts_with_digit").is_err());
    }

    #[test]
    fn rejects_too_many_parts() {
        assert_eq!(
            QualifiedName::parse("a.b.c.d"),
            Err(FqnError::TooManyParts("a.b.c.d".to_string()))
        );
    }

    #[test]
    fn display_name_unquotes_parts() {
        let fqn = QualifiedName::parse(r#""DB"."SCH"."ORDERS""#).unwrap();
        assert_eq!(fqn.display_name(), "DB.SCH.ORDERS");
    }

    #[test]
    fn display_name_uppercases_bare_parts() {
        let fqn = QualifiedName::parse("my_project").unwrap();
        assert_eq!(fqn.display_name(), "MY_PROJECT");
    }

    #[test]
    fn display_name_collapses_doubled_quotes() {
        let fqn = QualifiedName::parse(r#""say ""hi""""#).unwrap();
        assert_eq!(fqn.display_name(), r#"say "hi""#);
    }

    #[test]
    fn identifier_preserves_source_form() {
        let fqn = QualifiedName::parse("my_project").unwrap();
        assert_eq!(fqn.identifier(), "my_project");
        assert_eq!(fqn.sql_identifier(), "IDENTIFIER('my_project')");

        let fqn = QualifiedName::parse(r#"db."Sch".t"#).unwrap();
        assert_eq!(fqn.identifier(), r#"db."Sch".t"#);
    }

    #[test]
    fn builder_constructors() {
        let fqn = QualifiedName::new(r#""TBL""#)
            .with_schema(r#""SCH""#)
            .with_database(r#""DB""#);
        assert_eq!(fqn.display_name(), "DB.SCH.TBL");
    }
}
