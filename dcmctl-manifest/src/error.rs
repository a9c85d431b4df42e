use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to keep the happy path small).
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The manifest file does not exist. Some call sites treat this as
    /// "no manifest" and fall back to an explicit identifier; others surface
    /// it to the user as-is.
    #[error("manifest.yml was not found in directory {}.", directory.display())]
    #[diagnostic(code(dcmctl::manifest_not_found))]
    NotFound { directory: PathBuf },

    /// The manifest file exists but is not valid YAML.
    #[error("Manifest file is not valid YAML.")]
    #[diagnostic(code(dcmctl::manifest_parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_yaml::Error,
    },

    /// Structurally broken manifest: empty file, bad version, bad type.
    #[error("{message}")]
    #[diagnostic(code(dcmctl::invalid_manifest))]
    Invalid { message: String },

    /// Semantically invalid target or configuration reference.
    #[error("{message}")]
    #[diagnostic(code(dcmctl::manifest_configuration))]
    Configuration { message: String },
}

impl Error {
    pub fn not_found(directory: impl AsRef<Path>) -> Box<Self> {
        Box::new(Error::NotFound {
            directory: directory.as_ref().to_path_buf(),
        })
    }

    /// Create a parse error from a serde_yaml error with source context.
    pub fn parse(source: serde_yaml::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source
            .location()
            .map(|location| SourceSpan::from(location.index()..location.index() + 1));
        Box::new(Error::Parse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    pub fn invalid(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Invalid {
            message: message.into(),
        })
    }

    pub fn configuration(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Configuration {
            message: message.into(),
        })
    }

    /// Whether this is the recoverable "no manifest here" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
