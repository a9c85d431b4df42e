//! Manifest document model and target resolution.

use std::path::Path;
use std::str::FromStr;

use dcmctl_core::QualifiedName;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{Error, Result};

pub const MANIFEST_FILE_NAME: &str = "manifest.yml";
pub const PROJECT_TYPE: &str = "dcm_project";
pub const SUPPORTED_MANIFEST_VERSION: i64 = 2;

type YamlMap = IndexMap<String, serde_yaml::Value>;

#[derive(Debug, Deserialize)]
struct RawManifest {
    manifest_version: Option<serde_yaml::Value>,
    #[serde(rename = "type")]
    project_type: Option<String>,
    default_target: Option<String>,
    #[serde(default)]
    targets: IndexMap<String, RawTarget>,
    templating: Option<RawTemplating>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    #[serde(default)]
    project_name: String,
    templating_config: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTemplating {
    #[serde(default)]
    defaults: YamlMap,
    #[serde(default)]
    configurations: IndexMap<String, YamlMap>,
}

/// A named deployment environment from the manifest. Names and referenced
/// configuration names are stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub project_name: String,
    pub templating_config: Option<String>,
}

/// Templating defaults plus named configurations (keys upper-cased).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Templating {
    pub defaults: YamlMap,
    pub configurations: IndexMap<String, YamlMap>,
}

/// Parsed and validated manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub manifest_version: i64,
    pub project_type: String,
    pub default_target: Option<String>,
    pub targets: IndexMap<String, Target>,
    pub templating: Templating,
}

/// Identity and configuration resolved for one command invocation.
///
/// An explicit identifier overrides the target's `project_name`; the
/// target's templating configuration still applies. The two never blend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetContext {
    pub project_identifier: QualifiedName,
    pub configuration: Option<String>,
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, MANIFEST_FILE_NAME)
    }
}

impl Manifest {
    /// Load `manifest.yml` from the given project directory.
    pub fn load(source_directory: impl AsRef<Path>) -> Result<Self> {
        let directory = source_directory.as_ref();
        let path = directory.join(MANIFEST_FILE_NAME);
        info!(path = %path.display(), "loading project manifest");
        if !path.exists() {
            debug!(path = %path.display(), "manifest file not found");
            return Err(Error::not_found(directory));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| {
            Error::invalid(format!("Manifest file could not be read: {source}."))
        })?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    /// Parse from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(Error::invalid("Manifest file is empty or invalid."));
        }

        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| Error::parse(e, content, filename))?;
        if value.is_null() {
            return Err(Error::invalid("Manifest file is empty or invalid."));
        }

        let raw: RawManifest =
            serde_yaml::from_value(value).map_err(|e| Error::parse(e, content, filename))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawManifest) -> Result<Self> {
        let manifest_version = parse_version(raw.manifest_version)?;

        let mut targets = IndexMap::new();
        for (name, target) in raw.targets {
            let name = name.to_uppercase();
            targets.insert(
                name.clone(),
                Target {
                    name,
                    project_name: target.project_name,
                    templating_config: target.templating_config.map(|c| c.to_uppercase()),
                },
            );
        }

        let mut default_target = raw.default_target.map(|t| t.to_uppercase());
        // A manifest with exactly one target does not need an explicit default.
        if default_target.is_none() && targets.len() == 1 {
            default_target = targets.keys().next().cloned();
            info!(
                default_target = default_target.as_deref(),
                "derived default target from single-target manifest"
            );
        }

        let templating = raw.templating.unwrap_or_default();
        let manifest = Self {
            manifest_version,
            project_type: raw.project_type.unwrap_or_default().to_lowercase(),
            default_target,
            targets,
            templating: Templating {
                defaults: templating.defaults,
                configurations: templating
                    .configurations
                    .into_iter()
                    .map(|(name, values)| (name.to_uppercase(), values))
                    .collect(),
            },
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.project_type.is_empty() {
            return Err(Error::invalid(format!(
                "Manifest file type is undefined. Expected {PROJECT_TYPE}."
            )));
        }
        if self.project_type != PROJECT_TYPE {
            return Err(Error::invalid(format!(
                "Manifest file is defined for type {}. Expected {PROJECT_TYPE}.",
                self.project_type
            )));
        }
        if self.manifest_version != SUPPORTED_MANIFEST_VERSION {
            return Err(Error::invalid(format!(
                "Manifest version {} is not supported. Expected version {SUPPORTED_MANIFEST_VERSION}.",
                self.manifest_version
            )));
        }
        Ok(())
    }

    /// Look up a target by name, case-insensitively. The target's
    /// templating configuration reference is checked here, not at parse
    /// time.
    pub fn get_target(&self, target_name: &str) -> Result<&Target> {
        let target_name = target_name.to_uppercase();
        debug!(target = %target_name, "resolving manifest target");
        let Some(target) = self.targets.get(&target_name) else {
            debug!(target = %target_name, "target not found in manifest");
            return Err(Error::configuration(format!(
                "Target '{target_name}' not found in manifest."
            )));
        };
        if let Some(configuration) = &target.templating_config {
            if !self.templating.configurations.contains_key(configuration) {
                debug!(
                    target = %target.name,
                    configuration = %configuration,
                    "target references unknown templating configuration"
                );
                return Err(Error::configuration(format!(
                    "Target '{}' references unknown configuration '{}'.",
                    target.name, configuration
                )));
            }
        }
        Ok(target)
    }

    /// The requested target, or the manifest's default when none is given.
    pub fn get_effective_target(&self, target_name: Option<&str>) -> Result<&Target> {
        if let Some(name) = target_name {
            return self.get_target(name);
        }
        if let Some(default) = &self.default_target {
            return self.get_target(default);
        }
        debug!("no target specified and no default target configured");
        Err(Error::configuration(
            "No target specified and no default_target defined in manifest.",
        ))
    }
}

fn parse_version(value: Option<serde_yaml::Value>) -> Result<i64> {
    use serde_yaml::Value;

    let Some(value) = value else {
        return Err(Error::invalid("Manifest version is undefined."));
    };
    let version = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    version.ok_or_else(|| {
        Error::invalid(format!(
            "Manifest version '{}' is not valid. Expected an integer.",
            display_scalar(&value)
        ))
    })
}

fn display_scalar(value: &serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("{other:?}"),
    }
}
