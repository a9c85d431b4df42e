//! Target-context resolution policies shared by the commands.

use std::path::Path;

use dcmctl_core::{CliError, QualifiedName};
use dcmctl_manifest::{Error as ManifestError, Manifest, TargetContext};

/// Resolve project identity and configuration from the manifest target.
///
/// An explicit identifier always wins over the target's `project_name`; the
/// target's templating configuration applies either way. Identity and
/// configuration never blend.
pub fn resolve_target_context(
    identifier: Option<&QualifiedName>,
    target: Option<&str>,
    source_directory: &Path,
) -> Result<TargetContext, Box<ManifestError>> {
    let manifest = Manifest::load(source_directory)?;
    let effective = manifest.get_effective_target(target)?;

    let project_identifier = match identifier {
        Some(explicit) => explicit.clone(),
        None => QualifiedName::parse(&effective.project_name).map_err(|error| {
            ManifestError::configuration(format!(
                "Target '{}' has an invalid project_name: {error}.",
                effective.name
            ))
        })?,
    };

    Ok(TargetContext {
        project_identifier,
        configuration: effective.templating_config.clone(),
    })
}

/// Policy for commands that cannot work without a manifest.
pub fn resolve_with_required_manifest(
    source_directory: &Path,
    identifier: Option<&QualifiedName>,
    target: Option<&str>,
) -> Result<TargetContext, CliError> {
    resolve_target_context(identifier, target, source_directory)
        .map_err(|error| CliError::new(error.to_string()))
}

/// Policy for commands that can fall back to an explicit identifier when no
/// manifest exists. `--target` is rejected in that fallback since there is
/// no manifest to resolve it against.
pub fn resolve_with_optional_manifest(
    source_directory: &Path,
    identifier: Option<&QualifiedName>,
    target: Option<&str>,
) -> Result<TargetContext, CliError> {
    match resolve_target_context(identifier, target, source_directory) {
        Ok(context) => Ok(context),
        Err(error) if error.is_not_found() => {
            let Some(identifier) = identifier else {
                return Err(CliError::new(
                    "No manifest.yml found. Please provide a project identifier or create a manifest.yml file.",
                ));
            };
            if let Some(target) = target {
                return Err(CliError::new(format!(
                    "Cannot use --target '{target}' without a valid manifest.yml."
                )));
            }
            Ok(TargetContext {
                project_identifier: identifier.clone(),
                configuration: None,
            })
        }
        Err(error) => Err(CliError::new(error.to_string())),
    }
}
