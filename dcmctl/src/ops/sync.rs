//! Local artifact collection and upload to the project staging area.

use std::path::{Path, PathBuf};

use dcmctl_core::QualifiedName;
use dcmctl_manifest::MANIFEST_FILE_NAME;
use eyre::{Context, Result};
use tracing::info;
use walkdir::WalkDir;

use crate::client::SqlClient;

const SOURCES_FOLDER: &str = "sources";

/// Upload the manifest and the `sources/` tree to a temporary stage and
/// return the stage reference for SQL interpolation.
pub fn sync_files(
    client: &dyn SqlClient,
    project: &QualifiedName,
    source_directory: &Path,
) -> Result<String> {
    let stage = stage_name(project);
    let artifacts = collect_artifacts(source_directory)?;
    info!(stage = %stage, count = artifacts.len(), "uploading definition files");
    for relative in &artifacts {
        let contents = std::fs::read(source_directory.join(relative))
            .wrap_err_with(|| format!("could not read {}", relative.display()))?;
        client.upload_file(&stage, relative, &contents)?;
    }
    Ok(stage)
}

/// Temporary stage tied to the project name.
pub fn stage_name(project: &QualifiedName) -> String {
    format!("DCM_{}_TMP_STAGE", project.simple_name().to_uppercase())
}

/// Everything that ships to the stage: the manifest plus all files under
/// `sources/`, as paths relative to the project root.
pub fn collect_artifacts(source_directory: &Path) -> Result<Vec<PathBuf>> {
    let mut artifacts = vec![PathBuf::from(MANIFEST_FILE_NAME)];

    let sources = source_directory.join(SOURCES_FOLDER);
    if sources.is_dir() {
        for entry in WalkDir::new(&sources).sort_by_file_name() {
            let entry = entry.wrap_err("could not walk sources directory")?;
            if entry.file_type().is_file() {
                let relative = entry
                    .path()
                    .strip_prefix(source_directory)
                    .wrap_err("artifact outside the project root")?;
                artifacts.push(relative.to_path_buf());
            }
        }
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingClient;

    fn project_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE_NAME), "manifest_version: 2\n").unwrap();
        std::fs::create_dir_all(dir.path().join("sources/definitions")).unwrap();
        std::fs::write(dir.path().join("sources/definitions/customers.sql"), "select 1").unwrap();
        std::fs::write(dir.path().join("sources/schema.sql"), "select 2").unwrap();
        // Files outside sources/ are not artifacts.
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();
        dir
    }

    #[test]
    fn collects_manifest_and_sources_tree() {
        let dir = project_dir();

        let artifacts = collect_artifacts(dir.path()).unwrap();

        assert_eq!(
            artifacts,
            vec![
                PathBuf::from("manifest.yml"),
                PathBuf::from("sources/definitions/customers.sql"),
                PathBuf::from("sources/schema.sql"),
            ]
        );
    }

    #[test]
    fn manifest_alone_when_no_sources_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE_NAME), "manifest_version: 2\n").unwrap();

        let artifacts = collect_artifacts(dir.path()).unwrap();
        assert_eq!(artifacts, vec![PathBuf::from("manifest.yml")]);
    }

    #[test]
    fn stage_name_derives_from_project() {
        let project = QualifiedName::parse("db.schema.fooBar").unwrap();
        assert_eq!(stage_name(&project), "DCM_FOOBAR_TMP_STAGE");

        let quoted = QualifiedName::parse("\"fooBar\"").unwrap();
        assert_eq!(stage_name(&quoted), "DCM_FOOBAR_TMP_STAGE");
    }

    #[test]
    fn uploads_every_artifact_to_the_stage() {
        let dir = project_dir();
        let client = RecordingClient::new();
        let project = QualifiedName::parse("fooBar").unwrap();

        let stage = sync_files(&client, &project, dir.path()).unwrap();

        assert_eq!(stage, "DCM_FOOBAR_TMP_STAGE");
        let uploads = client.uploads.borrow();
        assert_eq!(uploads.len(), 3);
        assert!(uploads.iter().all(|(stage, _)| stage == "DCM_FOOBAR_TMP_STAGE"));
        assert!(
            uploads
                .iter()
                .any(|(_, path)| path == &PathBuf::from("sources/schema.sql"))
        );
    }
}
