use clap::Args;
use dcmctl_core::CliError;
use eyre::Result;

use super::ProjectSelector;
use crate::client::HttpSqlClient;
use crate::ops::{context, project};

#[derive(Args)]
pub struct CreateCommand {
    #[command(flatten)]
    selector: ProjectSelector,

    /// Do nothing if the project already exists.
    #[arg(long)]
    if_not_exists: bool,
}

impl CreateCommand {
    pub fn run(&self) -> Result<()> {
        let context = context::resolve_with_optional_manifest(
            &self.selector.source_directory(),
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;
        let project_id = &context.project_identifier;

        let client = HttpSqlClient::from_env()?;
        if project::exists(&client, project_id)? {
            let message = format!("DCM Project '{project_id}' already exists.");
            if self.if_not_exists {
                println!("{message}");
                return Ok(());
            }
            return Err(CliError::new(message).into());
        }

        project::create(&client, project_id)?;
        println!("DCM Project '{project_id}' successfully created.");
        Ok(())
    }
}
