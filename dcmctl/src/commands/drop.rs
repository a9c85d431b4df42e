use clap::Args;
use eyre::Result;

use super::ProjectSelector;
use crate::client::HttpSqlClient;
use crate::ops::{context, project};
use crate::reports::{TerminalOutput, render_raw_rows};

#[derive(Args)]
pub struct DropCommand {
    #[command(flatten)]
    selector: ProjectSelector,

    /// Do nothing if the project does not exist.
    #[arg(long)]
    if_exists: bool,
}

impl DropCommand {
    pub fn run(&self) -> Result<()> {
        let context = context::resolve_with_optional_manifest(
            &self.selector.source_directory(),
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let mut cursor = project::drop(&client, &context.project_identifier, self.if_exists)?;
        render_raw_rows(&mut cursor, &mut TerminalOutput::new());
        Ok(())
    }
}
