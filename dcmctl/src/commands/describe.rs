use clap::Args;
use eyre::Result;

use super::ProjectSelector;
use crate::client::HttpSqlClient;
use crate::ops::{context, project};
use crate::reports::{TerminalOutput, render_raw_rows};

#[derive(Args)]
pub struct DescribeCommand {
    #[command(flatten)]
    selector: ProjectSelector,
}

impl DescribeCommand {
    pub fn run(&self) -> Result<()> {
        let context = context::resolve_with_optional_manifest(
            &self.selector.source_directory(),
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let mut cursor = project::describe(&client, &context.project_identifier)?;
        render_raw_rows(&mut cursor, &mut TerminalOutput::new());
        Ok(())
    }
}
