use clap::Args;
use eyre::Result;

use super::ProjectSelector;
use crate::client::HttpSqlClient;
use crate::ops::{context, project};
use crate::reports::{RefreshReporter, Reporter, TerminalOutput};

#[derive(Args)]
pub struct RefreshCommand {
    #[command(flatten)]
    selector: ProjectSelector,
}

impl RefreshCommand {
    pub fn run(&self) -> Result<()> {
        let context = context::resolve_with_optional_manifest(
            &self.selector.source_directory(),
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let mut cursor = project::refresh(&client, &context.project_identifier)?;

        let mut reporter = RefreshReporter::new();
        reporter.process(&mut cursor, &mut TerminalOutput::new())?;
        Ok(())
    }
}
