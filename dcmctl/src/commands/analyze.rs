use clap::Args;
use eyre::Result;

use super::{ProjectSelector, VariableArgs};
use crate::client::HttpSqlClient;
use crate::ops::{context, project, sync};
use crate::reports::{AnalyzeReporter, Reporter, TerminalOutput};

#[derive(Args)]
pub struct AnalyzeCommand {
    #[command(flatten)]
    selector: ProjectSelector,

    #[command(flatten)]
    variables: VariableArgs,
}

impl AnalyzeCommand {
    pub fn run(&self) -> Result<()> {
        let source_directory = self.selector.source_directory();
        let context = context::resolve_with_required_manifest(
            &source_directory,
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let stage = sync::sync_files(&client, &context.project_identifier, &source_directory)?;

        let mut cursor = project::analyze(
            &client,
            &context.project_identifier,
            &stage,
            context.configuration.as_deref(),
            &self.variables.variables,
        )?;

        let mut reporter = AnalyzeReporter::new();
        reporter.process(&mut cursor, &mut TerminalOutput::new())?;
        Ok(())
    }
}
