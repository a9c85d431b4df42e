use clap::Args;
use eyre::Result;

use super::{ProjectSelector, VariableArgs};
use crate::client::HttpSqlClient;
use crate::ops::{context, project, sync};
use crate::reports::{PlanAction, TerminalOutput, process_plan_result};

#[derive(Args)]
pub struct PlanCommand {
    #[command(flatten)]
    selector: ProjectSelector,

    #[command(flatten)]
    variables: VariableArgs,
}

impl PlanCommand {
    pub fn run(&self) -> Result<()> {
        let source_directory = self.selector.source_directory();
        let context = context::resolve_with_required_manifest(
            &source_directory,
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let stage = sync::sync_files(&client, &context.project_identifier, &source_directory)?;

        let mut cursor = project::plan(
            &client,
            &context.project_identifier,
            &stage,
            context.configuration.as_deref(),
            &self.variables.variables,
        )?;

        let mut out = TerminalOutput::new();
        process_plan_result(&mut cursor, PlanAction::Plan, &mut out)?;
        Ok(())
    }
}
