use clap::Args;
use eyre::Result;

use super::{ProjectSelector, VariableArgs};
use crate::client::HttpSqlClient;
use crate::ops::{context, project, sync};
use crate::reports::{PlanAction, TerminalOutput, process_plan_result};

#[derive(Args)]
pub struct DeployCommand {
    #[command(flatten)]
    selector: ProjectSelector,

    #[command(flatten)]
    variables: VariableArgs,

    /// Alias for the deployment.
    #[arg(long)]
    alias: Option<String>,

    /// Skip the planning step.
    #[arg(long, hide = true)]
    skip_plan: bool,
}

impl DeployCommand {
    pub fn run(&self) -> Result<()> {
        let source_directory = self.selector.source_directory();
        let context = context::resolve_with_required_manifest(
            &source_directory,
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let stage = sync::sync_files(&client, &context.project_identifier, &source_directory)?;

        if self.skip_plan {
            eprintln!("warning: skipping planning step");
        }
        let mut cursor = project::deploy(
            &client,
            &context.project_identifier,
            &stage,
            context.configuration.as_deref(),
            &self.variables.variables,
            self.alias.as_deref(),
            self.skip_plan,
        )?;

        let mut out = TerminalOutput::new();
        process_plan_result(&mut cursor, PlanAction::Deploy, &mut out)?;
        Ok(())
    }
}
