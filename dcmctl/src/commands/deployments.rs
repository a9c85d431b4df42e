use clap::{Args, Subcommand};
use eyre::Result;

use super::ProjectSelector;
use crate::client::HttpSqlClient;
use crate::ops::{context, project};
use crate::reports::{TerminalOutput, render_raw_rows};

#[derive(Args)]
pub struct DeploymentsCommand {
    #[command(subcommand)]
    command: DeploymentsSubcommand,
}

#[derive(Subcommand)]
enum DeploymentsSubcommand {
    /// List deployments of the project
    List(ListCommand),

    /// Drop a deployment from the project
    Drop(DropDeploymentCommand),
}

impl DeploymentsCommand {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            DeploymentsSubcommand::List(cmd) => cmd.run(),
            DeploymentsSubcommand::Drop(cmd) => cmd.run(),
        }
    }
}

#[derive(Args)]
struct ListCommand {
    #[command(flatten)]
    selector: ProjectSelector,
}

impl ListCommand {
    fn run(&self) -> Result<()> {
        let context = context::resolve_with_optional_manifest(
            &self.selector.source_directory(),
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let mut cursor = project::list_deployments(&client, &context.project_identifier)?;
        render_raw_rows(&mut cursor, &mut TerminalOutput::new());
        Ok(())
    }
}

#[derive(Args)]
struct DropDeploymentCommand {
    #[command(flatten)]
    selector: ProjectSelector,

    /// Name or alias of the deployment to drop. For names containing '$',
    /// use single quotes to prevent shell expansion (e.g. 'DEPLOYMENT$1').
    #[arg(long, value_name = "NAME")]
    deployment: String,

    /// Do nothing if the deployment does not exist.
    #[arg(long)]
    if_exists: bool,
}

impl DropDeploymentCommand {
    fn run(&self) -> Result<()> {
        let context = context::resolve_with_optional_manifest(
            &self.selector.source_directory(),
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;
        let project_id = &context.project_identifier;

        // A bare "DEPLOYMENT" is usually "DEPLOYMENT$n" mangled by the shell.
        if self.deployment.eq_ignore_ascii_case("DEPLOYMENT") {
            eprintln!(
                "warning: deployment name '{}' might be truncated due to shell expansion. \
                 If you meant a name like 'DEPLOYMENT$1', try using single quotes: 'DEPLOYMENT$1'.",
                self.deployment
            );
        }

        let client = HttpSqlClient::from_env()?;
        project::drop_deployment(&client, project_id, &self.deployment, self.if_exists)?;
        println!(
            "Deployment '{}' dropped from DCM Project '{project_id}'.",
            self.deployment
        );
        Ok(())
    }
}
