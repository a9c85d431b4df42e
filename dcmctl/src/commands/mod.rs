mod analyze;
mod completions;
mod create;
mod deploy;
mod deployments;
mod describe;
mod drop;
mod plan;
mod preview;
mod refresh;

use std::path::PathBuf;

use analyze::AnalyzeCommand;
use clap::{Args, Parser, Subcommand};
use completions::CompletionsCommand;
use create::CreateCommand;
use dcmctl_core::QualifiedName;
use deploy::DeployCommand;
use deployments::DeploymentsCommand;
use describe::DescribeCommand;
use drop::DropCommand;
use eyre::Result;
use plan::PlanCommand;
use preview::PreviewCommand;
use refresh::RefreshCommand;
use test::TestCommand;

#[derive(Parser)]
#[command(name = "dcmctl")]
#[command(version)]
#[command(about = "Manage declarative DCM projects in a remote SQL data platform")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Create(cmd) => cmd.run(),
            Commands::Plan(cmd) => cmd.run(),
            Commands::Deploy(cmd) => cmd.run(),
            Commands::Analyze(cmd) => cmd.run(),
            Commands::Refresh(cmd) => cmd.run(),
            Commands::Test(cmd) => cmd.run(),
            Commands::Preview(cmd) => cmd.run(),
            Commands::Describe(cmd) => cmd.run(),
            Commands::Drop(cmd) => cmd.run(),
            Commands::Deployments(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a DCM project in the remote platform
    Create(CreateCommand),

    /// Validate a deployment without executing it
    Plan(PlanCommand),

    /// Apply the project's definitions to the remote platform
    Deploy(DeployCommand),

    /// Analyze project definitions for errors
    Analyze(AnalyzeCommand),

    /// Refresh the dynamic tables defined in the project
    Refresh(RefreshCommand),

    /// Evaluate all expectations defined in the project
    Test(TestCommand),

    /// Preview rows from a table, view, or dynamic table
    Preview(PreviewCommand),

    /// Describe a DCM project
    Describe(DescribeCommand),

    /// Drop a DCM project
    Drop(DropCommand),

    /// Manage deployments of a DCM project
    Deployments(DeploymentsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Arguments shared by every command that addresses a project.
#[derive(Args)]
pub(crate) struct ProjectSelector {
    /// Identifier of the DCM project, e.g. MY_PROJECT or DB.SCHEMA.MY_PROJECT.
    /// Can be omitted when a manifest target provides one.
    pub identifier: Option<QualifiedName>,

    /// Local directory containing the project files. Defaults to the current
    /// directory.
    #[arg(long = "from", value_name = "DIR")]
    pub from: Option<PathBuf>,

    /// Target profile from manifest.yml. Uses default_target if omitted.
    #[arg(long)]
    pub target: Option<String>,
}

impl ProjectSelector {
    pub fn source_directory(&self) -> PathBuf {
        self.from.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Execution-context variables shared by the EXECUTE-style commands.
#[derive(Args)]
pub(crate) struct VariableArgs {
    /// Variables for the execution context, e.g. -D "key=value". Repeatable.
    #[arg(short = 'D', long = "variable", value_name = "KEY=VALUE")]
    pub variables: Vec<String>,
}
