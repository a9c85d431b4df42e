use clap::Args;
use dcmctl_core::QualifiedName;
use eyre::Result;

use super::{ProjectSelector, VariableArgs};
use crate::client::HttpSqlClient;
use crate::ops::{context, project, sync};
use crate::reports::{TerminalOutput, render_raw_rows};

#[derive(Args)]
pub struct PreviewCommand {
    #[command(flatten)]
    selector: ProjectSelector,

    /// Qualified name of the table, view, or dynamic table to preview.
    #[arg(long = "object", value_name = "NAME")]
    object: QualifiedName,

    /// The maximum number of rows to return.
    #[arg(long)]
    limit: Option<u64>,

    #[command(flatten)]
    variables: VariableArgs,
}

impl PreviewCommand {
    pub fn run(&self) -> Result<()> {
        let source_directory = self.selector.source_directory();
        let context = context::resolve_with_required_manifest(
            &source_directory,
            self.selector.identifier.as_ref(),
            self.selector.target.as_deref(),
        )?;

        let client = HttpSqlClient::from_env()?;
        let stage = sync::sync_files(&client, &context.project_identifier, &source_directory)?;

        let mut cursor = project::preview(
            &client,
            &context.project_identifier,
            &self.object,
            &stage,
            context.configuration.as_deref(),
            &self.variables.variables,
            self.limit,
        )?;
        render_raw_rows(&mut cursor, &mut TerminalOutput::new());
        Ok(())
    }
}
