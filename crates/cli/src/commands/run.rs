use anyhow::Result;
use emurunner_core::WorkflowKind;

use super::execute_workflow;

pub async fn run_command(main: &str, in_console: bool, dry_run: bool) -> Result<()> {
    execute_workflow(WorkflowKind::Run { in_console }, main, dry_run).await
}
