use anyhow::Result;
use emurunner_core::WorkflowKind;

use super::execute_workflow;

pub async fn debug_command(main: &str, dry_run: bool) -> Result<()> {
    execute_workflow(WorkflowKind::Debug, main, dry_run).await
}
