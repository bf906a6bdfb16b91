pub mod check;
pub mod debug;
pub mod docgen;
pub mod init;
pub mod run;
pub mod targets;

pub use check::check_command;
pub use debug::debug_command;
pub use docgen::docgen_command;
pub use init::init_command;
pub use run::run_command;
pub use targets::targets_command;

use anyhow::{Context, Result};
use emurunner_core::{WorkflowKind, WorkflowReport};
use tracing::{debug, info};

use crate::display::print_launches;
use crate::session::Session;

/// Run a workflow from the current directory and report its outcome
pub(crate) async fn execute_workflow(kind: WorkflowKind, main: &str, dry_run: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let session = Session::open(&cwd, dry_run)?;

    debug!("Running {} for {main}", kind.name());
    let report = session.execute(kind, main).await?;
    report_outcome(&session, &report).await;

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn report_outcome(session: &Session, report: &WorkflowReport) {
    if session.is_dry_run() {
        print_launches(&session.recorded_launches());
        return;
    }

    let jobs = match &report.error {
        Some(error) => {
            debug!("{} stopped in {:?}: {}", report.kind.name(), report.history, error.kind());
            session.cancel_jobs().await
        }
        None => session.wait_for_jobs().await,
    };

    for job in jobs {
        match job.exit_code {
            Some(code) => info!("{} exited with status {code}", job.label),
            None => info!("{} ended without an exit status", job.label),
        }
    }
}
