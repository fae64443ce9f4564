//! Link command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks;

/// Run the link command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any task fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("dotlink {}", super::version::version()));

    let setup = super::CommandSetup::init(global, log)?;
    let ctx = setup.into_context(global, log);
    let tasks = tasks::all_link_tasks();
    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log)
}
