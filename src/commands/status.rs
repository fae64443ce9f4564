//! Status command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks;

/// Run the status command. Never modifies the filesystem.
///
/// # Errors
///
/// Returns an error if configuration loading fails or a destination cannot
/// be inspected.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let ctx = setup.into_context(global, log);
    let tasks = tasks::all_status_tasks();
    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log)
}
