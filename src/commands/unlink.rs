//! Unlink command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, UnlinkOpts};
use crate::logging::Logger;
use crate::tasks;

/// Run the unlink command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, the restore directory
/// does not exist, or a symlink cannot be removed.
pub fn run(global: &GlobalOpts, opts: &UnlinkOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let ctx = setup.into_context(global, log);
    let tasks = tasks::all_unlink_tasks(opts.restore.clone());
    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log)
}
