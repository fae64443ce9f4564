//! Named tasks that orchestrate resource changes.
mod context;
pub mod symlinks;
pub mod tools;

pub use context::Context;

use std::path::PathBuf;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Result of a single task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped, with a reason for the summary.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current run.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if a filesystem operation fails or the task's input
    /// is unusable.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Tasks run by the link command, in order.
#[must_use]
pub fn all_link_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(tools::ProbeTools),
        Box::new(symlinks::LinkDotfiles),
    ]
}

/// Tasks run by the unlink command.
#[must_use]
pub fn all_unlink_tasks(restore_from: Option<PathBuf>) -> Vec<Box<dyn Task>> {
    vec![Box::new(symlinks::UnlinkDotfiles::new(restore_from))]
}

/// Tasks run by the status command.
#[must_use]
pub fn all_status_tasks() -> Vec<Box<dyn Task>> {
    vec![Box::new(symlinks::CheckLinks)]
}

/// Execute a task, recording the result in the logger.
///
/// Returns the recorded status so callers can stop at the first failure.
pub fn execute(task: &dyn Task, ctx: &Context) -> TaskStatus {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return TaskStatus::NotApplicable;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            TaskStatus::Ok
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            TaskStatus::Skipped
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
            TaskStatus::DryRun
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            TaskStatus::Failed
        }
    }
}
