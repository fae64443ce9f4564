use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::exec::Executor;
use crate::linker::LinkPlan;
use crate::logging::Log;

/// Shared context for task execution.
pub struct Context {
    /// Loaded link specification and repository root.
    pub config: Arc<Config>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Home directory that symlinks are created in.
    pub home: PathBuf,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Start of the run; names the backup directory.
    pub timestamp: DateTime<Local>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("executor", &self.executor)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl Context {
    /// Creates a new context stamped with the current local time.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        log: Arc<dyn Log>,
        dry_run: bool,
        home: PathBuf,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            config,
            log,
            dry_run,
            home,
            executor,
            timestamp: Local::now(),
        }
    }

    /// Root directory of the dotfiles repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Resolve the link specification against the root and home directory.
    #[must_use]
    pub fn plan(&self) -> LinkPlan {
        LinkPlan::new(self.root(), &self.home, &self.config.spec)
    }
}
