//! Top-level subcommand orchestration.
pub mod link;
pub mod status;
pub mod unlink;
pub mod version;

use anyhow::{Context as _, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::{Config, LINKS_FILE, SpecSource, validation};
use crate::error::ConfigError;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger, TaskStatus};
use crate::tasks::{self, Context, Task};

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "DOTLINK_ROOT";

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded configuration, rooted at the canonical repository root.
    pub config: Config,
    /// Home directory symlinks are created in.
    pub home: PathBuf,
}

impl CommandSetup {
    /// Resolve the root and home directories and load the link specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or home directory cannot be determined,
    /// or the link specification cannot be read, parsed, or validated.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let root = resolve_root(global)?;
        let home = resolve_home(global)?;

        log.stage("Loading configuration");
        let config = Config::load(&root, global.config.as_deref())?;
        match &config.source {
            SpecSource::File(path) => log.debug(&format!("read {}", path.display())),
            SpecSource::Builtin => log.debug(&format!("no {LINKS_FILE}, using built-in list")),
        }
        log.info(&format!(
            "{} files, {} config dirs from {}",
            config.spec.files.len(),
            config.spec.config_dirs.len(),
            root.display()
        ));
        log.debug(&format!("home: {}", home.display()));

        let warnings = validation::warnings(&config.spec, &config.root);
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!("  [{}]: {}", warning.item, warning.message));
            }
        }

        Ok(Self { config, home })
    }

    /// Build the task context for this run.
    #[must_use]
    pub fn into_context(self, global: &GlobalOpts, log: &Arc<Logger>) -> Context {
        Context::new(
            Arc::new(self.config),
            Arc::clone(log) as Arc<dyn Log>,
            global.dry_run,
            self.home,
            Arc::new(SystemExecutor),
        )
    }
}

/// Execute tasks in order, stopping at the first failure, then print the
/// summary and bail if any task failed.
///
/// # Errors
///
/// Returns an error if a task recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        if tasks::execute(task, ctx) == TaskStatus::Failed {
            break;
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}

/// Resolve and canonicalize the repository root.
///
/// Order: `--root`, then `$DOTLINK_ROOT`, then the nearest ancestor of the
/// running executable containing `links.toml`, then the current directory.
///
/// # Errors
///
/// Returns an error if no candidate exists or it cannot be canonicalized.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = pick_root(
        global.root.clone(),
        std::env::var_os(ROOT_ENV),
        std::env::current_exe().ok().as_deref(),
        std::env::current_dir().ok(),
    )?;
    dunce::canonicalize(&root)
        .with_context(|| format!("repository root not accessible: {}", root.display()))
}

fn pick_root(
    explicit: Option<PathBuf>,
    env: Option<OsString>,
    exe: Option<&Path>,
    cwd: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(root) = explicit {
        return Ok(root);
    }
    if let Some(root) = env.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    if let Some(found) = exe
        .into_iter()
        .flat_map(Path::ancestors)
        .skip(1)
        .find(|dir| dir.join(LINKS_FILE).is_file())
    {
        return Ok(found.to_path_buf());
    }
    cwd.ok_or(ConfigError::RootNotFound)
}

/// Resolve the home directory: `--home`, else `HOME` (`USERPROFILE` on Windows).
///
/// # Errors
///
/// Returns [`ConfigError::HomeNotSet`] if no home directory is known.
pub fn resolve_home(global: &GlobalOpts) -> Result<PathBuf, ConfigError> {
    let env = if cfg!(target_os = "windows") {
        std::env::var_os("USERPROFILE").or_else(|| std::env::var_os("HOME"))
    } else {
        std::env::var_os("HOME")
    };
    pick_home(global.home.clone(), env)
}

fn pick_home(explicit: Option<PathBuf>, env: Option<OsString>) -> Result<PathBuf, ConfigError> {
    explicit
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .ok_or(ConfigError::HomeNotSet)
}
