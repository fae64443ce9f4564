//! Tasks that link, unlink, and check the configured dotfiles.
use anyhow::{Result, bail};
use std::path::PathBuf;

use super::{Context, Task, TaskResult};
use crate::linker::{self, LinkOptions, LinkReport};
use crate::resources::backup::BackupOutcome;
use crate::resources::{LinkResult, Resource as _, ResourceState, UnlinkResult};

/// Mirror every configured entry into the home directory.
#[derive(Debug)]
pub struct LinkDotfiles;

impl Task for LinkDotfiles {
    fn name(&self) -> &str {
        "Link dotfiles"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.spec.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let plan = ctx.plan();
        let opts = LinkOptions {
            dry_run: ctx.dry_run,
            timestamp: ctx.timestamp,
        };
        let report = linker::link(&plan, &opts)?;

        for outcome in &report.outcomes {
            let target = outcome.target.display();
            if report.dry_run {
                ctx.log
                    .dry_run(&format!("would {}: {target}", planned_action(outcome.result)));
            } else {
                ctx.log.info(&format!("{target}: {}", outcome.result));
            }
        }

        log_report(ctx, &report);

        if report.dry_run {
            Ok(TaskResult::DryRun)
        } else {
            Ok(TaskResult::Ok)
        }
    }
}

const fn planned_action(result: LinkResult) -> &'static str {
    match result {
        LinkResult::Skipped => "skip (source missing)",
        LinkResult::BackedUpAndLinked => "back up and link",
        LinkResult::SymlinkReplaced => "replace symlink",
        LinkResult::Linked => "link",
        LinkResult::Covered => "leave (covered by linked parent)",
    }
}

fn log_report(ctx: &Context, report: &LinkReport) {
    let verb = if report.dry_run { "would link" } else { "linked" };
    ctx.log.info(&format!(
        "{} {verb}, {} backed up, {} skipped, {} covered",
        report.changed(),
        report.count(LinkResult::BackedUpAndLinked),
        report.count(LinkResult::Skipped),
        report.count(LinkResult::Covered),
    ));

    match &report.backup {
        BackupOutcome::Kept { path, entries } => {
            ctx.log
                .info(&format!("backup: {} ({entries} entries)", path.display()));
        }
        BackupOutcome::Removed { path } => {
            ctx.log.info(&format!(
                "backup: {} removed (nothing displaced)",
                path.display()
            ));
        }
        BackupOutcome::NotCreated => {}
    }
}

/// Remove symlinks created by [`LinkDotfiles`], optionally restoring the
/// originals from a backup directory.
#[derive(Debug, Default)]
pub struct UnlinkDotfiles {
    restore_from: Option<PathBuf>,
}

impl UnlinkDotfiles {
    /// Create the task; `restore_from` names a `.dotfiles_backup_*` directory.
    #[must_use]
    pub const fn new(restore_from: Option<PathBuf>) -> Self {
        Self { restore_from }
    }
}

impl Task for UnlinkDotfiles {
    fn name(&self) -> &str {
        "Unlink dotfiles"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.spec.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let restore = self.restore_from.as_deref();
        if let Some(dir) = restore
            && !dir.is_dir()
        {
            bail!("backup directory not found: {}", dir.display());
        }

        let mut removed = 0u32;
        let mut restored = 0u32;
        let mut untouched = 0u32;

        for resource in ctx.plan().resources() {
            let target = resource.target.display();
            if ctx.dry_run {
                if resource.is_linked() {
                    match resource.backup_copy(restore) {
                        Some(saved) => ctx.log.dry_run(&format!(
                            "would remove {target} and restore {}",
                            saved.display()
                        )),
                        None => ctx.log.dry_run(&format!("would remove {target}")),
                    }
                    removed += 1;
                } else {
                    untouched += 1;
                }
                continue;
            }

            let result = resource.remove(restore)?;
            match result {
                UnlinkResult::Removed => removed += 1,
                UnlinkResult::Restored => restored += 1,
                UnlinkResult::NotLinked => {
                    ctx.log.debug(&format!("{target}: {result}"));
                    untouched += 1;
                    continue;
                }
            }
            ctx.log.info(&format!("{target}: {result}"));
        }

        if ctx.dry_run {
            ctx.log.info(&format!(
                "{removed} would be removed, {untouched} not linked"
            ));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info(&format!(
            "{} removed ({restored} restored), {untouched} not linked",
            removed + restored
        ));
        Ok(TaskResult::Ok)
    }
}

/// Report the state of every configured entry without changing anything.
#[derive(Debug)]
pub struct CheckLinks;

impl Task for CheckLinks {
    fn name(&self) -> &str {
        "Check links"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.spec.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut correct = 0u32;
        let mut pending = 0u32;
        let mut invalid = 0u32;

        for resource in ctx.plan().resources() {
            let target = resource.target.display();
            match resource.current_state()? {
                ResourceState::Correct => {
                    ctx.log.info(&format!("ok       {target}"));
                    correct += 1;
                }
                ResourceState::Missing => {
                    ctx.log.info(&format!("missing  {target}"));
                    pending += 1;
                }
                ResourceState::Incorrect { current } => {
                    ctx.log.warn(&format!("{target}: {current}"));
                    pending += 1;
                }
                ResourceState::Invalid { reason } => {
                    ctx.log.debug(&format!("{target}: {reason}"));
                    invalid += 1;
                }
            }
        }

        ctx.log.info(&format!(
            "{correct} linked, {pending} need linking, {invalid} without source"
        ));
        Ok(TaskResult::Ok)
    }
}

#[cfg(all(test, unix))]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::{Config, LinkSpec};
    use crate::logging::TaskStatus;
    use crate::tasks::execute;
    use crate::tasks::test_helpers::make_context;
    use std::path::Path;

    fn setup(spec: LinkSpec) -> (tempfile::TempDir, PathBuf, PathBuf, Config) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        let home = dir.path().join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        let config = Config::from_spec(&root, spec);
        (dir, root, home, config)
    }

    fn backups(home: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(home)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(".dotfiles_backup_"))
            })
            .collect()
    }

    #[test]
    fn should_run_false_when_spec_empty() {
        let (_dir, _root, home, config) = setup(LinkSpec::default());
        let (ctx, _log) = make_context(config, home);
        assert!(!LinkDotfiles.should_run(&ctx));
        assert!(!UnlinkDotfiles::default().should_run(&ctx));
        assert!(!CheckLinks.should_run(&ctx));
    }

    #[test]
    fn link_creates_symlinks_and_reports_ok() {
        let (_dir, root, home, config) = setup(LinkSpec::new([".zshrc"], [""; 0]));
        std::fs::write(root.join(".zshrc"), "").unwrap();
        let (ctx, log) = make_context(config, home.clone());

        assert_eq!(execute(&LinkDotfiles, &ctx), TaskStatus::Ok);
        assert_eq!(std::fs::read_link(home.join(".zshrc")).unwrap(), root.join(".zshrc"));
        assert_eq!(log.failure_count(), 0);
        assert!(backups(&home).is_empty());
    }

    #[test]
    fn skipped_entries_and_removed_backup_are_reported_at_info() {
        use crate::logging::{Log, isolated_logger};
        use crate::tasks::test_helpers::StubExecutor;
        use std::sync::Arc;

        let (_dir, _root, home, config) = setup(LinkSpec::new([".nonexistent"], [""; 0]));
        let (log, _tmp, _guard) = isolated_logger();
        let log_file = log.log_path().unwrap().to_path_buf();
        let ctx = Context::new(
            Arc::new(config),
            Arc::new(log) as Arc<dyn Log>,
            false,
            home,
            Arc::new(StubExecutor::default()),
        );

        assert_eq!(LinkDotfiles.run(&ctx).unwrap(), TaskResult::Ok);

        let contents = std::fs::read_to_string(log_file).unwrap();
        let line = |needle: &str| {
            contents
                .lines()
                .find(|l| l.contains(needle))
                .unwrap_or_else(|| panic!("no line with {needle:?} in:\n{contents}"))
                .to_string()
        };
        let skipped = line(".nonexistent: skipped (source missing)");
        assert!(!skipped.contains("[debug]"), "got: {skipped}");
        let removed = line("removed (nothing displaced)");
        assert!(removed.contains(".dotfiles_backup_"), "got: {removed}");
        assert!(!removed.contains("[debug]"), "got: {removed}");
    }

    #[test]
    fn link_dry_run_touches_nothing() {
        let (_dir, root, home, config) = setup(LinkSpec::new([".zshrc"], [".config/mise"]));
        std::fs::write(root.join(".zshrc"), "").unwrap();
        std::fs::create_dir_all(root.join(".config/mise")).unwrap();
        let (mut ctx, _log) = make_context(config, home.clone());
        ctx.dry_run = true;

        assert_eq!(LinkDotfiles.run(&ctx).unwrap(), TaskResult::DryRun);
        assert!(std::fs::read_dir(&home).unwrap().next().is_none());
    }

    #[test]
    fn link_failure_is_recorded() {
        let (_dir, root, home, config) = setup(LinkSpec::new([".ssh/config"], [""; 0]));
        std::fs::create_dir_all(root.join(".ssh")).unwrap();
        std::fs::write(root.join(".ssh/config"), "").unwrap();
        let (ctx, log) = make_context(config, home);

        assert_eq!(execute(&LinkDotfiles, &ctx), TaskStatus::Failed);
        let message = log.task_entries()[0].message.clone().unwrap();
        assert!(message.contains("create symlink failed"), "got: {message}");
    }

    #[test]
    fn unlink_removes_only_our_links() {
        let (_dir, root, home, config) = setup(LinkSpec::new([".zshrc", ".vimrc"], [""; 0]));
        std::fs::write(root.join(".zshrc"), "").unwrap();
        std::fs::write(root.join(".vimrc"), "").unwrap();
        std::os::unix::fs::symlink(root.join(".zshrc"), home.join(".zshrc")).unwrap();
        std::fs::write(home.join(".vimrc"), "mine").unwrap();
        let (ctx, _log) = make_context(config, home.clone());

        assert_eq!(UnlinkDotfiles::default().run(&ctx).unwrap(), TaskResult::Ok);
        assert!(home.join(".zshrc").symlink_metadata().is_err());
        assert_eq!(std::fs::read_to_string(home.join(".vimrc")).unwrap(), "mine");
    }

    #[test]
    fn unlink_dry_run_keeps_links() {
        let (_dir, root, home, config) = setup(LinkSpec::new([".zshrc"], [""; 0]));
        std::fs::write(root.join(".zshrc"), "").unwrap();
        std::os::unix::fs::symlink(root.join(".zshrc"), home.join(".zshrc")).unwrap();
        let (mut ctx, _log) = make_context(config, home.clone());
        ctx.dry_run = true;

        assert_eq!(UnlinkDotfiles::default().run(&ctx).unwrap(), TaskResult::DryRun);
        assert!(std::fs::read_link(home.join(".zshrc")).is_ok());
    }

    #[test]
    fn unlink_rejects_missing_backup_directory() {
        let (_dir, root, home, config) = setup(LinkSpec::new([".zshrc"], [""; 0]));
        std::fs::write(root.join(".zshrc"), "").unwrap();
        let (ctx, _log) = make_context(config, home.clone());

        let task = UnlinkDotfiles::new(Some(home.join(".dotfiles_backup_19700101_000000")));
        let err = task.run(&ctx).unwrap_err();
        assert!(err.to_string().contains("backup directory not found"));
    }

    #[test]
    fn check_links_never_modifies() {
        let (_dir, root, home, config) = setup(LinkSpec::new([".zshrc", ".gone"], [""; 0]));
        std::fs::write(root.join(".zshrc"), "").unwrap();
        std::fs::write(home.join(".zshrc"), "mine").unwrap();
        let (ctx, log) = make_context(config, home.clone());

        assert_eq!(execute(&CheckLinks, &ctx), TaskStatus::Ok);
        assert_eq!(std::fs::read_to_string(home.join(".zshrc")).unwrap(), "mine");
        assert_eq!(log.failure_count(), 0);
    }

    #[test]
    fn planned_action_reads_naturally() {
        assert_eq!(planned_action(LinkResult::Linked), "link");
        assert_eq!(planned_action(LinkResult::BackedUpAndLinked), "back up and link");
    }
}
