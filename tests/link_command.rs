#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Integration tests for the `link` command and the linker behind it.
#![cfg(unix)]

mod common;

use common::TestContextBuilder;
use dotlink::commands;
use dotlink::config::LinkSpec;
use dotlink::logging::TaskStatus;
use dotlink::resources::LinkResult;
use dotlink::resources::backup::BackupOutcome;
use dotlink::tasks;

const NO_TOOLS: &str = "optional_tools = []\n";

// ---------------------------------------------------------------------------
// Snapshot: link task list
// ---------------------------------------------------------------------------

#[test]
fn link_task_names() {
    let all_tasks = tasks::all_link_tasks();
    let task_names: Vec<&str> = all_tasks.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!(task_names.join("\n"), @r"
    Probe optional tools
    Link dotfiles
    ");
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

/// `~/.gitconfig` holding "X" is backed up and replaced by a symlink.
#[test]
fn existing_gitconfig_is_backed_up_and_linked() {
    let ctx = TestContextBuilder::new()
        .with_links(&format!("files = [\".gitconfig\"]\n{NO_TOOLS}"))
        .with_repo_file(".gitconfig", "[user]\n")
        .with_home_file(".gitconfig", "X")
        .build();

    commands::link::run(&ctx.global(false), &ctx.logger()).unwrap();

    assert_eq!(
        std::fs::read_link(ctx.home_path(".gitconfig")).unwrap(),
        ctx.repo_path(".gitconfig")
    );
    let backups = ctx.backup_dirs();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].join(".gitconfig")).unwrap(),
        "X"
    );
}

/// An entry with no repository file creates nothing and leaves no backup.
#[test]
fn missing_source_creates_nothing() {
    let ctx = TestContextBuilder::new()
        .with_links(&format!("files = [\".nonexistent\"]\n{NO_TOOLS}"))
        .build();
    let log = ctx.logger();

    commands::link::run(&ctx.global(false), &log).unwrap();

    assert!(ctx.home_path(".nonexistent").symlink_metadata().is_err());
    assert!(ctx.backup_dirs().is_empty());
    assert_eq!(log.failure_count(), 0);
}

/// A config directory whose parent is missing gets its parent created.
#[test]
fn config_dir_parent_is_created() {
    let ctx = TestContextBuilder::new()
        .with_links(&format!("config_dirs = [\".config/mise\"]\n{NO_TOOLS}"))
        .with_repo_file(".config/mise/config.toml", "[tools]\n")
        .build();
    assert!(!ctx.home_path(".config").exists());

    commands::link::run(&ctx.global(false), &ctx.logger()).unwrap();

    assert!(ctx.home_path(".config").is_dir());
    assert_eq!(
        std::fs::read_link(ctx.home_path(".config/mise")).unwrap(),
        ctx.repo_path(".config/mise")
    );
}

// ---------------------------------------------------------------------------
// General properties
// ---------------------------------------------------------------------------

/// Every entry with a source ends up as a symlink resolving to it; entries
/// without a source leave the destination as it was.
#[test]
fn sources_are_linked_and_missing_sources_untouched() {
    let ctx = TestContextBuilder::new()
        .with_repo_file(".zshrc", "zsh")
        .with_repo_file(".vimrc", "vim")
        .with_home_file(".tmux.conf", "user tmux")
        .build();
    let spec = LinkSpec::new([".zshrc", ".vimrc", ".tmux.conf"], [""; 0]);

    let report = ctx.link_at(&spec, 0);

    for name in [".zshrc", ".vimrc"] {
        let resolved = dunce::canonicalize(ctx.home_path(name)).unwrap();
        assert_eq!(resolved, ctx.repo_path(name));
    }
    assert_eq!(
        std::fs::read_to_string(ctx.home_path(".tmux.conf")).unwrap(),
        "user tmux"
    );
    assert_eq!(report.count(LinkResult::Skipped), 1);
    assert_eq!(report.count(LinkResult::Linked), 2);
}

/// A destination that was already a symlink is replaced without backup.
#[test]
fn existing_symlink_is_not_backed_up() {
    let ctx = TestContextBuilder::new()
        .with_repo_file(".zshrc", "zsh")
        .with_home_symlink(".zshrc", std::path::Path::new("/nonexistent/old/zshrc"))
        .build();
    let spec = LinkSpec::new([".zshrc"], [""; 0]);

    let report = ctx.link_at(&spec, 0);

    assert_eq!(report.outcomes[0].result, LinkResult::SymlinkReplaced);
    assert!(matches!(report.backup, BackupOutcome::Removed { .. }));
    assert!(ctx.backup_dirs().is_empty());
}

/// An entry written with a trailing slash still treats a symlinked
/// destination as a symlink: it is replaced and its target left intact.
#[test]
fn trailing_slash_entry_keeps_foreign_symlink_target() {
    let ctx = TestContextBuilder::new()
        .with_links(&format!("config_dirs = [\".config/mise/\"]\n{NO_TOOLS}"))
        .with_repo_file(".config/mise/config.toml", "[tools]")
        .build();
    let foreign = ctx.dir.path().join("foreign_mise");
    std::fs::create_dir_all(&foreign).unwrap();
    std::fs::write(foreign.join("precious.toml"), "keep").unwrap();
    std::fs::create_dir_all(ctx.home_path(".config")).unwrap();
    std::os::unix::fs::symlink(&foreign, ctx.home_path(".config/mise")).unwrap();

    commands::link::run(&ctx.global(false), &ctx.logger()).unwrap();

    assert_eq!(
        std::fs::read_link(ctx.home_path(".config/mise")).unwrap(),
        ctx.repo_path(".config/mise")
    );
    assert_eq!(
        std::fs::read_to_string(foreign.join("precious.toml")).unwrap(),
        "keep"
    );
    assert!(ctx.backup_dirs().is_empty());
}

/// A displaced directory tree lands in the backup with its contents.
#[test]
fn displaced_directory_is_backed_up_whole() {
    let ctx = TestContextBuilder::new()
        .with_repo_file(".config/mise/config.toml", "repo")
        .with_home_file(".config/mise/config.toml", "mine")
        .with_home_file(".config/mise/extra.toml", "extra")
        .build();
    let spec = LinkSpec::new(Vec::<String>::new(), [".config/mise"]);

    let report = ctx.link_at(&spec, 0);

    let BackupOutcome::Kept { path, entries } = report.backup else {
        panic!("expected a kept backup, got {:?}", report.backup);
    };
    assert_eq!(entries, 1);
    assert_eq!(
        std::fs::read_to_string(path.join("mise/config.toml")).unwrap(),
        "mine"
    );
    assert_eq!(
        std::fs::read_to_string(path.join("mise/extra.toml")).unwrap(),
        "extra"
    );
}

/// Two consecutive runs leave an identical home directory, and the second
/// run's backup directory is removed as empty.
#[test]
fn second_run_is_idempotent() {
    let ctx = TestContextBuilder::new()
        .with_repo_file(".gitconfig", "repo")
        .with_repo_file(".zshrc", "zsh")
        .with_repo_file(".config/mise/config.toml", "[tools]")
        .with_home_file(".gitconfig", "X")
        .build();
    let spec = LinkSpec::new([".gitconfig", ".zshrc", ".missing"], [".config/mise"]);

    let first = ctx.link_at(&spec, 1);
    let after_first = ctx.home_tree();
    let second = ctx.link_at(&spec, 2);
    let after_second = ctx.home_tree();

    assert_eq!(after_first, after_second);
    assert!(matches!(first.backup, BackupOutcome::Kept { .. }));
    let BackupOutcome::Removed { ref path } = second.backup else {
        panic!("expected the second backup to be removed");
    };
    assert!(!path.exists());
    assert_eq!(ctx.backup_dirs().len(), 1);
    assert_eq!(second.count(LinkResult::SymlinkReplaced), 3);
}

/// A config directory nested inside one that is already linked is left
/// alone instead of being backed up out of the repository.
#[test]
fn nested_config_dir_under_linked_parent_is_covered() {
    let ctx = TestContextBuilder::new()
        .with_repo_file(".config/nvim/init.lua", "-- repo")
        .build();
    let spec = LinkSpec::new(Vec::<String>::new(), [".config", ".config/nvim"]);

    let report = ctx.link_at(&spec, 0);

    assert_eq!(report.outcomes[1].result, LinkResult::Covered);
    assert_eq!(
        std::fs::read_to_string(ctx.repo_path(".config/nvim/init.lua")).unwrap(),
        "-- repo"
    );
    assert!(ctx.backup_dirs().is_empty());
}

// ---------------------------------------------------------------------------
// Command behaviour
// ---------------------------------------------------------------------------

/// `--dry-run` reports what would happen without touching home.
#[test]
fn dry_run_leaves_home_untouched() {
    let ctx = TestContextBuilder::new()
        .with_links(&format!(
            "files = [\".gitconfig\"]\nconfig_dirs = [\".config/mise\"]\n{NO_TOOLS}"
        ))
        .with_repo_file(".gitconfig", "repo")
        .with_repo_file(".config/mise/config.toml", "")
        .with_home_file(".gitconfig", "X")
        .build();
    let before = ctx.home_tree();
    let log = ctx.logger();

    commands::link::run(&ctx.global(true), &log).unwrap();

    assert_eq!(ctx.home_tree(), before);
    assert!(ctx.backup_dirs().is_empty());
    let statuses: Vec<_> = log.task_entries().iter().map(|t| t.status).collect();
    assert_eq!(statuses, vec![TaskStatus::NotApplicable, TaskStatus::DryRun]);
}

/// An entry escaping the repository is rejected before anything changes.
#[test]
fn invalid_entry_fails_before_any_change() {
    let ctx = TestContextBuilder::new()
        .with_links(&format!("files = [\".zshrc\", \"../outside\"]\n{NO_TOOLS}"))
        .with_repo_file(".zshrc", "zsh")
        .build();

    let err = commands::link::run(&ctx.global(false), &ctx.logger()).unwrap_err();

    assert!(format!("{err:#}").contains("../outside"), "got: {err:#}");
    assert!(ctx.home_path(".zshrc").symlink_metadata().is_err());
    assert!(ctx.backup_dirs().is_empty());
}

/// A filesystem error aborts the run with a non-zero result.
#[test]
fn filesystem_error_fails_the_command() {
    let ctx = TestContextBuilder::new()
        .with_links(&format!("files = [\".ssh/config\"]\n{NO_TOOLS}"))
        .with_repo_file(".ssh/config", "Host *")
        .build();
    let log = ctx.logger();

    let err = commands::link::run(&ctx.global(false), &log).unwrap_err();

    assert!(err.to_string().contains("1 task(s) failed"));
    assert_eq!(log.failure_count(), 1);
    assert!(ctx.backup_dirs().is_empty());
}

/// Without `links.toml` the built-in list is used; missing sources are fine.
#[test]
fn builtin_list_used_without_links_file() {
    let ctx = TestContextBuilder::new()
        .with_repo_file(".vimrc", "set nu")
        .build();
    let log = ctx.logger();

    commands::link::run(&ctx.global(false), &log).unwrap();

    assert_eq!(
        std::fs::read_link(ctx.home_path(".vimrc")).unwrap(),
        ctx.repo_path(".vimrc")
    );
    assert!(ctx.home_path(".zshrc").symlink_metadata().is_err());
    assert_eq!(log.failure_count(), 0);
}
