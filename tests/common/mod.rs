// Shared helpers for integration tests.
//
// Provides a temporary scratch repository plus home directory and a fluent
// builder so each integration test can set up an isolated environment
// without touching the real home directory.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone as _};
use dotlink::cli::GlobalOpts;
use dotlink::config::LinkSpec;
use dotlink::linker::{self, LinkOptions, LinkPlan, LinkReport};
use dotlink::logging::Logger;
use dotlink::resources::backup::BACKUP_PREFIX;

/// An isolated repository and home directory backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Owns both directories; deleted on drop.
    pub dir: tempfile::TempDir,
    /// Canonical repository root.
    pub root: PathBuf,
    /// Scratch home directory.
    pub home: PathBuf,
}

impl IntegrationTestContext {
    /// Create empty `repo/` and `home/` directories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().join("repo");
        let home = dir.path().join("home");
        std::fs::create_dir_all(&root).expect("create repo dir");
        std::fs::create_dir_all(&home).expect("create home dir");
        let root = dunce::canonicalize(&root).expect("canonicalize repo");
        let home = dunce::canonicalize(&home).expect("canonicalize home");
        Self { dir, root, home }
    }

    /// Global options pointing the commands at this scratch environment.
    pub fn global(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            dry_run,
            root: Some(self.root.clone()),
            home: Some(self.home.clone()),
            config: None,
        }
    }

    /// A logger that records tasks but writes no log file.
    pub fn logger(&self) -> Arc<Logger> {
        Arc::new(Logger::with_log_file(None))
    }

    /// Run the linker directly with a fixed timestamp `second` seconds past
    /// a reference instant, so consecutive runs get distinct backup names.
    pub fn link_at(&self, spec: &LinkSpec, second: u32) -> LinkReport {
        let plan = LinkPlan::new(&self.root, &self.home, spec);
        let opts = LinkOptions {
            dry_run: false,
            timestamp: timestamp(second),
        };
        linker::link(&plan, &opts).expect("link run")
    }

    /// Every `.dotfiles_backup_*` directory currently under home.
    pub fn backup_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.home)
            .expect("list home")
            .map(|e| e.expect("dir entry").path())
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(BACKUP_PREFIX))
            })
            .collect();
        dirs.sort();
        dirs
    }

    /// Path inside the home directory.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    /// Path inside the repository.
    pub fn repo_path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Describe every entry under home (excluding backup directories) as
    /// `path -> link target`, `path: contents`, or `path/`.
    pub fn home_tree(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        walk(&self.home, &self.home, &mut out);
        out
    }
}

fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<String, String>) {
    for entry in std::fs::read_dir(dir).expect("list dir") {
        let path = entry.expect("dir entry").path();
        let rel = path
            .strip_prefix(base)
            .expect("under base")
            .to_string_lossy()
            .into_owned();
        if rel.starts_with(BACKUP_PREFIX) {
            continue;
        }
        let meta = std::fs::symlink_metadata(&path).expect("metadata");
        if meta.file_type().is_symlink() {
            let target = std::fs::read_link(&path).expect("read link");
            out.insert(rel, format!("-> {}", target.display()));
        } else if meta.is_dir() {
            out.insert(rel, "/".to_string());
            walk(base, &path, out);
        } else {
            let contents = std::fs::read_to_string(&path).unwrap_or_default();
            out.insert(rel, contents);
        }
    }
}

/// A fixed local instant offset by `second` seconds.
pub fn timestamp(second: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, 3, 14, 15, 9, second)
        .single()
        .expect("valid timestamp")
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new, empty context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `links.toml` at the repository root.
    pub fn with_links(self, content: &str) -> Self {
        std::fs::write(self.ctx.root.join("links.toml"), content).expect("write links.toml");
        self
    }

    /// Create a file inside the repository.
    pub fn with_repo_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.root.join(rel), content);
        self
    }

    /// Create a file inside the home directory.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.home.join(rel), content);
        self
    }

    /// Create a symlink inside the home directory.
    #[cfg(unix)]
    pub fn with_home_symlink(self, rel: &str, target: &Path) -> Self {
        let link = self.ctx.home.join(rel);
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent).expect("create link parent");
        }
        std::os::unix::fs::symlink(target, link).expect("create symlink");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}
