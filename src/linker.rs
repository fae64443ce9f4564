//! The dotfile linker: mirror every entry of a [`LinkSpec`] into a home
//! directory as an absolute symlink, displacing pre-existing files and
//! directories into a per-run backup directory.
//!
//! Entries run sequentially, files first and then configuration
//! directories, each in list order. The first hard error aborts the run;
//! entries linked before it stay linked and nothing is rolled back.
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::config::LinkSpec;
use crate::error::LinkError;
use crate::resources::LinkResult;
use crate::resources::backup::{BackupDir, BackupOutcome};
use crate::resources::symlink::{EntryKind, SymlinkResource};

/// The resolved set of symlinks for one run.
#[derive(Debug, Clone)]
pub struct LinkPlan {
    resources: Vec<SymlinkResource>,
    home: PathBuf,
}

impl LinkPlan {
    /// Resolve every entry of `spec` against `root` and `home`.
    ///
    /// `root` should be absolute so the created symlinks are absolute.
    #[must_use]
    pub fn new(root: &Path, home: &Path, spec: &LinkSpec) -> Self {
        let files = spec
            .files
            .iter()
            .map(|entry| SymlinkResource::new(root, home, entry, EntryKind::File));
        let dirs = spec
            .config_dirs
            .iter()
            .map(|entry| SymlinkResource::new(root, home, entry, EntryKind::ConfigDir));
        Self {
            resources: files.chain(dirs).collect(),
            home: home.to_path_buf(),
        }
    }

    /// The planned resources, in processing order.
    #[must_use]
    pub fn resources(&self) -> &[SymlinkResource] {
        &self.resources
    }

    /// Home directory the plan links into.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }
}

/// Options controlling a link run.
#[derive(Debug, Clone, Copy)]
pub struct LinkOptions {
    /// Classify every entry but change nothing.
    pub dry_run: bool,
    /// Timestamp naming the backup directory.
    pub timestamp: DateTime<Local>,
}

/// Outcome for a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// The entry as written in the link specification.
    pub entry: String,
    /// Destination path in the home directory.
    pub target: PathBuf,
    /// What was (or, in a dry run, would be) done.
    pub result: LinkResult,
}

/// Everything a link run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    /// One outcome per entry, in processing order.
    pub outcomes: Vec<LinkOutcome>,
    /// Fate of the backup directory.
    pub backup: BackupOutcome,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl LinkReport {
    /// Number of entries with the given result.
    #[must_use]
    pub fn count(&self, result: LinkResult) -> usize {
        self.outcomes.iter().filter(|o| o.result == result).count()
    }

    /// Number of symlinks created (or that would be created).
    #[must_use]
    pub fn changed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.changed()).count()
    }
}

/// Run the plan.
///
/// A dry run only classifies entries: no backup directory, no parent
/// creation, no removals. Each entry is classified against the home
/// directory as the entries before it would have left it.
///
/// # Errors
///
/// Returns the first [`LinkError`] encountered. Before returning it, a
/// backup directory that is still empty is removed.
pub fn link(plan: &LinkPlan, opts: &LinkOptions) -> Result<LinkReport, LinkError> {
    if opts.dry_run {
        let mut planned = PlannedChanges::default();
        let outcomes = plan
            .resources
            .iter()
            .map(|r| Ok(outcome(r, planned.classify(r)?)))
            .collect::<Result<Vec<_>, LinkError>>()?;
        return Ok(LinkReport {
            outcomes,
            backup: BackupOutcome::NotCreated,
            dry_run: true,
        });
    }

    let mut backup = BackupDir::create(&plan.home, &opts.timestamp)?;
    let mut outcomes = Vec::with_capacity(plan.resources.len());
    for resource in &plan.resources {
        match resource.apply(&mut backup) {
            Ok(result) => outcomes.push(outcome(resource, result)),
            Err(e) => {
                backup.discard_if_empty();
                return Err(e);
            }
        }
    }

    Ok(LinkReport {
        outcomes,
        backup: backup.finish()?,
        dry_run: false,
    })
}

/// Changes a dry run has planned so far.
#[derive(Debug, Default)]
struct PlannedChanges {
    /// Destinations that would become symlinks.
    links: Vec<PathBuf>,
    /// Config-directory parents that would be created.
    dirs: Vec<PathBuf>,
}

impl PlannedChanges {
    fn classify(&mut self, resource: &SymlinkResource) -> Result<LinkResult, LinkError> {
        if resource.kind == EntryKind::ConfigDir
            && let Some(parent) = resource.target.parent()
            && !parent.exists()
            && !self.under_link(parent)
        {
            self.dirs.push(parent.to_path_buf());
        }

        let result = self.predict(resource)?;
        if result.changed() {
            self.links.push(resource.target.clone());
        }
        Ok(result)
    }

    fn predict(&self, resource: &SymlinkResource) -> Result<LinkResult, LinkError> {
        if !resource.source.exists() {
            return Ok(LinkResult::Skipped);
        }
        if self.links.contains(&resource.target) {
            return Ok(LinkResult::SymlinkReplaced);
        }
        if self.under_link(&resource.target) {
            return Ok(LinkResult::Covered);
        }

        // An absent destination still gets created when an earlier entry
        // puts a link or a parent directory beneath it.
        let current = resource.classify()?;
        let created = self
            .links
            .iter()
            .chain(&self.dirs)
            .any(|p| p.starts_with(&resource.target));
        if current == LinkResult::Linked && created {
            Ok(LinkResult::BackedUpAndLinked)
        } else {
            Ok(current)
        }
    }

    /// Whether `path` lies strictly inside a planned symlink.
    fn under_link(&self, path: &Path) -> bool {
        self.links
            .iter()
            .any(|link| link.as_path() != path && path.starts_with(link))
    }
}

fn outcome(resource: &SymlinkResource, result: LinkResult) -> LinkOutcome {
    LinkOutcome {
        entry: resource.entry.clone(),
        target: resource.target.clone(),
        result,
    }
}
