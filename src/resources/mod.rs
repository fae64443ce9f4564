//! Per-entry filesystem primitives (check + apply pattern).
pub mod backup;
pub mod fs;
pub mod symlink;

use std::fmt;

use crate::error::LinkError;

/// Interface for resources that can describe themselves and report their
/// current state without modifying anything.
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined due to I/O failures
    /// other than the path being absent.
    fn current_state(&self) -> Result<ResourceState, LinkError>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Resource::current_state`].
    fn needs_change(&self) -> Result<bool, LinkError> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

/// State of a resource as observed on disk.
///
/// # Examples
///
/// ```
/// use dotlink::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "regular file".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(wrong, missing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the destination.
    Missing,
    /// The destination is a symlink to the expected source.
    Correct,
    /// Something else occupies the destination.
    Incorrect {
        /// What currently lives at the destination.
        current: String,
    },
    /// The resource cannot be applied (e.g. its source is missing).
    Invalid {
        /// Why the resource cannot be applied.
        reason: String,
    },
}

/// Per-entry outcome of a link run.
///
/// # Examples
///
/// ```
/// use dotlink::resources::LinkResult;
///
/// assert_eq!(LinkResult::BackedUpAndLinked.to_string(), "backed up and linked");
/// assert!(LinkResult::Linked.changed());
/// assert!(!LinkResult::Skipped.changed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkResult {
    /// The repository source does not exist; nothing was touched.
    Skipped,
    /// A pre-existing file or directory was copied to the backup directory,
    /// removed, and replaced by a symlink.
    BackedUpAndLinked,
    /// A pre-existing symlink was replaced without backup.
    SymlinkReplaced,
    /// Nothing existed at the destination; a symlink was created.
    Linked,
    /// The destination already resolves to its source through a symlinked
    /// ancestor created by an earlier entry; left untouched.
    Covered,
}

impl LinkResult {
    /// Whether a new symlink is created for this outcome.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(
            self,
            Self::BackedUpAndLinked | Self::SymlinkReplaced | Self::Linked
        )
    }
}

impl fmt::Display for LinkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skipped => "skipped (source missing)",
            Self::BackedUpAndLinked => "backed up and linked",
            Self::SymlinkReplaced => "symlink replaced",
            Self::Linked => "linked",
            Self::Covered => "covered by linked parent",
        })
    }
}

/// Per-entry outcome of an unlink run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkResult {
    /// Our symlink was removed.
    Removed,
    /// Our symlink was removed and the backed-up original copied back.
    Restored,
    /// The destination is not a symlink to the source; left untouched.
    NotLinked,
}

impl fmt::Display for UnlinkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Removed => "removed",
            Self::Restored => "restored from backup",
            Self::NotLinked => "not linked",
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    struct TestResource {
        state: ResourceState,
    }

    impl Resource for TestResource {
        fn description(&self) -> String {
            "test resource".to_string()
        }

        fn current_state(&self) -> Result<ResourceState, LinkError> {
            Ok(self.state.clone())
        }
    }

    #[test]
    fn needs_change_for_missing_resource() {
        let resource = TestResource {
            state: ResourceState::Missing,
        };
        assert!(resource.needs_change().unwrap());
    }

    #[test]
    fn needs_change_for_incorrect_resource() {
        let resource = TestResource {
            state: ResourceState::Incorrect {
                current: "regular file".to_string(),
            },
        };
        assert!(resource.needs_change().unwrap());
    }

    #[test]
    fn no_change_for_correct_or_invalid_resource() {
        for state in [
            ResourceState::Correct,
            ResourceState::Invalid {
                reason: "source missing".to_string(),
            },
        ] {
            assert!(!TestResource { state }.needs_change().unwrap());
        }
    }

    #[test]
    fn only_symlink_creating_results_count_as_changed() {
        assert!(LinkResult::BackedUpAndLinked.changed());
        assert!(LinkResult::SymlinkReplaced.changed());
        assert!(LinkResult::Linked.changed());
        assert!(!LinkResult::Skipped.changed());
        assert!(!LinkResult::Covered.changed());
    }
}
