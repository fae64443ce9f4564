//! Dotfile linker.
//!
//! Mirrors a list of repository-relative paths into a home directory as
//! absolute symlinks. Regular files and directories that would be replaced
//! are first copied into a per-run `~/.dotfiles_backup_<timestamp>`
//! directory, which is deleted again if nothing was displaced.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load and validate `links.toml`
//! - **[`resources`]**: per-entry `check + apply` primitives and the backup directory
//! - **[`linker`]**: run a whole link specification
//! - **[`tasks`]**: named units of work wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`link`, `unlink`, `status`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod linker;
pub mod logging;
pub mod resources;
pub mod tasks;
