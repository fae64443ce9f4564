//! Command-line argument parsing.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the dotfile linker.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Symlink dotfiles from a repository into your home directory",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the dotfiles repository root
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Override the home directory symlinks are created in
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Read the link list from this file instead of <root>/links.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Symlink dotfiles into the home directory, backing up what they replace
    Link,
    /// Remove symlinks created by `link`
    Unlink(UnlinkOpts),
    /// Show the state of every configured link
    Status,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Unlink(_) => "unlink",
            Self::Status => "status",
            Self::Version => "version",
        }
    }
}

/// Options for the `unlink` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct UnlinkOpts {
    /// Copy originals back from this backup directory after unlinking
    #[arg(long, value_name = "DIR")]
    pub restore: Option<PathBuf>,
}
