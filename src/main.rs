//! `dotlink` command-line entry point.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use dotlink::cli::{Cli, Command};
use dotlink::commands;
use dotlink::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let name = args.command.log_name();
    init_subscriber(args.verbose, name);
    let log = Arc::new(Logger::new(name));

    match &args.command {
        Command::Link => commands::link::run(&args.global, &log),
        Command::Unlink(opts) => commands::unlink::run(&args.global, opts, &log),
        Command::Status => commands::status::run(&args.global, &log),
        Command::Version => Ok(()),
    }
}
