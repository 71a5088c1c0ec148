mod cli;
mod commands;
mod config;
mod engine;
mod models;
mod state;
mod transport;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::SkeinConfig;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: SkeinConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let config = SkeinConfig::load(cli.config.as_deref())?;
    if !config.color {
        colored::control::set_override(false);
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config,
    };

    match cli.command {
        Command::Validate(args) => commands::validate::run(&ctx, &args.paths, args.jobs),
        Command::Plan(args) => commands::plan::run(&ctx, &args.file),
        Command::Apply(args) => commands::apply::run(&ctx, &args.file, args.dry_run, args.yes),
        Command::Show(args) => commands::show::run(&ctx, &args.file),
        Command::State(cmd) => commands::state::run(&ctx, cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "skein", &mut io::stdout());
            Ok(())
        }
    }
}
