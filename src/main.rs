use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use breathwork::breath::SqliteSessionStore;
use breathwork::cli::args::{Cli, Commands};
use breathwork::cli::commands;
use breathwork::config::{Config, Paths};
use breathwork::error::BreathError;
use breathwork::logging::init_logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        let code = e.downcast_ref::<BreathError>().map_or(1, BreathError::exit_code);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new()?;
    let config = Config::load_from_path(&paths.config_file)?;
    let format = cli.output.unwrap_or(config.general.default_output);

    let level = if cli.verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    if paths.ensure_dirs().is_ok() {
        init_logging(level, Some(&paths.log_file))?;
    }

    let output = match &cli.command {
        Commands::Train(args) => commands::train(args, &config, format)?,
        Commands::History { limit } => commands::history(&open_store()?, *limit, format)?,
        Commands::Show { id } => commands::show(&open_store()?, id, format)?,
        Commands::Delete { id } => commands::delete(&open_store()?, id, format)?,
        Commands::Report { period } => commands::report(&open_store()?, period, format)?,
        Commands::Paces => commands::paces(format)?,
        Commands::Config(args) => commands::config(&paths, &args.command, format)?,
        Commands::Completions { shell, install } => commands::completions(shell, *install)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn open_store() -> Result<SqliteSessionStore> {
    SqliteSessionStore::new().context("Failed to open session history")
}
