mod cli;
mod commands;
mod error_fmt;
mod logging;

use clap::Parser;
use eyre::Result;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{CliError, exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let _ = color_eyre::install();

    let cfg = ewaste_config::load_file(&cli.config).map_err(|e| CliError::Config {
        path: cli.config.clone(),
        msg: format!("{e:#}"),
    })?;

    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    logging::init_tracing(cli.json, level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Generate { samples, seed, out } => {
            commands::run_generate(&cfg, samples, seed, out, cli.json)
        }
        Commands::Train { data, out, trees } => {
            commands::run_train(&cfg, data, out, trees, cli.json)
        }
        Commands::Serve { bind, port, model } => commands::run_serve(&cfg, bind, port, model),
        Commands::Predict { input, model } => commands::run_predict(&cfg, &input, model),
        Commands::Lookup { model, list } => commands::run_lookup(model.as_deref(), list, cli.json),
    }
}
