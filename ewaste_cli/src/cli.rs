//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "ewaste", version, about = "E-waste material recovery estimator")]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/ewaste.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and report errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a synthetic training dataset CSV
    Generate {
        /// Number of samples (overrides generator.samples)
        #[arg(long, value_name = "N")]
        samples: Option<usize>,
        /// RNG seed (overrides generator.seed)
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        /// Output CSV (overrides paths.data)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Fit the per-target forests and write the model artifact
    Train {
        /// Dataset CSV (overrides paths.data)
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,
        /// Output artifact (overrides paths.model)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Trees per target (overrides training.n_estimators)
        #[arg(long, value_name = "N")]
        trees: Option<usize>,
    },
    /// Serve the HTTP API
    Serve {
        /// Bind address (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
        /// Port (overrides PORT and server.port)
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,
        /// Model artifact (overrides paths.model)
        #[arg(long, value_name = "FILE")]
        model: Option<PathBuf>,
    },
    /// Run one prediction from a JSON request and print the response
    Predict {
        /// Request JSON file, or `-` for stdin
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Model artifact (overrides paths.model)
        #[arg(long, value_name = "FILE")]
        model: Option<PathBuf>,
    },
    /// Look up a device model in the reference table
    Lookup {
        /// Free-text model name
        #[arg(value_name = "MODEL", required_unless_present = "list")]
        model: Option<String>,
        /// Print every table entry
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "model")]
        list: bool,
    },
}
