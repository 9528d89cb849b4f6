//! Human-readable error descriptions and structured JSON error formatting.

use ewaste_core::EstimatorError;
use std::path::PathBuf;

/// Failures raised by the CLI itself rather than the core crates.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid configuration in {path:?}: {msg}")]
    Config { path: PathBuf, msg: String },
    #[error("cannot parse request JSON: {0}")]
    Request(String),
    #[error("server.bind must be an IP address, got '{0}'")]
    BindAddr(String),
}

/// First error of type `T` anywhere in the report's chain.
fn find<T: std::error::Error + 'static>(err: &eyre::Report) -> Option<&T> {
    err.chain().find_map(|e| e.downcast_ref::<T>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ce) = find::<CliError>(err) {
        return match ce {
            CliError::Config { path, msg } => format!(
                "What happened: The configuration file is invalid ({msg}).\nLikely causes: A typo or out-of-range value in {}.\nHow to fix: Edit the file (see etc/ewaste.toml for a commented sample), or pass --config with another path.",
                path.display()
            ),
            CliError::Request(msg) => format!(
                "What happened: The prediction request is not valid JSON ({msg}).\nLikely causes: Misspelled enum values (e.g. battery_type must be li-ion, li-poly or none) or wrong field types.\nHow to fix: Correct the request file and rerun `ewaste predict --input FILE`."
            ),
            CliError::BindAddr(addr) => format!(
                "What happened: Cannot bind to '{addr}'.\nLikely causes: server.bind or --bind holds a hostname rather than an IP.\nHow to fix: Use an address such as 0.0.0.0 or 127.0.0.1."
            ),
        };
    }

    if let Some(ee) = find::<EstimatorError>(err) {
        return match ee {
            EstimatorError::ArtifactMissing(path) => format!(
                "What happened: No trained model at {}.\nLikely causes: `ewaste train` has not been run yet, or paths.model points elsewhere.\nHow to fix: Run `ewaste generate` then `ewaste train`, or pass --model.",
                path.display()
            ),
            EstimatorError::Artifact(msg) => format!(
                "What happened: The model artifact could not be used ({msg}).\nLikely causes: The file is truncated or was written by an incompatible version.\nHow to fix: Retrain with `ewaste train`."
            ),
            EstimatorError::MissingField(field) => format!(
                "What happened: The request lacks '{field}'.\nLikely causes: The field was omitted and no matching device_model supplied it.\nHow to fix: Add {field} to the request, or name a known device_model (see `ewaste lookup --list`)."
            ),
            EstimatorError::InvalidInput(msg) => format!(
                "What happened: The request is invalid ({msg}).\nLikely causes: A negative or non-numeric value.\nHow to fix: Correct the request and rerun."
            ),
            EstimatorError::Dataset(msg) => format!(
                "What happened: The dataset could not be decoded ({msg}).\nLikely causes: The CSV was edited by hand or produced by another tool.\nHow to fix: Regenerate it with `ewaste generate`."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from the config crate
    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("dataset csv must have headers") {
        return "Invalid headers in dataset CSV. Regenerate it with `ewaste generate`.".to_string();
    }
    if lower.contains("no such file") || lower.contains("cannot find the file") {
        return format!(
            "What happened: A required file is missing.\nLikely causes: The dataset or request file path is wrong, or `ewaste generate` has not been run.\nHow to fix: Check the path. Original: {err:#}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 missing artifact, 4 invalid input, 5 config error, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = find::<CliError>(err) {
        return match ce {
            CliError::Config { .. } | CliError::BindAddr(_) => 5,
            CliError::Request(_) => 4,
        };
    }
    match find::<EstimatorError>(err) {
        Some(EstimatorError::ArtifactMissing(_)) => 3,
        Some(EstimatorError::MissingField(_) | EstimatorError::InvalidInput(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ce) = find::<CliError>(err) {
        return match ce {
            CliError::Config { .. } | CliError::BindAddr(_) => "ConfigError",
            CliError::Request(_) => "InvalidRequest",
        };
    }
    match find::<EstimatorError>(err) {
        Some(EstimatorError::ArtifactMissing(_)) => "ArtifactMissing",
        Some(EstimatorError::Artifact(_)) => "ArtifactInvalid",
        Some(EstimatorError::MissingField(_)) => "MissingField",
        Some(EstimatorError::InvalidInput(_)) => "InvalidInput",
        Some(EstimatorError::Dataset(_)) => "DatasetError",
        Some(EstimatorError::Training(_)) => "TrainingError",
        Some(EstimatorError::Inference(_)) => "InferenceError",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(EstimatorError::MissingField(field)) = find::<EstimatorError>(err) {
        obj["details"] = json!({ "field": field });
    }
    obj.to_string()
}
