//! Subcommand implementations.

use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::{Result, WrapErr};
use ewaste_config::Config;
use ewaste_core::{DeviceInput, Estimator, MergePolicy, ModelArtifact, TrainingCfg};

use crate::error_fmt::CliError;

pub fn run_generate(
    cfg: &Config,
    samples: Option<usize>,
    seed: Option<u64>,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut gen_cfg = ewaste_core::GeneratorCfg::from(&cfg.generator);
    if let Some(n) = samples {
        if n == 0 {
            eyre::bail!("--samples must be >= 1");
        }
        gen_cfg.samples = n;
    }
    if let Some(s) = seed {
        gen_cfg.seed = s;
    }
    let out = out.unwrap_or_else(|| cfg.paths.data.clone());

    let examples = ewaste_core::generate(&gen_cfg)?;
    ewaste_core::write_examples(&out, &examples)
        .wrap_err_with(|| format!("writing dataset {}", out.display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "samples": examples.len(), "seed": gen_cfg.seed, "path": out })
        );
    } else {
        println!(
            "Wrote {} samples (seed {}) to {}",
            examples.len(),
            gen_cfg.seed,
            out.display()
        );
    }
    Ok(())
}

pub fn run_train(
    cfg: &Config,
    data: Option<PathBuf>,
    out: Option<PathBuf>,
    trees: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut train_cfg = TrainingCfg::from(&cfg.training);
    if let Some(n) = trees {
        if n == 0 {
            eyre::bail!("--trees must be >= 1");
        }
        train_cfg.forest.n_estimators = n;
    }
    let data = data.unwrap_or_else(|| cfg.paths.data.clone());
    let out = out.unwrap_or_else(|| cfg.paths.model.clone());

    let examples = ewaste_core::load_examples(&data)
        .wrap_err_with(|| format!("loading dataset {}", data.display()))?;
    let (artifact, report) = ewaste_core::train(&examples, &train_cfg)?;
    artifact.save(&out)?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "Trained {} trees per target on {} rows ({} held out)",
            report.trees_per_target, report.train_rows, report.test_rows
        );
        for t in &report.targets {
            println!(
                "{:<22} MAE: {:>9.3}  RMSE: {:>9.3}  R2: {:>6.3}",
                t.target, t.metrics.mae, t.metrics.rmse, t.metrics.r2
            );
        }
        println!("Model saved to {}", out.display());
    }
    Ok(())
}

fn load_estimator(cfg: &Config, model: Option<PathBuf>) -> Result<Estimator> {
    let path = model.unwrap_or_else(|| cfg.paths.model.clone());
    let artifact = ModelArtifact::load(&path).wrap_err("loading model artifact")?;
    Ok(Estimator::new(
        Arc::new(artifact),
        MergePolicy::from(cfg.service.merge_policy),
    ))
}

/// `--port`, then a parseable `PORT`, then `server.port`.
fn effective_port(cli_port: Option<u16>, config_port: u16) -> u16 {
    cli_port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.trim().parse().ok()))
        .unwrap_or(config_port)
}

pub fn run_serve(
    cfg: &Config,
    bind: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
) -> Result<()> {
    let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let ip: IpAddr = bind
        .trim()
        .parse()
        .map_err(|_| CliError::BindAddr(bind.clone()))?;
    let addr = SocketAddr::new(ip, effective_port(port, cfg.server.port));

    let estimator = load_estimator(cfg, model)?;
    let state = ewaste_server::AppState::new(estimator, cfg.paths.static_dir.clone());

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("starting async runtime")?;
    rt.block_on(ewaste_server::serve(addr, state))
}

fn read_request(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .wrap_err("reading request from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).wrap_err_with(|| format!("reading request {}", input.display()))
}

pub fn run_predict(cfg: &Config, input: &Path, model: Option<PathBuf>) -> Result<()> {
    let raw = read_request(input)?;
    let request: DeviceInput =
        serde_json::from_str(&raw).map_err(|e| CliError::Request(e.to_string()))?;
    let estimator = load_estimator(cfg, model)?;
    let resp = estimator.predict(request)?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

pub fn run_lookup(model: Option<&str>, list: bool, json: bool) -> Result<()> {
    if list {
        let entries = ewaste_core::entries();
        if json {
            let rows: Vec<_> = entries
                .iter()
                .map(|e| serde_json::json!({ "model": e.key, "spec": e.to_spec() }))
                .collect();
            println!("{}", serde_json::Value::Array(rows));
        } else {
            for e in entries {
                println!(
                    "{:<20} {:<12} {:<10} {} {:>7.0} g  {:<7} {:>5.2}\"  metal={}",
                    e.key,
                    e.device_type,
                    e.brand,
                    e.launch_year,
                    e.weight_g,
                    e.battery_type,
                    e.screen_size_in,
                    e.has_metal_chassis
                );
            }
        }
        return Ok(());
    }

    let query = model.unwrap_or_default();
    let hit = ewaste_core::catalog::lookup_entry(query);
    if json {
        println!(
            "{}",
            serde_json::json!({ "model": query, "spec": hit.map(|e| e.to_spec()) })
        );
        return Ok(());
    }
    match hit {
        Some(e) => println!("{}", serde_json::to_string_pretty(&e.to_spec())?),
        None => println!("No reference entry matches '{query}'"),
    }
    Ok(())
}
