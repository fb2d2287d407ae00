//! SPH forecast command-line snapshot.
//!
//! Loads the settings, the daily series and the model artifact, then prints
//! the dashboard snapshot as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Settings from forecast.toml in a standard location
//! cargo run --bin sph-forecast
//!
//! # Explicit settings file, also writing the export table
//! cargo run --bin sph-forecast -- config/forecast.toml --export out.csv
//!
//! # Dump the model-ready feature table
//! cargo run --bin sph-forecast -- --features features.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sph_forecast::config::Settings;
use sph_forecast::io::{write_export_csv, SeriesLoader};
use sph_forecast::models::LinearModel;
use sph_forecast::preprocessing::{build_features, FeatureBuilder, SeriesValidator};
use sph_forecast::services::DashboardService;

struct Args {
    config: Option<PathBuf>,
    export: Option<PathBuf>,
    features: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        export: None,
        features: None,
    };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--export" => {
                let path = iter.next().context("--export requires a path")?;
                args.export = Some(PathBuf::from(path));
            }
            "--features" => {
                let path = iter.next().context("--features requires a path")?;
                args.features = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("Usage: sph-forecast [CONFIG] [--export PATH] [--features PATH]");
                std::process::exit(0);
            }
            other if args.config.is_none() && !other.starts_with('-') => {
                args.config = Some(PathBuf::from(other));
            }
            other => anyhow::bail!("Unexpected argument: {}", other),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let settings = match &args.config {
        Some(path) => Settings::from_file(path),
        None => Settings::from_default_location(),
    }
    .context("Failed to load settings")?;

    let loaded = SeriesLoader::new(settings.ingestion.clone())
        .load_from_csv(&settings.data.path)
        .context("Failed to load daily series")?;

    let validation = SeriesValidator::validate(loaded.store.observations());
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid {
        anyhow::bail!("Series failed validation: {}", validation.errors.join("; "));
    }

    if let Some(path) = &args.features {
        let rows = build_features(loaded.store.observations())?;
        let mut df = FeatureBuilder::to_dataframe(&rows)?;
        write_export_csv(&mut df, path)?;
    }

    let model = LinearModel::from_file(&settings.model.path)?;
    let service = DashboardService::from_settings(&model, &settings);
    let snapshot = service.snapshot_with_context(&loaded.store, loaded.latest_icu_rate())?;

    info!(
        "J+1 {} -> {:.0} ({}), J+2 {} -> {:.0} ({})",
        snapshot.forecasts[0].date,
        snapshot.forecasts[0].value,
        snapshot.forecasts[0].status,
        snapshot.forecasts[1].date,
        snapshot.forecasts[1].value,
        snapshot.forecasts[1].status
    );

    for card in snapshot.forecasts.iter().filter(|c| c.status.is_alert()) {
        warn!(
            "{} forecast {:.0} is at or above the p{} threshold {}",
            card.date, card.value, snapshot.percentile, snapshot.threshold
        );
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    let export_path = args
        .export
        .or_else(|| settings.export.as_ref().map(|e| e.path.clone()));
    if let Some(path) = export_path {
        let mut df = service.export(&loaded.store, &snapshot)?;
        write_export_csv(&mut df, &path)?;
    }

    Ok(())
}
