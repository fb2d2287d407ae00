//! End-to-end tests for the forecasting pipeline.
//!
//! These tests ensure that:
//! 1. Settings, series and model artifact load together from disk
//! 2. The dashboard snapshot carries forecasts, threshold and evaluation
//! 3. The export table lands on disk with the expected layout
//! 4. The recursive two-day rollout matches hand-computed values

use std::fmt::Write as _;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use sph_forecast::algorithms::{alert_status, evaluate, forecast_next_two_days};
use sph_forecast::config::Settings;
use sph_forecast::core::domain::{AlertLevel, FeatureVector, Observation};
use sph_forecast::core::ForecastError;
use sph_forecast::io::{write_export_csv, SeriesLoader};
use sph_forecast::models::LinearModel;
use sph_forecast::preprocessing::{build_features, SeriesValidator};
use sph_forecast::services::DashboardService;

// ==================== Helper Functions ====================

const SCENARIO: [u32; 10] = [100, 102, 98, 105, 110, 95, 97, 101, 99, 108];

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn observations(values: &[u32]) -> Vec<Observation> {
    values
        .iter()
        .enumerate()
        .map(|(i, &d)| Observation::new(start() + Duration::days(i as i64), d + 5, d))
        .collect()
}

fn seasonal(days: usize) -> Vec<u32> {
    (0..days)
        .map(|i| {
            let weekly = [0u32, 14, 10, 8, 6, 2, 1][i % 7];
            100 + weekly + ((i * 7) % 11) as u32
        })
        .collect()
}

fn write_daily_csv(path: &Path, values: &[u32]) {
    let mut csv = String::from("date,admissions,discharges,hosp,rea,hosp_rel,icu_rate\n");
    for obs in observations(values) {
        writeln!(
            csv,
            "{},{},{},2500,350,0.4,0.05",
            obs.date, obs.admissions, obs.discharges
        )
        .unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

fn write_model(path: &Path, model: &LinearModel) {
    std::fs::write(path, serde_json::to_string_pretty(model).unwrap()).unwrap();
}

/// Lays out `forecast.toml`, the daily CSV and the model artifact in a temp dir.
fn workspace(values: &[u32], extra_toml: &str) -> (tempfile::TempDir, Settings) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data/raw")).unwrap();
    std::fs::create_dir_all(dir.path().join("models")).unwrap();

    write_daily_csv(&dir.path().join("data/raw/hospital_daily.csv"), values);
    write_model(
        &dir.path().join("models/baseline_linreg.json"),
        &LinearModel::new([0.0, 0.5, 0.5, 0.0], 0.0),
    );

    let toml = format!(
        "[data]\npath = \"data/raw/hospital_daily.csv\"\n\n\
         [model]\npath = \"models/baseline_linreg.json\"\n\n{}",
        extra_toml
    );
    let config_path = dir.path().join("forecast.toml");
    std::fs::write(&config_path, toml).unwrap();

    let settings = Settings::from_file(&config_path).unwrap();
    (dir, settings)
}

// ==================== End-to-end ====================

#[test]
fn test_scenario_from_disk_matches_recursive_rule() {
    let (_dir, settings) = workspace(&SCENARIO, "");

    let loaded = SeriesLoader::new(settings.ingestion.clone())
        .load_from_csv(&settings.data.path)
        .unwrap();
    let model = LinearModel::from_file(&settings.model.path).unwrap();

    let rows = build_features(loaded.store.observations()).unwrap();
    assert_eq!(rows.len(), 3);

    let tail = loaded.store.require_tail(7).unwrap();
    let (d1, d2) = forecast_next_two_days(&model, &rows, tail).unwrap();
    assert_eq!(d1.value, 106.5);
    assert_eq!(d2.value, 108.25);
    assert_eq!(d1.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    assert_eq!(d2.date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
}

#[test]
fn test_dashboard_snapshot_and_export() {
    let values = seasonal(120);
    let (dir, settings) = workspace(
        &values,
        "[display]\nwindow = 14\nsmooth = true\n\n[alert]\npercentile = 90\n\n\
         [export]\npath = \"sph_forecast_export.csv\"\n",
    );

    let loaded = SeriesLoader::new(settings.ingestion.clone())
        .load_from_csv(&settings.data.path)
        .unwrap();
    assert!(SeriesValidator::validate(loaded.store.observations()).is_valid);

    let model = LinearModel::from_file(&settings.model.path).unwrap();
    let service = DashboardService::from_settings(&model, &settings);
    let snapshot = service
        .snapshot_with_context(&loaded.store, loaded.latest_icu_rate())
        .unwrap();

    assert_eq!(snapshot.percentile, 90);
    assert_eq!(snapshot.history.len(), 14);
    assert!(snapshot.history[..6].iter().all(|p| p.mm7.is_none()));
    assert!(snapshot.history[6..].iter().all(|p| p.mm7.is_some()));
    assert_eq!(snapshot.icu_rate, Some(0.05));

    let history: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    let expected = alert_status(&history, 90, snapshot.forecasts[0].value);
    assert_eq!(snapshot.threshold, expected.threshold);
    assert_eq!(snapshot.forecasts[0].status, expected.status);

    // 120 observations -> 113 feature rows -> 23 test rows
    let evaluation = snapshot.evaluation.as_ref().unwrap();
    assert_eq!(evaluation.split_index, 90);
    assert_eq!(evaluation.residuals.len(), 23);
    assert_eq!(snapshot.beats_baselines, Some(evaluation.beats_baselines()));

    let export_path = settings.export.as_ref().unwrap().path.clone();
    assert!(export_path.starts_with(dir.path()));
    let mut df = service.export(&loaded.store, &snapshot).unwrap();
    write_export_csv(&mut df, &export_path).unwrap();

    let written = std::fs::read_to_string(&export_path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "date,admissions,discharges");
    assert_eq!(lines.len(), 1 + 14 + 2);
    assert!(lines[15].contains(",,"));
}

#[test]
fn test_snapshot_json_has_uppercase_status() {
    let (_dir, settings) = workspace(&seasonal(60), "");
    let loaded = SeriesLoader::default()
        .load_from_csv(&settings.data.path)
        .unwrap();
    let model = LinearModel::from_file(&settings.model.path).unwrap();
    let snapshot = DashboardService::from_settings(&model, &settings)
        .snapshot(&loaded.store)
        .unwrap();

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"status\":\"OK\"") || json.contains("\"status\":\"ALERT\""));
}

#[test]
fn test_short_series_from_disk_still_exports_forecasts() {
    let (dir, settings) = workspace(&seasonal(12), "[display]\nwindow = 7\n");
    let loaded = SeriesLoader::default()
        .load_from_csv(&settings.data.path)
        .unwrap();
    let model = LinearModel::from_file(&settings.model.path).unwrap();
    let service = DashboardService::from_settings(&model, &settings);

    let snapshot = service.snapshot(&loaded.store).unwrap();
    assert!(snapshot.evaluation.is_none());
    assert!(snapshot.evaluation_error.is_some());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json["evaluation"].is_null());
    assert_eq!(json["forecasts"].as_array().unwrap().len(), 2);

    let path = dir.path().join("short_export.csv");
    let mut df = service.export(&loaded.store, &snapshot).unwrap();
    write_export_csv(&mut df, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1 + 7 + 2);
}

// ==================== Evaluation ====================

#[test]
fn test_naive_oracle_ties_naive1_baseline() {
    let rows = build_features(&observations(&seasonal(200))).unwrap();
    let result = evaluate(&|f: &FeatureVector| f.lag1, &rows).unwrap();
    assert_eq!(result.model_error.mae, result.naive1_error);
    assert!(!result.beats_baselines());
}

#[test]
fn test_weekly_oracle_ties_naive7_baseline() {
    let rows = build_features(&observations(&seasonal(200))).unwrap();
    let result = evaluate(&|f: &FeatureVector| f.lag7, &rows).unwrap();
    assert_eq!(result.model_error.mae, result.naive7_error);
}

#[test]
fn test_short_series_fails_before_prediction() {
    let result = build_features(&observations(&SCENARIO[..7]));
    assert_eq!(
        result,
        Err(ForecastError::InsufficientHistory {
            required: 8,
            available: 7
        })
    );
}

// ==================== Alerting ====================

#[test]
fn test_alert_status_reference_values() {
    let history: Vec<f64> = (1..=10).map(|i| f64::from(i * 10)).collect();
    let high = alert_status(&history, 75, 75.0);
    let low = alert_status(&history, 75, 65.0);
    assert_eq!(high.threshold, 70);
    assert_eq!(high.status, AlertLevel::Alert);
    assert_eq!(low.status, AlertLevel::Ok);
}

// ==================== Properties ====================

proptest! {
    #[test]
    fn prop_forecast_is_deterministic(values in prop::collection::vec(1u32..2_000, 8..90)) {
        let obs = observations(&values);
        let rows = build_features(&obs).unwrap();
        let model = LinearModel::new([0.7, 0.4, 0.2, 0.4], 3.0);

        let first = forecast_next_two_days(&model, &rows, &obs);
        let second = forecast_next_two_days(&model, &rows, &obs);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_threshold_is_within_history(
        values in prop::collection::vec(0u32..5_000, 1..200),
        percentile in 50u8..=95,
    ) {
        let history: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
        let status = alert_status(&history, percentile, 0.0);
        let min = values.iter().copied().min().unwrap() as i64;
        let max = values.iter().copied().max().unwrap() as i64;
        prop_assert!(status.threshold >= min && status.threshold <= max);
    }
}
