use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::core::domain::{ForecastPoint, Observation};

/// Build the export table: the history window followed by the two forecast
/// rows.
///
/// Columns are `date, admissions, discharges`. Forecast rows carry no
/// admissions; their `discharges` is the forecast value.
pub fn export_table(
    history: &[Observation],
    forecasts: &[ForecastPoint; 2],
) -> Result<DataFrame> {
    let rows = history.len() + forecasts.len();
    let mut dates = Vec::with_capacity(rows);
    let mut admissions: Vec<Option<i64>> = Vec::with_capacity(rows);
    let mut discharges = Vec::with_capacity(rows);

    for obs in history {
        dates.push(obs.date.to_string());
        admissions.push(Some(i64::from(obs.admissions)));
        discharges.push(obs.discharges_f64());
    }
    for point in forecasts {
        dates.push(point.date.to_string());
        admissions.push(None);
        discharges.push(point.value);
    }

    df!(
        "date" => dates,
        "admissions" => admissions,
        "discharges" => discharges
    )
    .context("Failed to build export DataFrame")
}

/// Write a table as CSV with a header row.
pub fn write_export_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write export CSV {}", path.display()))?;
    log::info!("Wrote {} export rows to {}", df.height(), path.display());
    Ok(())
}

/// Render a table as CSV text, header included.
pub fn export_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(df)
        .context("Failed to serialize export CSV")?;
    String::from_utf8(buffer).context("Export CSV is not valid UTF-8")
}
