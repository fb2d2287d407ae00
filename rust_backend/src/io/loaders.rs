use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use crate::config::IngestionSettings;
use crate::core::domain::Observation;
use crate::core::series::SeriesStore;

const REQUIRED_COLUMNS: [&str; 3] = ["date", "admissions", "discharges"];

/// Result of loading the daily series
#[derive(Debug)]
pub struct SeriesLoadResult {
    pub store: SeriesStore,
    /// Data rows read from the source, before region filtering and aggregation.
    pub rows_read: usize,
    /// Daily ICU occupancy rate aligned with `store`, when requested and available.
    pub icu_rate: Option<Vec<Option<f64>>>,
}

impl SeriesLoadResult {
    /// Most recent ICU occupancy rate, if any.
    pub fn latest_icu_rate(&self) -> Option<f64> {
        self.icu_rate
            .as_ref()
            .and_then(|rates| rates.last().copied().flatten())
    }
}

/// One calendar day accumulated from the source rows.
#[derive(Debug, Default, Clone, Copy)]
struct DailyTotals {
    rows: usize,
    admissions: u64,
    discharges: u64,
    rea: Option<f64>,
}

/// Loads the normalized daily CSV (`date, admissions, discharges` plus
/// context columns) into a [`SeriesStore`].
#[derive(Debug, Clone, Default)]
pub struct SeriesLoader {
    ingestion: IngestionSettings,
}

impl SeriesLoader {
    pub fn new(ingestion: IngestionSettings) -> Self {
        Self { ingestion }
    }

    /// Load the daily series from a CSV file
    pub fn load_from_csv(&self, csv_path: &Path) -> Result<SeriesLoadResult> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(csv_path.into()))?
            .finish()
            .with_context(|| format!("Failed to parse CSV file {}", csv_path.display()))?;

        let result = self.load_from_dataframe(df)?;
        log::info!(
            "Loaded {} days ({} rows) from {}",
            result.store.len(),
            result.rows_read,
            csv_path.display()
        );
        Ok(result)
    }

    /// Load the daily series from CSV text
    pub fn load_from_csv_str(&self, content: &str) -> Result<SeriesLoadResult> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
            .finish()
            .context("Failed to parse CSV string")?;

        self.load_from_dataframe(df)
    }

    /// Convert an already-read DataFrame into the daily series
    pub fn load_from_dataframe(&self, mut df: DataFrame) -> Result<SeriesLoadResult> {
        normalize_column_names(&mut df)?;

        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !column_names.iter().any(|n| n == c))
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required columns {:?}. Columns read: {:?}",
                missing,
                column_names
            );
        }

        let dates = df.column("date")?.cast(&DataType::String)?;
        let dates = dates.str()?;
        let admissions = df.column("admissions")?.cast(&DataType::Float64)?;
        let admissions = admissions.f64()?;
        let discharges = df.column("discharges")?.cast(&DataType::Float64)?;
        let discharges = discharges.f64()?;

        let regions = match df.column("region") {
            Ok(c) => Some(c.cast(&DataType::String)?),
            Err(_) => None,
        };
        let regions = regions.as_ref().map(|c| c.str()).transpose()?;

        let rea = if self.ingestion.use_icu_rate {
            match df.column("rea") {
                Ok(c) => Some(c.cast(&DataType::Float64)?),
                Err(_) => None,
            }
        } else {
            None
        };
        let rea = rea.as_ref().map(|c| c.f64()).transpose()?;

        let region_filter = self.ingestion.region_filter();
        if region_filter.is_some() && regions.is_none() {
            log::warn!("REGION scope requested but the source has no 'region' column");
        }

        let rows_read = df.height();
        let mut days: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();
        let mut duplicates = Vec::new();

        for i in 0..rows_read {
            if let (Some(code), Some(regions)) = (region_filter, regions) {
                if regions.get(i).map(str::trim) != Some(code) {
                    continue;
                }
            }

            let raw_date = dates
                .get(i)
                .with_context(|| format!("Missing date at row {}", i))?;
            let date = parse_date(raw_date).with_context(|| format!("Invalid date at row {}", i))?;
            let adm = parse_count(admissions.get(i), "admissions", i)?;
            let dis = parse_count(discharges.get(i), "discharges", i)?;
            let rea_value = rea.and_then(|c| c.get(i));

            let entry = days.entry(date).or_default();
            if regions.is_none() && entry.rows > 0 {
                duplicates.push(date);
            }
            entry.rows += 1;
            entry.admissions += adm;
            entry.discharges += dis;
            entry.rea = match (entry.rea, rea_value) {
                (Some(a), Some(b)) => Some(a + b),
                (a, b) => a.or(b),
            };
        }

        if !duplicates.is_empty() {
            anyhow::bail!(
                "Duplicate dates without a 'region' column: {:?}",
                duplicates
            );
        }
        if days.is_empty() && rows_read > 0 {
            anyhow::bail!(
                "No rows left after filtering on region {:?}",
                region_filter.unwrap_or_default()
            );
        }

        let mut observations = Vec::with_capacity(days.len());
        let mut icu_rate = Vec::with_capacity(days.len());
        for (date, totals) in &days {
            observations.push(Observation::new(
                *date,
                to_u32(totals.admissions, "admissions", *date)?,
                to_u32(totals.discharges, "discharges", *date)?,
            ));
            icu_rate.push(
                totals
                    .rea
                    .map(|r| (r / f64::from(self.ingestion.icu_capacity)).clamp(0.0, 1.0)),
            );
        }

        let store = SeriesStore::new(observations)?;
        let icu_rate = rea.map(|_| icu_rate);

        Ok(SeriesLoadResult {
            store,
            rows_read,
            icu_rate,
        })
    }
}

/// Trim and lower-case every column name.
fn normalize_column_names(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    df.set_column_names(names)
        .context("Column names collide after normalization")?;
    Ok(())
}

/// Accepts `YYYY-MM-DD` with an optional time part.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.date());
        }
    }
    anyhow::bail!("Unrecognized date '{}'", value)
}

fn parse_count(value: Option<f64>, column: &str, row: usize) -> Result<u64> {
    let value = value.with_context(|| format!("Missing {} at row {}", column, row))?;
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("{} must be a non-negative count at row {}, got {}", column, row, value);
    }
    Ok(value.round() as u64)
}

fn to_u32(value: u64, column: &str, date: NaiveDate) -> Result<u32> {
    u32::try_from(value).with_context(|| format!("{} on {} overflows: {}", column, date, value))
}
