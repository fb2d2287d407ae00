//! Data loading and export.
//!
//! Loaders read the normalized daily CSV into a [`SeriesStore`](crate::core::SeriesStore),
//! applying the ingestion scope from [`IngestionSettings`](crate::config::IngestionSettings).
//! Exporters turn a history window plus forecasts into a polars table.
//!
//! # Example
//!
//! ```no_run
//! use sph_forecast::io::SeriesLoader;
//! use std::path::Path;
//!
//! let result = SeriesLoader::default()
//!     .load_from_csv(Path::new("data/raw/hospital_daily.csv"))
//!     .expect("Failed to load");
//! println!("Loaded {} days", result.store.len());
//! ```

pub mod export;
pub mod loaders;


pub use export::{export_csv_string, export_table, write_export_csv};
pub use loaders::{parse_date, SeriesLoadResult, SeriesLoader};
