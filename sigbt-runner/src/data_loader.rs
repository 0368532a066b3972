//! Bar loading from CSV.
//!
//! Reads a header row plus one row per bar. The required columns are
//! `datetime, open, high, low, close, signals`, in any order; extra columns
//! are ignored. Parsed columns are handed to `BarSeries::from_columns`,
//! which performs all value validation, so a file either loads completely
//! or is rejected with a located error.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sigbt_core::domain::BarSeries;
use sigbt_core::InputError;
use thiserror::Error;

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = ["datetime", "open", "high", "low", "close", "signals"];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("bar {bar}: column '{column}' has non-numeric value '{value}'")]
    NotNumeric {
        bar: usize,
        column: &'static str,
        value: String,
    },

    #[error("invalid input: {0}")]
    Input(#[from] InputError),
}

impl LoadError {
    /// Stable machine-readable identifier for the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Io { .. } => "io",
            LoadError::Csv(_) => "malformed_csv",
            LoadError::MissingColumn(_) => "missing_column",
            LoadError::NotNumeric { .. } => "not_numeric",
            LoadError::Input(e) => e.kind(),
        }
    }
}

/// Result of loading bars, with provenance for fingerprinting.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub series: BarSeries,
    /// BLAKE3 over timestamps, prices and signal codes.
    pub dataset_hash: String,
}

/// Load a bar series from a CSV file on disk.
pub fn load_csv(path: &Path) -> Result<LoadedBars, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv_reader(file)
}

/// Load a bar series from any CSV byte source.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<LoadedBars, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut indices = [0usize; 6];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(LoadError::MissingColumn(column))?;
    }
    let [dt_idx, open_idx, high_idx, low_idx, close_idx, signal_idx] = indices;

    let mut datetime = Vec::new();
    let mut open = Vec::new();
    let mut high = Vec::new();
    let mut low = Vec::new();
    let mut close = Vec::new();
    let mut signals = Vec::new();

    for (bar, record) in rdr.records().enumerate() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        datetime.push(cell(dt_idx).to_string());
        open.push(parse_price(cell(open_idx), bar, "open")?);
        high.push(parse_price(cell(high_idx), bar, "high")?);
        low.push(parse_price(cell(low_idx), bar, "low")?);
        close.push(parse_price(cell(close_idx), bar, "close")?);
        signals.push(parse_signal(cell(signal_idx), bar)?);
    }

    let series = BarSeries::from_columns(datetime, &open, &high, &low, &close, &signals)?;
    let dataset_hash = compute_dataset_hash(&series);
    Ok(LoadedBars {
        series,
        dataset_hash,
    })
}

fn parse_price(raw: &str, bar: usize, column: &'static str) -> Result<f64, LoadError> {
    raw.parse::<f64>().map_err(|_| LoadError::NotNumeric {
        bar,
        column,
        value: raw.to_string(),
    })
}

/// Signal cells may be written as integers or as integral floats ("1.0").
/// Range checking happens in the core.
fn parse_signal(raw: &str, bar: usize) -> Result<i64, LoadError> {
    if let Ok(code) = raw.parse::<i64>() {
        return Ok(code);
    }
    let not_numeric = || LoadError::NotNumeric {
        bar,
        column: "signals",
        value: raw.to_string(),
    };
    let value = raw.parse::<f64>().map_err(|_| not_numeric())?;
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return Err(not_numeric());
    }
    Ok(value as i64)
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn compute_dataset_hash(series: &BarSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in series.bars() {
        hasher.update(bar.timestamp.as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.signal.code().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
