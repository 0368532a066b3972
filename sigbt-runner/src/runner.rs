//! Backtest runner: wires together loading, engine, and metrics.
//!
//! Three entry points:
//! - `run_single_backtest()`: loads a CSV file, then runs. Used by the CLI.
//! - `run_backtest_from_series()`: takes an already-built series. Used by
//!   hosts that produce bars in memory.
//! - `run_batch()`: runs many files concurrently, one independent run each.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use sigbt_core::domain::{BarSeries, OpenPosition, Trade};
use sigbt_core::engine::{run_backtest, BacktestParams, BarAction, Curves};
use sigbt_core::InputError;

use crate::config::{run_id_for, BacktestConfig, ConfigError, RunId};
use crate::data_loader::{compute_dataset_hash, load_csv, LoadError};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Load(#[from] LoadError),
    #[error("input error: {0}")]
    Input(#[from] InputError),
}

impl RunError {
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Config(e) => e.kind(),
            RunError::Load(e) => e.kind(),
            RunError::Input(e) => e.kind(),
        }
    }
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Where the bars came from (file path or caller-supplied label).
    pub source: String,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    pub actions: Vec<BarAction>,
    pub curves: Curves,
    /// Position left open after the last bar; never force-closed.
    pub open_position: Option<OpenPosition>,
    pub params: BacktestParams,
    pub bar_count: usize,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub dataset_hash: String,
    pub run_id: RunId,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load `path` and run a backtest with the parameters from `config`.
pub fn run_single_backtest(path: &Path, config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let loaded = load_csv(path)?;
    let result = run_backtest_from_series(
        &loaded.series,
        &config.params(),
        &path.display().to_string(),
        &loaded.dataset_hash,
    )?;

    info!(
        source = %result.source,
        bars = result.bar_count,
        trades = result.metrics.trade_count,
        final_balance = result.metrics.final_balance,
        roi = result.metrics.roi,
        "backtest complete"
    );
    Ok(result)
}

/// Run a backtest over a pre-built series.
///
/// `dataset_hash` may be empty, in which case it is computed from the series.
pub fn run_backtest_from_series(
    series: &BarSeries,
    params: &BacktestParams,
    source: &str,
    dataset_hash: &str,
) -> Result<BacktestResult, RunError> {
    let run = run_backtest(series, params)?;
    let metrics = PerformanceMetrics::compute(&run, series, params);

    let dataset_hash = if dataset_hash.is_empty() {
        compute_dataset_hash(series)
    } else {
        dataset_hash.to_string()
    };
    let run_id = run_id_for(params, &dataset_hash);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        source: source.to_string(),
        metrics,
        trades: run.trade_log.trades().to_vec(),
        actions: run.actions,
        curves: run.curves,
        open_position: run.open_position,
        params: *params,
        bar_count: run.bar_count,
        start_timestamp: series.first_timestamp().to_string(),
        end_timestamp: series.last_timestamp().to_string(),
        dataset_hash,
        run_id,
    })
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<BacktestResult, RunError>,
}

/// Run every file independently and in parallel. Output order matches `paths`.
///
/// A failing file does not affect the others.
pub fn run_batch(paths: &[PathBuf], config: &BacktestConfig) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = paths
        .par_iter()
        .map(|path| {
            let result = run_single_backtest(path, config);
            if let Err(e) = &result {
                warn!(path = %path.display(), kind = e.kind(), error = %e, "backtest failed");
            }
            BatchOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(total = outcomes.len(), failed, "batch complete");
    outcomes
}
