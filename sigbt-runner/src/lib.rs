//! sigbt runner: loading, orchestration, metrics and export.
//!
//! This crate builds on `sigbt-core` to provide:
//! - CSV bar loading with located parse errors
//! - TOML run configuration
//! - Single, in-memory and batch runners
//! - Performance metrics with presentation names
//! - JSON, CSV and Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{compute_dataset_hash, load_csv, load_csv_reader, LoadError, LoadedBars};
pub use export::{
    export_curves_csv, export_json, export_metrics_csv, export_trades_csv, generate_comparison,
    generate_report, import_json, load_artifacts, save_artifacts,
};
pub use metrics::PerformanceMetrics;
pub use runner::{
    run_backtest_from_series, run_batch, run_single_backtest, BacktestResult, BatchOutcome,
    RunError, SCHEMA_VERSION,
};
