//! sigbt CLI: run signal backtests over CSV bar files.
//!
//! Commands:
//! - `run`: backtest one file, print metrics, save artifacts
//! - `batch`: backtest many files in parallel
//! - `compare`: side-by-side Markdown report for two saved runs

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sigbt_core::engine::CurveCompat;
use sigbt_runner::runner::{run_batch, run_single_backtest};
use sigbt_runner::{
    export_json, generate_comparison, load_artifacts, save_artifacts, BacktestConfig,
    BacktestResult,
};

#[derive(Parser)]
#[command(
    name = "sigbt",
    about = "sigbt CLI: signal-driven backtests over OHLC bars"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a single CSV file.
    Run {
        /// CSV with datetime, open, high, low, close, signals columns.
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        overrides: Overrides,

        /// Skip writing the artifact directory.
        #[arg(long, default_value_t = false)]
        no_save: bool,

        /// Print the full result as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Backtest several CSV files in parallel.
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Skip writing artifact directories.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Compare two saved artifact directories.
    Compare { a: PathBuf, b: PathBuf },
}

/// Settings shared by `run` and `batch`; flags win over the config file.
#[derive(Args)]
struct Overrides {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    initial_portfolio: Option<f64>,

    /// Commission in percent of the balance at entry.
    #[arg(long)]
    commission: Option<f64>,

    /// Reproduce the legacy curve construction.
    #[arg(long, default_value_t = false)]
    legacy_curves: bool,

    /// Artifact directory. Defaults to the config's `output.dir`.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Overrides {
    fn resolve(&self) -> Result<BacktestConfig> {
        let mut config = match &self.config {
            Some(path) => BacktestConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BacktestConfig::default(),
        };
        if let Some(initial) = self.initial_portfolio {
            config.backtest.initial_portfolio = initial;
        }
        if let Some(commission) = self.commission {
            config.backtest.commission = commission;
        }
        if self.legacy_curves {
            config.curves.compat = CurveCompat::Legacy;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            overrides,
            no_save,
            json,
        } => run_cmd(&input, &overrides, no_save, json),
        Commands::Batch {
            files,
            overrides,
            no_save,
        } => batch_cmd(&files, &overrides, no_save),
        Commands::Compare { a, b } => compare_cmd(&a, &b),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_cmd(input: &Path, overrides: &Overrides, no_save: bool, json: bool) -> Result<()> {
    let config = overrides.resolve()?;
    let result = run_single_backtest(input, &config)
        .with_context(|| format!("backtest of {} failed", input.display()))?;

    if json {
        println!("{}", export_json(&result)?);
    } else {
        print_summary(&result);
    }

    if !no_save {
        let run_dir = save_artifacts(&result, &config.output.dir)?;
        info!(dir = %run_dir.display(), "artifacts saved");
    }
    Ok(())
}

fn batch_cmd(files: &[PathBuf], overrides: &Overrides, no_save: bool) -> Result<()> {
    let config = overrides.resolve()?;
    let outcomes = run_batch(files, &config);

    println!(
        "{:<40} {:>8} {:>14} {:>10} {:>10}",
        "File", "Trades", "Final_Balance", "ROI", "Win_Rate"
    );
    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => {
                let m = &result.metrics;
                println!(
                    "{:<40} {:>8} {:>14.2} {:>9.2}% {:>9.2}%",
                    outcome.path.display(),
                    m.trade_count,
                    m.final_balance,
                    m.roi,
                    m.win_rate
                );
                if !no_save {
                    save_artifacts(result, &config.output.dir)?;
                }
            }
            Err(e) => {
                failed += 1;
                println!("{:<40} error [{}]: {e}", outcome.path.display(), e.kind());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} backtests failed", outcomes.len());
    }
    Ok(())
}

fn compare_cmd(a: &Path, b: &Path) -> Result<()> {
    let left = load_artifacts(a)?;
    let right = load_artifacts(b)?;
    print!("{}", generate_comparison(&left, &right));
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Source:         {}", result.source);
    println!(
        "Period:         {} to {}",
        result.start_timestamp, result.end_timestamp
    );
    println!("Bars:           {}", result.bar_count);
    println!("Curves:         {:?}", result.params.curve_compat);
    println!();
    println!("--- Performance ---");
    for (name, value) in result.metrics.named_values() {
        println!("{:<18}{value:.2}", format!("{name}:"));
    }
    if let Some(pos) = &result.open_position {
        println!();
        println!(
            "NOTE: {:?} position open since {} ({:.6} @ {:.2}), unrealized",
            pos.direction, pos.entry_timestamp, pos.quantity, pos.entry_price
        );
    }
}
