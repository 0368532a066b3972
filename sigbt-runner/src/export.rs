//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for backtest results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape, the three curves, and the named metrics
//! - **Markdown**: human-readable single-run reports and side-by-side comparisons
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sigbt_core::domain::Trade;
use sigbt_core::engine::Curves;

use crate::metrics::PerformanceMetrics;
use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export closed trades as CSV.
///
/// Columns: direction, entry_bar, entry_datetime, entry_price, exit_bar,
/// exit_datetime, exit_price, quantity, commission, pnl, balance_after, bars_held
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "direction",
        "entry_bar",
        "entry_datetime",
        "entry_price",
        "exit_bar",
        "exit_datetime",
        "exit_price",
        "quantity",
        "commission",
        "pnl",
        "balance_after",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &format!("{:?}", t.direction),
            &t.entry_bar.to_string(),
            &t.entry_timestamp,
            &format!("{:.6}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_timestamp,
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.quantity),
            &format!("{:.2}", t.commission),
            &format!("{:.2}", t.pnl),
            &format!("{:.2}", t.balance_after),
            &t.bars_held().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the three curves as one row per bar.
///
/// Columns: bar_index, datetime, buy_and_hold, mark_to_market, realized.
/// Bars without a mark-to-market point leave that cell empty.
pub fn export_curves_csv(curves: &Curves) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "bar_index",
        "datetime",
        "buy_and_hold",
        "mark_to_market",
        "realized",
    ])?;

    let mut marks = curves.mark_to_market.iter().peekable();
    for (bh, realized) in curves.buy_and_hold.iter().zip(&curves.realized_step) {
        let mark = match marks.peek() {
            Some(p) if p.bar_index == bh.bar_index => {
                let value = format!("{:.2}", p.value);
                marks.next();
                value
            }
            _ => String::new(),
        };
        wtr.write_record([
            &bh.bar_index.to_string(),
            &bh.timestamp,
            &format!("{:.2}", bh.value),
            &mark,
            &format!("{:.2}", realized.value),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the named metrics as `name,value` rows.
pub fn export_metrics_csv(metrics: &PerformanceMetrics) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["name", "value"])?;
    for (name, value) in metrics.named_values() {
        wtr.write_record([name, value.to_string().as_str()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{source_stem}_{timestamp}_{run_id prefix}/`
/// under `output_dir` containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `trades.csv`: closed trades
/// - `curves.csv`: bar-by-bar curves
/// - `metrics.csv`: named metrics
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let stem = Path::new(&result.source)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("run");
    let run_prefix = result.run_id.get(..8).unwrap_or(&result.run_id);
    let dirname = format!(
        "{}_{}_{}",
        stem,
        chrono::Local::now().format("%Y%m%d_%H%M%S"),
        run_prefix
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("manifest.json", export_json(result)?),
        ("trades.csv", export_trades_csv(&result.trades)?),
        ("curves.csv", export_curves_csv(&result.curves)?),
        ("metrics.csv", export_metrics_csv(&result.metrics)?),
        ("report.md", generate_report(result)),
    ];
    for (name, contents) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Source | {} |\n", result.source));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        result.start_timestamp, result.end_timestamp
    ));
    md.push_str(&format!("| Bars | {} |\n", result.bar_count));
    md.push_str(&format!(
        "| Initial Portfolio | {:.2} |\n",
        result.params.initial_portfolio
    ));
    md.push_str(&format!(
        "| Commission | {}% |\n",
        result.params.commission_pct
    ));
    md.push_str(&format!(
        "| Curves | {:?} |\n",
        result.params.curve_compat
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push_str(&format!("| Run Id | {} |\n", result.run_id));
    md.push('\n');

    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | ---: |\n");
    for (name, value) in result.metrics.named_values() {
        md.push_str(&format!("| {name} | {value:.2} |\n"));
    }
    md.push('\n');

    if let Some(pos) = &result.open_position {
        md.push_str("## Open Position\n\n");
        md.push_str(&format!(
            "{:?} {:.6} @ {:.2} since bar {} ({}), not included in Final_Balance.\n\n",
            pos.direction, pos.quantity, pos.entry_price, pos.entry_bar, pos.entry_timestamp
        ));
    }

    md
}

/// Generate a Markdown comparison report for two backtest results.
pub fn generate_comparison(a: &BacktestResult, b: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Comparison\n\n");

    md.push_str("| Field | Run A | Run B |\n");
    md.push_str("| --- | --- | --- |\n");
    md.push_str(&format!("| Source | {} | {} |\n", a.source, b.source));
    md.push_str(&format!(
        "| Commission | {}% | {}% |\n",
        a.params.commission_pct, b.params.commission_pct
    ));
    md.push_str(&format!(
        "| Curves | {:?} | {:?} |\n",
        a.params.curve_compat, b.params.curve_compat
    ));
    md.push('\n');

    md.push_str("## Performance Comparison\n\n");
    md.push_str("| Metric | Run A | Run B | Delta |\n");
    md.push_str("| --- | ---: | ---: | ---: |\n");

    for ((name, va), (_, vb)) in a.metrics.named_values().into_iter().zip(b.metrics.named_values()) {
        let d = vb - va;
        let delta = if d >= 0.0 {
            format!("+{d:.2}")
        } else {
            format!("{d:.2}")
        };
        md.push_str(&format!("| {name} | {va:.2} | {vb:.2} | {delta} |\n"));
    }
    md.push('\n');

    md
}
