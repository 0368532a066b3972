//! Bar-by-bar loop: the single sequential pass over the series.
//!
//! Per bar:
//! 1. Apply the signal to the ledger (open / close / flip / hold / ignore)
//! 2. Record the resulting action and the mark-to-market sample
//!
//! After the pass the curves are built from the action log and trade log.

use tracing::debug;

use super::action::BarAction;
use super::curves::Curves;
use super::ledger::Ledger;
use super::state::{BacktestParams, RunResult};
use crate::domain::BarSeries;
use crate::error::InputError;

/// Run a backtest over a validated bar series.
///
/// Parameters are checked before the first bar is touched. The series
/// itself was validated when it was constructed.
pub fn run_backtest(series: &BarSeries, params: &BacktestParams) -> Result<RunResult, InputError> {
    params.validate()?;

    let mut ledger = Ledger::new(params.initial_portfolio, params.commission_pct);
    let mut actions: Vec<BarAction> = Vec::with_capacity(series.len());
    let mut marks: Vec<Option<f64>> = Vec::with_capacity(series.len());

    for (i, bar) in series.bars().iter().enumerate() {
        let action = ledger.apply(i, bar);
        marks.push(ledger.mark(action, bar.close));
        actions.push(action);
    }

    let long_entries = ledger.long_entries();
    let short_entries = ledger.short_entries();
    let final_balance = ledger.balance();
    let (trade_log, open_position) = ledger.finish();

    let curves = Curves::build(
        series,
        params.initial_portfolio,
        &marks,
        &actions,
        &trade_log,
        params.curve_compat,
    );

    debug!(
        bars = series.len(),
        trades = trade_log.trade_count(),
        final_balance,
        open = open_position.is_some(),
        "backtest pass complete"
    );

    Ok(RunResult {
        actions,
        trade_log,
        final_balance,
        open_position,
        curves,
        long_entries,
        short_entries,
        bar_count: series.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, Signal};

    fn series(closes: &[f64], signals: &[i64]) -> BarSeries {
        let n = closes.len();
        BarSeries::from_columns(
            (0..n).map(|i| format!("bar{i}")).collect(),
            closes,
            closes,
            closes,
            closes,
            signals,
        )
        .unwrap()
    }

    #[test]
    fn invalid_params_rejected_before_run() {
        let s = series(&[100.0], &[0]);
        let err = run_backtest(&s, &BacktestParams::new(-1.0, 0.0)).unwrap_err();
        assert_eq!(err.kind(), "invalid_initial_portfolio");
    }

    #[test]
    fn one_action_and_curve_point_per_bar() {
        let s = series(&[100.0, 101.0, 102.0, 103.0], &[1, 0, 1, -1]);
        let result = run_backtest(&s, &BacktestParams::new(1000.0, 0.0)).unwrap();
        assert_eq!(result.actions.len(), 4);
        assert_eq!(result.curves.buy_and_hold.len(), 4);
        assert_eq!(result.curves.mark_to_market.len(), 4);
        assert_eq!(result.curves.realized_step.len(), 4);
        assert_eq!(result.actions[2], BarAction::Ignored);
    }

    #[test]
    fn open_position_left_unrealized() {
        let s = series(&[100.0, 150.0], &[1, 0]);
        let result = run_backtest(&s, &BacktestParams::new(1000.0, 0.0)).unwrap();
        assert_eq!(result.final_balance, 1000.0);
        assert!(result.open_position.is_some());
        assert_eq!(result.curves.mark_to_market[1].value, 1500.0);
        assert_eq!(result.curves.realized_step[1].value, 1000.0);
    }

    #[test]
    fn short_mark_to_market_moves_against_price() {
        let bars = vec![
            Bar {
                timestamp: "a".into(),
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                signal: Signal::Sell,
            },
            Bar {
                timestamp: "b".into(),
                open: 120.0,
                high: 120.0,
                low: 120.0,
                close: 120.0,
                signal: Signal::Hold,
            },
        ];
        let s = BarSeries::new(bars).unwrap();
        let result = run_backtest(&s, &BacktestParams::new(1000.0, 0.0)).unwrap();
        assert_eq!(result.curves.mark_to_market_values(), vec![1000.0, 800.0]);
        assert_eq!(result.short_entries, 1);
    }
}
