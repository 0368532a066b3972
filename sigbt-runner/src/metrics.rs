//! Performance metrics: pure functions that compute run statistics.
//!
//! Every metric is a pure function: trade log, pnl list and/or closes in,
//! scalar out. Values keep full precision; rounding to two decimals happens
//! only in [`PerformanceMetrics::named_values`].

use serde::{Deserialize, Serialize};
use sigbt_core::domain::{BarSeries, Trade, TradeLog};
use sigbt_core::engine::{BacktestParams, RunResult};

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trade_count: usize,
    pub min_balance: f64,
    pub max_balance: f64,
    /// Percent.
    pub roi: f64,
    pub total_fees: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent.
    pub win_rate: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub max_win: f64,
    pub max_loss: f64,
    pub long_trades: usize,
    pub short_trades: usize,
    /// Percent change of close over the whole series.
    pub benchmark_return: f64,
    pub benchmark_balance: f64,
    pub average_return: f64,
    /// Percent, zero or negative.
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics for a finished run.
    pub fn compute(run: &RunResult, series: &BarSeries, params: &BacktestParams) -> Self {
        let log = &run.trade_log;
        let trades = log.trades();
        let initial = params.initial_portfolio;
        let (min_balance, max_balance) = balance_bounds(log);
        let benchmark_return = benchmark_return(series);

        Self {
            initial_balance: initial,
            final_balance: run.final_balance,
            trade_count: trades.len(),
            min_balance,
            max_balance,
            roi: roi(initial, run.final_balance),
            total_fees: total_fees(log, params.commission_pct),
            winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
            losing_trades: trades.iter().filter(|t| t.is_loser()).count(),
            win_rate: win_rate(trades),
            average_win: average_win(trades),
            average_loss: average_loss(trades),
            max_win: max_win(trades),
            max_loss: max_loss(trades),
            long_trades: run.long_entries,
            short_trades: run.short_entries,
            benchmark_return,
            benchmark_balance: initial + benchmark_return * initial / 100.0,
            average_return: average_return(initial, run.final_balance, trades.len()),
            max_drawdown: max_drawdown(&run.curves.mark_to_market_values()),
        }
    }

    /// Presentation names and values, rounded to two decimals.
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Initial_Balance", round2(self.initial_balance)),
            ("Final_Balance", round2(self.final_balance)),
            ("No_of_Trades", self.trade_count as f64),
            ("Min_Balance", round2(self.min_balance)),
            ("Max_Balance", round2(self.max_balance)),
            ("ROI", round2(self.roi)),
            ("Net_Profit", round2(self.roi)),
            ("Total_Fees", round2(self.total_fees)),
            ("Winning_Trades", self.winning_trades as f64),
            ("Losing_Trades", self.losing_trades as f64),
            ("Win_Rate", round2(self.win_rate)),
            ("Average_Win", round2(self.average_win)),
            ("Average_Loss", round2(self.average_loss)),
            ("Max_Win", round2(self.max_win)),
            ("Max_Loss", round2(self.max_loss)),
            ("Long_Trades", self.long_trades as f64),
            ("Short_Trades", self.short_trades as f64),
            ("Benchmark_Return", round2(self.benchmark_return)),
            ("Benchmark_Balance", round2(self.benchmark_balance)),
            ("Average_Return", round2(self.average_return)),
            ("Max_Drawdown", round2(self.max_drawdown)),
        ]
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Min and max over the trade log balances, seed included.
pub fn balance_bounds(log: &TradeLog) -> (f64, f64) {
    log.balances()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &b| {
            (lo.min(b), hi.max(b))
        })
}

/// Return on investment in percent.
pub fn roi(initial: f64, final_balance: f64) -> f64 {
    (final_balance - initial) / initial * 100.0
}

/// Fees estimated from the balance preceding each trade.
///
/// Sums `pct × balance / 100` over every balance but the last. This matches
/// the per-trade charges whenever each position opens from the previous
/// trade's closing balance.
pub fn total_fees(log: &TradeLog, commission_pct: f64) -> f64 {
    let balances = log.balances();
    balances[..balances.len() - 1]
        .iter()
        .map(|b| commission_pct * b / 100.0)
        .sum()
}

/// Win rate in percent. Zero-pnl trades count toward the total only.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

pub fn average_win(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl))
}

pub fn average_loss(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| t.is_loser()).map(|t| t.pnl))
}

/// Largest single pnl; 0 without trades.
pub fn max_win(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).reduce(f64::max).unwrap_or(0.0)
}

/// Smallest single pnl; 0 without trades.
pub fn max_loss(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).reduce(f64::min).unwrap_or(0.0)
}

/// Percent change from the first close to the last.
pub fn benchmark_return(series: &BarSeries) -> f64 {
    let first = series.first_close();
    (series.last_close() - first) / first * 100.0
}

pub fn average_return(initial: f64, final_balance: f64, trade_count: usize) -> f64 {
    if trade_count == 0 {
        return 0.0;
    }
    (final_balance - initial) / trade_count as f64
}

/// Maximum peak-to-trough decline in percent (a negative number or zero).
pub fn max_drawdown(curve: &[f64]) -> f64 {
    if curve.len() < 2 {
        return 0.0;
    }
    let mut peak = curve[0];
    let mut max_dd = 0.0_f64;

    for &value in curve {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd * 100.0
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
