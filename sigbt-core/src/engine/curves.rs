//! Curve builder: buy-and-hold, mark-to-market and realized-equity series.

use serde::{Deserialize, Serialize};

use super::action::BarAction;
use super::state::CurveCompat;
use crate::domain::{BarSeries, TradeLog};

/// One sample of a curve, keyed by the bar it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub bar_index: usize,
    pub timestamp: String,
    pub value: f64,
}

/// The three time-aligned series produced by a run.
///
/// `buy_and_hold` and `realized_step` always have one point per bar.
/// `mark_to_market` does too under [`CurveCompat::Corrected`]; under
/// [`CurveCompat::Legacy`] bars with ignored signals have no point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curves {
    pub buy_and_hold: Vec<CurvePoint>,
    pub mark_to_market: Vec<CurvePoint>,
    pub realized_step: Vec<CurvePoint>,
}

impl Curves {
    pub fn build(
        series: &BarSeries,
        initial_portfolio: f64,
        marks: &[Option<f64>],
        actions: &[BarAction],
        log: &TradeLog,
        compat: CurveCompat,
    ) -> Self {
        Self {
            buy_and_hold: buy_and_hold(series, initial_portfolio),
            mark_to_market: mark_to_market(series, marks, initial_portfolio, compat),
            realized_step: match compat {
                CurveCompat::Corrected => realized_step(series, actions, log),
                CurveCompat::Legacy => realized_step_by_signal(series, log),
            },
        }
    }

    /// Mark-to-market values only, in bar order.
    pub fn mark_to_market_values(&self) -> Vec<f64> {
        self.mark_to_market.iter().map(|p| p.value).collect()
    }
}

fn point(series: &BarSeries, bar_index: usize, value: f64) -> CurvePoint {
    CurvePoint {
        bar_index,
        timestamp: series.bars()[bar_index].timestamp.clone(),
        value,
    }
}

/// Value of holding the whole initial capital from the first close onward.
pub fn buy_and_hold(series: &BarSeries, initial_portfolio: f64) -> Vec<CurvePoint> {
    let holding_qty = initial_portfolio / series.first_close();
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| point(series, i, holding_qty * bar.close))
        .collect()
}

/// Unrealized equity. `marks[i]` is `None` where the bar's signal was ignored.
pub fn mark_to_market(
    series: &BarSeries,
    marks: &[Option<f64>],
    initial_portfolio: f64,
    compat: CurveCompat,
) -> Vec<CurvePoint> {
    let mut last = initial_portfolio;
    marks
        .iter()
        .enumerate()
        .filter_map(|(i, mark)| match (mark, compat) {
            (Some(value), _) => {
                last = *value;
                Some(point(series, i, *value))
            }
            (None, CurveCompat::Corrected) => Some(point(series, i, last)),
            (None, CurveCompat::Legacy) => None,
        })
        .collect()
}

/// Realized equity step series replayed from the action log: advances to the
/// next trade-log balance exactly on bars that closed a trade.
pub fn realized_step(series: &BarSeries, actions: &[BarAction], log: &TradeLog) -> Vec<CurvePoint> {
    let balances = log.balances();
    let mut current = balances[0];
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            if let Some(trade) = action.closed_trade() {
                current = balances[trade + 1];
            }
            point(series, i, current)
        })
        .collect()
}

/// Realized equity step series keyed on signal presence.
///
/// From bar 1 on, any non-zero signal advances a pointer into the trade log
/// while entries remain, whether or not that bar closed a trade. Opening
/// bars therefore show the balance of the next close early.
pub fn realized_step_by_signal(series: &BarSeries, log: &TradeLog) -> Vec<CurvePoint> {
    let balances = log.balances();
    let mut next = 1;
    let mut current = balances[0];
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i > 0 && next < balances.len() && bar.signal.is_active() {
                current = balances[next];
                next += 1;
            }
            point(series, i, current)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, Direction, Signal, Trade};

    fn series(closes: &[f64], signals: &[Signal]) -> BarSeries {
        let bars = closes
            .iter()
            .zip(signals)
            .enumerate()
            .map(|(i, (&close, &signal))| Bar {
                timestamp: format!("2024-01-{:02}", i + 1),
                open: close,
                high: close,
                low: close,
                close,
                signal,
            })
            .collect();
        BarSeries::new(bars).unwrap()
    }

    fn log_with(balances: &[f64]) -> TradeLog {
        let mut log = TradeLog::new(balances[0]);
        for pair in balances.windows(2) {
            log.push(Trade {
                direction: Direction::Long,
                entry_bar: 0,
                entry_timestamp: String::new(),
                entry_price: 1.0,
                exit_bar: 0,
                exit_timestamp: String::new(),
                exit_price: 1.0,
                quantity: 1.0,
                commission: 0.0,
                pnl: pair[1] - pair[0],
                balance_after: pair[1],
            });
        }
        log
    }

    #[test]
    fn buy_and_hold_scales_by_first_close() {
        let s = series(&[50.0, 100.0, 25.0], &[Signal::Hold; 3]);
        let values: Vec<f64> = buy_and_hold(&s, 1000.0).iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1000.0, 2000.0, 500.0]);
    }

    #[test]
    fn corrected_mark_to_market_carries_forward_gaps() {
        let s = series(&[100.0, 110.0, 120.0], &[Signal::Hold; 3]);
        let marks = [Some(1000.0), Some(1100.0), None];
        let curve = mark_to_market(&s, &marks, 1000.0, CurveCompat::Corrected);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[2].value, 1100.0);
        assert_eq!(curve[2].timestamp, "2024-01-03");
    }

    #[test]
    fn corrected_mark_to_market_leading_gap_uses_initial() {
        let s = series(&[100.0, 110.0], &[Signal::FlipLong, Signal::Hold]);
        let curve = mark_to_market(&s, &[None, Some(1000.0)], 1000.0, CurveCompat::Corrected);
        assert_eq!(curve[0].value, 1000.0);
    }

    #[test]
    fn legacy_mark_to_market_skips_gaps() {
        let s = series(&[100.0, 110.0, 120.0], &[Signal::Hold; 3]);
        let marks = [Some(1000.0), None, Some(1200.0)];
        let curve = mark_to_market(&s, &marks, 1000.0, CurveCompat::Legacy);
        let indices: Vec<usize> = curve.iter().map(|p| p.bar_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn realized_step_advances_on_close_only() {
        let s = series(
            &[100.0, 100.0, 110.0, 120.0],
            &[Signal::Hold, Signal::Buy, Signal::Hold, Signal::Sell],
        );
        let actions = [
            BarAction::Hold,
            BarAction::Open {
                direction: Direction::Long,
            },
            BarAction::Hold,
            BarAction::Close { trade: 0 },
        ];
        let log = log_with(&[1000.0, 1200.0]);
        let values: Vec<f64> = realized_step(&s, &actions, &log)
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![1000.0, 1000.0, 1000.0, 1200.0]);
    }

    #[test]
    fn signal_keyed_step_advances_on_open_bar() {
        let s = series(
            &[100.0, 100.0, 110.0, 120.0],
            &[Signal::Hold, Signal::Buy, Signal::Hold, Signal::Sell],
        );
        let log = log_with(&[1000.0, 1200.0]);
        let values: Vec<f64> = realized_step_by_signal(&s, &log)
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![1000.0, 1200.0, 1200.0, 1200.0]);
    }

    #[test]
    fn signal_keyed_step_ignores_first_bar() {
        let s = series(&[100.0, 120.0], &[Signal::Buy, Signal::Sell]);
        let log = log_with(&[1000.0, 1200.0]);
        let values: Vec<f64> = realized_step_by_signal(&s, &log)
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![1000.0, 1200.0]);
    }
}
