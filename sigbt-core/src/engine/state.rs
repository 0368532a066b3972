//! Run parameters and run result types.

use serde::{Deserialize, Serialize};

use super::action::BarAction;
use super::curves::Curves;
use crate::domain::{OpenPosition, TradeLog};
use crate::error::InputError;

pub const DEFAULT_INITIAL_PORTFOLIO: f64 = 1000.0;
pub const DEFAULT_COMMISSION_PCT: f64 = 0.15;

/// How curves treat bars whose signal had no transition, and what drives the
/// realized step series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveCompat {
    /// Every curve has one point per bar. Ignored bars carry the previous
    /// mark-to-market value forward; the realized step follows actual closes.
    #[default]
    Corrected,
    /// Ignored bars emit no mark-to-market point, and the realized step
    /// advances on any non-zero signal after the first bar.
    Legacy,
}

/// Parameters for a single backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestParams {
    pub initial_portfolio: f64,
    /// Commission as a percentage of the balance at entry (0.15 = 0.15%).
    pub commission_pct: f64,
    #[serde(default)]
    pub curve_compat: CurveCompat,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            initial_portfolio: DEFAULT_INITIAL_PORTFOLIO,
            commission_pct: DEFAULT_COMMISSION_PCT,
            curve_compat: CurveCompat::default(),
        }
    }
}

impl BacktestParams {
    pub fn new(initial_portfolio: f64, commission_pct: f64) -> Self {
        Self {
            initial_portfolio,
            commission_pct,
            curve_compat: CurveCompat::default(),
        }
    }

    pub fn with_curve_compat(mut self, compat: CurveCompat) -> Self {
        self.curve_compat = compat;
        self
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.initial_portfolio.is_finite() && self.initial_portfolio > 0.0) {
            return Err(InputError::InvalidInitialPortfolio(self.initial_portfolio));
        }
        if !(self.commission_pct.is_finite() && self.commission_pct >= 0.0) {
            return Err(InputError::InvalidCommission(self.commission_pct));
        }
        Ok(())
    }
}

/// Result of a complete backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// What the ledger did on each bar.
    pub actions: Vec<BarAction>,
    /// Seed balance plus every closed trade.
    pub trade_log: TradeLog,
    /// Realized balance after the last bar.
    pub final_balance: f64,
    /// Position still open after the last bar, left unrealized.
    pub open_position: Option<OpenPosition>,
    pub curves: Curves,
    /// Positions opened long, flips included.
    pub long_entries: usize,
    /// Positions opened short, flips included.
    pub short_entries: usize,
    pub bar_count: usize,
}
