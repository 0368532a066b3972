//! Backtesting engine: single-pass bar loop and supporting pieces.
//!
//! The engine consumes a validated [`BarSeries`](crate::domain::BarSeries)
//! and run parameters, then:
//!
//! 1. Walks the bars once, applying each signal to the [`Ledger`]
//! 2. Records a [`BarAction`] and a mark-to-market sample per bar
//! 3. Builds the buy-and-hold, mark-to-market and realized-step [`Curves`]

pub mod action;
pub mod curves;
pub mod ledger;
pub mod loop_runner;
pub mod state;

pub use action::BarAction;
pub use curves::{CurvePoint, Curves};
pub use ledger::Ledger;
pub use loop_runner::run_backtest;
pub use state::{
    BacktestParams, CurveCompat, RunResult, DEFAULT_COMMISSION_PCT, DEFAULT_INITIAL_PORTFOLIO,
};
