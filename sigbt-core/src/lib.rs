//! sigbt core: domain types and the signal-driven backtest engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, signals, positions, trades, trade log)
//! - Input validation, performed before any state is mutated
//! - Position state machine and PnL ledger
//! - Curve builder (buy-and-hold, mark-to-market, realized step)
//!
//! Everything here is pure and synchronous: one call to
//! [`engine::run_backtest`] owns all of its mutable state.

pub mod domain;
pub mod engine;
pub mod error;

pub use domain::{Bar, BarSeries, Direction, OpenPosition, PositionSide, Signal, Trade, TradeLog};
pub use engine::{
    run_backtest, BacktestParams, BarAction, CurveCompat, CurvePoint, Curves, Ledger, RunResult,
};
pub use error::InputError;
