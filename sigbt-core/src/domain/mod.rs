//! Domain types: bars, signals, positions, trades.

pub mod bar;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::{Bar, BarSeries};
pub use position::{Direction, OpenPosition, PositionSide};
pub use signal::Signal;
pub use trade::{Trade, TradeLog};
