//! Position types: the directional exposure held between signals.

use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short. Multiplies `(exit - entry)` into gross PnL.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

/// Exposure at a bar: exactly one of flat, long or short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSide {
    Flat,
    Long,
    Short,
}

impl From<Option<Direction>> for PositionSide {
    fn from(direction: Option<Direction>) -> Self {
        match direction {
            None => PositionSide::Flat,
            Some(Direction::Long) => PositionSide::Long,
            Some(Direction::Short) => PositionSide::Short,
        }
    }
}

/// An open position. Only exists while not flat, so entry fields are always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub direction: Direction,
    pub entry_bar: usize,
    pub entry_timestamp: String,
    pub entry_price: f64,
    /// Units bought (long) or sold (short) at entry: balance / entry price.
    pub quantity: f64,
    /// Commission reserved at entry; charged in full when the position closes.
    pub charges: f64,
}

impl OpenPosition {
    /// Size a new position from the whole balance at the bar's close.
    pub fn open(
        direction: Direction,
        entry_bar: usize,
        bar: &Bar,
        balance: f64,
        commission_pct: f64,
    ) -> Self {
        Self {
            direction,
            entry_bar,
            entry_timestamp: bar.timestamp.clone(),
            entry_price: bar.close,
            quantity: balance / bar.close,
            charges: commission_pct * balance / 100.0,
        }
    }

    /// Realized PnL if the position were closed at `exit_price`, net of charges.
    pub fn pnl_at(&self, exit_price: f64) -> f64 {
        self.direction.sign() * (exit_price - self.entry_price) * self.quantity - self.charges
    }

    /// Portfolio value marked at `price`, relative to the last realized balance.
    ///
    /// Long: `balance + (price*qty - balance)`. Short: `balance - (price*qty - balance)`.
    pub fn mark_to_market(&self, balance: f64, price: f64) -> f64 {
        let unrealized = price * self.quantity - balance;
        match self.direction {
            Direction::Long => balance + unrealized,
            Direction::Short => balance - unrealized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;

    fn bar_at(close: f64) -> Bar {
        Bar {
            timestamp: "2024-03-01".into(),
            open: close,
            high: close,
            low: close,
            close,
            signal: Signal::Hold,
        }
    }

    #[test]
    fn open_sizes_from_balance() {
        let pos = OpenPosition::open(Direction::Long, 3, &bar_at(100.0), 1000.0, 0.15);
        assert_eq!(pos.quantity, 10.0);
        assert!((pos.charges - 1.5).abs() < 1e-12);
        assert_eq!(pos.entry_bar, 3);
        assert_eq!(pos.entry_timestamp, "2024-03-01");
    }

    #[test]
    fn long_pnl() {
        let pos = OpenPosition::open(Direction::Long, 0, &bar_at(100.0), 1000.0, 0.0);
        assert_eq!(pos.pnl_at(120.0), 200.0);
    }

    #[test]
    fn short_pnl_subtracts_charges() {
        let pos = OpenPosition::open(Direction::Short, 0, &bar_at(100.0), 1000.0, 0.1);
        // (100 - 90) * 10 - 1.0
        assert!((pos.pnl_at(90.0) - 99.0).abs() < 1e-12);
    }

    #[test]
    fn mark_to_market_long_and_short() {
        let long = OpenPosition::open(Direction::Long, 0, &bar_at(100.0), 1000.0, 0.0);
        assert_eq!(long.mark_to_market(1000.0, 110.0), 1100.0);

        let short = OpenPosition::open(Direction::Short, 0, &bar_at(100.0), 1000.0, 0.0);
        assert_eq!(short.mark_to_market(1000.0, 110.0), 900.0);
    }

    #[test]
    fn side_from_direction() {
        assert_eq!(PositionSide::from(None), PositionSide::Flat);
        assert_eq!(
            PositionSide::from(Some(Direction::Short)),
            PositionSide::Short
        );
        assert_eq!(Direction::Long.opposite(), Direction::Short);
    }
}
