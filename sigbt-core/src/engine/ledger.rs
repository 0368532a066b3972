//! Position state machine and PnL ledger.
//!
//! `Ledger` is the single accumulator threaded through the bar loop. It owns
//! the running balance, the open position (if any) and the trade log, and is
//! the only thing allowed to mutate them.
//!
//! Transition table, keyed by (held direction, signal):
//!
//! | Held  | Signal    | Result                                  |
//! |-------|-----------|-----------------------------------------|
//! | Flat  | Buy       | open long                               |
//! | Flat  | Sell      | open short                              |
//! | Long  | Sell      | close long                              |
//! | Short | Buy       | close short                             |
//! | Long  | FlipShort | close long, open short (same close)     |
//! | Short | FlipLong  | close short, open long (same close)     |
//! | any   | Hold      | unchanged                               |
//! | other | other     | ignored, unchanged                      |

use tracing::debug;

use super::action::BarAction;
use crate::domain::{Bar, Direction, OpenPosition, PositionSide, Signal, Trade, TradeLog};

/// Running state for one backtest.
#[derive(Debug, Clone)]
pub struct Ledger {
    commission_pct: f64,
    balance: f64,
    position: Option<OpenPosition>,
    log: TradeLog,
    long_entries: usize,
    short_entries: usize,
}

impl Ledger {
    pub fn new(initial_portfolio: f64, commission_pct: f64) -> Self {
        Self {
            commission_pct,
            balance: initial_portfolio,
            position: None,
            log: TradeLog::new(initial_portfolio),
            long_entries: 0,
            short_entries: 0,
        }
    }

    /// Apply one bar's signal and report what happened.
    pub fn apply(&mut self, index: usize, bar: &Bar) -> BarAction {
        match (self.position.take(), bar.signal) {
            (None, Signal::Buy) => {
                self.open(Direction::Long, index, bar);
                BarAction::Open {
                    direction: Direction::Long,
                }
            }
            (None, Signal::Sell) => {
                self.open(Direction::Short, index, bar);
                BarAction::Open {
                    direction: Direction::Short,
                }
            }
            (Some(held), signal) if closes(held.direction, signal) => {
                let trade = self.close(held, index, bar);
                BarAction::Close { trade }
            }
            (Some(held), signal) if flips(held.direction, signal) => {
                let opened = held.direction.opposite();
                let trade = self.close(held, index, bar);
                self.open(opened, index, bar);
                BarAction::Flip { trade, opened }
            }
            (held, Signal::Hold) => {
                self.position = held;
                BarAction::Hold
            }
            (held, signal) => {
                debug!(
                    bar = index,
                    signal = signal.code(),
                    side = ?PositionSide::from(held.as_ref().map(|p| p.direction)),
                    "signal has no transition from current state"
                );
                self.position = held;
                BarAction::Ignored
            }
        }
    }

    /// Portfolio value at `close` after this bar's action.
    ///
    /// Returns `None` for ignored bars; the curve builder decides what to emit.
    /// Bars with a transition report the realized balance; held bars re-mark
    /// the open position.
    pub fn mark(&self, action: BarAction, close: f64) -> Option<f64> {
        match (action, &self.position) {
            (BarAction::Ignored, _) => None,
            (BarAction::Hold, Some(held)) => Some(held.mark_to_market(self.balance, close)),
            _ => Some(self.balance),
        }
    }

    fn open(&mut self, direction: Direction, index: usize, bar: &Bar) {
        match direction {
            Direction::Long => self.long_entries += 1,
            Direction::Short => self.short_entries += 1,
        }
        self.position = Some(OpenPosition::open(
            direction,
            index,
            bar,
            self.balance,
            self.commission_pct,
        ));
    }

    /// Realize `held` at the bar's close. Returns the trade's index in the log.
    fn close(&mut self, held: OpenPosition, index: usize, bar: &Bar) -> usize {
        let pnl = held.pnl_at(bar.close);
        self.balance += pnl;

        debug!(
            bar = index,
            direction = ?held.direction,
            entry = held.entry_price,
            exit = bar.close,
            pnl,
            balance = self.balance,
            "trade closed"
        );

        self.log.push(Trade {
            direction: held.direction,
            entry_bar: held.entry_bar,
            entry_timestamp: held.entry_timestamp,
            entry_price: held.entry_price,
            exit_bar: index,
            exit_timestamp: bar.timestamp.clone(),
            exit_price: bar.close,
            quantity: held.quantity,
            commission: held.charges,
            pnl,
            balance_after: self.balance,
        });
        self.log.trade_count() - 1
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    pub fn side(&self) -> PositionSide {
        PositionSide::from(self.position.as_ref().map(|p| p.direction))
    }

    pub fn trade_log(&self) -> &TradeLog {
        &self.log
    }

    pub fn long_entries(&self) -> usize {
        self.long_entries
    }

    pub fn short_entries(&self) -> usize {
        self.short_entries
    }

    /// Consume the ledger, yielding the trade log and any still-open position.
    pub fn finish(self) -> (TradeLog, Option<OpenPosition>) {
        (self.log, self.position)
    }
}

fn closes(held: Direction, signal: Signal) -> bool {
    matches!(
        (held, signal),
        (Direction::Long, Signal::Sell) | (Direction::Short, Signal::Buy)
    )
}

fn flips(held: Direction, signal: Signal) -> bool {
    matches!(
        (held, signal),
        (Direction::Long, Signal::FlipShort) | (Direction::Short, Signal::FlipLong)
    )
}
