//! Per-bar record of what the ledger actually did.
//!
//! The action log is produced during the single pass over the bars and is
//! what downstream curve construction replays, instead of re-reading raw
//! signal codes.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;

/// Outcome of applying one bar's signal to the position state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BarAction {
    /// Signal 0: state unchanged.
    Hold,
    /// Flat → Long/Short.
    Open { direction: Direction },
    /// Long/Short → Flat. `trade` indexes the trade log (seed excluded).
    Close { trade: usize },
    /// Close the held position and open the opposite one at the same close.
    Flip { trade: usize, opened: Direction },
    /// A signal with no transition from the current state (flip while flat,
    /// or a repeat of the held direction). State unchanged.
    Ignored,
}

impl BarAction {
    /// Index of the trade realized on this bar, if any.
    pub fn closed_trade(&self) -> Option<usize> {
        match *self {
            BarAction::Close { trade } | BarAction::Flip { trade, .. } => Some(trade),
            _ => None,
        }
    }

    /// Direction of the position opened on this bar, if any.
    pub fn opened(&self) -> Option<Direction> {
        match *self {
            BarAction::Open { direction } => Some(direction),
            BarAction::Flip { opened, .. } => Some(opened),
            _ => None,
        }
    }

    /// True when the ledger mutated state on this bar.
    pub fn is_transition(&self) -> bool {
        !matches!(self, BarAction::Hold | BarAction::Ignored)
    }
}
