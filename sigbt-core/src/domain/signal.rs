//! Signal: the per-bar trade instruction carried by the input series.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Integer-coded trade instruction attached to every bar.
///
/// Magnitude 1 opens or closes a position, magnitude 2 reverses it in a
/// single bar. The sign gives the direction of the resulting exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Signal {
    /// 0: no instruction, only mark to market.
    Hold,
    /// +1: open long when flat, close short when short.
    Buy,
    /// -1: open short when flat, close long when long.
    Sell,
    /// +2: close short and open long at the same price.
    FlipLong,
    /// -2: close long and open short at the same price.
    FlipShort,
}

impl Signal {
    /// The wire code for this signal.
    pub fn code(self) -> i8 {
        match self {
            Signal::Hold => 0,
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::FlipLong => 2,
            Signal::FlipShort => -2,
        }
    }

    /// Decode a signal code, reporting the offending bar on failure.
    pub fn from_code(code: i64, bar: usize) -> Result<Self, InputError> {
        match code {
            0 => Ok(Signal::Hold),
            1 => Ok(Signal::Buy),
            -1 => Ok(Signal::Sell),
            2 => Ok(Signal::FlipLong),
            -2 => Ok(Signal::FlipShort),
            other => Err(InputError::InvalidSignal { bar, code: other }),
        }
    }

    /// True for every code except `Hold`.
    pub fn is_active(self) -> bool {
        self != Signal::Hold
    }
}

impl TryFrom<i8> for Signal {
    type Error = InputError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        Signal::from_code(i64::from(code), 0)
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.code()
    }
}
