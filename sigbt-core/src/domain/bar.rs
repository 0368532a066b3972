//! Bar: the fundamental market data unit, and the validated series of bars.

use serde::{Deserialize, Serialize};

use super::signal::Signal;
use crate::error::InputError;

/// One row of input: OHLC prices plus the strategy's signal for that bar.
///
/// `timestamp` is an opaque ordering key; the engine never interprets it and
/// only carries it through to curves and trades. `high` and `low` are
/// validated but unused by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub signal: Signal,
}

impl Bar {
    fn prices(&self) -> [(&'static str, f64); 4] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
    }

    /// Check that every price is finite and strictly positive.
    pub fn validate(&self, index: usize) -> Result<(), InputError> {
        for (field, value) in self.prices() {
            if !value.is_finite() {
                return Err(InputError::NonFinitePrice {
                    bar: index,
                    field,
                    value,
                });
            }
            if value <= 0.0 {
                return Err(InputError::NonPositivePrice {
                    bar: index,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// A non-empty, validated, time-ordered sequence of bars.
///
/// Construction is the only place input is checked; once a `BarSeries`
/// exists the engine can index `close[0]` and divide by any close safely.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and wrap row-oriented bars.
    pub fn new(bars: Vec<Bar>) -> Result<Self, InputError> {
        let first = bars.first().ok_or(InputError::EmptySeries)?;
        if first.close == 0.0 {
            return Err(InputError::ZeroReferencePrice);
        }
        for (i, bar) in bars.iter().enumerate() {
            bar.validate(i)?;
        }
        Ok(Self { bars })
    }

    /// Build a series from parallel columns, the shape a tabular loader hands over.
    ///
    /// Every column must have the same length as `datetime`; signal codes
    /// outside {-2..2} are rejected with the index of the offending bar.
    pub fn from_columns(
        datetime: Vec<String>,
        open: &[f64],
        high: &[f64],
        low: &[f64],
        close: &[f64],
        signals: &[i64],
    ) -> Result<Self, InputError> {
        let expected = datetime.len();
        let lengths = [
            ("open", open.len()),
            ("high", high.len()),
            ("low", low.len()),
            ("close", close.len()),
            ("signals", signals.len()),
        ];
        for (column, actual) in lengths {
            if actual != expected {
                return Err(InputError::LengthMismatch {
                    column,
                    expected,
                    actual,
                });
            }
        }

        let bars = datetime
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| {
                Ok(Bar {
                    timestamp,
                    open: open[i],
                    high: high[i],
                    low: low[i],
                    close: close[i],
                    signal: Signal::from_code(signals[i], i)?,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        Self::new(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close of the first bar, the buy-and-hold reference price.
    pub fn first_close(&self) -> f64 {
        self.bars[0].close
    }

    pub fn last_close(&self) -> f64 {
        self.bars[self.bars.len() - 1].close
    }

    pub fn first_timestamp(&self) -> &str {
        &self.bars[0].timestamp
    }

    pub fn last_timestamp(&self) -> &str {
        &self.bars[self.bars.len() - 1].timestamp
    }
}
