//! Input validation errors.
//!
//! Every error here is raised before the first bar is simulated, so a
//! failed run never produces partial state.

use thiserror::Error;

/// Rejection of a bar series or of run parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("bar series is empty")]
    EmptySeries,

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("bar {bar}: {field} is not a finite number ({value})")]
    NonFinitePrice {
        bar: usize,
        field: &'static str,
        value: f64,
    },

    #[error("bar {bar}: {field} must be positive, got {value}")]
    NonPositivePrice {
        bar: usize,
        field: &'static str,
        value: f64,
    },

    #[error("bar {bar}: signal code {code} is not one of -2, -1, 0, 1, 2")]
    InvalidSignal { bar: usize, code: i64 },

    #[error("first close is zero; buy-and-hold reference price is undefined")]
    ZeroReferencePrice,

    #[error("initial portfolio must be positive and finite, got {0}")]
    InvalidInitialPortfolio(f64),

    #[error("commission must be a non-negative finite percentage, got {0}")]
    InvalidCommission(f64),
}

impl InputError {
    /// Stable machine-readable identifier for the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            InputError::EmptySeries => "empty_series",
            InputError::LengthMismatch { .. } => "length_mismatch",
            InputError::NonFinitePrice { .. } => "non_finite_price",
            InputError::NonPositivePrice { .. } => "non_positive_price",
            InputError::InvalidSignal { .. } => "invalid_signal",
            InputError::ZeroReferencePrice => "zero_reference_price",
            InputError::InvalidInitialPortfolio(_) => "invalid_initial_portfolio",
            InputError::InvalidCommission(_) => "invalid_commission",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_bar() {
        let err = InputError::NonPositivePrice {
            bar: 3,
            field: "close",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "bar 3: close must be positive, got -1");
        assert_eq!(err.kind(), "non_positive_price");
    }

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            InputError::EmptySeries,
            InputError::LengthMismatch {
                column: "close",
                expected: 2,
                actual: 1,
            },
            InputError::NonFinitePrice {
                bar: 0,
                field: "open",
                value: f64::NAN,
            },
            InputError::NonPositivePrice {
                bar: 0,
                field: "open",
                value: 0.0,
            },
            InputError::InvalidSignal { bar: 0, code: 9 },
            InputError::ZeroReferencePrice,
            InputError::InvalidInitialPortfolio(0.0),
            InputError::InvalidCommission(-1.0),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }
}
