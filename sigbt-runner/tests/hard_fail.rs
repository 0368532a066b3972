//! Malformed inputs must be rejected with a located, typed error and never
//! produce a partial result.

use std::path::PathBuf;

use sigbt_core::InputError;
use sigbt_runner::config::BacktestConfig;
use sigbt_runner::data_loader::{load_csv_reader, LoadError};
use sigbt_runner::runner::run_single_backtest;

const HEADER: &str = "datetime,open,high,low,close,signals\n";

fn load(body: &str) -> Result<(), LoadError> {
    load_csv_reader(format!("{HEADER}{body}").as_bytes()).map(|_| ())
}

#[test]
fn hard_fail_signal_out_of_range() {
    let err = load("a,1,1,1,1,0\nb,1,1,1,1,-3\n").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Input(InputError::InvalidSignal { bar: 1, code: -3 })
    ));
}

#[test]
fn hard_fail_nan_price() {
    let err = load("a,1,1,1,1,0\nb,1,NaN,1,1,0\n").unwrap_err();
    assert_eq!(err.kind(), "non_finite_price");
}

#[test]
fn hard_fail_infinite_close() {
    let err = load("a,1,1,1,1,0\nb,1,1,1,inf,0\n").unwrap_err();
    assert_eq!(err.kind(), "non_finite_price");
}

#[test]
fn hard_fail_negative_price() {
    let err = load("a,1,1,1,1,0\nb,1,1,-1,1,0\n").unwrap_err();
    match err {
        LoadError::Input(InputError::NonPositivePrice { bar, field, .. }) => {
            assert_eq!(bar, 1);
            assert_eq!(field, "low");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn hard_fail_zero_first_close_beats_other_checks() {
    let err = load("a,1,1,1,0,0\nb,1,1,-1,1,0\n").unwrap_err();
    assert_eq!(err.kind(), "zero_reference_price");
}

#[test]
fn hard_fail_empty_cell() {
    let err = load("a,1,1,,1,0\n").unwrap_err();
    assert_eq!(err.kind(), "not_numeric");
}

#[test]
fn hard_fail_ragged_row() {
    let err = load("a,1,1,1,1,0\nb,1,1,1\n").unwrap_err();
    assert_eq!(err.kind(), "malformed_csv");
}

#[test]
fn hard_fail_missing_header_column() {
    let err = load_csv_reader("datetime,open,high,low,signals\na,1,1,1,0\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn("close")));
}

#[test]
fn hard_fail_empty_file() {
    let err = load_csv_reader("".as_bytes()).unwrap_err();
    assert_eq!(err.kind(), "missing_column");
}

#[test]
fn hard_fail_invalid_config_never_loads_data() {
    let config = BacktestConfig {
        backtest: sigbt_runner::config::BacktestSection {
            initial_portfolio: f64::NAN,
            commission: 0.15,
        },
        ..BacktestConfig::default()
    };
    // The data path does not exist; config validation must fail first.
    let err = run_single_backtest(&PathBuf::from("/no/such/file.csv"), &config).unwrap_err();
    assert_eq!(err.kind(), "invalid_initial_portfolio");
}

#[test]
fn hard_fail_bad_compat_name() {
    let err = BacktestConfig::from_toml_str("[curves]\ncompat = \"fixed\"\n").unwrap_err();
    assert_eq!(err.kind(), "config_parse");
}
