//! Serializable backtest configuration, loaded from TOML.
//!
//! Every section and field is optional; missing values take the documented
//! defaults (1000 initial portfolio, 0.15% commission, corrected curves).
//!
//! ```toml
//! [backtest]
//! initial_portfolio = 1000.0
//! commission = 0.15
//!
//! [curves]
//! compat = "legacy"
//!
//! [output]
//! dir = "results"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sigbt_core::engine::{
    BacktestParams, CurveCompat, DEFAULT_COMMISSION_PCT, DEFAULT_INITIAL_PORTFOLIO,
};
use sigbt_core::InputError;
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from reading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] InputError),
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "config_io",
            ConfigError::Parse(_) => "config_parse",
            ConfigError::Invalid(e) => e.kind(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub curves: CurvesSection,
    pub output: OutputSection,
}

/// Run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestSection {
    pub initial_portfolio: f64,
    /// Percent of the balance at entry charged per round trip.
    pub commission: f64,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            initial_portfolio: DEFAULT_INITIAL_PORTFOLIO,
            commission: DEFAULT_COMMISSION_PCT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurvesSection {
    pub compat: CurveCompat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Directory artifacts are written under.
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
        }
    }
}

impl BacktestConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params().validate()?;
        Ok(())
    }

    /// Engine parameters described by this config.
    pub fn params(&self) -> BacktestParams {
        BacktestParams::new(self.backtest.initial_portfolio, self.backtest.commission)
            .with_curve_compat(self.curves.compat)
    }

    /// Deterministic hash of the parameters that affect results.
    ///
    /// The output directory is excluded.
    pub fn run_id(&self, dataset_hash: &str) -> RunId {
        run_id_for(&self.params(), dataset_hash)
    }
}

/// Two runs over the same dataset with equal run ids produce identical output.
pub fn run_id_for(params: &BacktestParams, dataset_hash: &str) -> RunId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(dataset_hash.as_bytes());
    hasher.update(&params.initial_portfolio.to_le_bytes());
    hasher.update(&params.commission_pct.to_le_bytes());
    hasher.update(match params.curve_compat {
        CurveCompat::Corrected => "corrected".as_bytes(),
        CurveCompat::Legacy => "legacy".as_bytes(),
    });
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = BacktestConfig::from_toml_str("").unwrap();
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.params(), BacktestParams::default());
        assert_eq!(config.output.dir, PathBuf::from("results"));
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = BacktestConfig::from_toml_str(
            r#"
            [backtest]
            commission = 0.0

            [curves]
            compat = "legacy"
            "#,
        )
        .unwrap();
        assert_eq!(config.backtest.initial_portfolio, 1000.0);
        assert_eq!(config.backtest.commission, 0.0);
        assert_eq!(config.curves.compat, CurveCompat::Legacy);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = BacktestConfig::from_toml_str("[backtest]\ninitial_portfolio = 0.0\n").unwrap_err();
        assert_eq!(err.kind(), "invalid_initial_portfolio");

        let err = BacktestConfig::from_toml_str("[backtest]\ncommission = -1.0\n").unwrap_err();
        assert_eq!(err.kind(), "invalid_commission");
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = BacktestConfig::from_toml_str("[backtest]\nslippage = 1.0\n").unwrap_err();
        assert_eq!(err.kind(), "config_parse");
    }

    #[test]
    fn run_id_deterministic_and_param_sensitive() {
        let a = BacktestConfig::default();
        let mut b = a.clone();
        assert_eq!(a.run_id("abc"), b.run_id("abc"));

        b.backtest.commission = 0.2;
        assert_ne!(a.run_id("abc"), b.run_id("abc"));
        assert_ne!(a.run_id("abc"), a.run_id("abd"));

        let mut c = a.clone();
        c.output.dir = PathBuf::from("elsewhere");
        assert_eq!(a.run_id("abc"), c.run_id("abc"));
    }

    #[test]
    fn missing_file_reported() {
        let err = BacktestConfig::from_file(Path::new("/no/such/config.toml")).unwrap_err();
        assert_eq!(err.kind(), "config_io");
    }
}
