//! Pricing basis configuration
//!
//! A JSON document fixing everything a calculation needs besides the
//! mortality table itself:
//!
//! ```json
//! {
//!   "interest": { "type": "curve", "points": [{ "maturity": 1.0, "rate": 0.03 }] },
//!   "boundary": "closed",
//!   "expense_loading": { "premium_loading": 0.05, "initial_expense": 250.0 }
//! }
//! ```
//!
//! Every field is optional; omitted fields take the [`PricingConfig::default`] values.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assumptions::TableBoundary;
use crate::error::ActuarialError;
use crate::interest::{Discounting, InterestTheory, YieldCurve};
use crate::pricing::ExpenseLoading;

/// Default flat valuation rate
pub const DEFAULT_INTEREST_RATE: f64 = 0.05;

/// Failure to read or validate a pricing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed pricing config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ActuarialError),
}

/// One tenor of a configured yield curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub maturity: f64,
    pub rate: f64,
}

/// Interest assumption: one flat rate or a term structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterestBasis {
    Flat { rate: f64 },
    Curve { points: Vec<CurvePoint> },
}

impl Default for InterestBasis {
    fn default() -> Self {
        InterestBasis::Flat {
            rate: DEFAULT_INTEREST_RATE,
        }
    }
}

impl InterestBasis {
    /// Build the validated discounting source
    pub fn discounting(&self) -> Result<Box<dyn Discounting>, ActuarialError> {
        match self {
            InterestBasis::Flat { rate } => Ok(Box::new(InterestTheory::new(*rate)?)),
            InterestBasis::Curve { points } => {
                let maturities = points.iter().map(|p| p.maturity).collect();
                let yields = points.iter().map(|p| p.rate).collect();
                Ok(Box::new(YieldCurve::new(maturities, yields)?))
            }
        }
    }
}

/// Complete pricing basis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Discounting assumption
    pub interest: InterestBasis,

    /// Mortality extrapolation policy past the terminal age
    pub boundary: TableBoundary,

    /// Loadings applied to gross premiums
    pub expense_loading: ExpenseLoading,
}

impl PricingConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PricingConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!("Loaded pricing config: {:?}", config);
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check the interest basis and loadings without building anything else
    pub fn validate(&self) -> Result<(), ActuarialError> {
        self.interest.discounting()?;
        self.expense_loading.validate()
    }

    /// Discounting source for this basis
    pub fn discounting(&self) -> Result<Box<dyn Discounting>, ActuarialError> {
        self.interest.discounting()
    }
}
