//! Error types for actuarial calculations
//!
//! Every failure is surfaced synchronously with enough context to tell which
//! parameter or bound was violated:
//! - **Validation**: malformed construction input or call arguments
//! - **Lookup**: an exact age that is not tabulated
//! - **Range**: an interpolated age outside the tabulated span
//! - **Domain**: a horizon running past the terminal age of a table

use thiserror::Error;

/// Error raised by the mortality, interest and pricing layers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActuarialError {
    /// Input rejected before any computation took place
    #[error("invalid {parameter}: {reason}")]
    Validation {
        /// Name of the offending parameter
        parameter: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Exact lookup of an age the table does not contain
    #[error("age {age} not found in mortality table '{table}'")]
    AgeNotFound {
        /// Requested age
        age: u32,
        /// Table name
        table: String,
    },

    /// Interpolated lookup outside the tabulated ages
    #[error("age {age} outside tabulated range [{min_age}, {max_age}]")]
    AgeOutOfRange {
        /// Requested (possibly fractional) age
        age: f64,
        /// First tabulated age
        min_age: u32,
        /// Terminal tabulated age
        max_age: u32,
    },

    /// Survival horizon extends past the terminal age
    #[error("age {age} plus {years} years exceeds terminal age {terminal_age} of table '{table}'")]
    BeyondTable {
        /// Starting age
        age: u32,
        /// Requested horizon in years
        years: u32,
        /// Last tabulated age
        terminal_age: u32,
        /// Table name
        table: String,
    },
}

impl ActuarialError {
    /// Shorthand for a validation failure
    pub fn validation(parameter: &'static str, reason: impl Into<String>) -> Self {
        ActuarialError::Validation {
            parameter,
            reason: reason.into(),
        }
    }

    /// True for construction/argument validation failures
    pub fn is_validation(&self) -> bool {
        matches!(self, ActuarialError::Validation { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = ActuarialError> = std::result::Result<T, E>;

/// Require a finite, strictly positive amount
pub(crate) fn ensure_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ActuarialError::validation(
            parameter,
            format!("must be finite and > 0, got {}", value),
        ))
    }
}

/// Require a finite amount
pub(crate) fn ensure_finite(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ActuarialError::validation(
            parameter,
            format!("must be finite, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_parameter() {
        let err = ActuarialError::validation("sum_assured", "must be > 0, got -1");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid sum_assured: must be > 0, got -1");
    }

    #[test]
    fn test_beyond_table_message() {
        let err = ActuarialError::BeyondTable {
            age: 90,
            years: 20,
            terminal_age: 100,
            table: "Test".to_string(),
        };
        assert!(!err.is_validation());
        assert!(err.to_string().contains("terminal age 100"));
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("x", 1.0).is_ok());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", f64::NAN).is_err());
        assert!(ensure_finite("x", -3.0).is_ok());
        assert!(ensure_finite("x", f64::INFINITY).is_err());
    }
}
