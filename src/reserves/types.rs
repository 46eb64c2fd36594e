//! Core types for reserve calculations

use serde::{Deserialize, Serialize};

use crate::error::{ActuarialError, Result};

/// Reserve at one policy duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReserveRow {
    /// Policy years elapsed since issue
    pub duration: u32,

    /// Age of the insured at this duration
    pub attained_age: u32,

    /// EPV(future benefits) − EPV(future premiums)
    pub prospective: f64,

    /// Same reserve from the backward one-year recursion
    pub recursive: f64,

    /// Change to the next duration, V(t+1) − V(t); None at maturity
    pub increase: Option<f64>,
}

/// Year-by-year reserves of one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveSchedule {
    pub issue_age: u32,
    pub term: u32,
    pub sum_assured: f64,

    /// Net level annual premium the reserves are held against
    pub annual_premium: f64,

    /// One row per duration 0..=term
    pub rows: Vec<ReserveRow>,
}

impl ReserveSchedule {
    /// Prospective reserve at `duration`, if the schedule covers it
    pub fn reserve_at(&self, duration: u32) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.duration == duration)
            .map(|row| row.prospective)
    }

    /// Largest gap between the prospective and recursive reserves
    pub fn max_discrepancy(&self) -> f64 {
        self.rows
            .iter()
            .map(|row| (row.prospective - row.recursive).abs())
            .fold(0.0, f64::max)
    }

    /// Reserve released between two durations, V(from) − V(to)
    ///
    /// Negative when the reserve builds up over the period.
    pub fn release(&self, from: u32, to: u32) -> Option<f64> {
        Some(self.reserve_at(from)? - self.reserve_at(to)?)
    }
}

/// Default risk factor for the contingency reserve
pub const DEFAULT_CONTINGENCY_FACTOR: f64 = 0.05;

/// Expense and profit margins held on top of the net reserve
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReserveLoadings {
    /// Expense reserve as a fraction of the net reserve
    pub expense_rate: f64,

    /// Profit margin as a fraction of the net reserve
    pub profit_margin: f64,
}

impl ReserveLoadings {
    pub fn new(expense_rate: f64, profit_margin: f64) -> Result<Self> {
        for (parameter, value) in [("expense_rate", expense_rate), ("profit_margin", profit_margin)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ActuarialError::validation(
                    parameter,
                    format!("must be finite and >= 0, got {}", value),
                ));
            }
        }

        Ok(Self {
            expense_rate,
            profit_margin,
        })
    }

    /// Net reserve plus expense and profit margins
    ///
    /// An explicit `expense_reserve` replaces the proportional expense margin.
    pub fn gross_reserve(&self, net_reserve: f64, expense_reserve: Option<f64>) -> f64 {
        let expense = expense_reserve.unwrap_or(net_reserve * self.expense_rate);
        net_reserve + expense + net_reserve * self.profit_margin
    }

    /// Net reserve reduced by unamortised initial expenses
    ///
    /// Initial expenses are written off linearly over `amortization_years`;
    /// the result never drops below zero.
    pub fn zillmerized_reserve(
        net_reserve: f64,
        initial_expenses: f64,
        duration: u32,
        amortization_years: u32,
    ) -> Result<f64> {
        if amortization_years == 0 {
            return Err(ActuarialError::validation(
                "amortization_years",
                "must be at least 1",
            ));
        }
        if duration >= amortization_years {
            return Ok(net_reserve);
        }

        let remaining = (amortization_years - duration) as f64 / amortization_years as f64;
        Ok((net_reserve - initial_expenses * remaining).max(0.0))
    }

    /// Margin held against adverse deviation, `base_reserve · risk_factor`
    ///
    /// See [`DEFAULT_CONTINGENCY_FACTOR`] for the usual factor.
    pub fn contingency_reserve(base_reserve: f64, risk_factor: f64) -> Result<f64> {
        if !(risk_factor.is_finite() && risk_factor >= 0.0) {
            return Err(ActuarialError::validation(
                "risk_factor",
                format!("must be finite and >= 0, got {}", risk_factor),
            ));
        }
        Ok(base_reserve * risk_factor)
    }
}

/// Summary statistics of reserves across a portfolio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReserveDistribution {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,

    /// Total reserves over the portfolio value; 0 when the value is not positive
    pub reserve_to_portfolio_ratio: f64,

    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

impl ReserveDistribution {
    /// Summarise per-policy reserves
    ///
    /// Percentiles interpolate linearly between the sorted reserves.
    pub fn from_reserves(reserves: &[f64], total_portfolio_value: f64) -> Result<Self> {
        if reserves.is_empty() {
            return Err(ActuarialError::validation("reserves", "must not be empty"));
        }
        if let Some(bad) = reserves.iter().find(|r| !r.is_finite()) {
            return Err(ActuarialError::validation(
                "reserves",
                format!("must be finite, got {}", bad),
            ));
        }
        if !total_portfolio_value.is_finite() {
            return Err(ActuarialError::validation(
                "total_portfolio_value",
                format!("must be finite, got {}", total_portfolio_value),
            ));
        }

        let mut sorted = reserves.to_vec();
        sorted.sort_by(f64::total_cmp);

        let total: f64 = sorted.iter().sum();
        let count = sorted.len();
        let ratio = if total_portfolio_value > 0.0 {
            total / total_portfolio_value
        } else {
            0.0
        };

        Ok(Self {
            count,
            total,
            mean: total / count as f64,
            median: percentile(&sorted, 0.5),
            min: sorted[0],
            max: sorted[count - 1],
            reserve_to_portfolio_ratio: ratio,
            p25: percentile(&sorted, 0.25),
            p75: percentile(&sorted, 0.75),
            p90: percentile(&sorted, 0.90),
            p95: percentile(&sorted, 0.95),
        })
    }
}

/// Linear-interpolated quantile of non-empty sorted data
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
