//! Survival and death probabilities derived from a mortality table
//!
//! All functions are pure given the wrapped table reference. Probabilities
//! composed by repeated multiplication are clamped to [0, 1].
//!
//! # Boundary policy
//!
//! What happens when a horizon runs past the terminal age ω is explicit:
//! - [`TableBoundary::Strict`] (default): a domain error
//! - [`TableBoundary::Closed`]: survival beyond ω is zero and horizons truncate

use log::warn;
use serde::{Deserialize, Serialize};

use super::mortality::MortalityTable;
use crate::error::{ActuarialError, Result};

/// Treatment of horizons that extend past the terminal age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableBoundary {
    /// Fail with a domain error
    #[default]
    Strict,
    /// Treat survival beyond the terminal age as zero
    Closed,
}

/// One policy year along a survival path
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct YearStep {
    /// Years elapsed since the starting age
    pub k: u32,
    /// ₖpₓ
    pub survival: f64,
    /// qₓ₊ₖ
    pub qx: f64,
}

/// Survival functions over a borrowed mortality table
#[derive(Debug, Clone, Copy)]
pub struct SurvivalFunctions<'a> {
    table: &'a MortalityTable,
    boundary: TableBoundary,
}

impl<'a> SurvivalFunctions<'a> {
    /// Wrap a table with the strict boundary policy
    pub fn new(table: &'a MortalityTable) -> Self {
        Self::with_boundary(table, TableBoundary::Strict)
    }

    /// Wrap a table with an explicit boundary policy
    pub fn with_boundary(table: &'a MortalityTable, boundary: TableBoundary) -> Self {
        Self { table, boundary }
    }

    /// The wrapped table
    pub fn table(&self) -> &'a MortalityTable {
        self.table
    }

    /// Boundary policy in force
    pub fn boundary(&self) -> TableBoundary {
        self.boundary
    }

    /// Validate that `age` is tabulated and `age + years` is reachable
    ///
    /// Returns the number of years actually covered by the table: `years`
    /// itself, or fewer when the closed boundary truncates the horizon.
    pub fn check_horizon(&self, age: u32, years: u32) -> Result<u32> {
        if !self.table.contains(age) {
            return Err(ActuarialError::AgeNotFound {
                age,
                table: self.table.name().to_string(),
            });
        }

        let terminal_age = self.table.terminal_age();
        if age.saturating_add(years) <= terminal_age {
            return Ok(years);
        }

        match self.boundary {
            TableBoundary::Strict => Err(ActuarialError::BeyondTable {
                age,
                years,
                terminal_age,
                table: self.table.name().to_string(),
            }),
            TableBoundary::Closed => {
                warn!(
                    "Horizon {}+{} truncated at terminal age {} of '{}'",
                    age,
                    years,
                    terminal_age,
                    self.table.name()
                );
                Ok(terminal_age - age)
            }
        }
    }

    /// ₙpₓ: probability that a life aged `age` survives `n` further years
    ///
    /// Product of (1 − q) over the `n` consecutive ages starting at `age`;
    /// 1.0 when `n == 0`.
    pub fn npx(&self, age: u32, n: u32) -> Result<f64> {
        let covered = self.check_horizon(age, n)?;
        if covered < n {
            return Ok(0.0);
        }

        let mut survival = 1.0;
        for k in 0..n {
            survival *= self.table.get_px(age + k)?;
        }

        Ok(survival.clamp(0.0, 1.0))
    }

    /// ₙqₓ: probability of death within `n` years
    pub fn nqx(&self, age: u32, n: u32) -> Result<f64> {
        Ok((1.0 - self.npx(age, n)?).clamp(0.0, 1.0))
    }

    /// ₜpₓ for fractional durations under a uniform distribution of deaths
    ///
    /// ₜpₓ = ₙpₓ · (1 − s · qₓ₊ₙ) with n = ⌊t⌋ and s = t − n.
    pub fn tpx(&self, age: u32, t: f64) -> Result<f64> {
        if !t.is_finite() || t < 0.0 {
            return Err(ActuarialError::validation(
                "t",
                format!("must be finite and >= 0, got {}", t),
            ));
        }

        let whole = t.floor() as u32;
        let frac = t - t.floor();
        if frac == 0.0 {
            return self.npx(age, whole);
        }

        // The fractional year runs past ω when it starts at or after it
        let attained = age.saturating_add(whole);
        if attained >= self.table.terminal_age() {
            self.check_horizon(age, whole.saturating_add(1))?;
            return Ok(0.0);
        }

        let survival = self.npx(age, whole)?;
        let q = self.table.get_qx(attained)?;
        Ok((survival * (1.0 - frac * q)).clamp(0.0, 1.0))
    }

    /// ᵤ|ₙqₓ: probability of surviving `u` years then dying within the next `n`
    pub fn deferred_nqx(&self, age: u32, u: u32, n: u32) -> Result<f64> {
        let survival = self.npx(age, u)?;
        if survival == 0.0 {
            return Ok(0.0);
        }

        let death = self.nqx(age + u, n)?;
        Ok((survival * death).clamp(0.0, 1.0))
    }

    /// Year-by-year path for k = 0..years, stopping after the terminal age
    ///
    /// Callers validate the horizon with [`check_horizon`](Self::check_horizon)
    /// first; this only walks what the table covers, so the work is bounded
    /// by the table length whatever `years` is.
    pub(crate) fn year_steps(&self, age: u32, years: u32) -> Result<Vec<YearStep>> {
        let terminal_age = self.table.terminal_age();
        let span = if age > terminal_age {
            0
        } else {
            (terminal_age - age).saturating_add(1)
        };
        let limit = years.min(span);

        let mut steps = Vec::with_capacity(limit as usize);
        let mut survival = 1.0_f64;

        for k in 0..limit {
            let qx = self.table.get_qx(age + k)?;
            steps.push(YearStep { k, survival, qx });
            survival = (survival * (1.0 - qx)).clamp(0.0, 1.0);
        }

        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::fixtures::{increasing_table, linear_ramp_table};

    #[test]
    fn test_npx_zero_years_is_certain() {
        let table = linear_ramp_table();
        let sf = SurvivalFunctions::new(&table);

        for age in [20, 45, 100] {
            assert_eq!(sf.npx(age, 0).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_npx_scenario_bounds_and_monotonic() {
        let table = linear_ramp_table();
        let sf = SurvivalFunctions::new(&table);

        let p = sf.npx(30, 20).unwrap();
        assert!(p > 0.0 && p < 1.0, "20p30 = {}", p);

        let mut previous = 1.0;
        for n in 1..=70 {
            let current = sf.npx(30, n).unwrap();
            assert!(current < previous, "npx must decrease at n = {}", n);
            assert!((0.0..=1.0).contains(&current));
            previous = current;
        }
    }

    #[test]
    fn test_npx_is_product_of_px() {
        let table = increasing_table();
        let sf = SurvivalFunctions::new(&table);

        let expected: f64 = (50..55).map(|a| 1.0 - table.get_qx(a).unwrap()).product();
        assert!((sf.npx(50, 5).unwrap() - expected).abs() < 1e-15);
        assert!((sf.nqx(50, 5).unwrap() - (1.0 - expected)).abs() < 1e-15);
    }

    #[test]
    fn test_survival_composes() {
        let table = increasing_table();
        let sf = SurvivalFunctions::new(&table);

        for (m, n) in [(0, 10), (5, 7), (13, 20), (30, 0)] {
            let joint = sf.npx(40, m + n).unwrap();
            let split = sf.npx(40, m).unwrap() * sf.npx(40 + m, n).unwrap();
            assert!((joint - split).abs() < 1e-14, "m={} n={}", m, n);
        }
    }

    #[test]
    fn test_strict_boundary_rejects_horizon_past_terminal_age() {
        let table = linear_ramp_table();
        let sf = SurvivalFunctions::new(&table);

        assert!(sf.npx(90, 10).is_ok());
        match sf.npx(90, 11) {
            Err(ActuarialError::BeyondTable { age, years, terminal_age, .. }) => {
                assert_eq!((age, years, terminal_age), (90, 11, 100));
            }
            other => panic!("expected domain error, got {:?}", other),
        }
        assert!(matches!(sf.npx(10, 1), Err(ActuarialError::AgeNotFound { age: 10, .. })));
    }

    #[test]
    fn test_closed_boundary_truncates_to_zero() {
        let table = linear_ramp_table();
        let sf = SurvivalFunctions::with_boundary(&table, TableBoundary::Closed);

        assert_eq!(sf.npx(90, 11).unwrap(), 0.0);
        assert_eq!(sf.nqx(90, 50).unwrap(), 1.0);
        assert_eq!(sf.check_horizon(90, 25).unwrap(), 10);
        assert!(sf.npx(90, 10).unwrap() > 0.0);
    }

    #[test]
    fn test_tpx_uniform_deaths() {
        let table = increasing_table();
        let sf = SurvivalFunctions::new(&table);

        let expected = sf.npx(60, 2).unwrap() * (1.0 - 0.25 * table.get_qx(62).unwrap());
        assert!((sf.tpx(60, 2.25).unwrap() - expected).abs() < 1e-15);
        assert_eq!(sf.tpx(60, 3.0).unwrap(), sf.npx(60, 3).unwrap());

        assert!(sf.tpx(60, -0.5).unwrap_err().is_validation());
        assert!(sf.tpx(99, 1.5).is_err());
        assert!(sf.tpx(99, 0.5).is_ok());
    }

    #[test]
    fn test_tpx_closed_boundary_past_terminal_age() {
        let table = increasing_table();
        let sf = SurvivalFunctions::with_boundary(&table, TableBoundary::Closed);

        assert_eq!(sf.tpx(99, 1.5).unwrap(), 0.0);
        assert!(sf.tpx(99, 0.5).unwrap() > 0.0);
    }

    #[test]
    fn test_deferred_death_probability() {
        let table = increasing_table();
        let sf = SurvivalFunctions::new(&table);

        let deferred = sf.deferred_nqx(40, 10, 5).unwrap();
        let expected = sf.npx(40, 10).unwrap() - sf.npx(40, 15).unwrap();
        assert!((deferred - expected).abs() < 1e-14);
    }

    #[test]
    fn test_closed_boundary_huge_horizon_is_bounded_by_table() {
        let table = linear_ramp_table();
        let sf = SurvivalFunctions::with_boundary(&table, TableBoundary::Closed);

        assert_eq!(sf.check_horizon(90, u32::MAX).unwrap(), 10);
        assert_eq!(sf.npx(90, u32::MAX).unwrap(), 0.0);
        assert_eq!(sf.year_steps(90, u32::MAX).unwrap().len(), 11);
        assert_eq!(sf.year_steps(u32::MAX, u32::MAX).unwrap().len(), 0);
    }

    #[test]
    fn test_year_steps_match_npx() {
        let table = increasing_table();
        let sf = SurvivalFunctions::new(&table);

        let steps = sf.year_steps(95, 10).unwrap();
        assert_eq!(steps.len(), 6); // ages 95..=100
        for step in &steps {
            assert!((step.survival - sf.npx(95, step.k).unwrap()).abs() < 1e-15);
            assert_eq!(step.qx, table.get_qx(95 + step.k).unwrap());
        }
    }
}
