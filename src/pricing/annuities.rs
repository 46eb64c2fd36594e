//! Survival-contingent annuity factors
//!
//! Unit payment streams valued with survival from the mortality table and
//! discount factors from any [`Discounting`] source:
//! - ä_x = Σ_{k=0}^{ω−x} DF(k) · ₖpₓ (whole life, annuity-due)
//! - ä_x:n = Σ_{k=0}^{n−1} DF(k) · ₖpₓ (temporary)
//! - ᵤ|ä_x = Σ_{k=u}^{ω−x} DF(k) · ₖpₓ (deferred; v^u · ᵤpₓ · ä_{x+u} at a flat rate)
//!
//! Immediate variants drop the payment at time 0 and add one at the end of
//! the term. Geometrically varying annuities scale the payment at time k by
//! (1 + g)^k.

use crate::assumptions::SurvivalFunctions;
use crate::interest::Discounting;
use crate::error::{ActuarialError, Result};

/// Annuity calculator over a table and a discounting source
pub struct Annuities<'a, D: Discounting + ?Sized> {
    survival: SurvivalFunctions<'a>,
    discount: &'a D,
}

impl<'a, D: Discounting + ?Sized> Annuities<'a, D> {
    /// Value annuities on `survival` discounted with `discount`
    pub fn new(survival: SurvivalFunctions<'a>, discount: &'a D) -> Self {
        Self { survival, discount }
    }

    /// Survival functions in use
    pub fn survival(&self) -> SurvivalFunctions<'a> {
        self.survival
    }

    /// Σ DF(k) · ₖpₓ over k in `from..years`
    fn survival_weighted(&self, age: u32, from: u32, years: u32) -> Result<f64> {
        Ok(self
            .survival
            .year_steps(age, years)?
            .iter()
            .filter(|step| step.k >= from)
            .map(|step| self.discount.discount_factor(step.k as f64) * step.survival)
            .sum())
    }

    fn years_to_terminal(&self, age: u32) -> Result<u32> {
        self.survival.check_horizon(age, 0)?;
        Ok((self.survival.table().terminal_age() - age).saturating_add(1))
    }

    /// ä_x: unit paid at the start of each year the life survives
    pub fn whole_life_annuity_due(&self, age: u32) -> Result<f64> {
        let years = self.years_to_terminal(age)?;
        self.survival_weighted(age, 0, years)
    }

    /// ä_x:n: whole-life annuity-due truncated to `n` payments
    pub fn temporary_annuity_due(&self, age: u32, n: u32) -> Result<f64> {
        self.survival.check_horizon(age, n)?;
        self.survival_weighted(age, 0, n)
    }

    /// ᵤ|ä_x: annuity-due whose first payment is at time `deferral`
    pub fn deferred_annuity(&self, age: u32, deferral: u32) -> Result<f64> {
        self.survival.check_horizon(age, deferral)?;
        let years = self.years_to_terminal(age)?;
        self.survival_weighted(age, deferral, years)
    }

    /// a_x: unit paid at the end of each year the life survives
    pub fn whole_life_annuity_immediate(&self, age: u32) -> Result<f64> {
        let years = self.years_to_terminal(age)?;
        self.survival_weighted(age, 1, years)
    }

    /// a_x:n: payments at times 1..=n
    pub fn temporary_annuity_immediate(&self, age: u32, n: u32) -> Result<f64> {
        self.survival.check_horizon(age, n)?;
        self.survival_weighted(age, 1, n.saturating_add(1))
    }

    /// äₙ certain: `n` payments at times 0..n regardless of survival
    pub fn annuity_certain_due(&self, n: u32) -> f64 {
        (0..n).map(|k| self.discount.discount_factor(k as f64)).sum()
    }

    /// `n` years certain, then for life: äₙ + ₙ|ä_x
    pub fn guaranteed_annuity_due(&self, age: u32, n: u32) -> Result<f64> {
        let life = self.deferred_annuity(age, n)?;
        Ok(self.annuity_certain_due(n) + life)
    }

    /// `n` payments in advance, the payment at time k being (1 + g)^k
    ///
    /// Growth must be finite and above −1; g = 0 gives ä_x:n.
    pub fn increasing_annuity_due(&self, age: u32, n: u32, growth_rate: f64) -> Result<f64> {
        if !(growth_rate.is_finite() && growth_rate > -1.0) {
            return Err(ActuarialError::validation(
                "growth_rate",
                format!("must be finite and > -1, got {}", growth_rate),
            ));
        }
        self.survival.check_horizon(age, n)?;

        let growth = 1.0 + growth_rate;
        Ok(self
            .survival
            .year_steps(age, n)?
            .iter()
            .map(|step| {
                self.discount.discount_factor(step.k as f64)
                    * step.survival
                    * growth.powi(step.k as i32)
            })
            .sum())
    }

    /// `n` payments in advance shrinking by `decrease_rate` each year
    pub fn decreasing_annuity_due(&self, age: u32, n: u32, decrease_rate: f64) -> Result<f64> {
        if !(decrease_rate.is_finite() && (0.0..1.0).contains(&decrease_rate)) {
            return Err(ActuarialError::validation(
                "decrease_rate",
                format!("must be in [0, 1), got {}", decrease_rate),
            ));
        }
        self.increasing_annuity_due(age, n, -decrease_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::fixtures::{increasing_table, linear_ramp_table, zero_mortality_table};
    use crate::assumptions::TableBoundary;
    use crate::error::ActuarialError;
    use crate::interest::{InterestTheory, YieldCurve};

    #[test]
    fn test_zero_mortality_zero_interest_counts_payments() {
        let table = zero_mortality_table();
        let rate = InterestTheory::new(0.0).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        assert!((ann.whole_life_annuity_due(30).unwrap() - 71.0).abs() < 1e-12);
        assert!((ann.temporary_annuity_due(30, 10).unwrap() - 10.0).abs() < 1e-12);
        assert!((ann.whole_life_annuity_due(100).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_mortality_matches_annuity_certain() {
        let table = zero_mortality_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        let life = ann.temporary_annuity_due(40, 20).unwrap();
        assert!((life - rate.annuity_certain_due(20)).abs() < 1e-12);
        assert!((ann.annuity_certain_due(20) - rate.annuity_certain_due(20)).abs() < 1e-12);
    }

    #[test]
    fn test_whole_life_decreases_with_age() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        let mut previous = f64::INFINITY;
        for age in 20..=100 {
            let current = ann.whole_life_annuity_due(age).unwrap();
            assert!(current > 0.0);
            assert!(current < previous, "ä must decrease at age {}", age);
            previous = current;
        }
    }

    #[test]
    fn test_deferred_decreases_with_deferral_and_matches_formula() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.04).unwrap();
        let sf = SurvivalFunctions::new(&table);
        let ann = Annuities::new(sf, &rate);

        let mut previous = f64::INFINITY;
        for u in 0..=40 {
            let deferred = ann.deferred_annuity(50, u).unwrap();
            let formula = rate.discount_factor(u as f64)
                * sf.npx(50, u).unwrap()
                * ann.whole_life_annuity_due(50 + u).unwrap();

            assert!((deferred - formula).abs() < 1e-12, "u = {}", u);
            assert!(deferred > 0.0 && deferred < previous);
            previous = deferred;
        }
        assert_eq!(
            ann.deferred_annuity(50, 0).unwrap(),
            ann.whole_life_annuity_due(50).unwrap()
        );
    }

    #[test]
    fn test_temporary_plus_deferred_is_whole_life() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        let split = ann.temporary_annuity_due(45, 15).unwrap() + ann.deferred_annuity(45, 15).unwrap();
        assert!((split - ann.whole_life_annuity_due(45).unwrap()).abs() < 1e-12);
        assert!(ann.temporary_annuity_due(45, 15).unwrap() < ann.whole_life_annuity_due(45).unwrap());
    }

    #[test]
    fn test_immediate_variants() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let sf = SurvivalFunctions::new(&table);
        let ann = Annuities::new(sf, &rate);

        let due = ann.whole_life_annuity_due(60).unwrap();
        assert!((ann.whole_life_annuity_immediate(60).unwrap() - (due - 1.0)).abs() < 1e-12);

        // a_x:n = ä_x:n − 1 + vⁿ ₙpₓ
        let n = 10;
        let expected = ann.temporary_annuity_due(60, n).unwrap() - 1.0
            + rate.discount_factor(n as f64) * sf.npx(60, n).unwrap();
        assert!((ann.temporary_annuity_immediate(60, n).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_guaranteed_exceeds_life_annuity() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        let guaranteed = ann.guaranteed_annuity_due(65, 10).unwrap();
        assert!(guaranteed > ann.whole_life_annuity_due(65).unwrap());
        assert!((ann.guaranteed_annuity_due(65, 0).unwrap() - ann.whole_life_annuity_due(65).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_strict_horizon_errors() {
        let table = linear_ramp_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        assert!(matches!(
            ann.temporary_annuity_due(90, 11),
            Err(ActuarialError::BeyondTable { .. })
        ));
        assert!(ann.deferred_annuity(90, 11).is_err());
        assert!(matches!(
            ann.whole_life_annuity_due(101),
            Err(ActuarialError::AgeNotFound { .. })
        ));
    }

    #[test]
    fn test_closed_boundary_truncates() {
        let table = linear_ramp_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let ann = Annuities::new(SurvivalFunctions::with_boundary(&table, TableBoundary::Closed), &rate);

        let truncated = ann.temporary_annuity_due(90, 30).unwrap();
        assert!((truncated - ann.whole_life_annuity_due(90).unwrap()).abs() < 1e-12);
        assert_eq!(ann.deferred_annuity(90, 20).unwrap(), 0.0);
    }

    #[test]
    fn test_closed_boundary_unbounded_term_is_whole_life() {
        let table = linear_ramp_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let ann = Annuities::new(SurvivalFunctions::with_boundary(&table, TableBoundary::Closed), &rate);

        let whole = ann.whole_life_annuity_due(90).unwrap();
        assert!((ann.temporary_annuity_due(90, u32::MAX).unwrap() - whole).abs() < 1e-12);
        assert!((ann.temporary_annuity_immediate(90, u32::MAX).unwrap() - (whole - 1.0)).abs() < 1e-12);
        assert_eq!(ann.deferred_annuity(90, u32::MAX).unwrap(), 0.0);
    }

    #[test]
    fn test_geometric_annuities() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.04).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        let level = ann.temporary_annuity_due(55, 20).unwrap();
        assert!((ann.increasing_annuity_due(55, 20, 0.0).unwrap() - level).abs() < 1e-12);
        assert!((ann.decreasing_annuity_due(55, 20, 0.0).unwrap() - level).abs() < 1e-12);

        let rising = ann.increasing_annuity_due(55, 20, 0.03).unwrap();
        let falling = ann.decreasing_annuity_due(55, 20, 0.03).unwrap();
        assert!(rising > level && level > falling, "{} {} {}", rising, level, falling);
        assert_eq!(ann.increasing_annuity_due(55, 0, 0.03).unwrap(), 0.0);
    }

    #[test]
    fn test_geometric_annuity_without_mortality_or_interest() {
        let table = zero_mortality_table();
        let rate = InterestTheory::new(0.0).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        // 1 + 1.1 + 1.21 + 1.331
        assert!((ann.increasing_annuity_due(30, 4, 0.1).unwrap() - 4.641).abs() < 1e-12);
        // 1 + 0.5 + 0.25
        assert!((ann.decreasing_annuity_due(30, 3, 0.5).unwrap() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_geometric_annuity_rejects_bad_rates() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.04).unwrap();
        let ann = Annuities::new(SurvivalFunctions::new(&table), &rate);

        assert!(ann.increasing_annuity_due(55, 10, -1.0).unwrap_err().is_validation());
        assert!(ann.increasing_annuity_due(55, 10, f64::NAN).unwrap_err().is_validation());
        assert!(ann.decreasing_annuity_due(55, 10, 1.0).unwrap_err().is_validation());
        assert!(ann.decreasing_annuity_due(55, 10, -0.1).unwrap_err().is_validation());
        assert!(matches!(
            ann.increasing_annuity_due(95, 10, 0.02),
            Err(ActuarialError::BeyondTable { .. })
        ));
    }

    #[test]
    fn test_flat_curve_matches_flat_rate() {
        let table = increasing_table();
        let rate = InterestTheory::new(0.05).unwrap();
        let curve = YieldCurve::flat(0.05).unwrap();
        let sf = SurvivalFunctions::new(&table);

        let by_rate = Annuities::new(sf, &rate).whole_life_annuity_due(40).unwrap();
        let by_curve = Annuities::new(sf, &curve).whole_life_annuity_due(40).unwrap();
        assert!((by_rate - by_curve).abs() < 1e-12);
    }
}
