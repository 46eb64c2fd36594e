//! Single flat-rate time value of money
//!
//! Handles compounding at one annual effective rate:
//! - Present/future values and discount factors
//! - Annuities-certain and level loan amortisation
//! - Nominal/effective/real rate conversions
//!
//! A zero rate degrades gracefully: every discount factor is 1 and
//! annuity-certain values collapse to the number of payments.

use serde::{Deserialize, Serialize};

use super::Discounting;
use crate::error::{ensure_finite, ActuarialError, Result};

/// Rates closer to zero than this use the zero-interest closed forms
const ZERO_RATE_TOLERANCE: f64 = 1e-12;

fn ensure_frequency(frequency: u32) -> Result<()> {
    if frequency == 0 {
        return Err(ActuarialError::validation(
            "compounding_frequency",
            "must be at least 1 period per year",
        ));
    }
    Ok(())
}

fn ensure_above_minus_one(parameter: &'static str, rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(ActuarialError::validation(
            parameter,
            format!("must be finite and > -1, got {}", rate),
        ));
    }
    Ok(())
}

/// Flat annual effective interest rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestTheory {
    /// Annual effective rate i
    interest_rate: f64,

    /// Compounding periods per year, used for the periodic rate i/m
    compounding_frequency: u32,
}

impl InterestTheory {
    /// Annually compounded rate; fails when `interest_rate <= -1`
    pub fn new(interest_rate: f64) -> Result<Self> {
        Self::with_compounding(interest_rate, 1)
    }

    /// Rate with an explicit compounding frequency
    pub fn with_compounding(interest_rate: f64, compounding_frequency: u32) -> Result<Self> {
        ensure_above_minus_one("interest_rate", interest_rate)?;
        ensure_frequency(compounding_frequency)?;

        Ok(Self {
            interest_rate,
            compounding_frequency,
        })
    }

    /// Annual effective rate i
    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    /// Compounding periods per year
    pub fn compounding_frequency(&self) -> u32 {
        self.compounding_frequency
    }

    /// Rate per compounding period, i/m
    pub fn periodic_rate(&self) -> f64 {
        self.interest_rate / self.compounding_frequency as f64
    }

    /// One-year discount factor v = 1/(1+i)
    pub fn v(&self) -> f64 {
        1.0 / (1.0 + self.interest_rate)
    }

    /// Effective rate of discount d = i/(1+i)
    pub fn discount_rate(&self) -> f64 {
        self.interest_rate / (1.0 + self.interest_rate)
    }

    /// Force of interest δ = ln(1+i)
    pub fn force_of_interest(&self) -> f64 {
        self.interest_rate.ln_1p()
    }

    fn is_zero(&self) -> bool {
        self.interest_rate.abs() < ZERO_RATE_TOLERANCE
    }

    /// pv · (1+i)^t
    pub fn future_value(&self, present_value: f64, t: f64) -> f64 {
        present_value * (1.0 + self.interest_rate).powf(t)
    }

    /// fv · (1+i)^-t
    pub fn present_value(&self, future_value: f64, t: f64) -> f64 {
        future_value * self.discount_factor(t)
    }

    /// (1+i)^-t
    pub fn discount_factor(&self, t: f64) -> f64 {
        (1.0 + self.interest_rate).powf(-t)
    }

    /// aₙ: value of 1 paid at the end of each of `n` years
    pub fn annuity_certain_immediate(&self, n: u32) -> f64 {
        if self.is_zero() {
            return n as f64;
        }
        (1.0 - self.v().powi(n as i32)) / self.interest_rate
    }

    /// äₙ: value of 1 paid at the start of each of `n` years
    pub fn annuity_certain_due(&self, n: u32) -> f64 {
        self.annuity_certain_immediate(n) * (1.0 + self.interest_rate)
    }

    /// sₙ: accumulated value at time n of 1 paid at the end of each year
    pub fn accumulated_annuity_immediate(&self, n: u32) -> f64 {
        if self.is_zero() {
            return n as f64;
        }
        ((1.0 + self.interest_rate).powi(n as i32) - 1.0) / self.interest_rate
    }

    /// s̈ₙ: accumulated value at time n of 1 paid at the start of each year
    pub fn accumulated_annuity_due(&self, n: u32) -> f64 {
        self.accumulated_annuity_immediate(n) * (1.0 + self.interest_rate)
    }

    /// Level end-of-year payment repaying `principal` over `periods` years
    pub fn loan_payment(&self, principal: f64, periods: u32) -> Result<f64> {
        ensure_finite("principal", principal)?;
        if periods == 0 {
            return Err(ActuarialError::validation(
                "periods",
                "loan must run for at least one period",
            ));
        }

        Ok(principal / self.annuity_certain_immediate(periods))
    }

    /// Outstanding balance after `payments_made` level payments
    ///
    /// Prospective method: value of the remaining payments.
    pub fn loan_balance(&self, principal: f64, periods: u32, payments_made: u32) -> Result<f64> {
        if payments_made > periods {
            return Err(ActuarialError::validation(
                "payments_made",
                format!("{} exceeds loan term of {}", payments_made, periods),
            ));
        }

        let payment = self.loan_payment(principal, periods)?;
        Ok(payment * self.annuity_certain_immediate(periods - payments_made))
    }

    /// Effective annual rate equivalent to a nominal rate compounded `m` times a year
    pub fn effective_annual_rate(nominal_rate: f64, m: u32) -> Result<f64> {
        ensure_frequency(m)?;
        ensure_finite("nominal_rate", nominal_rate)?;
        Ok((1.0 + nominal_rate / m as f64).powi(m as i32) - 1.0)
    }

    /// Nominal rate compounded `m` times a year equivalent to an effective rate
    pub fn nominal_rate(effective_rate: f64, m: u32) -> Result<f64> {
        ensure_frequency(m)?;
        ensure_above_minus_one("effective_rate", effective_rate)?;
        Ok(m as f64 * ((1.0 + effective_rate).powf(1.0 / m as f64) - 1.0))
    }

    /// Real rate by the Fisher relation (1+n)/(1+π) − 1
    pub fn real_interest_rate(nominal_rate: f64, inflation_rate: f64) -> Result<f64> {
        ensure_above_minus_one("nominal_rate", nominal_rate)?;
        ensure_above_minus_one("inflation_rate", inflation_rate)?;
        Ok((1.0 + nominal_rate) / (1.0 + inflation_rate) - 1.0)
    }

    /// Value in today's money of a nominal amount `t` years out
    pub fn inflation_adjusted_value(nominal_value: f64, inflation_rate: f64, t: f64) -> Result<f64> {
        ensure_above_minus_one("inflation_rate", inflation_rate)?;
        Ok(nominal_value / (1.0 + inflation_rate).powf(t))
    }
}

impl Discounting for InterestTheory {
    fn discount_factor(&self, t: f64) -> f64 {
        InterestTheory::discount_factor(self, t)
    }

    fn rate_at(&self, _t: f64) -> f64 {
        self.interest_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_future_value_scenario() {
        let it = InterestTheory::new(0.05).unwrap();
        let fv = it.future_value(1000.0, 10.0);

        assert_relative_eq!(fv, 1000.0 * 1.05_f64.powi(10), max_relative = 1e-14);
        assert!((fv - 1628.89).abs() < 0.01);
        assert_relative_eq!(it.present_value(fv, 10.0), 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_non_physical_rate() {
        assert!(InterestTheory::new(-1.0).unwrap_err().is_validation());
        assert!(InterestTheory::new(-1.5).unwrap_err().is_validation());
        assert!(InterestTheory::new(f64::NAN).is_err());
        assert!(InterestTheory::with_compounding(0.05, 0).is_err());
        assert!(InterestTheory::new(-0.5).is_ok());
    }

    #[test]
    fn test_zero_rate_degrades_gracefully() {
        let it = InterestTheory::new(0.0).unwrap();

        assert_eq!(it.discount_factor(17.3), 1.0);
        assert_eq!(it.annuity_certain_immediate(12), 12.0);
        assert_eq!(it.annuity_certain_due(12), 12.0);
        assert_eq!(it.accumulated_annuity_due(4), 4.0);
        assert!((it.loan_payment(1200.0, 12).unwrap() - 100.0).abs() < 1e-12);
        assert_eq!(it.force_of_interest(), 0.0);
    }

    #[test]
    fn test_compounding_and_rate_measures() {
        let it = InterestTheory::with_compounding(0.05, 2).unwrap();
        assert_eq!(it.compounding_frequency(), 2);
        assert!((it.periodic_rate() - 0.025).abs() < 1e-15);
        assert!((it.discount_rate() - 0.05 / 1.05).abs() < 1e-15);
        assert!((it.force_of_interest() - 1.05_f64.ln()).abs() < 1e-15);
        assert!((it.v() * 1.05 - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_annuities_certain() {
        let it = InterestTheory::new(0.06).unwrap();

        let immediate = it.annuity_certain_immediate(10);
        let expected: f64 = (1..=10).map(|k| 1.06_f64.powi(-k)).sum();
        assert_relative_eq!(immediate, expected, max_relative = 1e-12);
        assert!(it.annuity_certain_due(10) > immediate);

        // Accumulated value is the present value rolled forward n years
        assert_relative_eq!(
            it.accumulated_annuity_immediate(10),
            immediate * 1.06_f64.powi(10),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_loan_amortisation() {
        let it = InterestTheory::new(0.05).unwrap();
        let payment = it.loan_payment(100_000.0, 30).unwrap();

        assert!(payment > 100_000.0 / 30.0);
        let balance = it.loan_balance(100_000.0, 30, 10).unwrap();
        assert!(balance < 100_000.0 && balance > 0.0);
        assert!(it.loan_balance(100_000.0, 30, 30).unwrap().abs() < 1e-9);
        assert!((it.loan_balance(100_000.0, 30, 0).unwrap() - 100_000.0).abs() < 1e-6);

        assert!(it.loan_payment(1000.0, 0).is_err());
        assert!(it.loan_balance(1000.0, 5, 6).is_err());
    }

    #[test]
    fn test_rate_conversions() {
        let ear = InterestTheory::effective_annual_rate(0.05, 12).unwrap();
        assert!(ear > 0.05);

        let nominal = InterestTheory::nominal_rate(ear, 12).unwrap();
        assert!((nominal - 0.05).abs() < 1e-12);

        let real = InterestTheory::real_interest_rate(0.05, 0.02).unwrap();
        assert!((real - (1.05 / 1.02 - 1.0)).abs() < 1e-15);

        let adjusted = InterestTheory::inflation_adjusted_value(1000.0, 0.02, 5.0).unwrap();
        assert!((adjusted - 1000.0 / 1.02_f64.powi(5)).abs() < 1e-9);

        assert!(InterestTheory::effective_annual_rate(0.05, 0).is_err());
        assert!(InterestTheory::real_interest_rate(0.05, -1.0).is_err());
    }

    #[test]
    fn test_trait_matches_inherent() {
        let it = InterestTheory::new(0.04).unwrap();
        let source: &dyn Discounting = &it;

        assert_eq!(source.discount_factor(3.0), it.discount_factor(3.0));
        assert_eq!(source.rate_at(100.0), 0.04);
        assert!((source.present_value(100.0, 1.0) - 100.0 / 1.04).abs() < 1e-12);
    }
}
