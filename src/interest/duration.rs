//! Duration and convexity of fixed cash-flow schedules
//!
//! Each cash flow is discounted at the source's rate for its own time. The
//! sensitivities are the exact derivatives under a parallel move of those rates:
//! - Macaulay duration: Σ PV·t / PV
//! - Modified duration: Σ PV·t/(1+yₜ) / PV (Macaulay/(1+y) on a flat curve)
//! - Convexity: Σ PV·t(t+1)/(1+yₜ)² / PV

use serde::{Deserialize, Serialize};

use super::{Discounting, YieldCurve};
use crate::error::{ensure_finite, ensure_positive, ActuarialError, Result};

/// Dated cash flows, times in years from the valuation date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    times: Vec<f64>,
    amounts: Vec<f64>,
}

impl CashFlowSchedule {
    /// Fails on an empty schedule, mismatched lengths or negative/non-finite times
    pub fn new(times: Vec<f64>, amounts: Vec<f64>) -> Result<Self> {
        if times.is_empty() {
            return Err(ActuarialError::validation(
                "times",
                "cash-flow schedule is empty",
            ));
        }
        if times.len() != amounts.len() {
            return Err(ActuarialError::validation(
                "amounts",
                format!(
                    "length {} does not match {} times",
                    amounts.len(),
                    times.len()
                ),
            ));
        }
        if let Some(&t) = times.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
            return Err(ActuarialError::validation(
                "times",
                format!("must be finite and >= 0, got {}", t),
            ));
        }
        if let Some(&a) = amounts.iter().find(|a| !a.is_finite()) {
            return Err(ActuarialError::validation(
                "amounts",
                format!("must be finite, got {}", a),
            ));
        }

        Ok(Self { times, amounts })
    }

    /// Level-coupon bullet bond paying `frequency` coupons a year
    pub fn level_coupon_bond(
        face_value: f64,
        coupon_rate: f64,
        maturity_years: f64,
        frequency: u32,
    ) -> Result<Self> {
        ensure_positive("face_value", face_value)?;
        ensure_finite("coupon_rate", coupon_rate)?;
        ensure_positive("maturity_years", maturity_years)?;
        if frequency == 0 {
            return Err(ActuarialError::validation(
                "frequency",
                "must be at least one coupon per year",
            ));
        }

        let periods = (maturity_years * frequency as f64).round() as usize;
        if periods == 0 {
            return Err(ActuarialError::validation(
                "maturity_years",
                format!("{} is shorter than one coupon period", maturity_years),
            ));
        }

        let coupon = face_value * coupon_rate / frequency as f64;
        let times = (1..=periods).map(|k| k as f64 / frequency as f64).collect();
        let mut amounts = vec![coupon; periods];
        amounts[periods - 1] += face_value;

        Self::new(times, amounts)
    }

    /// Payment times
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Payment amounts
    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    /// Number of cash flows
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false: construction rejects empty schedules
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn flows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.amounts.iter().copied())
    }
}

/// Sensitivity measures for one schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMeasures {
    pub present_value: f64,
    pub macaulay_duration: f64,
    pub modified_duration: f64,
    pub convexity: f64,
}

/// A holding inside a portfolio
#[derive(Debug, Clone)]
pub struct Position {
    pub schedule: CashFlowSchedule,
    /// Weight override; the schedule's present value when absent
    pub market_value: Option<f64>,
}

/// Duration of a schedule after bumping one curve node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyRateDuration {
    pub maturity: f64,
    pub duration: f64,
}

/// Duration/convexity calculator over a discounting source
pub struct DurationConvexity<'a, D: Discounting + ?Sized> {
    discount: &'a D,
}

impl<'a, D: Discounting + ?Sized> DurationConvexity<'a, D> {
    pub fn new(discount: &'a D) -> Self {
        Self { discount }
    }

    /// Σ amount · DF(t)
    pub fn present_value(&self, schedule: &CashFlowSchedule) -> f64 {
        schedule
            .flows()
            .map(|(t, amount)| amount * self.discount.discount_factor(t))
            .sum()
    }

    /// All measures in one pass
    ///
    /// Fails with a validation error when the total present value is not positive.
    pub fn analyze(&self, schedule: &CashFlowSchedule) -> Result<RiskMeasures> {
        let mut present_value = 0.0;
        let mut time_weighted = 0.0;
        let mut first_order = 0.0;
        let mut second_order = 0.0;

        for (t, amount) in schedule.flows() {
            let pv = amount * self.discount.discount_factor(t);
            let growth = 1.0 + self.discount.rate_at(t);

            present_value += pv;
            time_weighted += pv * t;
            first_order += pv * t / growth;
            second_order += pv * t * (t + 1.0) / (growth * growth);
        }

        if !(present_value > 0.0) {
            return Err(ActuarialError::validation(
                "schedule",
                format!("total present value must be > 0, got {}", present_value),
            ));
        }

        Ok(RiskMeasures {
            present_value,
            macaulay_duration: time_weighted / present_value,
            modified_duration: first_order / present_value,
            convexity: second_order / present_value,
        })
    }

    pub fn macaulay_duration(&self, schedule: &CashFlowSchedule) -> Result<f64> {
        Ok(self.analyze(schedule)?.macaulay_duration)
    }

    pub fn modified_duration(&self, schedule: &CashFlowSchedule) -> Result<f64> {
        Ok(self.analyze(schedule)?.modified_duration)
    }

    pub fn convexity(&self, schedule: &CashFlowSchedule) -> Result<f64> {
        Ok(self.analyze(schedule)?.convexity)
    }

    /// Value-weighted modified duration of a set of positions
    pub fn portfolio_duration(&self, positions: &[Position]) -> Result<f64> {
        if positions.is_empty() {
            return Err(ActuarialError::validation("positions", "portfolio is empty"));
        }

        let mut total_value = 0.0;
        let mut weighted = 0.0;

        for position in positions {
            let measures = self.analyze(&position.schedule)?;
            let value = match position.market_value {
                Some(v) => {
                    ensure_finite("market_value", v)?;
                    v
                }
                None => measures.present_value,
            };

            total_value += value;
            weighted += value * measures.modified_duration;
        }

        if !(total_value > 0.0) {
            return Err(ActuarialError::validation(
                "positions",
                format!("total portfolio value must be > 0, got {}", total_value),
            ));
        }

        Ok(weighted / total_value)
    }
}

/// Second-order estimate of the price change for a yield move `yield_change`
pub fn price_change_approximation(
    modified_duration: f64,
    convexity: f64,
    yield_change: f64,
    price: f64,
) -> f64 {
    let duration_effect = -modified_duration * yield_change * price;
    let convexity_effect = 0.5 * convexity * yield_change * yield_change * price;
    duration_effect + convexity_effect
}

/// Key rate durations by bumping the curve node nearest each key maturity
pub fn key_rate_durations(
    curve: &YieldCurve,
    schedule: &CashFlowSchedule,
    key_maturities: &[f64],
    bump: f64,
) -> Result<Vec<KeyRateDuration>> {
    if !(bump.is_finite() && bump != 0.0) {
        return Err(ActuarialError::validation(
            "bump",
            format!("must be finite and non-zero, got {}", bump),
        ));
    }

    let base = DurationConvexity::new(curve).present_value(schedule);
    if !(base > 0.0) {
        return Err(ActuarialError::validation(
            "schedule",
            format!("total present value must be > 0, got {}", base),
        ));
    }

    key_maturities
        .iter()
        .map(|&maturity| {
            let shifted = curve.bumped_at(maturity, bump)?;
            let bumped = DurationConvexity::new(&shifted).present_value(schedule);
            Ok(KeyRateDuration {
                maturity,
                duration: -(bumped - base) / (base * bump),
            })
        })
        .collect()
}
