//! Maturity-indexed term structure of annual effective yields
//!
//! Yields are linearly interpolated between tabulated maturities. Outside the
//! tabulated range the nearest boundary yield is continued flat, so slightly
//! out-of-range tenors price without error. A single-point curve behaves as a
//! flat rate.

use log::{debug, trace};
use serde::Serialize;

use super::Discounting;
use crate::error::{ensure_finite, ActuarialError, Result};

/// Immutable yield curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldCurve {
    /// Strictly increasing positive maturities in years
    maturities: Vec<f64>,
    /// Annual effective yields aligned with `maturities`
    yields: Vec<f64>,
}

impl YieldCurve {
    /// Build a curve from aligned maturities and yields
    ///
    /// Fails with a validation error when the arrays are empty or of different
    /// lengths, a maturity is not positive, maturities are not strictly
    /// increasing, or a yield is not above −100%.
    pub fn new(maturities: Vec<f64>, yields: Vec<f64>) -> Result<Self> {
        if maturities.is_empty() {
            return Err(ActuarialError::validation(
                "maturities",
                "curve must contain at least one point",
            ));
        }

        if maturities.len() != yields.len() {
            return Err(ActuarialError::validation(
                "yields",
                format!(
                    "length {} does not match {} maturities",
                    yields.len(),
                    maturities.len()
                ),
            ));
        }

        if let Some(&m) = maturities.iter().find(|m| !(m.is_finite() && **m > 0.0)) {
            return Err(ActuarialError::validation(
                "maturities",
                format!("must be finite and > 0, got {}", m),
            ));
        }

        if let Some(pair) = maturities.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ActuarialError::validation(
                "maturities",
                format!(
                    "must be strictly increasing, found {} followed by {}",
                    pair[0], pair[1]
                ),
            ));
        }

        if let Some(&y) = yields.iter().find(|y| !(y.is_finite() && **y > -1.0)) {
            return Err(ActuarialError::validation(
                "yields",
                format!("must be finite and > -1, got {}", y),
            ));
        }

        debug!(
            "Constructed yield curve with {} points ({:.2}y-{:.2}y)",
            maturities.len(),
            maturities[0],
            maturities[maturities.len() - 1]
        );

        Ok(Self { maturities, yields })
    }

    /// Single-point curve equivalent to a flat annual rate
    pub fn flat(rate: f64) -> Result<Self> {
        Self::new(vec![1.0], vec![rate])
    }

    /// Tabulated maturities
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// Tabulated yields
    pub fn yields(&self) -> &[f64] {
        &self.yields
    }

    /// Number of curve points
    pub fn len(&self) -> usize {
        self.maturities.len()
    }

    /// Always false: construction rejects empty curves
    pub fn is_empty(&self) -> bool {
        self.maturities.is_empty()
    }

    /// Yield at maturity `t`
    ///
    /// Linear between tabulated maturities, flat beyond either end.
    pub fn get_yield(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }

        let last = self.maturities.len() - 1;
        if t <= self.maturities[0] {
            if t < self.maturities[0] {
                trace!("Flat extrapolation below first maturity for t = {}", t);
            }
            return self.yields[0];
        }
        if t >= self.maturities[last] {
            if t > self.maturities[last] {
                trace!("Flat extrapolation beyond last maturity for t = {}", t);
            }
            return self.yields[last];
        }

        let upper = self.maturities.partition_point(|&m| m <= t);
        let lower = upper - 1;

        let (t0, t1) = (self.maturities[lower], self.maturities[upper]);
        let (y0, y1) = (self.yields[lower], self.yields[upper]);

        y0 + (y1 - y0) * (t - t0) / (t1 - t0)
    }

    /// Spot rate to maturity `t`; the tabulated yields are zero-coupon rates
    pub fn spot_rate(&self, t: f64) -> f64 {
        self.get_yield(t)
    }

    /// (1 + y(t))^-t
    pub fn discount_factor(&self, t: f64) -> f64 {
        (1.0 + self.get_yield(t)).powf(-t)
    }

    /// Annual effective forward rate between `start` and `end`
    pub fn forward_rate(&self, start: f64, end: f64) -> Result<f64> {
        ensure_finite("start", start)?;
        ensure_finite("end", end)?;
        if start < 0.0 || start >= end {
            return Err(ActuarialError::validation(
                "start",
                format!("need 0 <= start < end, got start {} and end {}", start, end),
            ));
        }

        let growth_end = (1.0 + self.spot_rate(end)).powf(end);
        let growth_start = (1.0 + self.spot_rate(start)).powf(start);

        Ok((growth_end / growth_start).powf(1.0 / (end - start)) - 1.0)
    }

    /// New curve with every yield moved by `shift`
    pub fn parallel_shift(&self, shift: f64) -> Result<Self> {
        ensure_finite("shift", shift)?;
        Self::new(
            self.maturities.clone(),
            self.yields.iter().map(|y| y + shift).collect(),
        )
    }

    /// New curve with only the point nearest `maturity` moved by `shift`
    pub fn bumped_at(&self, maturity: f64, shift: f64) -> Result<Self> {
        ensure_finite("maturity", maturity)?;
        ensure_finite("shift", shift)?;

        let mut nearest = 0;
        for (idx, m) in self.maturities.iter().enumerate() {
            if (m - maturity).abs() < (self.maturities[nearest] - maturity).abs() {
                nearest = idx;
            }
        }

        let mut yields = self.yields.clone();
        yields[nearest] += shift;
        Self::new(self.maturities.clone(), yields)
    }
}

impl Discounting for YieldCurve {
    fn discount_factor(&self, t: f64) -> f64 {
        YieldCurve::discount_factor(self, t)
    }

    fn rate_at(&self, t: f64) -> f64 {
        self.get_yield(t)
    }
}
