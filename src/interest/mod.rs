//! Interest theory, yield curves and rate sensitivity
//!
//! Pricing code is written against the [`Discounting`] capability so a flat
//! rate and a full term structure are interchangeable.

mod theory;
mod yield_curve;
mod duration;

pub use theory::InterestTheory;
pub use yield_curve::YieldCurve;
pub use duration::{
    key_rate_durations, price_change_approximation, CashFlowSchedule, DurationConvexity,
    KeyRateDuration, Position, RiskMeasures,
};

/// Source of discount factors for cash flows at a given time (in years)
pub trait Discounting {
    /// Present value of one unit payable at time `t`
    fn discount_factor(&self, t: f64) -> f64;

    /// Annual effective rate applied to a cash flow at time `t`
    fn rate_at(&self, t: f64) -> f64;

    /// Present value of `amount` payable at time `t`
    fn present_value(&self, amount: f64, t: f64) -> f64 {
        amount * self.discount_factor(t)
    }
}
