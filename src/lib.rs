//! Life Contingencies - Actuarial present values for single-life contracts
//!
//! This library provides:
//! - Mortality tables, survival probabilities and life expectancy
//! - Flat-rate interest theory, yield curves and rate sensitivity
//! - Life assurance and life annuity pricing under the equivalence principle
//! - Prospective, retrospective and recursive policy reserves
//!
//! All calculators are pure: they borrow immutable inputs fixed at
//! construction and recompute on every call.

pub mod error;
pub mod assumptions;
pub mod interest;
pub mod pricing;
pub mod reserves;
pub mod config;

// Re-export commonly used types
pub use error::{ActuarialError, Result};
pub use assumptions::{MortalityTable, SurvivalFunctions, TableBoundary};
pub use interest::{Discounting, DurationConvexity, InterestTheory, YieldCurve};
pub use pricing::{Annuities, ExpenseLoading, LifeAssurance, PremiumQuote};
pub use reserves::{ReserveDistribution, ReserveSchedule, Reserves};
pub use config::{InterestBasis, PricingConfig};
