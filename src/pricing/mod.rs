//! Expected present values of life-contingent benefits and premiums
//!
//! Both calculators borrow a [`SurvivalFunctions`](crate::assumptions::SurvivalFunctions)
//! and a [`Discounting`](crate::interest::Discounting) source fixed at construction.

mod annuities;
mod assurance;

pub use annuities::Annuities;
pub use assurance::{ExpenseLoading, LifeAssurance, PremiumQuote};
