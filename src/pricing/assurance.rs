//! Life assurance pricing under the equivalence principle
//!
//! Death benefits are paid at the end of the year of death; a pure endowment
//! is paid on survival to the end of the term. Level annual premiums are
//! payable annually in advance while the life survives, so
//!
//! ```text
//! P · ä = SA · A
//! ```
//!
//! with ä the annuity-due over the premium term and A the unit benefit EPV.

use log::debug;
use serde::{Deserialize, Serialize};

use super::annuities::Annuities;
use crate::assumptions::SurvivalFunctions;
use crate::error::{ensure_positive, ActuarialError, Result};
use crate::interest::Discounting;

/// Proportional and fixed expense loadings applied to net premiums
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpenseLoading {
    /// Proportional margin on every premium (0.1 = 10%)
    #[serde(default)]
    pub premium_loading: f64,

    /// Fixed acquisition expense incurred at issue
    #[serde(default)]
    pub initial_expense: f64,
}

impl ExpenseLoading {
    /// Loadings must be finite and non-negative
    pub fn new(premium_loading: f64, initial_expense: f64) -> Result<Self> {
        let loading = Self {
            premium_loading,
            initial_expense,
        };
        loading.validate()?;
        Ok(loading)
    }

    /// Check a loading built from a literal or deserialized config
    pub fn validate(&self) -> Result<()> {
        if !(self.premium_loading.is_finite() && self.premium_loading >= 0.0) {
            return Err(ActuarialError::validation(
                "premium_loading",
                format!("must be finite and >= 0, got {}", self.premium_loading),
            ));
        }
        if !(self.initial_expense.is_finite() && self.initial_expense >= 0.0) {
            return Err(ActuarialError::validation(
                "initial_expense",
                format!("must be finite and >= 0, got {}", self.initial_expense),
            ));
        }
        Ok(())
    }

    /// Net single premium loaded for margin plus the initial expense
    pub fn gross_single_premium(&self, net_single_premium: f64) -> f64 {
        net_single_premium * (1.0 + self.premium_loading) + self.initial_expense
    }

    /// Net annual premium loaded for margin, with the initial expense spread
    /// over the premium annuity
    pub fn gross_annual_premium(&self, net_annual_premium: f64, annuity_factor: f64) -> f64 {
        net_annual_premium * (1.0 + self.premium_loading) + self.initial_expense / annuity_factor
    }
}

/// Priced contract: single and level annual premiums, net and gross
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PremiumQuote {
    pub sum_assured: f64,
    /// Net single premium, SA · A
    pub single_premium: f64,
    /// Annuity-due factor over the premium term
    pub annuity_factor: f64,
    /// Net level annual premium
    pub annual_premium: f64,
    pub gross_single_premium: f64,
    pub gross_annual_premium: f64,
}

/// Assurance pricing over a table and a discounting source
pub struct LifeAssurance<'a, D: Discounting + ?Sized> {
    survival: SurvivalFunctions<'a>,
    discount: &'a D,
    loading: ExpenseLoading,
}

impl<'a, D: Discounting + ?Sized> LifeAssurance<'a, D> {
    /// Net pricing (no expense loading)
    pub fn new(survival: SurvivalFunctions<'a>, discount: &'a D) -> Self {
        Self {
            survival,
            discount,
            loading: ExpenseLoading::default(),
        }
    }

    /// Apply expense loadings to quoted gross premiums
    pub fn with_loading(mut self, loading: ExpenseLoading) -> Self {
        self.loading = loading;
        self
    }

    /// Survival functions in use
    pub fn survival(&self) -> SurvivalFunctions<'a> {
        self.survival
    }

    /// Expense loading applied to gross premiums
    pub fn loading(&self) -> ExpenseLoading {
        self.loading
    }

    /// Annuity factors on the same basis
    pub fn annuities(&self) -> Annuities<'a, D> {
        Annuities::new(self.survival, self.discount)
    }

    // ========================================================================
    // UNIT BENEFIT EPVs
    // ========================================================================

    /// Σ DF(k+1) · ₖpₓ · qₓ₊ₖ over k in `from..years`
    fn death_benefit_epv(&self, age: u32, from: u32, years: u32) -> Result<f64> {
        Ok(self
            .survival
            .year_steps(age, years)?
            .iter()
            .filter(|step| step.k >= from)
            .map(|step| {
                self.discount.discount_factor(step.k as f64 + 1.0) * step.survival * step.qx
            })
            .sum())
    }

    /// Aₓ: unit paid at the end of the year of death, whenever it occurs
    ///
    /// The terminal qx is used as tabulated; a table that does not close
    /// at ω leaves the surviving mass unpaid.
    pub fn whole_life_epv(&self, age: u32) -> Result<f64> {
        self.survival.check_horizon(age, 0)?;
        let years = (self.survival.table().terminal_age() - age).saturating_add(1);
        self.death_benefit_epv(age, 0, years)
    }

    /// A¹ₓ:n: unit paid on death within `n` years
    pub fn term_epv(&self, age: u32, n: u32) -> Result<f64> {
        self.survival.check_horizon(age, n)?;
        self.death_benefit_epv(age, 0, n)
    }

    /// ₙEₓ: unit paid on survival to the end of `n` years
    pub fn pure_endowment_epv(&self, age: u32, n: u32) -> Result<f64> {
        Ok(self.discount.discount_factor(n as f64) * self.survival.npx(age, n)?)
    }

    /// Aₓ:n = A¹ₓ:n + ₙEₓ
    pub fn endowment_epv(&self, age: u32, n: u32) -> Result<f64> {
        Ok(self.term_epv(age, n)? + self.pure_endowment_epv(age, n)?)
    }

    /// ᵤ|A¹ₓ:n: unit paid on death between years `u` and `u + n`
    pub fn deferred_term_epv(&self, age: u32, u: u32, n: u32) -> Result<f64> {
        let years = u.saturating_add(n);
        self.survival.check_horizon(age, years)?;
        self.death_benefit_epv(age, u, years)
    }

    // ========================================================================
    // PRICED PRODUCTS
    // ========================================================================

    /// Whole life assurance with premiums payable for life
    pub fn whole_life_assurance(&self, age: u32, sum_assured: f64) -> Result<PremiumQuote> {
        ensure_positive("sum_assured", sum_assured)?;

        let unit_epv = self.whole_life_epv(age)?;
        let annuity_factor = self.annuities().whole_life_annuity_due(age)?;
        let quote = self.quote(sum_assured, unit_epv, annuity_factor)?;

        debug!(
            "Whole life at {}: SA {:.2}, single {:.4}, annual {:.4}",
            age, sum_assured, quote.single_premium, quote.annual_premium
        );
        Ok(quote)
    }

    /// Term assurance with premiums payable over the term
    pub fn term_assurance(&self, age: u32, term: u32, sum_assured: f64) -> Result<PremiumQuote> {
        ensure_positive("sum_assured", sum_assured)?;
        ensure_term(term)?;

        let unit_epv = self.term_epv(age, term)?;
        let annuity_factor = self.annuities().temporary_annuity_due(age, term)?;
        let quote = self.quote(sum_assured, unit_epv, annuity_factor)?;

        debug!(
            "Term {} at {}: SA {:.2}, single {:.4}, annual {:.4}",
            term, age, sum_assured, quote.single_premium, quote.annual_premium
        );
        Ok(quote)
    }

    /// Endowment assurance: term cover plus the sum assured on survival
    pub fn endowment_assurance(&self, age: u32, term: u32, sum_assured: f64) -> Result<PremiumQuote> {
        ensure_positive("sum_assured", sum_assured)?;
        ensure_term(term)?;

        let unit_epv = self.endowment_epv(age, term)?;
        let annuity_factor = self.annuities().temporary_annuity_due(age, term)?;
        let quote = self.quote(sum_assured, unit_epv, annuity_factor)?;

        debug!(
            "Endowment {} at {}: SA {:.2}, single {:.4}, annual {:.4}",
            term, age, sum_assured, quote.single_premium, quote.annual_premium
        );
        Ok(quote)
    }

    fn quote(&self, sum_assured: f64, unit_epv: f64, annuity_factor: f64) -> Result<PremiumQuote> {
        ensure_positive("annuity_factor", annuity_factor)?;

        let single_premium = sum_assured * unit_epv;
        let annual_premium = single_premium / annuity_factor;

        Ok(PremiumQuote {
            sum_assured,
            single_premium,
            annuity_factor,
            annual_premium,
            gross_single_premium: self.loading.gross_single_premium(single_premium),
            gross_annual_premium: self.loading.gross_annual_premium(annual_premium, annuity_factor),
        })
    }
}

fn ensure_term(term: u32) -> Result<()> {
    if term == 0 {
        return Err(ActuarialError::validation(
            "term",
            "priced contracts must run for at least one year",
        ));
    }
    Ok(())
}
