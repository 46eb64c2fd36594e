//! Net premium policy reserves
//!
//! A reserve is recomputed on demand as a point-in-time snapshot:
//! - **Prospective**: EPV(future benefits) − EPV(future premiums) at the attained age
//! - **Retrospective**: premiums accumulated with interest and survivorship, less benefits
//! - **Recursive**: backward one-year recursion from the maturity value
//!
//! Under the equivalence premium the three agree. The one-year methods roll
//! with the discounting source's one-year factor DF(1), so they reproduce the
//! prospective reserve exactly only for a flat rate.
//!
//! # Example
//!
//! ```rust,ignore
//! use life_contingencies::{InterestTheory, MortalityTable, Reserves, SurvivalFunctions};
//!
//! let rate = InterestTheory::new(0.05)?;
//! let reserves = Reserves::new(SurvivalFunctions::new(&table), &rate);
//! let schedule = reserves.endowment_schedule(40, 20, 100_000.0)?;
//! println!("Premium: {:.2}", schedule.annual_premium);
//! ```

mod types;

pub use types::{
    ReserveDistribution, ReserveLoadings, ReserveRow, ReserveSchedule, DEFAULT_CONTINGENCY_FACTOR,
};

use log::debug;

use crate::assumptions::SurvivalFunctions;
use crate::error::{ensure_finite, ensure_positive, ActuarialError, Result};
use crate::interest::Discounting;
use crate::pricing::{Annuities, LifeAssurance};

/// Reserve calculator over a table and a discounting source
pub struct Reserves<'a, D: Discounting + ?Sized> {
    survival: SurvivalFunctions<'a>,
    discount: &'a D,
}

impl<'a, D: Discounting + ?Sized> Reserves<'a, D> {
    /// Reserve calculator on the given mortality and interest basis
    pub fn new(survival: SurvivalFunctions<'a>, discount: &'a D) -> Self {
        Self { survival, discount }
    }

    /// Net assurance pricing on the same basis
    pub fn assurance(&self) -> LifeAssurance<'a, D> {
        LifeAssurance::new(self.survival, self.discount)
    }

    fn annuities(&self) -> Annuities<'a, D> {
        Annuities::new(self.survival, self.discount)
    }

    /// Check `duration` lies within the term and the contract fits the table
    ///
    /// Returns false when the closed boundary leaves no lives in force at
    /// `duration`.
    fn in_force(&self, issue_age: u32, term: u32, duration: u32) -> Result<bool> {
        if duration > term {
            return Err(ActuarialError::validation(
                "duration",
                format!("{} exceeds policy term of {}", duration, term),
            ));
        }

        self.survival.check_horizon(issue_age, term)?;
        Ok(self.survival.check_horizon(issue_age, duration)? == duration)
    }

    /// Fail unless `issue_age + years` lies within the table, whatever the boundary
    fn require_full_horizon(&self, issue_age: u32, years: u32) -> Result<()> {
        let covered = self.survival.check_horizon(issue_age, years)?;
        if covered < years {
            let table = self.survival.table();
            return Err(ActuarialError::BeyondTable {
                age: issue_age,
                years,
                terminal_age: table.terminal_age(),
                table: table.name().to_string(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // PROSPECTIVE RESERVES
    // ========================================================================

    /// Endowment reserve at `duration` years after issue
    ///
    /// SA · Aₓ₊ₜ:ₙ₋ₜ − P · äₓ₊ₜ:ₙ₋ₜ. Not floored at zero; equals the sum
    /// assured at maturity.
    pub fn reserve_endowment(
        &self,
        issue_age: u32,
        term: u32,
        duration: u32,
        annual_premium: f64,
        sum_assured: f64,
    ) -> Result<f64> {
        ensure_positive("sum_assured", sum_assured)?;
        ensure_finite("annual_premium", annual_premium)?;
        if !self.in_force(issue_age, term, duration)? {
            return Ok(0.0);
        }

        let age = issue_age + duration;
        let remaining = term - duration;
        let benefits = sum_assured * self.assurance().endowment_epv(age, remaining)?;
        let premiums = annual_premium * self.annuities().temporary_annuity_due(age, remaining)?;

        Ok(benefits - premiums)
    }

    /// Term assurance reserve at `duration` years after issue; zero at expiry
    pub fn reserve_term(
        &self,
        issue_age: u32,
        term: u32,
        duration: u32,
        annual_premium: f64,
        sum_assured: f64,
    ) -> Result<f64> {
        ensure_positive("sum_assured", sum_assured)?;
        ensure_finite("annual_premium", annual_premium)?;
        if !self.in_force(issue_age, term, duration)? {
            return Ok(0.0);
        }

        let age = issue_age + duration;
        let remaining = term - duration;
        let benefits = sum_assured * self.assurance().term_epv(age, remaining)?;
        let premiums = annual_premium * self.annuities().temporary_annuity_due(age, remaining)?;

        Ok(benefits - premiums)
    }

    /// Whole life reserve at `duration` years after issue, premiums for life
    pub fn reserve_whole_life(
        &self,
        issue_age: u32,
        duration: u32,
        annual_premium: f64,
        sum_assured: f64,
    ) -> Result<f64> {
        ensure_positive("sum_assured", sum_assured)?;
        ensure_finite("annual_premium", annual_premium)?;
        if self.survival.check_horizon(issue_age, duration)? < duration {
            return Ok(0.0);
        }

        let age = issue_age + duration;
        let benefits = sum_assured * self.assurance().whole_life_epv(age)?;
        let premiums = annual_premium * self.annuities().whole_life_annuity_due(age)?;

        Ok(benefits - premiums)
    }

    // ========================================================================
    // ONE-YEAR METHODS
    // ========================================================================

    /// Endowment reserve by forward accumulation from V₀ = 0
    ///
    /// V(t+1) = ((V(t) + P) / DF(1) − q · SA) / p. Before maturity this is
    /// the same for any contract paying SA on death.
    pub fn retrospective_reserve(
        &self,
        issue_age: u32,
        duration: u32,
        annual_premium: f64,
        sum_assured: f64,
    ) -> Result<f64> {
        ensure_positive("sum_assured", sum_assured)?;
        ensure_finite("annual_premium", annual_premium)?;
        self.require_full_horizon(issue_age, duration)?;

        let growth = 1.0 / self.discount.discount_factor(1.0);
        let table = self.survival.table();
        let mut reserve = 0.0;

        for t in 0..duration {
            let age = issue_age + t;
            let q = table.get_qx(age)?;
            let p = 1.0 - q;
            if p <= 0.0 {
                return Err(ActuarialError::validation(
                    "duration",
                    format!("no survivors beyond age {} to accumulate over", age),
                ));
            }
            reserve = ((reserve + annual_premium) * growth - q * sum_assured) / p;
        }

        Ok(reserve)
    }

    /// Endowment reserves for durations 0..=term by backward recursion
    ///
    /// Starts from V(term) = SA and steps V(t) = (q · SA + p · V(t+1)) · DF(1) − P.
    pub fn recursive_endowment_reserves(
        &self,
        issue_age: u32,
        term: u32,
        annual_premium: f64,
        sum_assured: f64,
    ) -> Result<Vec<f64>> {
        ensure_positive("sum_assured", sum_assured)?;
        ensure_finite("annual_premium", annual_premium)?;
        self.require_full_horizon(issue_age, term)?;

        let v = self.discount.discount_factor(1.0);
        let table = self.survival.table();
        let mut reserves = vec![0.0; term as usize + 1];
        reserves[term as usize] = sum_assured;

        for t in (0..term).rev() {
            let q = table.get_qx(issue_age + t)?;
            let next = reserves[t as usize + 1];
            reserves[t as usize] = (q * sum_assured + (1.0 - q) * next) * v - annual_premium;
        }

        Ok(reserves)
    }

    /// Price an endowment and tabulate its reserves at every duration
    pub fn endowment_schedule(
        &self,
        issue_age: u32,
        term: u32,
        sum_assured: f64,
    ) -> Result<ReserveSchedule> {
        let quote = self.assurance().endowment_assurance(issue_age, term, sum_assured)?;
        let premium = quote.annual_premium;
        let recursive = self.recursive_endowment_reserves(issue_age, term, premium, sum_assured)?;

        let mut rows = Vec::with_capacity(recursive.len());
        for duration in 0..=term {
            let prospective =
                self.reserve_endowment(issue_age, term, duration, premium, sum_assured)?;
            rows.push(ReserveRow {
                duration,
                attained_age: issue_age + duration,
                prospective,
                recursive: recursive[duration as usize],
                increase: None,
            });
        }

        for idx in 1..rows.len() {
            rows[idx - 1].increase = Some(rows[idx].prospective - rows[idx - 1].prospective);
        }

        debug!(
            "Endowment schedule {}+{}: premium {:.4}, {} rows",
            issue_age,
            term,
            premium,
            rows.len()
        );

        Ok(ReserveSchedule {
            issue_age,
            term,
            sum_assured,
            annual_premium: premium,
            rows,
        })
    }
}
