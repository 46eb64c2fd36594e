//! Mortality table: validated age → qx mapping with derived life-table columns
//!
//! The table is immutable once constructed. Adjustments such as mortality
//! improvement or a scalar multiplier produce a new table:
//! - `with_improvement`: qx × (1 − rate)^years
//! - `scaled`: qx × factor, capped at 1
//!
//! Derived columns are computed once at construction:
//! - px = 1 − qx
//! - lx with radix 1 at the first tabulated age
//! - dx = lx × qx

use log::debug;

use crate::error::{ActuarialError, Result};

/// Name given to tables constructed without one
pub const UNNAMED_TABLE: &str = "Unnamed Table";

/// Tabulated one-year mortality rates by integer age
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityTable {
    name: String,

    /// Strictly increasing ages
    ages: Vec<u32>,

    /// Probability that a life aged exactly x dies before x+1
    qx: Vec<f64>,

    px: Vec<f64>,
    lx: Vec<f64>,
    dx: Vec<f64>,
}

impl MortalityTable {
    /// Create an unnamed table from aligned ages and mortality rates
    pub fn new(ages: Vec<u32>, qx: Vec<f64>) -> Result<Self> {
        Self::named(UNNAMED_TABLE, ages, qx)
    }

    /// Create a named table from aligned ages and mortality rates
    ///
    /// Fails with a validation error when the arrays are empty or of different
    /// lengths, ages are not strictly increasing, or any qx lies outside [0, 1].
    pub fn named(name: impl Into<String>, ages: Vec<u32>, qx: Vec<f64>) -> Result<Self> {
        let name = name.into();

        if ages.is_empty() {
            return Err(ActuarialError::validation(
                "ages",
                "table must contain at least one age",
            ));
        }

        if ages.len() != qx.len() {
            return Err(ActuarialError::validation(
                "qx",
                format!(
                    "length {} does not match {} ages",
                    qx.len(),
                    ages.len()
                ),
            ));
        }

        if let Some(pair) = ages.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ActuarialError::validation(
                "ages",
                format!(
                    "must be strictly increasing, found {} followed by {}",
                    pair[0], pair[1]
                ),
            ));
        }

        if let Some((idx, &q)) = qx
            .iter()
            .enumerate()
            .find(|(_, q)| !(0.0..=1.0).contains(*q))
        {
            return Err(ActuarialError::validation(
                "qx",
                format!(
                    "value {} at age {} is outside [0, 1]",
                    q, ages[idx]
                ),
            ));
        }

        let px: Vec<f64> = qx.iter().map(|q| 1.0 - q).collect();

        let mut lx = Vec::with_capacity(ages.len());
        let mut alive = 1.0;
        for p in &px {
            lx.push(alive);
            alive *= p;
        }

        let dx = lx.iter().zip(&qx).map(|(l, q)| l * q).collect();

        debug!(
            "Constructed mortality table '{}' with {} ages ({}-{})",
            name,
            ages.len(),
            ages[0],
            ages[ages.len() - 1]
        );

        Ok(Self {
            name,
            ages,
            qx,
            px,
            lx,
            dx,
        })
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tabulated ages
    pub fn ages(&self) -> &[u32] {
        &self.ages
    }

    /// Tabulated mortality rates, aligned with `ages()`
    pub fn qx_values(&self) -> &[f64] {
        &self.qx
    }

    /// First tabulated age
    pub fn min_age(&self) -> u32 {
        self.ages[0]
    }

    /// Last tabulated age (ω); survival beyond it is not tabulated
    pub fn terminal_age(&self) -> u32 {
        self.ages[self.ages.len() - 1]
    }

    /// Number of tabulated ages
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    /// Always false: construction rejects empty tables
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// Whether `age` is tabulated exactly
    pub fn contains(&self, age: u32) -> bool {
        self.ages.binary_search(&age).is_ok()
    }

    fn index_of(&self, age: u32) -> Result<usize> {
        self.ages
            .binary_search(&age)
            .map_err(|_| ActuarialError::AgeNotFound {
                age,
                table: self.name.clone(),
            })
    }

    /// Mortality rate at an exactly tabulated age
    ///
    /// Ages not present in the table are a lookup error; use
    /// [`interpolate_qx`](Self::interpolate_qx) to request interpolation.
    pub fn get_qx(&self, age: u32) -> Result<f64> {
        self.index_of(age).map(|idx| self.qx[idx])
    }

    /// One-year survival probability at an exactly tabulated age
    pub fn get_px(&self, age: u32) -> Result<f64> {
        self.index_of(age).map(|idx| self.px[idx])
    }

    /// Survivors at `age` out of a radix of 1 at the first tabulated age
    ///
    /// Each tabulated row is one step, so a table with gaps in its ages
    /// applies qx across the gap as if it were a single year.
    pub fn lx(&self, age: u32) -> Result<f64> {
        self.index_of(age).map(|idx| self.lx[idx])
    }

    /// Expected deaths between `age` and `age + 1` out of a radix of 1
    pub fn dx(&self, age: u32) -> Result<f64> {
        self.index_of(age).map(|idx| self.dx[idx])
    }

    /// Mortality rate with linear interpolation between neighbouring ages
    ///
    /// Tabulated ages return their exact rate. Ages outside
    /// [min_age, terminal_age] are a range error, never extrapolated.
    pub fn interpolate_qx(&self, age: f64) -> Result<f64> {
        let min_age = self.min_age();
        let max_age = self.terminal_age();

        if !age.is_finite() || age < min_age as f64 || age > max_age as f64 {
            return Err(ActuarialError::AgeOutOfRange {
                age,
                min_age,
                max_age,
            });
        }

        // Index of the first tabulated age strictly above `age`
        let upper = self.ages.partition_point(|&a| (a as f64) <= age);
        if upper == self.ages.len() {
            return Ok(self.qx[self.ages.len() - 1]);
        }
        let lower = upper - 1;

        let (a0, a1) = (self.ages[lower] as f64, self.ages[upper] as f64);
        let (q0, q1) = (self.qx[lower], self.qx[upper]);
        let weight = (age - a0) / (a1 - a0);

        Ok(q0 + (q1 - q0) * weight)
    }

    /// Curtate life expectancy at a tabulated age
    ///
    /// e_x = Σ_{k≥1} ₖpₓ, closed at the terminal age: survival beyond ω counts
    /// as zero, so e_ω = 0. Only rates at ages ≥ x enter. The ages from x to ω
    /// must be consecutive; a gap is a lookup error for the first missing age.
    pub fn life_expectancy(&self, age: u32) -> Result<f64> {
        let idx = self.index_of(age)?;

        let mut expectancy = 0.0;
        let mut survival = 1.0_f64;
        for (offset, (&a, &p)) in self.ages[idx..].iter().zip(&self.px[idx..]).enumerate() {
            let expected = age + offset as u32;
            if a != expected {
                return Err(ActuarialError::AgeNotFound {
                    age: expected,
                    table: self.name.clone(),
                });
            }
            if offset > 0 {
                expectancy += survival;
            }
            survival = (survival * p).clamp(0.0, 1.0);
        }

        Ok(expectancy)
    }

    /// Complete life expectancy approximated as curtate + ½ year
    pub fn complete_life_expectancy(&self, age: u32) -> Result<f64> {
        Ok(self.life_expectancy(age)? + 0.5)
    }

    /// New table with mortality improvement applied for `years` years
    ///
    /// Uses qx × (1 − rate)^years. A negative rate (deterioration) is allowed;
    /// resulting rates are capped at 1.
    pub fn with_improvement(&self, annual_rate: f64, years: f64) -> Result<Self> {
        if !annual_rate.is_finite() || annual_rate >= 1.0 {
            return Err(ActuarialError::validation(
                "annual_rate",
                format!("must be finite and < 1, got {}", annual_rate),
            ));
        }
        if !years.is_finite() || years < 0.0 {
            return Err(ActuarialError::validation(
                "years",
                format!("must be finite and >= 0, got {}", years),
            ));
        }

        let factor = (1.0 - annual_rate).powf(years);
        debug!(
            "Projecting '{}' with {:.4} improvement over {} years (factor {:.6})",
            self.name, annual_rate, years, factor
        );

        let qx = self.qx.iter().map(|q| (q * factor).min(1.0)).collect();
        Self::named(
            format!("{} (improved {:.2}% x {})", self.name, annual_rate * 100.0, years),
            self.ages.clone(),
            qx,
        )
    }

    /// New table with every rate multiplied by `factor`, capped at 1
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(ActuarialError::validation(
                "factor",
                format!("must be finite and >= 0, got {}", factor),
            ));
        }

        let qx = self.qx.iter().map(|q| (q * factor).min(1.0)).collect();
        Self::named(
            format!("{} (x{})", self.name, factor),
            self.ages.clone(),
            qx,
        )
    }
}
