//! Mortality assumptions: tables, survival functions and table loading

mod mortality;
mod survival;
pub mod loader;

pub use mortality::{MortalityTable, UNNAMED_TABLE};
pub use survival::{SurvivalFunctions, TableBoundary};
pub use loader::LoadError;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::MortalityTable;

    /// Ages 20..=100 with qx = 0.001 · (age − 20) / 80
    pub fn linear_ramp_table() -> MortalityTable {
        let ages: Vec<u32> = (20..=100).collect();
        let qx = ages.iter().map(|&a| 0.001 * (a - 20) as f64 / 80.0).collect();
        MortalityTable::named("Linear Ramp", ages, qx).unwrap()
    }

    /// Ages 20..=100 with qx = 0.001 + 0.00005 · (age − 20)
    pub fn increasing_table() -> MortalityTable {
        let ages: Vec<u32> = (20..=100).collect();
        let qx = ages.iter().map(|&a| 0.001 + 0.00005 * (a - 20) as f64).collect();
        MortalityTable::named("Test Table", ages, qx).unwrap()
    }

    /// Ages 20..=100 with no deaths at all
    pub fn zero_mortality_table() -> MortalityTable {
        MortalityTable::named("Immortal", (20..=100).collect(), vec![0.0; 81]).unwrap()
    }

    /// Steep table ending in certain death at 110
    pub fn closed_table() -> MortalityTable {
        let ages: Vec<u32> = (40..=110).collect();
        let qx = ages
            .iter()
            .map(|&a| if a == 110 { 1.0 } else { (0.002 * 1.09_f64.powi((a - 40) as i32)).min(1.0) })
            .collect();
        MortalityTable::named("Closed", ages, qx).unwrap()
    }
}
