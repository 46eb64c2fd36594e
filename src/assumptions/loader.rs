//! CSV-based table loader
//!
//! Thin adapter in front of the validating constructors. Expected layouts:
//! - mortality: header `age,qx`, one row per age
//! - yield curve: header `maturity,rate`, one row per tenor

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use super::mortality::MortalityTable;
use crate::error::ActuarialError;
use crate::interest::YieldCurve;

/// Failure to read or validate an external table
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be opened
    #[error("failed to open {path}: {source}")]
    Io {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Row could not be parsed
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Parsed values were rejected by the table constructor
    #[error(transparent)]
    Invalid(#[from] ActuarialError),
}

#[derive(Debug, Deserialize)]
struct QxRecord {
    age: u32,
    qx: f64,
}

#[derive(Debug, Deserialize)]
struct CurveRecord {
    maturity: f64,
    rate: f64,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a mortality table from any CSV source
pub fn read_mortality_table<R: Read>(reader: R, name: &str) -> Result<MortalityTable, LoadError> {
    let mut ages = Vec::new();
    let mut qx = Vec::new();

    for record in csv_reader(reader).deserialize() {
        let row: QxRecord = record?;
        ages.push(row.age);
        qx.push(row.qx);
    }

    debug!("Read {} mortality rows for '{}'", ages.len(), name);
    Ok(MortalityTable::named(name, ages, qx)?)
}

/// Load a mortality table from a CSV file, named after the file stem
pub fn load_mortality_table(path: &Path) -> Result<MortalityTable, LoadError> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(super::mortality::UNNAMED_TABLE)
        .to_string();

    read_mortality_table(open(path)?, &name)
}

/// Read a yield curve from any CSV source
pub fn read_yield_curve<R: Read>(reader: R) -> Result<YieldCurve, LoadError> {
    let mut maturities = Vec::new();
    let mut yields = Vec::new();

    for record in csv_reader(reader).deserialize() {
        let row: CurveRecord = record?;
        maturities.push(row.maturity);
        yields.push(row.rate);
    }

    debug!("Read {} yield curve points", maturities.len());
    Ok(YieldCurve::new(maturities, yields)?)
}

/// Load a yield curve from a CSV file
pub fn load_yield_curve(path: &Path) -> Result<YieldCurve, LoadError> {
    read_yield_curve(open(path)?)
}
