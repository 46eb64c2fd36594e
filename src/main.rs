//! Life contingencies CLI
//!
//! Prices and reserves single-life contracts against a CSV mortality table.
//! Results are printed as JSON; `RUST_LOG=debug` shows intermediate values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use life_contingencies::assumptions::loader::load_mortality_table;
use life_contingencies::{LifeAssurance, MortalityTable, PricingConfig, Reserves, SurvivalFunctions};

/// Actuarial present values for single-life contracts
#[derive(Parser)]
#[command(name = "life_contingencies")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Mortality table CSV with header `age,qx`
    #[arg(short, long)]
    table: PathBuf,

    /// Pricing basis JSON (defaults to flat 5%, strict table boundary)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Survival probabilities and life expectancy
    Survival {
        #[arg(long)]
        age: u32,

        #[arg(long, default_value_t = 1)]
        years: u32,
    },

    /// Net and gross premiums for a contract
    Price {
        #[arg(long, value_enum)]
        product: Product,

        #[arg(long)]
        age: u32,

        /// Policy term in years (term and endowment only)
        #[arg(long)]
        term: Option<u32>,

        #[arg(long)]
        sum_assured: f64,
    },

    /// Endowment reserve schedule at every policy duration
    Reserves {
        #[arg(long)]
        age: u32,

        #[arg(long)]
        term: u32,

        #[arg(long)]
        sum_assured: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Product {
    WholeLife,
    Term,
    Endowment,
}

#[derive(Serialize)]
struct SurvivalSummary<'a> {
    table: &'a str,
    age: u32,
    years: u32,
    npx: f64,
    nqx: f64,
    curtate_life_expectancy: f64,
    complete_life_expectancy: f64,
}

fn survival_summary<'a>(
    survival: SurvivalFunctions<'a>,
    table: &'a MortalityTable,
    age: u32,
    years: u32,
) -> Result<SurvivalSummary<'a>> {
    Ok(SurvivalSummary {
        table: table.name(),
        age,
        years,
        npx: survival.npx(age, years)?,
        nqx: survival.nqx(age, years)?,
        curtate_life_expectancy: table.life_expectancy(age)?,
        complete_life_expectancy: table.complete_life_expectancy(age)?,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let table = load_mortality_table(&cli.table)
        .with_context(|| format!("loading mortality table {}", cli.table.display()))?;

    let config = match &cli.config {
        Some(path) => PricingConfig::from_json_file(path)
            .with_context(|| format!("loading pricing config {}", path.display()))?,
        None => PricingConfig::default(),
    };

    info!(
        "Table '{}' ages {}-{}, boundary {:?}",
        table.name(),
        table.min_age(),
        table.terminal_age(),
        config.boundary
    );

    let discount = config.discounting().context("building discounting source")?;
    let survival = SurvivalFunctions::with_boundary(&table, config.boundary);

    let output = match cli.command {
        Commands::Survival { age, years } => {
            let summary = survival_summary(survival, &table, age, years)?;
            serde_json::to_string_pretty(&summary)?
        }
        Commands::Price {
            product,
            age,
            term,
            sum_assured,
        } => {
            let assurance =
                LifeAssurance::new(survival, discount.as_ref()).with_loading(config.expense_loading);
            let quote = match product {
                Product::WholeLife => assurance.whole_life_assurance(age, sum_assured)?,
                Product::Term => {
                    let term = term.context("--term is required for term assurance")?;
                    assurance.term_assurance(age, term, sum_assured)?
                }
                Product::Endowment => {
                    let term = term.context("--term is required for endowment assurance")?;
                    assurance.endowment_assurance(age, term, sum_assured)?
                }
            };
            serde_json::to_string_pretty(&quote)?
        }
        Commands::Reserves {
            age,
            term,
            sum_assured,
        } => {
            let reserves = Reserves::new(survival, discount.as_ref());
            let schedule = reserves.endowment_schedule(age, term, sum_assured)?;
            serde_json::to_string_pretty(&schedule)?
        }
    };

    println!("{}", output);
    Ok(())
}
