use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::ledger::TaxMonth;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "apura")]
#[command(
    version,
    about = "Brazilian capital gains tax calculator for variable income"
)]
#[command(
    long_about = "Compute the monthly capital gains tax owed on a ledger of variable-income operations (stocks, FIIs, ETFs, crypto): cost basis by weighted average, swing/day-trade split, per-class exemptions, loss carryforward and DARF slips."
)]
pub struct Cli {
    /// Path to the ledger JSON file (overrides APURA_LEDGER and the config file)
    #[arg(long, global = true, value_name = "FILE")]
    pub ledger: Option<PathBuf>,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate tax for a specific month
    Calculate {
        /// Month in YYYY-MM format (e.g., 2024-03)
        month: TaxMonth,
    },

    /// Show monthly tax summary for a year
    Summary {
        /// Year (e.g., 2024)
        #[arg(value_parser = clap::value_parser!(i32).range(1..=9999))]
        year: i32,
    },

    /// Show losses carried into a month
    Losses {
        /// Month in YYYY-MM format (e.g., 2024-03)
        month: TaxMonth,
    },

    /// Generate DARF payment slips for a month
    Darf {
        /// Month in YYYY-MM format (e.g., 2024-03)
        month: TaxMonth,
    },
}
