//! Apura - Brazilian capital gains tax engine for variable income
//!
//! This library reconstructs cost basis from a ledger of operations,
//! classifies disposals as swing or day trades, and computes the monthly
//! tax owed per asset class with exemptions, loss carryforward and
//! withholding netted out.

pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod tax;
pub mod utils;
