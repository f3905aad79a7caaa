//! Error handling for apura
//!
//! Defines the ledger-boundary error type and establishes a unified Result
//! type using anyhow for context chaining and error propagation. The tax
//! engine itself never fails: missing data computes to zeroes, so only the
//! loading side carries errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading an operation ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read ledger file")]
    Io(#[from] std::io::Error),

    #[error("malformed ledger JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type alias for ledger and CLI operations
pub type Result<T> = anyhow::Result<T>;
