// Ledger module - the input boundary: holdings and their operation histories

pub mod models;

pub use models::{AssetClass, Holding, Operation, OperationKind, ParseTaxMonthError, TaxMonth};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LedgerError;

/// A full ledger file: every holding with its operation history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

/// Load a ledger from a JSON file.
///
/// The file is expected to be already normalized: a single currency,
/// decimal values as strings or plain numbers, dates as `YYYY-MM-DD`.
/// Loading is the caller-side half of the contract; the engine itself
/// never touches the filesystem.
pub fn load_ledger(path: impl AsRef<Path>) -> Result<Ledger> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LedgerError::NotFound(path.to_path_buf()).into());
    }

    let raw = fs::read_to_string(path)
        .map_err(LedgerError::Io)
        .with_context(|| format!("Failed to read ledger file {}", path.display()))?;
    let ledger: Ledger = serde_json::from_str(&raw)
        .map_err(LedgerError::Malformed)
        .with_context(|| format!("Failed to parse ledger file {}", path.display()))?;

    info!(
        "Loaded {} holdings ({} operations) from {}",
        ledger.holdings.len(),
        ledger
            .holdings
            .iter()
            .map(|h| h.operations.len())
            .sum::<usize>(),
        path.display()
    );

    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_ledger_reads_holdings() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "holdings": [
                    {{
                        "id": "h-1",
                        "name": "Petrobras",
                        "ticker": "PETR4",
                        "assetClass": "stock",
                        "operations": [
                            {{
                                "id": "op-1",
                                "holdingId": "h-1",
                                "kind": "buy",
                                "date": "2024-01-10",
                                "quantity": "100",
                                "unitPrice": "38.50",
                                "total": "3850.00",
                                "fees": "4.90"
                            }}
                        ]
                    }}
                ]
            }}"#
        )
        .unwrap();

        let ledger = load_ledger(file.path()).unwrap();
        assert_eq!(ledger.holdings.len(), 1);
        assert_eq!(ledger.holdings[0].ticker.as_deref(), Some("PETR4"));
        assert_eq!(ledger.holdings[0].operations.len(), 1);
    }

    #[test]
    fn test_load_ledger_missing_file() {
        let err = load_ledger("/nonexistent/ledger.json").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_ledger_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ this is not json").unwrap();

        let err = load_ledger(file.path()).unwrap_err();
        assert!(format!("{:?}", err).contains("malformed ledger JSON"));
    }

    #[test]
    fn test_empty_object_is_empty_ledger() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        let ledger = load_ledger(file.path()).unwrap();
        assert!(ledger.holdings.is_empty());
    }
}
