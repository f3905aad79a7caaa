use std::env;
use std::path::PathBuf;

use anyhow::bail;
use tracing::info;

use crate::cli::{formatters, Cli, Commands};
use crate::config;
use crate::error::Result;
use crate::ledger::{load_ledger, Holding, TaxMonth};
use crate::tax::{
    self, calculate_monthly_tax, generate_darf_payments, replay_loss_state, MonthlyTaxResult,
};

/// Execute a parsed CLI invocation.
pub fn run(cli: Cli) -> Result<()> {
    let path = resolve_ledger_path(cli.ledger)?;
    let ledger = load_ledger(&path)?;
    let holdings = ledger.holdings;

    match cli.command {
        Commands::Calculate { month } => {
            info!("Assessing tax for {}", month);
            let result = tax::assess_month(&holdings, month);
            if cli.json {
                println!("{}", formatters::format_monthly_json(&result));
            } else if result.details.is_empty() {
                println!("{}", formatters::format_no_activity(month));
            } else {
                println!("{}", formatters::format_monthly_result(&result));
            }
        }

        Commands::Summary { year } => {
            info!("Assessing all months of {}", year);
            let results = assess_year(&holdings, year);
            if cli.json {
                println!("{}", formatters::format_annual_json(year, &results));
            } else {
                println!("{}", formatters::format_annual_table(year, &results));
            }
        }

        Commands::Losses { month } => {
            info!("Replaying losses carried into {}", month);
            let state = replay_loss_state(&holdings, month);
            if cli.json {
                println!("{}", formatters::format_loss_state_json(month, &state));
            } else {
                println!("{}", formatters::format_loss_state(month, &state));
            }
        }

        Commands::Darf { month } => {
            info!("Generating DARF slips for {}", month);
            let result = tax::assess_month(&holdings, month);
            let payments = generate_darf_payments(&result);
            if cli.json {
                println!("{}", formatters::format_darf_json(month, &payments));
            } else {
                println!("{}", formatters::format_darf_payments(month, &payments));
            }
        }
    }

    Ok(())
}

/// Assess all twelve months of a year, threading the loss state from one
/// month into the next so the history before January is replayed once.
pub fn assess_year(holdings: &[Holding], year: i32) -> Vec<MonthlyTaxResult> {
    let mut state = replay_loss_state(holdings, TaxMonth::new(year, 1));
    let mut results = Vec::with_capacity(12);

    for month in 1..=12 {
        let result = calculate_monthly_tax(holdings, TaxMonth::new(year, month), &state);
        state = result.loss_state.clone();
        results.push(result);
    }

    results
}

/// Ledger location: `--ledger` flag first, then APURA_LEDGER, then the
/// config file.
fn resolve_ledger_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }

    if let Some(path) = env::var_os("APURA_LEDGER") {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = config::load()?.ledger {
        return Ok(path);
    }

    bail!(
        "No ledger file configured. Pass --ledger <FILE>, set APURA_LEDGER, \
         or add `ledger = \"...\"` to the config file."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AssetClass, Operation, OperationKind};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn op(seq: u32, kind: OperationKind, date: &str, qty: Decimal, price: Decimal) -> Operation {
        Operation {
            id: format!("vale3-{seq}"),
            holding_id: "vale3".to_string(),
            kind,
            date: date.parse().unwrap(),
            quantity: qty,
            unit_price: price,
            total: qty * price,
            fees: Decimal::ZERO,
            notes: None,
        }
    }

    #[test]
    fn test_assess_year_threads_losses_between_months() {
        // February loses 5000 above the exemption volume, March gains 5000;
        // the March assessment must come out fully compensated.
        let holdings = vec![Holding {
            id: "vale3".to_string(),
            name: "Vale ON".to_string(),
            ticker: Some("VALE3".to_string()),
            asset_class: AssetClass::Stock,
            operations: vec![
                op(1, OperationKind::Buy, "2024-01-10", dec!(2000), dec!(30)),
                op(2, OperationKind::Sell, "2024-02-15", dec!(1000), dec!(25)),
                op(3, OperationKind::Sell, "2024-03-15", dec!(1000), dec!(35)),
            ],
        }];

        let results = assess_year(&holdings, 2024);
        assert_eq!(results.len(), 12);

        let february = &results[1];
        assert_eq!(february.loss_state.carried(AssetClass::Stock), dec!(-5000));

        let march = &results[2];
        assert_eq!(march.summary.tax_due, Decimal::ZERO);
        assert_eq!(march.breakdowns[0].loss_used, dec!(5000));
        assert!(march.loss_state.is_clear());

        // Threading must agree with a from-scratch monthly assessment
        let standalone = tax::assess_month(&holdings, TaxMonth::new(2024, 3));
        assert_eq!(standalone.summary.tax_due, march.summary.tax_due);
        assert_eq!(standalone.loss_state, march.loss_state);
    }

    #[test]
    fn test_ledger_flag_takes_precedence() {
        let path = resolve_ledger_path(Some(PathBuf::from("/tmp/explicit.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit.json"));
    }
}
