use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::monthly::MonthlyTaxResult;
use super::rules;
use crate::ledger::{AssetClass, TaxMonth};

/// One payment slip owed for a month's assessment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DarfPayment {
    pub month: TaxMonth,
    pub asset_class: AssetClass,
    pub darf_code: String,
    pub description: String,
    /// Tax due minus tax already withheld at source
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Payment slips for a month's assessment, one per asset class that still
/// owes anything after withholding is netted out.
///
/// The slip is due on the last day of the following month. The official
/// deadline is the last business day; holidays move it earlier, which is
/// out of scope here.
pub fn generate_darf_payments(result: &MonthlyTaxResult) -> Vec<DarfPayment> {
    let due_date = result.month.next().last_day();
    let mut payments = Vec::new();

    for breakdown in &result.breakdowns {
        let amount = breakdown.tax_due - breakdown.withheld_tax;
        if amount <= Decimal::ZERO {
            continue;
        }

        let Some(rule) = rules::rule_for(breakdown.asset_class) else {
            continue;
        };

        payments.push(DarfPayment {
            month: result.month,
            asset_class: breakdown.asset_class,
            darf_code: rule.darf_code.to_string(),
            description: rule.darf_description.to_string(),
            amount,
            due_date,
        });
    }

    payments
}
