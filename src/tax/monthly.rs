//! Monthly tax assessment
//!
//! One call covers a single month of the variable-income regime: gather
//! the month's disposals with their reconstructed cost basis, split them
//! into swing and day-trade buckets per asset class, apply exemptions and
//! carried losses, then net withheld tax out of the amount due.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::classifier::{AcquisitionIndex, TradeKind};
use super::cost_basis::disposal_average_prices;
use super::loss_carryforward::{offset_against_carryforward, LossState};
use super::rules::{self, AssetTaxRule};
use crate::ledger::{AssetClass, Holding, TaxMonth};

/// Aggregate figures for one trade bucket (swing or day trade)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeTotals {
    /// Sale volume (sum of sale totals)
    pub volume: Decimal,
    /// Sum of positive per-sale results
    pub gains: Decimal,
    /// Sum of negative per-sale results, kept signed
    pub losses: Decimal,
    /// `gains + losses`
    pub net: Decimal,
    /// Base actually taxed after exemption and loss compensation
    pub taxable: Decimal,
    pub tax_due: Decimal,
}

impl TradeTotals {
    fn from_sales(sales: &[&SaleDetail]) -> Self {
        let mut totals = TradeTotals::default();
        for sale in sales {
            totals.volume += sale.sale_total;
            if sale.gain > Decimal::ZERO {
                totals.gains += sale.gain;
            } else {
                totals.losses += sale.gain;
            }
        }
        totals.net = totals.gains + totals.losses;
        totals
    }
}

/// Assessment of one asset class for the month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassBreakdown {
    pub asset_class: AssetClass,
    pub swing: TradeTotals,
    pub day_trade: TradeTotals,
    /// Whether the swing bucket fell under the class's volume exemption
    pub exempt: bool,
    /// Carried-loss magnitude consumed this month
    pub loss_used: Decimal,
    /// Loss carried out of the month for this class, zero or negative
    pub loss_remaining: Decimal,
    pub withheld_tax: Decimal,
    pub tax_due: Decimal,
}

/// One disposal with its reconstructed result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    pub holding_id: String,
    pub holding_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    pub trade_kind: TradeKind,
    pub asset_class: AssetClass,
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub sale_price: Decimal,
    pub average_price: Decimal,
    pub sale_total: Decimal,
    pub gain: Decimal,
    pub fees: Decimal,
}

/// Month-level rollup across every assessed class
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub total_sales: Decimal,
    pub total_gains: Decimal,
    pub total_losses: Decimal,
    pub net_result: Decimal,
    pub tax_due: Decimal,
    pub withheld_tax: Decimal,
    /// `max(0, tax_due - withheld_tax)`
    pub payable_tax: Decimal,
    pub has_tax_due: bool,
}

/// Full assessment of one month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTaxResult {
    pub month: TaxMonth,
    pub summary: MonthlySummary,
    pub breakdowns: Vec<AssetClassBreakdown>,
    pub details: Vec<SaleDetail>,
    /// Loss state entering the next month
    pub loss_state: LossState,
}

/// Assess one month given the loss state carried into it.
///
/// Pure: reads the holdings, never mutates them, and returns the same
/// result for the same inputs. Classes without a tax rule are skipped.
pub fn calculate_monthly_tax(
    holdings: &[Holding],
    month: TaxMonth,
    carried: &LossState,
) -> MonthlyTaxResult {
    let index = AcquisitionIndex::from_holdings(holdings);
    let sales_by_class = collect_month_sales(holdings, month, &index);

    // Normalize so every taxable class leaves the month with an entry,
    // even when nothing of that class traded.
    let mut loss_state = LossState::new();
    for class in rules::taxable_classes() {
        loss_state.set(class, carried.carried(class));
    }

    let mut breakdowns = Vec::new();
    let mut details: Vec<SaleDetail> = Vec::new();

    for (class, sales) in &sales_by_class {
        let Some(rule) = rules::rule_for(*class) else {
            debug!(asset_class = %class, sales = sales.len(), "skipping untaxed class");
            continue;
        };

        let breakdown = assess_asset_class(rule, sales, loss_state.carried(*class));
        debug!(
            asset_class = %class,
            tax_due = %breakdown.tax_due,
            loss_remaining = %breakdown.loss_remaining,
            "assessed class"
        );

        loss_state.set(*class, breakdown.loss_remaining);
        details.extend(sales.iter().cloned());
        breakdowns.push(breakdown);
    }

    let details: Vec<SaleDetail> = details
        .into_iter()
        .sorted_by(|a, b| b.date.cmp(&a.date))
        .collect();

    MonthlyTaxResult {
        month,
        summary: summarize(&breakdowns),
        breakdowns,
        details,
        loss_state,
    }
}

/// The month's disposals grouped by asset class, each with the average
/// price its holding's full history puts in effect at that point.
fn collect_month_sales(
    holdings: &[Holding],
    month: TaxMonth,
    index: &AcquisitionIndex,
) -> BTreeMap<AssetClass, Vec<SaleDetail>> {
    let mut sales_by_class: BTreeMap<AssetClass, Vec<SaleDetail>> = BTreeMap::new();

    for holding in holdings {
        let operations = holding.sorted_operations();
        let averages = disposal_average_prices(&operations);

        for op in operations {
            if !op.kind.is_disposal() || !month.contains(op.date) {
                continue;
            }

            let average_price = averages.get(&op.id).copied().unwrap_or(Decimal::ZERO);
            let gain = (op.unit_price - average_price) * op.quantity - op.fees;

            sales_by_class
                .entry(holding.asset_class)
                .or_default()
                .push(SaleDetail {
                    holding_id: holding.id.clone(),
                    holding_name: holding.name.clone(),
                    ticker: holding.ticker.clone(),
                    trade_kind: index.classify(&holding.id, op.date),
                    asset_class: holding.asset_class,
                    date: op.date,
                    quantity: op.quantity,
                    sale_price: op.unit_price,
                    average_price,
                    sale_total: op.total,
                    gain,
                    fees: op.fees,
                });
        }
    }

    sales_by_class
}

fn assess_asset_class(
    rule: &AssetTaxRule,
    sales: &[SaleDetail],
    carried: Decimal,
) -> AssetClassBreakdown {
    let (day_sales, swing_sales): (Vec<&SaleDetail>, Vec<&SaleDetail>) = sales
        .iter()
        .partition(|sale| sale.trade_kind == TradeKind::DayTrade);

    let mut swing = TradeTotals::from_sales(&swing_sales);
    let mut day_trade = TradeTotals::from_sales(&day_sales);

    let exempt = rule.exempts(swing.volume, day_trade.volume);

    // An exempt swing bucket neither pays tax nor consumes carried losses.
    let swing_net_for_tax = if exempt { Decimal::ZERO } else { swing.net };
    let swing_offset = offset_against_carryforward(carried, swing_net_for_tax);
    let day_offset = offset_against_carryforward(swing_offset.remaining, day_trade.net);

    swing.taxable = swing_offset.taxable.max(Decimal::ZERO);
    swing.tax_due = swing.taxable * rule.swing_rate;
    day_trade.taxable = day_offset.taxable.max(Decimal::ZERO);
    day_trade.tax_due = day_trade.taxable * rule.day_rate;

    // New losses accrue onto whatever carryforward survived compensation.
    // Exempt swing results stay out of the carryforward entirely.
    let mut loss_remaining = day_offset.remaining;
    if !exempt && swing.net < Decimal::ZERO {
        loss_remaining += swing.net;
    }
    if day_trade.net < Decimal::ZERO {
        loss_remaining += day_trade.net;
    }

    let withheld_tax = swing.volume * rule.swing_withholding_rate
        + day_trade.volume * rule.day_withholding_rate;
    let loss_used = swing_offset.used + day_offset.used;
    let tax_due = swing.tax_due + day_trade.tax_due;

    AssetClassBreakdown {
        asset_class: rule.asset_class,
        swing,
        day_trade,
        exempt,
        loss_used,
        loss_remaining,
        withheld_tax,
        tax_due,
    }
}

fn summarize(breakdowns: &[AssetClassBreakdown]) -> MonthlySummary {
    let mut summary = MonthlySummary {
        total_sales: Decimal::ZERO,
        total_gains: Decimal::ZERO,
        total_losses: Decimal::ZERO,
        net_result: Decimal::ZERO,
        tax_due: Decimal::ZERO,
        withheld_tax: Decimal::ZERO,
        payable_tax: Decimal::ZERO,
        has_tax_due: false,
    };

    for breakdown in breakdowns {
        summary.total_sales += breakdown.swing.volume + breakdown.day_trade.volume;
        summary.total_gains += breakdown.swing.gains + breakdown.day_trade.gains;
        summary.total_losses += breakdown.swing.losses + breakdown.day_trade.losses;
        summary.tax_due += breakdown.tax_due;
        summary.withheld_tax += breakdown.withheld_tax;
    }

    summary.net_result = summary.total_gains + summary.total_losses;
    summary.payable_tax = (summary.tax_due - summary.withheld_tax).max(Decimal::ZERO);
    summary.has_tax_due = summary.payable_tax > Decimal::ZERO;
    summary
}
