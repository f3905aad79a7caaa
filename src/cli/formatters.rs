//! Terminal and JSON rendering of assessment results
//!
//! Everything the CLI prints is built here, keeping presentation concerns
//! out of the tax engine itself.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::ledger::TaxMonth;
use crate::tax::monthly::{MonthlySummary, MonthlyTaxResult};
use crate::tax::{rules, DarfPayment, LossState};
use crate::utils::format_currency;

/// Currency with result coloring: gains green, losses red, zero plain.
fn colored_currency(value: Decimal) -> String {
    let formatted = format_currency(value);
    if value > Decimal::ZERO {
        formatted.green().to_string()
    } else if value < Decimal::ZERO {
        formatted.red().to_string()
    } else {
        formatted
    }
}

fn class_label(asset_class: crate::ledger::AssetClass) -> String {
    rules::rule_for(asset_class)
        .map(|rule| rule.label.to_string())
        .unwrap_or_else(|| asset_class.to_string())
}

/// Format a full monthly assessment for terminal output
pub fn format_monthly_result(result: &MonthlyTaxResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} Tax assessment - {}\n\n",
        "📅".cyan().bold(),
        result.month.to_string().bold()
    ));

    #[derive(Tabled)]
    struct BreakdownRow {
        #[tabled(rename = "Class")]
        class: String,
        #[tabled(rename = "Mode")]
        mode: String,
        #[tabled(rename = "Volume")]
        volume: String,
        #[tabled(rename = "Result")]
        result: String,
        #[tabled(rename = "Taxable")]
        taxable: String,
        #[tabled(rename = "Tax due")]
        tax_due: String,
    }

    let mut rows: Vec<BreakdownRow> = Vec::new();
    for breakdown in &result.breakdowns {
        let label = class_label(breakdown.asset_class);

        let swing = &breakdown.swing;
        if !swing.volume.is_zero() || !swing.net.is_zero() {
            rows.push(BreakdownRow {
                class: label.clone(),
                mode: "Swing".to_string(),
                volume: format_currency(swing.volume),
                result: colored_currency(swing.net),
                taxable: if breakdown.exempt {
                    "exempt".to_string()
                } else {
                    format_currency(swing.taxable)
                },
                tax_due: format_currency(swing.tax_due),
            });
        }

        let day = &breakdown.day_trade;
        if !day.volume.is_zero() || !day.net.is_zero() {
            rows.push(BreakdownRow {
                class: label.clone(),
                mode: "Day Trade".to_string(),
                volume: format_currency(day.volume),
                result: colored_currency(day.net),
                taxable: format_currency(day.taxable),
                tax_due: format_currency(day.tax_due),
            });
        }
    }

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align all columns except Class (0) and Mode (1)
    table.modify(Columns::new(2..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');

    for breakdown in &result.breakdowns {
        let label = class_label(breakdown.asset_class);
        if breakdown.loss_used > Decimal::ZERO {
            output.push_str(&format!(
                "{} {}: {} of carried losses compensated\n",
                "✓".green().bold(),
                label,
                format_currency(breakdown.loss_used)
            ));
        }
        if breakdown.loss_remaining < Decimal::ZERO {
            output.push_str(&format!(
                "{} {}: {} in losses carried forward\n",
                "⚠".yellow().bold(),
                label,
                format_currency(breakdown.loss_remaining.abs())
            ));
        }
    }

    #[derive(Tabled)]
    struct SaleRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Asset")]
        asset: String,
        #[tabled(rename = "Mode")]
        mode: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Avg Price")]
        avg_price: String,
        #[tabled(rename = "Sale Price")]
        sale_price: String,
        #[tabled(rename = "Total")]
        total: String,
        #[tabled(rename = "Result")]
        result: String,
    }

    let sale_rows: Vec<SaleRow> = result
        .details
        .iter()
        .map(|sale| SaleRow {
            date: sale.date.format("%d/%m/%Y").to_string(),
            asset: sale
                .ticker
                .clone()
                .unwrap_or_else(|| sale.holding_name.clone()),
            mode: sale.trade_kind.label().to_string(),
            quantity: sale.quantity.normalize().to_string(),
            avg_price: format_currency(sale.average_price),
            sale_price: format_currency(sale.sale_price),
            total: format_currency(sale.sale_total),
            result: colored_currency(sale.gain),
        })
        .collect();

    output.push_str(&format!("\n{} Sales\n\n", "🧾".cyan().bold()));
    let mut sales_table = Table::new(&sale_rows);
    sales_table.with(Style::modern());
    sales_table.modify(Columns::new(3..), Alignment::right());
    output.push_str(&sales_table.to_string());

    output.push_str(&format_summary_block(&result.summary));

    if result.summary.has_tax_due {
        output.push_str(&format!(
            "\n{} DARF payable: {}\n",
            "⚠".yellow().bold(),
            format_currency(result.summary.payable_tax).bold()
        ));
    } else {
        output.push_str(&format!(
            "\n{} Nothing to pay for {}\n",
            "✓".green().bold(),
            result.month
        ));
    }

    output
}

fn format_summary_block(summary: &MonthlySummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n\n{} Summary", "━".repeat(80).bright_black()));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Total sales:".bold(),
        format_currency(summary.total_sales)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Net result:".bold(),
        colored_currency(summary.net_result)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Tax due:".bold(),
        format_currency(summary.tax_due)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Withheld (IRRF):".bold(),
        format_currency(summary.withheld_tax)
    ));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Payable:".bold(),
        format_currency(summary.payable_tax)
    ));

    output
}

/// Message for a month without any taxable sales
pub fn format_no_activity(month: TaxMonth) -> String {
    format!(
        "{} No sales in {} - nothing to assess\n",
        "ℹ".blue().bold(),
        month
    )
}

/// Format a monthly assessment as pretty JSON
pub fn format_monthly_json(result: &MonthlyTaxResult) -> String {
    serde_json::to_string_pretty(result)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a year of assessments as a month-by-month table
pub fn format_annual_table(year: i32, results: &[MonthlyTaxResult]) -> String {
    let active: Vec<&MonthlyTaxResult> = results
        .iter()
        .filter(|result| !result.details.is_empty())
        .collect();

    if active.is_empty() {
        return format!("{} No sales in {}\n", "ℹ".blue().bold(), year);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Tax summary - {}\n\n",
        "📊".cyan().bold(),
        year.to_string().bold()
    ));

    #[derive(Tabled)]
    struct MonthRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Sales")]
        sales: String,
        #[tabled(rename = "Net result")]
        net: String,
        #[tabled(rename = "Tax due")]
        tax_due: String,
        #[tabled(rename = "Withheld")]
        withheld: String,
        #[tabled(rename = "Payable")]
        payable: String,
    }

    let rows: Vec<MonthRow> = active
        .iter()
        .map(|result| MonthRow {
            month: month_name(result.month.month).to_string(),
            sales: format_currency(result.summary.total_sales),
            net: colored_currency(result.summary.net_result),
            tax_due: format_currency(result.summary.tax_due),
            withheld: format_currency(result.summary.withheld_tax),
            payable: format_currency(result.summary.payable_tax),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());

    let total_net: Decimal = active.iter().map(|r| r.summary.net_result).sum();
    let total_payable: Decimal = active.iter().map(|r| r.summary.payable_tax).sum();

    output.push_str(&format!("\n\n{} Totals", "━".repeat(80).bright_black()));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Net result:".bold(),
        colored_currency(total_net)
    ));
    output.push_str(&format!(
        "\n{:<20} {}\n",
        "Payable:".bold(),
        format_currency(total_payable)
    ));

    output
}

/// Format a year of assessments as JSON: per-month summaries plus the
/// loss state leaving December
pub fn format_annual_json(year: i32, results: &[MonthlyTaxResult]) -> String {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonMonth<'a> {
        month: TaxMonth,
        #[serde(flatten)]
        summary: &'a MonthlySummary,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonYear<'a> {
        year: i32,
        months: Vec<JsonMonth<'a>>,
        loss_state: Option<&'a LossState>,
    }

    let report = JsonYear {
        year,
        months: results
            .iter()
            .map(|result| JsonMonth {
                month: result.month,
                summary: &result.summary,
            })
            .collect(),
        loss_state: results.last().map(|result| &result.loss_state),
    };

    serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the loss state carried into a month
pub fn format_loss_state(month: TaxMonth, state: &LossState) -> String {
    if state.is_clear() {
        return format!(
            "{} No losses carried into {}\n",
            "✓".green().bold(),
            month
        );
    }

    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Losses carried into {}\n\n",
        "📉".cyan().bold(),
        month.to_string().bold()
    ));

    #[derive(Tabled)]
    struct LossRow {
        #[tabled(rename = "Class")]
        class: String,
        #[tabled(rename = "Carried loss")]
        carried: String,
    }

    let rows: Vec<LossRow> = state
        .iter()
        .filter(|(_, carried)| !carried.is_zero())
        .map(|(class, carried)| LossRow {
            class: class_label(class),
            carried: format_currency(carried.abs()).red().to_string(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');

    output
}

/// Loss state as JSON, keyed by asset class
pub fn format_loss_state_json(month: TaxMonth, state: &LossState) -> String {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonLosses<'a> {
        month: TaxMonth,
        carried: &'a LossState,
    }

    serde_json::to_string_pretty(&JsonLosses {
        month,
        carried: state,
    })
    .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format DARF payment slips for a month
pub fn format_darf_payments(month: TaxMonth, payments: &[DarfPayment]) -> String {
    if payments.is_empty() {
        return format!("{} No DARF due for {}\n", "✓".green().bold(), month);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "\n{} DARF - {}\n\n",
        "🧾".cyan().bold(),
        month.to_string().bold()
    ));

    #[derive(Tabled)]
    struct DarfRow {
        #[tabled(rename = "Code")]
        code: String,
        #[tabled(rename = "Description")]
        description: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Due date")]
        due_date: String,
    }

    let rows: Vec<DarfRow> = payments
        .iter()
        .map(|payment| DarfRow {
            code: payment.darf_code.clone(),
            description: payment.description.clone(),
            amount: format_currency(payment.amount),
            due_date: payment.due_date.format("%d/%m/%Y").to_string(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    output.push_str(&table.to_string());

    let total: Decimal = payments.iter().map(|payment| payment.amount).sum();
    output.push_str(&format!(
        "\n\n{:<20} {}\n",
        "Total:".bold(),
        format_currency(total).bold()
    ));

    output
}

/// DARF payments as JSON
pub fn format_darf_json(month: TaxMonth, payments: &[DarfPayment]) -> String {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonDarf<'a> {
        month: TaxMonth,
        payments: &'a [DarfPayment],
        total: Decimal,
    }

    serde_json::to_string_pretty(&JsonDarf {
        month,
        payments,
        total: payments.iter().map(|payment| payment.amount).sum(),
    })
    .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Janeiro",
        2 => "Fevereiro",
        3 => "Março",
        4 => "Abril",
        5 => "Maio",
        6 => "Junho",
        7 => "Julho",
        8 => "Agosto",
        9 => "Setembro",
        10 => "Outubro",
        11 => "Novembro",
        12 => "Dezembro",
        _ => "?",
    }
}
