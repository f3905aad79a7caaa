//! Static tax rules per asset class
//!
//! Rates, exemption thresholds, withholding rates and DARF codes for the
//! Brazilian variable-income regime. The table never changes during a
//! computation run; new asset classes are added here, never as branches
//! inside the calculator.

use std::collections::BTreeMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::ledger::AssetClass;

/// Which sale volume the monthly exemption threshold compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemptionBasis {
    /// Swing-trade sale volume alone (stocks: day-trade sales don't count
    /// toward the R$ 20.000 threshold)
    SwingVolume,
    /// Swing and day-trade sale volume combined (crypto: IN RFB 1888
    /// counts every disposal toward the R$ 35.000 threshold)
    TotalVolume,
}

/// Tax parameters for one asset class
#[derive(Debug, Clone)]
pub struct AssetTaxRule {
    pub asset_class: AssetClass,
    pub swing_rate: Decimal,
    pub day_rate: Decimal,
    /// Monthly sale-volume threshold below which swing gains are untaxed;
    /// zero means the class has no exemption
    pub exemption_limit: Decimal,
    pub exemption_basis: ExemptionBasis,
    /// IRRF fraction withheld at source on swing sale volume
    pub swing_withholding_rate: Decimal,
    /// IRRF fraction withheld at source on day-trade sale volume
    pub day_withholding_rate: Decimal,
    /// Revenue service payment code for this class's tax
    pub darf_code: &'static str,
    /// Official description printed on the payment slip
    pub darf_description: &'static str,
    pub label: &'static str,
}

impl AssetTaxRule {
    /// Sale volume the exemption threshold is compared against.
    pub fn exemption_volume(&self, swing_volume: Decimal, day_volume: Decimal) -> Decimal {
        match self.exemption_basis {
            ExemptionBasis::SwingVolume => swing_volume,
            ExemptionBasis::TotalVolume => swing_volume + day_volume,
        }
    }

    /// Exemption applies when the basis volume is strictly below the limit.
    pub fn exempts(&self, swing_volume: Decimal, day_volume: Decimal) -> bool {
        !self.exemption_limit.is_zero()
            && self.exemption_volume(swing_volume, day_volume) < self.exemption_limit
    }
}

fn rate(s: &str) -> Decimal {
    Decimal::from_str(s).expect("static tax rate")
}

static RULES: Lazy<BTreeMap<AssetClass, AssetTaxRule>> = Lazy::new(|| {
    [
        AssetTaxRule {
            asset_class: AssetClass::Stock,
            swing_rate: rate("0.15"),
            day_rate: rate("0.20"),
            exemption_limit: Decimal::from(20_000),
            exemption_basis: ExemptionBasis::SwingVolume,
            swing_withholding_rate: rate("0.00005"),
            day_withholding_rate: rate("0.01"),
            darf_code: "6015",
            darf_description: "Ganhos líquidos em operações em bolsa",
            label: "Ações",
        },
        AssetTaxRule {
            asset_class: AssetClass::Fii,
            swing_rate: rate("0.20"),
            day_rate: rate("0.20"),
            exemption_limit: Decimal::ZERO,
            exemption_basis: ExemptionBasis::SwingVolume,
            swing_withholding_rate: rate("0.00005"),
            day_withholding_rate: rate("0.01"),
            darf_code: "6015",
            darf_description: "Ganhos líquidos em operações em bolsa",
            label: "FIIs",
        },
        AssetTaxRule {
            asset_class: AssetClass::Etf,
            swing_rate: rate("0.15"),
            day_rate: rate("0.20"),
            exemption_limit: Decimal::ZERO,
            exemption_basis: ExemptionBasis::SwingVolume,
            swing_withholding_rate: rate("0.00005"),
            day_withholding_rate: rate("0.01"),
            darf_code: "6015",
            darf_description: "Ganhos líquidos em operações em bolsa",
            label: "ETFs",
        },
        AssetTaxRule {
            asset_class: AssetClass::Crypto,
            swing_rate: rate("0.15"),
            day_rate: rate("0.15"),
            exemption_limit: Decimal::from(35_000),
            exemption_basis: ExemptionBasis::TotalVolume,
            swing_withholding_rate: Decimal::ZERO,
            day_withholding_rate: Decimal::ZERO,
            darf_code: "4600",
            darf_description: "Ganho de capital na alienação de criptoativos",
            label: "Criptoativos",
        },
    ]
    .into_iter()
    .map(|rule| (rule.asset_class, rule))
    .collect()
});

/// Rule for an asset class; `None` marks the class as untaxed here.
pub fn rule_for(asset_class: AssetClass) -> Option<&'static AssetTaxRule> {
    RULES.get(&asset_class)
}

/// Taxable asset classes, in class order.
pub fn taxable_classes() -> impl Iterator<Item = AssetClass> {
    RULES.keys().copied()
}
