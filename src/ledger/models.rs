use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Asset classes taxed under the variable-income regime
///
/// Anything else found in a ledger (fixed income, treasury bonds, ...)
/// deserializes into `Other` and is carried along but never taxed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Stock,  // Brazilian stocks (ações)
    Fii,    // Real estate investment funds
    Etf,    // Exchange-traded funds
    Crypto, // Crypto-assets
    Other,  // Unrecognized/non-taxable classes
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "stock",
            AssetClass::Fii => "fii",
            AssetClass::Etf => "etf",
            AssetClass::Crypto => "crypto",
            AssetClass::Other => "other",
        }
    }
}

impl FromStr for AssetClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" | "acao" | "ação" => Ok(AssetClass::Stock),
            "fii" | "fund" => Ok(AssetClass::Fii),
            "etf" => Ok(AssetClass::Etf),
            "crypto" | "cripto" => Ok(AssetClass::Crypto),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AssetClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AssetClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(AssetClass::Other))
    }
}

/// Operation kinds found in a ledger
///
/// Deposit/withdraw are the buy/sell synonyms some custodians emit for
/// fund quotas and crypto wallets; dividends never touch cost basis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Buy,
    Sell,
    Deposit,
    Withdraw,
    Dividend,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Buy => "buy",
            OperationKind::Sell => "sell",
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
            OperationKind::Dividend => "dividend",
        }
    }

    /// Adds units to a position (buy or its deposit synonym)
    pub fn is_acquisition(&self) -> bool {
        matches!(self, OperationKind::Buy | OperationKind::Deposit)
    }

    /// Removes units from a position (sell or its withdraw synonym)
    pub fn is_disposal(&self) -> bool {
        matches!(self, OperationKind::Sell | OperationKind::Withdraw)
    }
}

/// A single immutable ledger fact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub holding_id: String,
    pub kind: OperationKind,
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A holding with its (unordered) operation history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    pub asset_class: AssetClass,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Holding {
    /// Operations sorted by date. The sort is stable, so same-day
    /// operations keep their ledger insertion order.
    pub fn sorted_operations(&self) -> Vec<&Operation> {
        let mut ops: Vec<&Operation> = self.operations.iter().collect();
        ops.sort_by_key(|op| op.date);
        ops
    }
}

/// A calendar month in the tax sense (the "competência")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct ParseTaxMonthError(String);

impl TaxMonth {
    /// `month` must be 1-12; construct from parsed/validated input only.
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap()
    }
}

impl fmt::Display for TaxMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for TaxMonth {
    type Err = ParseTaxMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTaxMonthError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(TaxMonth::new(year, month))
    }
}

impl Serialize for TaxMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaxMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
