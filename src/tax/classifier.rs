use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::ledger::Holding;

/// Regime a disposal is taxed under
///
/// Day trades (a sale with an acquisition of the same holding on the same
/// calendar date) carry their own rate, forfeit the stock exemption and
/// offset losses in a separate bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeKind {
    Swing,
    DayTrade,
}

impl TradeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeKind::Swing => "swing",
            TradeKind::DayTrade => "day-trade",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeKind::Swing => "Swing",
            TradeKind::DayTrade => "Day Trade",
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TradeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Acquisition dates per holding, prebuilt so classifying a disposal is a
/// set lookup instead of a history scan.
#[derive(Debug, Default)]
pub struct AcquisitionIndex {
    days_by_holding: HashMap<String, HashSet<NaiveDate>>,
}

impl AcquisitionIndex {
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let mut days_by_holding: HashMap<String, HashSet<NaiveDate>> = HashMap::new();

        for holding in holdings {
            for op in &holding.operations {
                if op.kind.is_acquisition() {
                    days_by_holding
                        .entry(holding.id.clone())
                        .or_default()
                        .insert(op.date);
                }
            }
        }

        Self { days_by_holding }
    }

    /// Classify a disposal of `holding_id` executed on `date`.
    pub fn classify(&self, holding_id: &str, date: NaiveDate) -> TradeKind {
        let same_day_acquisition = self
            .days_by_holding
            .get(holding_id)
            .is_some_and(|days| days.contains(&date));

        if same_day_acquisition {
            TradeKind::DayTrade
        } else {
            TradeKind::Swing
        }
    }
}
