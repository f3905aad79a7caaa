use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::monthly::calculate_monthly_tax;
use super::rules;
use crate::ledger::{AssetClass, Holding, TaxMonth};

/// Accumulated compensable losses per asset class at a month boundary
///
/// Values are signed and never positive: `-1000` means R$ 1.000 of loss
/// still available to offset future gains of the same class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LossState {
    by_class: BTreeMap<AssetClass, Decimal>,
}

impl LossState {
    /// Fresh state with every taxable class at zero.
    pub fn new() -> Self {
        Self {
            by_class: rules::taxable_classes()
                .map(|class| (class, Decimal::ZERO))
                .collect(),
        }
    }

    /// Compensable loss carried for a class (zero when untracked).
    pub fn carried(&self, asset_class: AssetClass) -> Decimal {
        self.by_class
            .get(&asset_class)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, asset_class: AssetClass, carried: Decimal) {
        self.by_class.insert(asset_class, carried);
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, Decimal)> + '_ {
        self.by_class.iter().map(|(class, value)| (*class, *value))
    }

    /// True when no class carries any loss.
    pub fn is_clear(&self) -> bool {
        self.by_class.values().all(|value| value.is_zero())
    }
}

impl Default for LossState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of offsetting one taxable net against a carried loss
#[derive(Debug, Clone, Copy)]
pub struct LossOffset {
    /// Net after compensation (unchanged when nothing applied)
    pub taxable: Decimal,
    /// Loss magnitude consumed, always non-negative
    pub used: Decimal,
    /// Carried loss left over, still signed (zero or negative)
    pub remaining: Decimal,
}

/// Offset a positive taxable net against a carried (negative) loss.
///
/// Nothing happens when the net is zero/negative or no loss is carried;
/// otherwise the smaller of the two magnitudes is consumed.
pub fn offset_against_carryforward(carried: Decimal, taxable_net: Decimal) -> LossOffset {
    if taxable_net <= Decimal::ZERO || carried >= Decimal::ZERO {
        return LossOffset {
            taxable: taxable_net,
            used: Decimal::ZERO,
            remaining: carried,
        };
    }

    let used = taxable_net.min(carried.abs());
    LossOffset {
        taxable: taxable_net - used,
        used,
        remaining: carried + used,
    }
}

/// Reconstruct the loss state entering `target` by replaying every month
/// with a disposal strictly before it, oldest first, from a zero state.
///
/// This is what makes the engine stateless: the carryforward ledger is
/// never stored, it is a pure function of the operation history.
pub fn replay_loss_state(holdings: &[Holding], target: TaxMonth) -> LossState {
    let months: BTreeSet<TaxMonth> = holdings
        .iter()
        .flat_map(|holding| &holding.operations)
        .filter(|op| op.kind.is_disposal())
        .map(|op| TaxMonth::from_date(op.date))
        .filter(|month| *month < target)
        .collect();

    debug!(target_month = %target, months = months.len(), "replaying loss state");

    months.into_iter().fold(LossState::new(), |state, month| {
        calculate_monthly_tax(holdings, month, &state).loss_state
    })
}
