// Tax engine - cost basis, trade classification, monthly assessment,
// loss carryforward replay and DARF generation

pub mod classifier;
pub mod cost_basis;
pub mod darf;
pub mod loss_carryforward;
pub mod monthly;
pub mod rules;

pub use classifier::{AcquisitionIndex, TradeKind};
pub use darf::{generate_darf_payments, DarfPayment};
pub use loss_carryforward::{replay_loss_state, LossState};
pub use monthly::{calculate_monthly_tax, MonthlyTaxResult};

use crate::ledger::{Holding, TaxMonth};

/// Assess a month from scratch: replay every earlier disposal month to
/// reconstruct the loss state entering it, then assess the month itself.
pub fn assess_month(holdings: &[Holding], month: TaxMonth) -> MonthlyTaxResult {
    let carried = replay_loss_state(holdings, month);
    calculate_monthly_tax(holdings, month, &carried)
}
