use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::ledger::{Operation, OperationKind};

/// Running position for one holding: open quantity and its total cost,
/// fees included. Replaying the operation history through `apply` yields
/// the weighted-average price in effect at every disposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub quantity: Decimal,
    pub cost: Decimal,
}

/// One step of the position replay
#[derive(Debug, Clone, Copy)]
pub struct PositionStep {
    pub next: Position,
    /// Average price in effect for this operation, set on disposals only
    pub average_price: Option<Decimal>,
}

impl Position {
    /// Weighted-average acquisition price of the open position.
    pub fn average_price(&self) -> Decimal {
        if self.quantity > Decimal::ZERO {
            self.cost / self.quantity
        } else {
            Decimal::ZERO
        }
    }

    /// Apply one operation to the position.
    ///
    /// Acquisitions fold `quantity * unit_price + fees` into the running
    /// cost. Disposals consume quantity at the current average; when the
    /// position empties (or oversells), both fields reset to exactly zero
    /// so division residue never leaks into the next acquisition cycle.
    pub fn apply(self, op: &Operation) -> PositionStep {
        match op.kind {
            OperationKind::Buy | OperationKind::Deposit => {
                let next = Position {
                    quantity: self.quantity + op.quantity,
                    cost: self.cost + op.quantity * op.unit_price + op.fees,
                };
                PositionStep {
                    next,
                    average_price: None,
                }
            }
            OperationKind::Sell | OperationKind::Withdraw => {
                let average_price = self.average_price();
                let remaining = self.quantity - op.quantity;
                let next = if remaining <= Decimal::ZERO {
                    Position::default()
                } else {
                    Position {
                        quantity: remaining,
                        cost: self.cost - average_price * op.quantity,
                    }
                };
                PositionStep {
                    next,
                    average_price: Some(average_price),
                }
            }
            OperationKind::Dividend => PositionStep {
                next: self,
                average_price: None,
            },
        }
    }
}

/// Replay a holding's full history (must already be date-sorted) and
/// record the average price in effect for each disposal, keyed by
/// operation id.
pub fn disposal_average_prices(operations: &[&Operation]) -> HashMap<String, Decimal> {
    let mut averages = HashMap::new();
    let mut position = Position::default();

    for op in operations {
        let step = position.apply(op);
        if let Some(average_price) = step.average_price {
            averages.insert(op.id.clone(), average_price);
        }
        position = step.next;
    }

    averages
}
