//! Stock movements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coreflow_core::{DomainError, DomainResult, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Receipt,
    Issue,
    Adjustment,
    TransferIn,
    TransferOut,
}

/// A recorded change to an item's stock level.
///
/// `quantity` is stored unsigned for everything except adjustments, which
/// carry their own sign. [`signed_quantity`](Self::signed_quantity) gives the
/// effective stock delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: EntityId,
    pub item_id: EntityId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordMovement {
    pub item_id: EntityId,
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub reference: Option<String>,
}

impl StockMovement {
    pub fn record(input: RecordMovement) -> DomainResult<Self> {
        match input.kind {
            MovementKind::Adjustment => {
                if input.quantity == 0 {
                    return Err(DomainError::validation("adjustment quantity must not be zero"));
                }
            }
            _ => {
                if input.quantity <= 0 {
                    return Err(DomainError::validation("movement quantity must be positive"));
                }
            }
        }

        Ok(Self {
            id: EntityId::new(),
            item_id: input.item_id,
            kind: input.kind,
            quantity: input.quantity,
            reference: input.reference,
            occurred_at: Utc::now(),
        })
    }

    /// The effective stock delta: inbound kinds add, outbound kinds subtract,
    /// adjustments apply as-is.
    pub fn signed_quantity(&self) -> i64 {
        match self.kind {
            MovementKind::Receipt | MovementKind::TransferIn => self.quantity,
            MovementKind::Issue | MovementKind::TransferOut => -self.quantity,
            MovementKind::Adjustment => self.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(kind: MovementKind, quantity: i64) -> DomainResult<StockMovement> {
        StockMovement::record(RecordMovement {
            item_id: EntityId::new(),
            kind,
            quantity,
            reference: None,
        })
    }

    #[test]
    fn inbound_kinds_add_and_outbound_kinds_subtract() {
        assert_eq!(movement(MovementKind::Receipt, 7).unwrap().signed_quantity(), 7);
        assert_eq!(movement(MovementKind::TransferIn, 7).unwrap().signed_quantity(), 7);
        assert_eq!(movement(MovementKind::Issue, 7).unwrap().signed_quantity(), -7);
        assert_eq!(movement(MovementKind::TransferOut, 7).unwrap().signed_quantity(), -7);
    }

    #[test]
    fn adjustments_keep_their_sign() {
        assert_eq!(movement(MovementKind::Adjustment, -3).unwrap().signed_quantity(), -3);
        assert_eq!(movement(MovementKind::Adjustment, 3).unwrap().signed_quantity(), 3);
    }

    #[test]
    fn zero_or_negative_quantities_are_rejected_for_directional_kinds() {
        assert!(movement(MovementKind::Receipt, 0).is_err());
        assert!(movement(MovementKind::Issue, -2).is_err());
        assert!(movement(MovementKind::Adjustment, 0).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            /// Receipt followed by an issue of the same quantity is stock-neutral.
            #[test]
            fn receipt_then_issue_cancels_out(quantity in 1i64..1_000_000) {
                let receipt = movement(MovementKind::Receipt, quantity).unwrap();
                let issue = movement(MovementKind::Issue, quantity).unwrap();
                prop_assert_eq!(receipt.signed_quantity() + issue.signed_quantity(), 0);
            }

            /// Directional movements always carry a nonzero delta of the
            /// matching sign.
            #[test]
            fn direction_determines_sign(quantity in 1i64..1_000_000) {
                for kind in [MovementKind::Receipt, MovementKind::TransferIn] {
                    prop_assert!(movement(kind, quantity).unwrap().signed_quantity() > 0);
                }
                for kind in [MovementKind::Issue, MovementKind::TransferOut] {
                    prop_assert!(movement(kind, quantity).unwrap().signed_quantity() < 0);
                }
            }
        }
    }
}
