use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{ContractId, MovementKind};

/// money received against one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMovement {
    pub id: Uuid,
    pub contract_id: ContractId,
    pub sequence_number: u32,
    pub recorded_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub amount: Money,
    pub recorded_by: String,
}

impl PaymentMovement {
    pub fn new(
        contract_id: ContractId,
        sequence_number: u32,
        recorded_at: DateTime<Utc>,
        kind: MovementKind,
        amount: Money,
        recorded_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            sequence_number,
            recorded_at,
            kind,
            amount,
            recorded_by: recorded_by.into(),
        }
    }
}

/// amount already received for one installment
pub fn paid_towards(movements: &[PaymentMovement], sequence_number: u32) -> Money {
    movements
        .iter()
        .filter(|m| m.sequence_number == sequence_number)
        .map(|m| m.amount)
        .sum()
}
