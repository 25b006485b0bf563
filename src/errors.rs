use thiserror::Error;

use crate::types::{ContractId, NotAppliedReason};

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("contract not found: {contract_id}")]
    ContractNotFound {
        contract_id: ContractId,
    },

    #[error("contract already exists: {contract_id}")]
    DuplicateContract {
        contract_id: ContractId,
    },

    #[error("installment {sequence_number} not found in contract {contract_id}")]
    InstallmentNotFound {
        contract_id: ContractId,
        sequence_number: u32,
    },

    #[error("schedule change not applied to contract {contract_id}: {reason}")]
    NotApplied {
        contract_id: ContractId,
        reason: NotAppliedReason,
    },

    #[error("schedule invariant violated: {message}")]
    InvariantViolation {
        message: String,
    },

    #[error("unknown recalculation mode: {value}")]
    InvalidMode {
        value: String,
    },

    #[error("unknown installment state: {value}")]
    InvalidState {
        value: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
