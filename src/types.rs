use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ScheduleError;

/// identifier of a loan contract
pub type ContractId = u64;

/// installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InstallmentState {
    /// not yet paid
    #[default]
    Pending,
    /// some payment received, balance still due
    Partial,
    /// fully paid
    Paid,
}

impl InstallmentState {
    /// everything except `Paid` is still open for recalculation
    pub fn is_open(&self) -> bool {
        !matches!(self, InstallmentState::Paid)
    }
}

impl fmt::Display for InstallmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallmentState::Pending => "PENDING",
            InstallmentState::Partial => "PARTIAL",
            InstallmentState::Paid => "PAID",
        };
        f.write_str(s)
    }
}

impl FromStr for InstallmentState {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDIENTE" => Ok(InstallmentState::Pending),
            "PARTIAL" | "PARCIAL" => Ok(InstallmentState::Partial),
            "PAID" | "PAGADA" => Ok(InstallmentState::Paid),
            _ => Err(ScheduleError::InvalidState { value: s.to_string() }),
        }
    }
}

/// how an extraordinary prepayment is absorbed by the pending schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecalculationMode {
    /// keep the number of installments, lower the fixed payment
    ReducePayment,
    /// keep the payment, drop installments from the end
    ReduceTerm,
}

impl fmt::Display for RecalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecalculationMode::ReducePayment => "REDUCE_PAYMENT",
            RecalculationMode::ReduceTerm => "REDUCE_TERM",
        };
        f.write_str(s)
    }
}

impl FromStr for RecalculationMode {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REDUCE_PAYMENT" | "REDUCE_CUOTA" | "REDUCIR_CUOTA" => Ok(RecalculationMode::ReducePayment),
            "REDUCE_TERM" | "REDUCE_PLAZO" | "REDUCIR_PLAZO" => Ok(RecalculationMode::ReduceTerm),
            _ => Err(ScheduleError::InvalidMode { value: s.to_string() }),
        }
    }
}

/// lifecycle status of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContractStatus {
    #[default]
    Active,
    /// every installment paid
    Cancelled,
    /// replaced by a refinancing contract
    Refinanced,
}

impl ContractStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ContractStatus::Active)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContractStatus::Active => "VIGENTE",
            ContractStatus::Cancelled => "CANCELADO",
            ContractStatus::Refinanced => "REFINANCIADO",
        };
        f.write_str(s)
    }
}

/// kind of money movement recorded against an installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    /// full settlement of one installment
    InstallmentPayment,
    /// share of an amount spread over consecutive installments
    PartialPayment,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MovementKind::InstallmentPayment => "PAGO_CUOTA",
            MovementKind::PartialPayment => "PAGO_PARCIAL",
        };
        f.write_str(s)
    }
}

/// kind of change recorded when a schedule is replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Prepayment,
    Reschedule,
    Refinancing,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Prepayment => "AMORTIZACION",
            ChangeKind::Reschedule => "REPROGRAMACION_PLAZO",
            ChangeKind::Refinancing => "REFINANCIACION",
        };
        f.write_str(s)
    }
}

/// why an operation produced no schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotAppliedReason {
    MissingPrincipal,
    MissingRate,
    NonPositiveTerm,
    NoPendingInstallments,
    NonPositiveOutstanding,
    NonPositivePrepayment,
    /// prepayment covers the whole outstanding principal
    LoanSettled,
    NegativeRate,
    NonPositivePayment,
    InstallmentAlreadyPaid,
    /// contract is cancelled or refinanced
    ContractClosed,
    /// refinanced amount does not cover the outstanding principal
    BelowOutstanding,
}

impl fmt::Display for NotAppliedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotAppliedReason::MissingPrincipal => "principal is missing or not positive",
            NotAppliedReason::MissingRate => "annual rate is missing",
            NotAppliedReason::NonPositiveTerm => "installment count must be positive",
            NotAppliedReason::NoPendingInstallments => "no pending installments",
            NotAppliedReason::NonPositiveOutstanding => "outstanding principal is not positive",
            NotAppliedReason::NonPositivePrepayment => "prepayment amount must be positive",
            NotAppliedReason::LoanSettled => "prepayment settles the loan",
            NotAppliedReason::NegativeRate => "annual rate cannot be negative",
            NotAppliedReason::NonPositivePayment => "payment amount must be positive",
            NotAppliedReason::InstallmentAlreadyPaid => "installment is already paid",
            NotAppliedReason::ContractClosed => "contract is no longer active",
            NotAppliedReason::BelowOutstanding => "new amount is below the outstanding principal",
        };
        f.write_str(s)
    }
}
