use std::collections::HashMap;

use crate::decimal::Rate;
use crate::errors::{Result, ScheduleError};
use crate::history::{ScheduleChange, ScheduleHistory};
use crate::installment::Installment;
use crate::loan::Loan;
use crate::movement::PaymentMovement;
use crate::types::{ContractId, ContractStatus, InstallmentState};

/// storage for loans, their current schedules and the change history
pub trait ScheduleRepository {
    fn loan(&self, contract_id: ContractId) -> Result<Loan>;

    /// identifier the next created contract should take
    fn next_contract_id(&self) -> Result<ContractId>;

    /// store a new contract with an empty schedule
    fn create_loan(&mut self, loan: Loan) -> Result<()>;

    fn set_status(&mut self, contract_id: ContractId, status: ContractStatus) -> Result<()>;

    /// stored schedule in sequence order
    fn schedule(&self, contract_id: ContractId) -> Result<Vec<Installment>>;

    /// replace the whole stored schedule of a contract
    fn replace_schedule(&mut self, contract_id: ContractId, installments: Vec<Installment>) -> Result<()>;

    /// persist new loan terms after a reschedule
    fn update_terms(
        &mut self,
        contract_id: ContractId,
        installment_count: u32,
        annual_rate: Option<Rate>,
    ) -> Result<()>;

    fn set_installment_state(
        &mut self,
        contract_id: ContractId,
        sequence_number: u32,
        state: InstallmentState,
    ) -> Result<()>;

    fn record_movement(&mut self, movement: PaymentMovement) -> Result<()>;

    /// payment movements of a contract, oldest first
    fn movements(&self, contract_id: ContractId) -> Result<Vec<PaymentMovement>>;

    fn archive(&mut self, change: ScheduleChange) -> Result<()>;

    fn history(&self, contract_id: ContractId) -> Result<Vec<ScheduleChange>>;
}

/// map-backed repository, for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct InMemoryScheduleRepository {
    loans: HashMap<ContractId, Loan>,
    schedules: HashMap<ContractId, Vec<Installment>>,
    history: ScheduleHistory,
    movements: Vec<PaymentMovement>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a loan with an empty schedule, replacing any previous one
    pub fn insert_loan(&mut self, loan: Loan) {
        self.schedules.insert(loan.contract_id, Vec::new());
        self.loans.insert(loan.contract_id, loan);
    }

    fn ensure_known(&self, contract_id: ContractId) -> Result<()> {
        if self.loans.contains_key(&contract_id) {
            Ok(())
        } else {
            Err(ScheduleError::ContractNotFound { contract_id })
        }
    }
}

impl ScheduleRepository for InMemoryScheduleRepository {
    fn loan(&self, contract_id: ContractId) -> Result<Loan> {
        self.loans
            .get(&contract_id)
            .cloned()
            .ok_or(ScheduleError::ContractNotFound { contract_id })
    }

    fn next_contract_id(&self) -> Result<ContractId> {
        Ok(self.loans.keys().max().map_or(1, |id| id + 1))
    }

    fn create_loan(&mut self, loan: Loan) -> Result<()> {
        if self.loans.contains_key(&loan.contract_id) {
            return Err(ScheduleError::DuplicateContract {
                contract_id: loan.contract_id,
            });
        }
        self.insert_loan(loan);
        Ok(())
    }

    fn set_status(&mut self, contract_id: ContractId, status: ContractStatus) -> Result<()> {
        let loan = self
            .loans
            .get_mut(&contract_id)
            .ok_or(ScheduleError::ContractNotFound { contract_id })?;
        loan.status = status;
        Ok(())
    }

    fn schedule(&self, contract_id: ContractId) -> Result<Vec<Installment>> {
        self.ensure_known(contract_id)?;
        let mut installments = self.schedules.get(&contract_id).cloned().unwrap_or_default();
        installments.sort_by_key(|c| c.sequence_number);
        Ok(installments)
    }

    fn replace_schedule(&mut self, contract_id: ContractId, installments: Vec<Installment>) -> Result<()> {
        self.ensure_known(contract_id)?;
        self.schedules.insert(contract_id, installments);
        Ok(())
    }

    fn update_terms(
        &mut self,
        contract_id: ContractId,
        installment_count: u32,
        annual_rate: Option<Rate>,
    ) -> Result<()> {
        let loan = self
            .loans
            .get_mut(&contract_id)
            .ok_or(ScheduleError::ContractNotFound { contract_id })?;
        loan.installment_count = installment_count;
        if annual_rate.is_some() {
            loan.annual_rate = annual_rate;
        }
        Ok(())
    }

    fn set_installment_state(
        &mut self,
        contract_id: ContractId,
        sequence_number: u32,
        state: InstallmentState,
    ) -> Result<()> {
        self.ensure_known(contract_id)?;
        let installment = self
            .schedules
            .get_mut(&contract_id)
            .and_then(|rows| rows.iter_mut().find(|c| c.sequence_number == sequence_number))
            .ok_or(ScheduleError::InstallmentNotFound {
                contract_id,
                sequence_number,
            })?;
        installment.state = state;
        Ok(())
    }

    fn record_movement(&mut self, movement: PaymentMovement) -> Result<()> {
        self.ensure_known(movement.contract_id)?;
        self.movements.push(movement);
        Ok(())
    }

    fn movements(&self, contract_id: ContractId) -> Result<Vec<PaymentMovement>> {
        self.ensure_known(contract_id)?;
        Ok(self
            .movements
            .iter()
            .filter(|m| m.contract_id == contract_id)
            .cloned()
            .collect())
    }

    fn archive(&mut self, change: ScheduleChange) -> Result<()> {
        self.ensure_known(change.contract_id)?;
        self.history.record(change);
        Ok(())
    }

    fn history(&self, contract_id: ContractId) -> Result<Vec<ScheduleChange>> {
        self.ensure_known(contract_id)?;
        Ok(self.history.for_contract(contract_id))
    }
}
