use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{info, warn};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::history::ScheduleChange;
use crate::installment::Installment;
use crate::loan::Loan;
use crate::movement::{paid_towards, PaymentMovement};
use crate::repository::ScheduleRepository;
use crate::schedule::{AmortizationEngine, ScheduleOutcome};
use crate::types::{
    ChangeKind, ContractId, ContractStatus, InstallmentState, MovementKind, NotAppliedReason,
    RecalculationMode,
};

/// runs engine operations against stored contracts
///
/// A recalculation archives the current schedule before the replacement is
/// written; a failure at either step leaves later steps undone.
pub struct ScheduleService<R: ScheduleRepository> {
    repository: R,
    engine: AmortizationEngine,
    time_provider: SafeTimeProvider,
    user: String,
}

impl<R: ScheduleRepository> ScheduleService<R> {
    pub fn new(
        repository: R,
        engine: AmortizationEngine,
        time_provider: SafeTimeProvider,
        user: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            engine,
            time_provider,
            user: user.into(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// build and store the initial schedule of a contract
    pub fn originate(&mut self, contract_id: ContractId) -> Result<Vec<Installment>> {
        let loan = self.repository.loan(contract_id)?;
        let outcome = self.engine.generate_schedule_outcome(&loan, &self.time_provider);
        let schedule = self.applied(contract_id, outcome)?;

        self.repository.replace_schedule(contract_id, schedule.clone())?;
        info!(
            "stored schedule of {} installments for contract {}",
            schedule.len(),
            contract_id
        );
        Ok(schedule)
    }

    /// apply an extraordinary principal prepayment
    pub fn apply_prepayment(
        &mut self,
        contract_id: ContractId,
        amount: Money,
        mode: RecalculationMode,
    ) -> Result<Vec<Installment>> {
        if !amount.is_positive() {
            return Err(self.not_applied(contract_id, NotAppliedReason::NonPositivePrepayment));
        }

        let loan = self.active_loan(contract_id)?;
        let current = self.repository.schedule(contract_id)?;
        let outcome = self
            .engine
            .recalculate_for_prepayment_outcome(&loan, &current, amount, mode);
        let schedule = self.applied(contract_id, outcome)?;

        let description = format!("Extraordinary principal prepayment of {} ({})", amount, mode);
        self.replace(contract_id, ChangeKind::Prepayment, description, current, schedule)
    }

    /// rebuild the open balance with a new term and optionally a new rate
    pub fn reschedule(
        &mut self,
        contract_id: ContractId,
        installment_count: u32,
        annual_rate: Option<Rate>,
    ) -> Result<Vec<Installment>> {
        if annual_rate.map_or(false, |rate| rate.is_negative()) {
            return Err(self.not_applied(contract_id, NotAppliedReason::NegativeRate));
        }

        let loan = self.active_loan(contract_id)?;
        let current = self.repository.schedule(contract_id)?;
        let outcome = self.engine.recalculate_for_reschedule_outcome(
            &loan,
            &current,
            installment_count,
            annual_rate,
        );
        let schedule = self.applied(contract_id, outcome)?;

        let rate = annual_rate.unwrap_or_else(|| loan.rate_or_zero());
        let description = format!(
            "Reschedule: installments = {}, annual rate = {}",
            installment_count, rate
        );
        let schedule = self.replace(contract_id, ChangeKind::Reschedule, description, current, schedule)?;
        self.repository
            .update_terms(contract_id, installment_count, annual_rate)?;
        Ok(schedule)
    }

    /// settle one installment in full
    ///
    /// The movement covers whatever earlier partial payments left due.
    pub fn record_payment(&mut self, contract_id: ContractId, sequence_number: u32) -> Result<PaymentMovement> {
        self.active_loan(contract_id)?;
        let schedule = self.repository.schedule(contract_id)?;
        let installment = find_installment(&schedule, contract_id, sequence_number)?;
        if installment.is_paid() {
            return Err(self.not_applied(contract_id, NotAppliedReason::InstallmentAlreadyPaid));
        }

        let movements = self.repository.movements(contract_id)?;
        let due = installment.payment_amount - paid_towards(&movements, sequence_number);
        let movement = self.movement(contract_id, sequence_number, MovementKind::InstallmentPayment, due);
        self.repository.record_movement(movement.clone())?;
        self.repository
            .set_installment_state(contract_id, sequence_number, InstallmentState::Paid)?;
        info!(
            "contract {}: installment {} paid with {}",
            contract_id, sequence_number, movement.amount
        );

        self.close_if_settled(contract_id)?;
        Ok(movement)
    }

    /// spread an amount over open installments from `starting_sequence` on
    ///
    /// Each installment is completed in order; the last one reached may be
    /// left partial. Any excess beyond the final installment is not applied.
    pub fn record_partial_payment(
        &mut self,
        contract_id: ContractId,
        starting_sequence: u32,
        amount: Money,
    ) -> Result<Vec<PaymentMovement>> {
        if !amount.is_positive() {
            return Err(self.not_applied(contract_id, NotAppliedReason::NonPositivePayment));
        }

        self.active_loan(contract_id)?;
        let schedule = self.repository.schedule(contract_id)?;
        let last = match schedule.last() {
            Some(row) => row.sequence_number,
            None => return Err(self.not_applied(contract_id, NotAppliedReason::NoPendingInstallments)),
        };
        let start = starting_sequence.clamp(1, last);
        if find_installment(&schedule, contract_id, start)?.is_paid() {
            return Err(self.not_applied(contract_id, NotAppliedReason::InstallmentAlreadyPaid));
        }

        let config = self.engine.config();
        let mut remaining = amount.round_with(config.currency_scale, config.rounding);
        let movements = self.repository.movements(contract_id)?;
        let mut applied = Vec::new();

        for row in schedule.iter().filter(|c| c.sequence_number >= start) {
            if !remaining.is_positive() {
                break;
            }
            let paid = paid_towards(&movements, row.sequence_number);
            if row.is_paid() || paid >= row.payment_amount {
                continue;
            }

            let due = row.payment_amount - paid;
            let (portion, state) = if remaining >= due {
                (due, InstallmentState::Paid)
            } else {
                (remaining, InstallmentState::Partial)
            };
            let movement = self.movement(contract_id, row.sequence_number, MovementKind::PartialPayment, portion);
            self.repository.record_movement(movement.clone())?;
            self.repository
                .set_installment_state(contract_id, row.sequence_number, state)?;
            remaining -= portion;
            applied.push(movement);
        }

        info!(
            "contract {}: partial payment of {} spread over {} installments",
            contract_id,
            amount,
            applied.len()
        );
        if remaining.is_positive() {
            warn!("contract {}: {} left unapplied, no open installments remain", contract_id, remaining);
        }

        self.close_if_settled(contract_id)?;
        Ok(applied)
    }

    /// open a new contract for the outstanding principal and close this one
    ///
    /// The new amount must cover the principal still open. The old schedule
    /// is archived and kept, and the old contract is marked refinanced.
    pub fn refinance(
        &mut self,
        contract_id: ContractId,
        amount: Money,
        installment_count: u32,
        annual_rate: Rate,
        disbursement_date: Option<NaiveDate>,
    ) -> Result<Loan> {
        if annual_rate.is_negative() {
            return Err(self.not_applied(contract_id, NotAppliedReason::NegativeRate));
        }

        self.active_loan(contract_id)?;
        let current = self.repository.schedule(contract_id)?;
        let outstanding: Money = current
            .iter()
            .filter(|c| c.state.is_open())
            .map(|c| c.principal_portion)
            .sum();
        if !outstanding.is_positive() {
            return Err(self.not_applied(contract_id, NotAppliedReason::NonPositiveOutstanding));
        }

        let config = self.engine.config();
        let amount = amount.round_with(config.currency_scale, config.rounding);
        if amount < outstanding {
            return Err(self.not_applied(contract_id, NotAppliedReason::BelowOutstanding));
        }

        let new_id = self.repository.next_contract_id()?;
        let date = disbursement_date.unwrap_or_else(|| self.time_provider.now().date_naive());
        let refinanced = Loan::new(new_id, amount, annual_rate, installment_count, date);
        let outcome = self.engine.generate_schedule_outcome(&refinanced, &self.time_provider);
        let schedule = self.applied(contract_id, outcome)?;

        self.repository.create_loan(refinanced.clone())?;
        self.repository.replace_schedule(new_id, schedule)?;

        let description = format!("Refinancing into contract {} for {}", new_id, amount);
        self.archive(contract_id, ChangeKind::Refinancing, description, current)?;
        self.repository.set_status(contract_id, ContractStatus::Refinanced)?;
        Ok(refinanced)
    }

    pub fn history(&self, contract_id: ContractId) -> Result<Vec<ScheduleChange>> {
        self.repository.history(contract_id)
    }

    pub fn movements(&self, contract_id: ContractId) -> Result<Vec<PaymentMovement>> {
        self.repository.movements(contract_id)
    }

    fn replace(
        &mut self,
        contract_id: ContractId,
        kind: ChangeKind,
        description: String,
        current: Vec<Installment>,
        schedule: Vec<Installment>,
    ) -> Result<Vec<Installment>> {
        self.archive(contract_id, kind, description, current)?;
        self.repository.replace_schedule(contract_id, schedule.clone())?;
        Ok(schedule)
    }

    fn archive(
        &mut self,
        contract_id: ContractId,
        kind: ChangeKind,
        description: String,
        current: Vec<Installment>,
    ) -> Result<()> {
        let change = ScheduleChange::new(
            contract_id,
            self.time_provider.now(),
            kind,
            description,
            self.user.clone(),
            current,
        );
        info!("contract {}: {} - {}", contract_id, kind, change.description);
        self.repository.archive(change)
    }

    fn active_loan(&self, contract_id: ContractId) -> Result<Loan> {
        let loan = self.repository.loan(contract_id)?;
        if !loan.status.is_active() {
            return Err(self.not_applied(contract_id, NotAppliedReason::ContractClosed));
        }
        Ok(loan)
    }

    /// mark the contract cancelled once nothing is left open
    fn close_if_settled(&mut self, contract_id: ContractId) -> Result<()> {
        let schedule = self.repository.schedule(contract_id)?;
        if !schedule.is_empty() && schedule.iter().all(|c| c.is_paid()) {
            self.repository.set_status(contract_id, ContractStatus::Cancelled)?;
            info!("contract {}: all installments paid, contract cancelled", contract_id);
        }
        Ok(())
    }

    fn movement(
        &self,
        contract_id: ContractId,
        sequence_number: u32,
        kind: MovementKind,
        amount: Money,
    ) -> PaymentMovement {
        PaymentMovement::new(
            contract_id,
            sequence_number,
            self.time_provider.now(),
            kind,
            amount,
            self.user.clone(),
        )
    }

    fn applied(&self, contract_id: ContractId, outcome: ScheduleOutcome) -> Result<Vec<Installment>> {
        match outcome.not_applied_reason() {
            Some(reason) => Err(self.not_applied(contract_id, reason)),
            None => Ok(outcome.into_installments()),
        }
    }

    fn not_applied(&self, contract_id: ContractId, reason: NotAppliedReason) -> ScheduleError {
        warn!("contract {}: schedule change not applied, {}", contract_id, reason);
        ScheduleError::NotApplied { contract_id, reason }
    }
}

fn find_installment(
    schedule: &[Installment],
    contract_id: ContractId,
    sequence_number: u32,
) -> Result<&Installment> {
    schedule
        .iter()
        .find(|c| c.sequence_number == sequence_number)
        .ok_or(ScheduleError::InstallmentNotFound {
            contract_id,
            sequence_number,
        })
}
