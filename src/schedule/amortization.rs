use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::debug;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::installment::Installment;
use crate::loan::Loan;
use crate::types::{ContractId, InstallmentState, NotAppliedReason, RecalculationMode};

use super::calendar::{add_months, today};
use super::ScheduleOutcome;

/// fixed-installment (french system) schedule engine
///
/// Every operation is a pure function of its arguments and the engine's
/// configuration. Results are freshly built installments, numbered `1..N`,
/// all `Pending`.
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: EngineConfig,
}

impl AmortizationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// full schedule for a new loan, empty when the loan is incomplete
    pub fn generate_schedule(&self, loan: &Loan, time_provider: &SafeTimeProvider) -> Vec<Installment> {
        self.generate_schedule_outcome(loan, time_provider).into_installments()
    }

    pub fn generate_schedule_outcome(
        &self,
        loan: &Loan,
        time_provider: &SafeTimeProvider,
    ) -> ScheduleOutcome {
        let principal = match loan.principal {
            Some(p) if p.is_positive() => self.round(p),
            _ => return ScheduleOutcome::Empty(NotAppliedReason::MissingPrincipal),
        };
        if loan.installment_count == 0 {
            return ScheduleOutcome::Empty(NotAppliedReason::NonPositiveTerm);
        }
        let annual_rate = match loan.annual_rate {
            Some(rate) => rate,
            None => return ScheduleOutcome::Empty(NotAppliedReason::MissingRate),
        };

        let monthly_rate = self.monthly_rate(annual_rate);
        let n = loan.installment_count;
        let payment = calculate_fixed_payment(principal, monthly_rate, n, &self.config);
        let base = loan
            .disbursement_date
            .unwrap_or_else(|| today(time_provider));

        debug!(
            "generating schedule for contract {}: principal {}, rate {}, {} installments, payment {}",
            loan.contract_id, principal, annual_rate, n, payment
        );

        let due_dates: Vec<NaiveDate> = (1..=n).map(|i| add_months(base, i)).collect();
        let rows = self.amortize(principal, monthly_rate, payment, &due_dates);
        ScheduleOutcome::Schedule(self.finalize(rows, loan.contract_id))
    }

    /// apply an extraordinary principal prepayment to the open installments
    pub fn recalculate_for_prepayment(
        &self,
        loan: &Loan,
        current_schedule: &[Installment],
        prepayment_amount: Money,
        mode: RecalculationMode,
    ) -> Vec<Installment> {
        self.recalculate_for_prepayment_outcome(loan, current_schedule, prepayment_amount, mode)
            .into_installments()
    }

    pub fn recalculate_for_prepayment_outcome(
        &self,
        loan: &Loan,
        current_schedule: &[Installment],
        prepayment_amount: Money,
        mode: RecalculationMode,
    ) -> ScheduleOutcome {
        let pending = open_installments(current_schedule);
        if pending.is_empty() {
            return ScheduleOutcome::Empty(NotAppliedReason::NoPendingInstallments);
        }

        let outstanding = self.outstanding_principal(&pending);
        let new_principal = self.round(outstanding - prepayment_amount);
        if !new_principal.is_positive() {
            debug!(
                "prepayment {} settles contract {} (outstanding {})",
                prepayment_amount, loan.contract_id, outstanding
            );
            return ScheduleOutcome::Settled;
        }

        let monthly_rate = self.monthly_rate(loan.rate_or_zero());
        let due_dates: Vec<NaiveDate> = pending.iter().map(|c| c.due_date).collect();

        debug!(
            "recalculating contract {} for prepayment {} ({}): outstanding {} -> {} over {} slots",
            loan.contract_id,
            prepayment_amount,
            mode,
            outstanding,
            new_principal,
            due_dates.len()
        );

        let rows = match mode {
            RecalculationMode::ReducePayment => {
                self.reduce_payment(new_principal, monthly_rate, &due_dates)
            }
            RecalculationMode::ReduceTerm => {
                let reference = pending[0].payment_amount;
                if reference.is_positive() {
                    self.reduce_term(new_principal, monthly_rate, &due_dates, reference)
                } else {
                    self.reduce_payment(new_principal, monthly_rate, &due_dates)
                }
            }
        };

        ScheduleOutcome::Schedule(self.finalize(rows, loan.contract_id))
    }

    /// rebuild the open balance over a new term and/or rate
    pub fn recalculate_for_reschedule(
        &self,
        loan: &Loan,
        current_schedule: &[Installment],
        new_installment_count: u32,
        new_annual_rate: Option<Rate>,
    ) -> Vec<Installment> {
        self.recalculate_for_reschedule_outcome(
            loan,
            current_schedule,
            new_installment_count,
            new_annual_rate,
        )
        .into_installments()
    }

    pub fn recalculate_for_reschedule_outcome(
        &self,
        loan: &Loan,
        current_schedule: &[Installment],
        new_installment_count: u32,
        new_annual_rate: Option<Rate>,
    ) -> ScheduleOutcome {
        let pending = open_installments(current_schedule);
        if pending.is_empty() {
            return ScheduleOutcome::Empty(NotAppliedReason::NoPendingInstallments);
        }
        if new_installment_count == 0 {
            return ScheduleOutcome::Empty(NotAppliedReason::NonPositiveTerm);
        }

        let outstanding = self.outstanding_principal(&pending);
        if !outstanding.is_positive() {
            return ScheduleOutcome::Empty(NotAppliedReason::NonPositiveOutstanding);
        }

        let annual_rate = new_annual_rate.unwrap_or_else(|| loan.rate_or_zero());
        let monthly_rate = self.monthly_rate(annual_rate);
        let n = new_installment_count;
        let payment = calculate_fixed_payment(outstanding, monthly_rate, n, &self.config);

        // first new installment keeps the first open due date
        let anchor = pending[0].due_date;

        debug!(
            "rescheduling contract {}: outstanding {}, rate {}, {} installments from {}, payment {}",
            loan.contract_id, outstanding, annual_rate, n, anchor, payment
        );

        let due_dates: Vec<NaiveDate> = (0..n).map(|i| add_months(anchor, i)).collect();
        let rows = self.amortize(outstanding, monthly_rate, payment, &due_dates);
        ScheduleOutcome::Schedule(self.finalize(rows, loan.contract_id))
    }

    /// period loop shared by every fixed-payment walk
    ///
    /// The last slot, or any slot whose principal would overshoot the
    /// balance, takes the whole remaining balance and pays principal plus
    /// interest, so the schedule ends at exactly zero.
    pub(super) fn amortize(
        &self,
        principal: Money,
        monthly_rate: Decimal,
        payment: Money,
        due_dates: &[NaiveDate],
    ) -> Vec<Installment> {
        let mut rows = Vec::with_capacity(due_dates.len());
        let mut balance = principal;
        let last = due_dates.len().saturating_sub(1);

        for (i, due_date) in due_dates.iter().enumerate() {
            let interest = self.interest_on(balance, monthly_rate);
            let mut principal_portion = self.round(payment - interest);
            let mut payment_amount = payment;

            if i == last || principal_portion > balance {
                principal_portion = balance;
                payment_amount = self.round(principal_portion + interest);
            }

            balance = self.round((balance - principal_portion).max(Money::ZERO));

            rows.push(Installment::pending(
                *due_date,
                principal_portion,
                interest,
                payment_amount,
                balance,
                self.config.period_days,
            ));

            if balance.is_zero() {
                break;
            }
        }

        rows
    }

    /// renumber, stamp the contract and reset state on a produced schedule
    pub(super) fn finalize(&self, rows: Vec<Installment>, contract_id: ContractId) -> Vec<Installment> {
        rows.into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                row.sequence_number = i as u32 + 1;
                row.contract_id = contract_id;
                row.state = InstallmentState::Pending;
                row.insurance_portion = self.round(row.insurance_portion);
                row.fees_portion = self.round(row.fees_portion);
                row.tax_portion = self.round(row.tax_portion);
                row
            })
            .collect()
    }

    pub(super) fn round(&self, amount: Money) -> Money {
        amount.round_with(self.config.currency_scale, self.config.rounding)
    }

    pub(super) fn interest_on(&self, balance: Money, monthly_rate: Decimal) -> Money {
        self.round(Money::from_decimal(balance.as_decimal() * monthly_rate))
    }

    pub(super) fn monthly_rate(&self, annual_rate: Rate) -> Decimal {
        annual_rate.monthly_rate(self.config.rate_scale, self.config.rounding)
    }

    fn outstanding_principal(&self, pending: &[&Installment]) -> Money {
        self.round(pending.iter().map(|c| c.principal_portion).sum())
    }
}

/// installments not yet paid, in schedule order
fn open_installments(schedule: &[Installment]) -> Vec<&Installment> {
    schedule.iter().filter(|c| c.state.is_open()).collect()
}

/// fixed annuity payment: P * r / (1 - (1 + r)^-n), or P / n without interest
pub fn calculate_fixed_payment(
    principal: Money,
    monthly_rate: Decimal,
    periods: u32,
    config: &EngineConfig,
) -> Money {
    let round = |d: Decimal| Money::from_decimal(d).round_with(config.currency_scale, config.rounding);

    if periods == 0 {
        return round(principal.as_decimal());
    }

    if monthly_rate.is_zero() {
        return round(principal.as_decimal() / Decimal::from(periods));
    }

    // (1 + r)^n; past the decimal range the discount factor is zero
    let base = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        match compound.checked_mul(base) {
            Some(next) => compound = next,
            None => return round(principal.as_decimal() * monthly_rate),
        }
    }

    let discount = Decimal::ONE / compound;
    round(principal.as_decimal() * monthly_rate / (Decimal::ONE - discount))
}
