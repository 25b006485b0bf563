use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};
use crate::installment::Installment;

/// totals of a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub installment_count: u32,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub first_due_date: Option<NaiveDate>,
    pub last_due_date: Option<NaiveDate>,
}

impl ScheduleSummary {
    pub fn from_installments(installments: &[Installment]) -> Self {
        Self {
            installment_count: installments.len() as u32,
            total_principal: installments.iter().map(|c| c.principal_portion).sum(),
            total_interest: installments.iter().map(|c| c.interest_portion).sum(),
            total_payment: installments.iter().map(|c| c.payment_amount).sum(),
            first_due_date: installments.first().map(|c| c.due_date),
            last_due_date: installments.last().map(|c| c.due_date),
        }
    }
}

fn violation(message: String) -> ScheduleError {
    ScheduleError::InvariantViolation { message }
}

/// verify the guarantees every produced schedule carries
///
/// Balances never increase and end at zero, principal portions add up to
/// `expected_principal` exactly, numbering is `1..N` with ascending due
/// dates, and no currency field is negative.
pub fn check_invariants(schedule: &[Installment], expected_principal: Money) -> Result<()> {
    let last = match schedule.last() {
        Some(last) => last,
        None => return Err(violation("schedule is empty".to_string())),
    };

    for (i, row) in schedule.iter().enumerate() {
        let expected_number = i as u32 + 1;
        if row.sequence_number != expected_number {
            return Err(violation(format!(
                "installment at position {} is numbered {}",
                expected_number, row.sequence_number
            )));
        }

        let fields = [
            ("principal", row.principal_portion),
            ("interest", row.interest_portion),
            ("insurance", row.insurance_portion),
            ("fees", row.fees_portion),
            ("tax", row.tax_portion),
            ("payment", row.payment_amount),
            ("balance", row.remaining_balance),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| v.is_negative()) {
            return Err(violation(format!(
                "installment {} has negative {} {}",
                row.sequence_number, name, value
            )));
        }
    }

    for pair in schedule.windows(2) {
        if pair[1].due_date <= pair[0].due_date {
            return Err(violation(format!(
                "installment {} is not due after installment {}",
                pair[1].sequence_number, pair[0].sequence_number
            )));
        }
        if pair[1].remaining_balance > pair[0].remaining_balance {
            return Err(violation(format!(
                "balance increases at installment {}",
                pair[1].sequence_number
            )));
        }
    }

    if !last.remaining_balance.is_zero() {
        return Err(violation(format!(
            "final balance is {} instead of zero",
            last.remaining_balance
        )));
    }

    let total_principal: Money = schedule.iter().map(|c| c.principal_portion).sum();
    if total_principal != expected_principal {
        return Err(violation(format!(
            "principal portions add up to {} instead of {}",
            total_principal, expected_principal
        )));
    }

    Ok(())
}
