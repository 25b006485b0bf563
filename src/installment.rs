use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ContractId, InstallmentState};

/// one row of a payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position within the schedule
    pub sequence_number: u32,
    pub contract_id: ContractId,
    pub state: InstallmentState,
    pub due_date: NaiveDate,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub insurance_portion: Money,
    pub fees_portion: Money,
    pub tax_portion: Money,
    /// nominal days covered by the period
    pub period_days: u32,
    /// total due for the period
    pub payment_amount: Money,
    /// outstanding principal after this installment
    pub remaining_balance: Money,
}

impl Installment {
    /// pending installment with zeroed insurance, fees and tax
    pub fn pending(
        due_date: NaiveDate,
        principal_portion: Money,
        interest_portion: Money,
        payment_amount: Money,
        remaining_balance: Money,
        period_days: u32,
    ) -> Self {
        Self {
            sequence_number: 0,
            contract_id: 0,
            state: InstallmentState::Pending,
            due_date,
            principal_portion,
            interest_portion,
            insurance_portion: Money::ZERO,
            fees_portion: Money::ZERO,
            tax_portion: Money::ZERO,
            period_days,
            payment_amount,
            remaining_balance,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.state == InstallmentState::Paid
    }

    /// sum of every component of the payment
    pub fn components_total(&self) -> Money {
        self.principal_portion
            + self.interest_portion
            + self.insurance_portion
            + self.fees_portion
            + self.tax_portion
    }
}
