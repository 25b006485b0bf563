use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{ContractId, ContractStatus};

/// loan description read by the schedule engine
///
/// Optional fields mirror what an origination record may still be missing;
/// the engine yields no schedule rather than failing when they are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub contract_id: ContractId,
    /// disbursed amount
    pub principal: Option<Money>,
    /// nominal annual percentage rate
    pub annual_rate: Option<Rate>,
    pub installment_count: u32,
    pub disbursement_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ContractStatus,
}

impl Loan {
    pub fn new(
        contract_id: ContractId,
        principal: Money,
        annual_rate: Rate,
        installment_count: u32,
        disbursement_date: NaiveDate,
    ) -> Self {
        Self {
            contract_id,
            principal: Some(principal),
            annual_rate: Some(annual_rate),
            installment_count,
            disbursement_date: Some(disbursement_date),
            status: ContractStatus::Active,
        }
    }

    /// rate used by recalculations, zero when not set
    pub fn rate_or_zero(&self) -> Rate {
        self.annual_rate.unwrap_or(Rate::ZERO)
    }
}
