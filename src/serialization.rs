//! json views of schedules for display and export

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::installment::Installment;
use crate::schedule::ScheduleSummary;
use crate::types::ContractId;

/// serializable snapshot of a contract's schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub contract_id: ContractId,
    pub summary: ScheduleSummary,
    pub installments: Vec<Installment>,
}

impl ScheduleView {
    pub fn new(contract_id: ContractId, installments: Vec<Installment>) -> Self {
        ScheduleView {
            contract_id,
            summary: ScheduleSummary::from_installments(&installments),
            installments,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::loan::Loan;
    use crate::schedule::AmortizationEngine;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    fn view() -> ScheduleView {
        let loan = Loan::new(
            3,
            Money::from_major(2_400),
            Rate::from_percentage(dec!(24)),
            6,
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
        );
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap(),
        ));
        let schedule = AmortizationEngine::default().generate_schedule(&loan, &time);
        ScheduleView::new(3, schedule)
    }

    #[test]
    fn test_json_shape() {
        let json = view().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["contract_id"], 3);
        assert_eq!(value["summary"]["installment_count"], 6);
        assert_eq!(value["summary"]["total_principal"], "2400.00");
        assert_eq!(value["installments"][0]["due_date"], "2024-03-10");
        assert_eq!(value["installments"][0]["state"], "Pending");
        assert_eq!(value["installments"][0]["interest_portion"], "48.00");
        assert_eq!(value["installments"][0]["insurance_portion"], "0.00");
        assert_eq!(value["installments"][0]["fees_portion"], "0.00");
        assert_eq!(value["installments"][0]["tax_portion"], "0.00");
        assert_eq!(value["installments"][5]["remaining_balance"], "0.00");
    }

    #[test]
    fn test_view_reads_back() {
        let original = view();
        let parsed = ScheduleView::from_json(&original.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_malformed_view() {
        assert!(ScheduleView::from_json(r#"{"contract_id": 1}"#).is_err());
    }
}
