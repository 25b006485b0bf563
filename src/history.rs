use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::installment::Installment;
use crate::types::{ChangeKind, ContractId};

/// archival record of a schedule that was replaced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleChange {
    pub id: Uuid,
    pub contract_id: ContractId,
    pub changed_at: DateTime<Utc>,
    pub kind: ChangeKind,
    pub description: String,
    pub recorded_by: String,
    /// schedule as it stood before the change
    pub archived: Vec<Installment>,
}

impl ScheduleChange {
    pub fn new(
        contract_id: ContractId,
        changed_at: DateTime<Utc>,
        kind: ChangeKind,
        description: impl Into<String>,
        recorded_by: impl Into<String>,
        archived: Vec<Installment>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            changed_at,
            kind,
            description: description.into(),
            recorded_by: recorded_by.into(),
            archived,
        }
    }
}

/// append-only log of schedule changes
#[derive(Debug, Default, Clone)]
pub struct ScheduleHistory {
    changes: Vec<ScheduleChange>,
}

impl ScheduleHistory {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn record(&mut self, change: ScheduleChange) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[ScheduleChange] {
        &self.changes
    }

    /// changes for one contract, oldest first
    pub fn for_contract(&self, contract_id: ContractId) -> Vec<ScheduleChange> {
        self.changes
            .iter()
            .filter(|c| c.contract_id == contract_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_history_filters_by_contract() {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let mut history = ScheduleHistory::new();
        history.record(ScheduleChange::new(1, at, ChangeKind::Prepayment, "first", "system", vec![]));
        history.record(ScheduleChange::new(2, at, ChangeKind::Reschedule, "other", "system", vec![]));
        history.record(ScheduleChange::new(1, at, ChangeKind::Reschedule, "second", "system", vec![]));

        assert_eq!(history.len(), 3);
        let changes = history.for_contract(1);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].description, "first");
        assert_eq!(changes[1].kind, ChangeKind::Reschedule);
        assert_ne!(changes[0].id, changes[1].id);
    }

    #[test]
    fn test_change_kind_tags() {
        assert_eq!(ChangeKind::Prepayment.to_string(), "AMORTIZACION");
        assert_eq!(ChangeKind::Reschedule.to_string(), "REPROGRAMACION_PLAZO");
        assert_eq!(ChangeKind::Refinancing.to_string(), "REFINANCIACION");
    }
}
