pub mod amortization;
pub mod calendar;
pub mod prepayment;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::installment::Installment;
use crate::types::NotAppliedReason;

pub use amortization::{calculate_fixed_payment, AmortizationEngine};
pub use calendar::add_months;
pub use summary::{check_invariants, ScheduleSummary};

/// result of a schedule operation that tells "nothing to do" apart from
/// "loan settled"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleOutcome {
    /// freshly numbered schedule
    Schedule(Vec<Installment>),
    /// prepayment covers the whole outstanding principal
    Settled,
    /// input did not allow a schedule to be built
    Empty(NotAppliedReason),
}

impl ScheduleOutcome {
    /// collapse into the plain list view, empty unless a schedule was built
    pub fn into_installments(self) -> Vec<Installment> {
        match self {
            ScheduleOutcome::Schedule(installments) => installments,
            ScheduleOutcome::Settled | ScheduleOutcome::Empty(_) => Vec::new(),
        }
    }

    pub fn installments(&self) -> &[Installment] {
        match self {
            ScheduleOutcome::Schedule(installments) => installments,
            ScheduleOutcome::Settled | ScheduleOutcome::Empty(_) => &[],
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, ScheduleOutcome::Settled)
    }

    /// reason reported when no schedule was produced
    pub fn not_applied_reason(&self) -> Option<NotAppliedReason> {
        match self {
            ScheduleOutcome::Schedule(_) => None,
            ScheduleOutcome::Settled => Some(NotAppliedReason::LoanSettled),
            ScheduleOutcome::Empty(reason) => Some(*reason),
        }
    }
}
