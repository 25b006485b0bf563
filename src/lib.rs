pub mod config;
pub mod decimal;
pub mod errors;
pub mod history;
pub mod installment;
pub mod loan;
pub mod movement;
pub mod repository;
pub mod schedule;
pub mod serialization;
pub mod service;
pub mod types;

// re-export key types
pub use config::{EngineConfig, RoundingMode};
pub use decimal::{Money, Rate};
pub use errors::{Result, ScheduleError};
pub use history::{ScheduleChange, ScheduleHistory};
pub use installment::Installment;
pub use loan::Loan;
pub use movement::PaymentMovement;
pub use repository::{InMemoryScheduleRepository, ScheduleRepository};
pub use schedule::{
    add_months, calculate_fixed_payment, check_invariants, AmortizationEngine, ScheduleOutcome,
    ScheduleSummary,
};
pub use serialization::ScheduleView;
pub use service::ScheduleService;
pub use types::{
    ChangeKind, ContractId, ContractStatus, InstallmentState, MovementKind, NotAppliedReason,
    RecalculationMode,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
