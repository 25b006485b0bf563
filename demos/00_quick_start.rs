/// quick start - originate a loan schedule and absorb a prepayment
use loan_schedule_rs::chrono::{NaiveDate, TimeZone, Utc};
use loan_schedule_rs::{
    AmortizationEngine, InMemoryScheduleRepository, Loan, Money, Rate, RecalculationMode,
    SafeTimeProvider, ScheduleService, ScheduleView, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 12,000.00 at 15% over 12 monthly installments
    let disbursed = NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("invalid date")?;
    let mut repository = InMemoryScheduleRepository::new();
    repository.insert_loan(Loan::new(
        1,
        Money::from_str_exact("12000.00")?,
        Rate::from_percentage(15.into()),
        12,
        disbursed,
    ));

    let now = Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).single().ok_or("invalid time")?;
    let clock = SafeTimeProvider::new(TimeSource::Test(now));
    let mut service = ScheduleService::new(repository, AmortizationEngine::default(), clock, "quick-start");

    let schedule = service.originate(1)?;
    println!("fixed payment: {}", schedule[0].payment_amount);

    // pay the first two installments, then prepay 3,000.00 keeping the payment
    service.record_payment(1, 1)?;
    service.record_payment(1, 2)?;
    let schedule = service.apply_prepayment(1, Money::from_major(3_000), RecalculationMode::ReduceTerm)?;
    println!("installments left after prepayment: {}", schedule.len());

    println!("{}", ScheduleView::new(1, schedule).to_json_pretty()?);

    Ok(())
}
