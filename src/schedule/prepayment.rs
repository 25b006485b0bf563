use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::installment::Installment;

use super::amortization::{calculate_fixed_payment, AmortizationEngine};

impl AmortizationEngine {
    /// keep every open slot and its due date, lower the fixed payment
    pub(super) fn reduce_payment(
        &self,
        principal: Money,
        monthly_rate: Decimal,
        due_dates: &[NaiveDate],
    ) -> Vec<Installment> {
        let periods = due_dates.len() as u32;
        let payment = calculate_fixed_payment(principal, monthly_rate, periods, self.config());
        self.amortize(principal, monthly_rate, payment, due_dates)
    }

    /// keep the reference payment, stop as soon as the balance is cleared
    ///
    /// Slots are consumed in order with their original due dates. A slot
    /// closes the schedule when the payment no longer covers interest, when
    /// it is the last one available, or when its principal reaches the
    /// remaining balance; the closing slot pays balance plus interest.
    pub(super) fn reduce_term(
        &self,
        principal: Money,
        monthly_rate: Decimal,
        due_dates: &[NaiveDate],
        reference_payment: Money,
    ) -> Vec<Installment> {
        let mut rows = Vec::new();
        let mut balance = principal;
        let payment = self.round(reference_payment);
        let last = due_dates.len().saturating_sub(1);
        let period_days = self.config().period_days;

        for (i, due_date) in due_dates.iter().enumerate() {
            let interest = self.interest_on(balance, monthly_rate);
            let principal_portion = self.round(reference_payment - interest);

            if !principal_portion.is_positive() || i == last || principal_portion >= balance {
                let closing_payment = self.round(balance + interest);
                rows.push(Installment::pending(
                    *due_date,
                    balance,
                    interest,
                    closing_payment,
                    self.round(Money::ZERO),
                    period_days,
                ));
                break;
            }

            balance = self.round(balance - principal_portion);
            rows.push(Installment::pending(
                *due_date,
                principal_portion,
                interest,
                payment,
                balance,
                period_days,
            ));
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use crate::decimal::{Money, Rate};
    use crate::installment::Installment;
    use crate::loan::Loan;
    use crate::schedule::{check_invariants, AmortizationEngine, ScheduleOutcome};
    use crate::types::{InstallmentState, RecalculationMode};
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str_exact(s).unwrap()
    }

    fn setup() -> (AmortizationEngine, Loan, Vec<Installment>) {
        let engine = AmortizationEngine::default();
        let loan = Loan::new(
            42,
            money("12000.00"),
            Rate::from_percentage(dec!(15.00)),
            12,
            date(2024, 1, 15),
        );
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        ));
        let schedule = engine.generate_schedule(&loan, &time);
        (engine, loan, schedule)
    }

    #[test]
    fn test_reduce_payment_keeps_term_and_dates() {
        let (engine, loan, schedule) = setup();

        let recalculated = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("5000.00"),
            RecalculationMode::ReducePayment,
        );

        assert_eq!(recalculated.len(), 12);
        assert_eq!(recalculated[0].payment_amount, money("631.81"));
        assert_eq!(recalculated[0].interest_portion, money("87.50"));
        assert_eq!(recalculated[0].principal_portion, money("544.31"));
        assert!(recalculated[0].payment_amount < schedule[0].payment_amount);

        let last = &recalculated[11];
        assert_eq!(last.principal_portion, money("623.99"));
        assert_eq!(last.payment_amount, money("631.79"));
        assert!(last.remaining_balance.is_zero());

        for (new, old) in recalculated.iter().zip(&schedule) {
            assert_eq!(new.due_date, old.due_date);
        }
        check_invariants(&recalculated, money("7000.00")).unwrap();
    }

    #[test]
    fn test_reduce_term_shortens_schedule() {
        let (engine, loan, schedule) = setup();

        let recalculated = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("5000.00"),
            RecalculationMode::ReduceTerm,
        );

        assert_eq!(recalculated.len(), 7);
        assert_eq!(recalculated[0].interest_portion, money("87.50"));
        assert_eq!(recalculated[0].principal_portion, money("995.60"));
        assert_eq!(recalculated[0].payment_amount, money("1083.10"));
        assert_eq!(recalculated[5].remaining_balance, money("836.59"));

        let last = &recalculated[6];
        assert_eq!(last.sequence_number, 7);
        assert_eq!(last.due_date, schedule[6].due_date);
        assert_eq!(last.interest_portion, money("10.46"));
        assert_eq!(last.principal_portion, money("836.59"));
        assert_eq!(last.payment_amount, money("847.05"));
        assert!(last.remaining_balance.is_zero());

        check_invariants(&recalculated, money("7000.00")).unwrap();
    }

    #[test]
    fn test_reduce_term_only_uses_open_slots() {
        let (engine, loan, mut schedule) = setup();
        for row in schedule.iter_mut().take(3) {
            row.state = InstallmentState::Paid;
        }
        schedule[3].state = InstallmentState::Partial;

        let recalculated = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("1000.00"),
            RecalculationMode::ReduceTerm,
        );

        assert!(recalculated.len() <= 9);
        assert_eq!(recalculated[0].due_date, schedule[3].due_date);
        assert_eq!(recalculated[0].sequence_number, 1);
        assert!(recalculated.iter().all(|c| c.state == InstallmentState::Pending));

        let outstanding: Money = schedule[3..].iter().map(|c| c.principal_portion).sum();
        check_invariants(&recalculated, outstanding - money("1000.00")).unwrap();
    }

    #[test]
    fn test_reduce_term_closes_when_payment_misses_interest() {
        let (engine, loan, mut schedule) = setup();
        // reference payment below the first month's interest
        schedule[0].payment_amount = money("50.00");

        let recalculated = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("2000.00"),
            RecalculationMode::ReduceTerm,
        );

        assert_eq!(recalculated.len(), 1);
        assert_eq!(recalculated[0].principal_portion, money("10000.00"));
        assert_eq!(recalculated[0].interest_portion, money("125.00"));
        assert_eq!(recalculated[0].payment_amount, money("10125.00"));
        assert!(recalculated[0].remaining_balance.is_zero());
    }

    #[test]
    fn test_reduce_term_without_reference_reduces_payment() {
        let (engine, loan, mut schedule) = setup();
        schedule[0].payment_amount = Money::ZERO;

        let by_term = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("5000.00"),
            RecalculationMode::ReduceTerm,
        );
        let by_payment = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("5000.00"),
            RecalculationMode::ReducePayment,
        );

        assert_eq!(by_term, by_payment);
    }

    #[test]
    fn test_reduce_term_never_longer_than_pending() {
        let (engine, loan, schedule) = setup();

        for amount in ["0.01", "100.00", "2500.50", "9999.99"] {
            let recalculated = engine.recalculate_for_prepayment(
                &loan,
                &schedule,
                money(amount),
                RecalculationMode::ReduceTerm,
            );
            assert!(!recalculated.is_empty());
            assert!(recalculated.len() <= schedule.len());
            check_invariants(&recalculated, money("12000.00") - money(amount)).unwrap();
        }
    }

    #[test]
    fn test_full_prepayment_settles_loan() {
        let (engine, loan, schedule) = setup();

        for mode in [RecalculationMode::ReducePayment, RecalculationMode::ReduceTerm] {
            assert!(engine
                .recalculate_for_prepayment(&loan, &schedule, money("12000.00"), mode)
                .is_empty());
            assert_eq!(
                engine.recalculate_for_prepayment_outcome(&loan, &schedule, money("15000.00"), mode),
                ScheduleOutcome::Settled
            );
        }
    }

    #[test]
    fn test_prepayment_without_open_installments() {
        let (engine, loan, mut schedule) = setup();
        assert!(engine
            .recalculate_for_prepayment(&loan, &[], money("10.00"), RecalculationMode::ReducePayment)
            .is_empty());

        for row in schedule.iter_mut() {
            row.state = InstallmentState::Paid;
        }
        let outcome = engine.recalculate_for_prepayment_outcome(
            &loan,
            &schedule,
            money("10.00"),
            RecalculationMode::ReducePayment,
        );
        assert!(!outcome.is_settled());
        assert!(outcome.installments().is_empty());
    }

    #[test]
    fn test_prepayment_is_deterministic() {
        let (engine, loan, schedule) = setup();
        let first = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("1234.56"),
            RecalculationMode::ReduceTerm,
        );
        let second = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("1234.56"),
            RecalculationMode::ReduceTerm,
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_prepayment_on_interest_free_loan() {
        let (engine, mut loan, schedule) = setup();
        loan.annual_rate = None;

        let recalculated = engine.recalculate_for_prepayment(
            &loan,
            &schedule,
            money("6000.00"),
            RecalculationMode::ReducePayment,
        );
        assert_eq!(recalculated.len(), 12);
        assert!(recalculated.iter().all(|c| c.interest_portion.is_zero()));
        assert_eq!(recalculated[0].payment_amount, money("500.00"));
    }
}
