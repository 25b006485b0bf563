use chrono::{Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;

/// add whole calendar months, clamping the day to the end of shorter months
///
/// Always offsets from `date` itself, so a schedule anchored on the 31st
/// returns to the 31st whenever the target month allows it.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// current calendar date according to the time provider
pub fn today(time_provider: &SafeTimeProvider) -> NaiveDate {
    time_provider.now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_mid_month() {
        assert_eq!(add_months(date(2024, 1, 15), 0), date(2024, 1, 15));
        assert_eq!(add_months(date(2024, 1, 15), 1), date(2024, 2, 15));
        assert_eq!(add_months(date(2024, 1, 15), 12), date(2025, 1, 15));
    }

    #[test]
    fn test_add_months_clamps_month_end() {
        let start = date(2024, 1, 31);
        assert_eq!(add_months(start, 1), date(2024, 2, 29));
        assert_eq!(add_months(start, 2), date(2024, 3, 31));
        assert_eq!(add_months(start, 3), date(2024, 4, 30));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
    }

    #[test]
    fn test_today_follows_time_provider() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap(),
        ));
        assert_eq!(today(&time), date(2024, 3, 10));
    }
}
