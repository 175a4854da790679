//! Report period (one calendar month) and the day-label join key.
//!
//! The label produced by [`day_label`] is written into the date column of
//! every grid and recomputed from each completion record's timestamp when
//! matching, so both sides must go through this one function.

use chrono::{Datelike, Months, NaiveDate};
use crate::ConfigError;

/// Format of the day label: abbreviated weekday, abbreviated month,
/// unpadded day, four-digit year (`"Mon, Jan 6 2025"`).
pub const DAY_LABEL_FORMAT: &str = "%a, %b %-d %Y";

/// Format a date the way the grid's date column shows it
pub fn day_label(date: NaiveDate) -> String {
    date.format(DAY_LABEL_FORMAT).to_string()
}

/// A calendar month of a proleptic Gregorian year
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportPeriod {
    year: i32,
    month: u32,
}

impl ReportPeriod {
    /// Create a period, validating the month and year
    pub fn new(year: i32, month: u32) -> Result<Self, ConfigError> {
        if !(1..=12).contains(&month) {
            return Err(ConfigError::InvalidPeriod(format!(
                "month {month} is not between 1 and 12"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(ConfigError::InvalidPeriod(format!(
                "year {year} is not between 1 and 9999"
            )));
        }
        Ok(Self { year, month })
    }

    /// The last complete month before `today`
    pub fn previous(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        let prev = first.checked_sub_months(Months::new(1)).unwrap_or(first);
        Self {
            year: prev.year(),
            month: prev.month(),
        }
    }

    /// The month `date` falls in
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // Validated in `new`, so the 1st always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Number of days in the month
    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        match first.checked_add_months(Months::new(1)) {
            Some(next) => (next - first).num_days() as u32,
            // December 9999: no following month to subtract from
            None => 31,
        }
    }

    /// Every date of the month in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.first_day().iter_days().take(self.days_in_month() as usize)
    }

    /// Whether `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Full month name, e.g. "January"
    pub fn month_name(&self) -> String {
        self.first_day().format("%B").to_string()
    }

    /// Abbreviated month name, e.g. "Jan"
    pub fn month_abbrev(&self) -> String {
        self.first_day().format("%b").to_string()
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn day_label_is_unpadded() {
        assert_eq!(day_label(date(2025, 1, 6)), "Mon, Jan 6 2025");
        assert_eq!(day_label(date(2025, 1, 31)), "Fri, Jan 31 2025");
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(ReportPeriod::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(ReportPeriod::new(2025, 2).unwrap().days_in_month(), 28);
        assert_eq!(ReportPeriod::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(ReportPeriod::new(2000, 2).unwrap().days_in_month(), 29);
        assert_eq!(ReportPeriod::new(2025, 4).unwrap().days_in_month(), 30);
        assert_eq!(ReportPeriod::new(2025, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn dates_are_ascending_and_complete() {
        let period = ReportPeriod::new(2025, 1).unwrap();
        let dates: Vec<_> = period.dates().collect();
        assert_eq!(dates.len(), 31);
        assert_eq!(dates[0], date(2025, 1, 1));
        assert_eq!(dates[30], date(2025, 1, 31));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn invalid_month_rejected() {
        assert!(ReportPeriod::new(2025, 0).is_err());
        assert!(ReportPeriod::new(2025, 13).is_err());
    }

    #[test]
    fn previous_month_wraps_year() {
        let period = ReportPeriod::previous(date(2025, 1, 15));
        assert_eq!((period.year(), period.month()), (2024, 12));

        let period = ReportPeriod::previous(date(2025, 3, 1));
        assert_eq!((period.year(), period.month()), (2025, 2));
    }

    #[test]
    fn contains_checks_month_and_year() {
        let period = ReportPeriod::new(2025, 1).unwrap();
        assert!(period.contains(date(2025, 1, 1)));
        assert!(!period.contains(date(2024, 1, 1)));
        assert!(!period.contains(date(2025, 2, 1)));
    }

    #[test]
    fn containing_matches_contains() {
        let day = date(2024, 2, 29);
        let period = ReportPeriod::containing(day);
        assert!(period.contains(day));
        assert_eq!(period, ReportPeriod::new(2024, 2).unwrap());
    }

    #[test]
    fn month_names() {
        let period = ReportPeriod::new(2025, 9).unwrap();
        assert_eq!(period.month_name(), "September");
        assert_eq!(period.month_abbrev(), "Sep");
        assert_eq!(period.to_string(), "September 2025");
    }
}
