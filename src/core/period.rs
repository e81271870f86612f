//! Calendar periods and the contiguous period grid.

use crate::error::AnalysisError;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Granularity of the aggregation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// One bucket per calendar month (`YYYY-MM` keys).
    #[default]
    Month,
    /// One bucket per calendar day (`YYYY-MM-DD` keys).
    Day,
}

/// A calendar bucket key, `"YYYY-MM"` (monthly) or `"YYYY-MM-DD"` (daily).
///
/// Zero padding makes lexicographic order coincide with chronological
/// order, so `Ord` is derived from the underlying string. Construction
/// goes through [`Period::from_date`] or the validating `FromStr` impl,
/// which keeps malformed keys out of the ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(String);

impl Period {
    /// Format the period containing `date` at the given granularity.
    pub fn from_date(date: NaiveDate, granularity: Granularity) -> Self {
        let key = match granularity {
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Day => {
                format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
            }
        };
        Period(key)
    }

    /// The period key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First calendar day covered by this period.
    fn first_day(&self) -> Option<NaiveDate> {
        let year: i32 = self.0.get(0..4)?.parse().ok()?;
        let month: u32 = self.0.get(5..7)?.parse().ok()?;
        let day: u32 = match self.0.get(8..10) {
            Some(d) => d.parse().ok()?,
            None => 1,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Period {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let granularity = match s.len() {
            7 => Granularity::Month,
            10 => Granularity::Day,
            _ => {
                return Err(AnalysisError::InvalidParameter(format!(
                    "malformed period key: {s:?}"
                )))
            }
        };
        let candidate = Period(s.to_string());
        match candidate.first_day() {
            // Round-trip through the formatter rejects unpadded keys.
            Some(day) if Period::from_date(day, granularity) == candidate => Ok(candidate),
            _ => Err(AnalysisError::InvalidParameter(format!(
                "malformed period key: {s:?}"
            ))),
        }
    }
}

/// Gap-free sequence of periods from `min` to `max` inclusive.
///
/// Walks the calendar one month (or day) at a time, so a series observed
/// only in January and March still gets a February bucket. Returns an
/// empty sequence when `min > max`.
pub fn period_sequence(min: &Period, max: &Period, granularity: Granularity) -> Vec<Period> {
    let (Some(mut current), Some(end)) = (min.first_day(), max.first_day()) else {
        return Vec::new();
    };
    let mut periods = Vec::new();
    while current <= end {
        periods.push(Period::from_date(current, granularity));
        let next = match granularity {
            Granularity::Month => current.checked_add_months(Months::new(1)),
            Granularity::Day => current.checked_add_days(Days::new(1)),
        };
        match next {
            Some(date) => current = date,
            None => break,
        }
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_keys_are_zero_padded() {
        let p = Period::from_date(date(2023, 7, 17), Granularity::Month);
        assert_eq!(p.as_str(), "2023-07");
        let p = Period::from_date(date(2023, 7, 17), Granularity::Day);
        assert_eq!(p.as_str(), "2023-07-17");
    }

    #[test]
    fn lexicographic_order_is_chronological() {
        let nov = Period::from_date(date(2023, 11, 1), Granularity::Month);
        let feb = Period::from_date(date(2024, 2, 1), Granularity::Month);
        assert!(nov < feb);

        let dec_31 = Period::from_date(date(2023, 12, 31), Granularity::Day);
        let jan_01 = Period::from_date(date(2024, 1, 1), Granularity::Day);
        assert!(dec_31 < jan_01);
    }

    #[test]
    fn monthly_sequence_crosses_year_boundary() {
        let min = Period::from_date(date(2023, 11, 5), Granularity::Month);
        let max = Period::from_date(date(2024, 2, 20), Granularity::Month);
        let seq = period_sequence(&min, &max, Granularity::Month);
        let keys: Vec<&str> = seq.iter().map(|p| p.as_str()).collect();
        assert_eq!(keys, ["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn daily_sequence_crosses_month_boundary() {
        let min = Period::from_date(date(2023, 1, 30), Granularity::Day);
        let max = Period::from_date(date(2023, 2, 2), Granularity::Day);
        let seq = period_sequence(&min, &max, Granularity::Day);
        let keys: Vec<&str> = seq.iter().map(|p| p.as_str()).collect();
        assert_eq!(keys, ["2023-01-30", "2023-01-31", "2023-02-01", "2023-02-02"]);
    }

    #[test]
    fn sequence_with_single_period() {
        let p = Period::from_date(date(2023, 3, 1), Granularity::Month);
        let seq = period_sequence(&p, &p, Granularity::Month);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0], p);
    }

    #[test]
    fn inverted_range_is_empty() {
        let min = Period::from_date(date(2023, 5, 1), Granularity::Month);
        let max = Period::from_date(date(2023, 2, 1), Granularity::Month);
        assert!(period_sequence(&max, &min, Granularity::Month).is_empty());
    }

    #[test]
    fn from_str_round_trips_valid_keys() {
        let p: Period = "2023-01".parse().unwrap();
        assert_eq!(p.as_str(), "2023-01");
        let p: Period = "2023-01-31".parse().unwrap();
        assert_eq!(p.as_str(), "2023-01-31");
    }

    #[test]
    fn from_str_rejects_malformed_keys() {
        assert!("2023-1".parse::<Period>().is_err());
        assert!("2023-13".parse::<Period>().is_err());
        assert!("2023-02-30".parse::<Period>().is_err());
        assert!("not a period".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }
}
