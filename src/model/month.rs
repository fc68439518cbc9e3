//! Calendar months and the half-open ranges of months that a run processes.

use anyhow::Context;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month, such as `2021-10`. Internally this is the first day of the month.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Month(NaiveDate);

impl Month {
    /// Returns `None` if `month` is not in `1..=12` or the year is out of range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The month after this one, or `None` at the end of the representable calendar.
    pub fn succ(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// The date bounds that are sent to the expense service for this month.
    ///
    /// The upper bound is always day 31, even for shorter months. The service accepts dates past
    /// the real end of the month.
    pub fn bounds(&self) -> DateBounds {
        DateBounds {
            dated_after: format!("{self}-01"),
            dated_before: format!("{self}-31"),
        }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .with_context(|| format!("Invalid month '{s}', expected the format YYYY-MM"))?;
        let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
        anyhow::ensure!(
            year.len() == 4 && all_digits(year) && (1..=2).contains(&month.len()) && all_digits(month),
            "Invalid month '{s}', expected the format YYYY-MM"
        );
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in '{s}'"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month number in '{s}'"))?;
        Month::new(year, month)
            .with_context(|| format!("Invalid month '{s}', the month must be between 01 and 12"))
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Month::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The `dated_after` and `dated_before` query values for one month.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DateBounds {
    pub dated_after: String,
    pub dated_before: String,
}

/// The half-open range of months `[start, end)`. If `start >= end` the range is empty.
///
/// Iterating does not consume the range, so it can be walked any number of times.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct MonthRange {
    start: Month,
    end: Month,
}

impl MonthRange {
    pub fn new(start: Month, end: Month) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Month {
        self.start
    }

    pub fn end(&self) -> Month {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn iter(&self) -> MonthIter {
        MonthIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for &MonthRange {
    type Item = Month;
    type IntoIter = MonthIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazily yields the months of a `MonthRange` in chronological order.
#[derive(Debug, Clone)]
pub struct MonthIter {
    next: Option<Month>,
    end: Month,
}

impl Iterator for MonthIter {
    type Item = Month;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|m| *m < self.end)?;
        self.next = current.succ();
        Some(current)
    }
}
