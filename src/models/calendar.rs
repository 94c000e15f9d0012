//! Working-day calendar.
//!
//! Classifies calendar days as working or non-working and performs day
//! arithmetic that optionally skips non-working days.
//!
//! # Day Model
//! All dates are `chrono::NaiveDate` (no time zone, whole days).
//! A date is a working day iff:
//! - Its weekday is in the configured `WorkingDays` set (an empty set means
//!   no weekday restriction), AND
//! - It is NOT listed in `non_working_dates`.
//!
//! # Counting Semantics
//! Spans are inclusive of both ends. Advancing by `n` days first moves to
//! the first qualifying day at or after the origin, then steps over `n`
//! further qualifying days. Advancing by 0 therefore returns the origin only
//! when it qualifies.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The set of weekdays counted as working days.
///
/// Stored as ISO weekday numbers (Monday = 1 .. Sunday = 7). An empty set
/// means "no restriction configured": every weekday counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WorkingDays {
    days: BTreeSet<u8>,
}

impl WorkingDays {
    /// Creates a set from ISO weekday numbers.
    ///
    /// # Errors
    /// Returns [`Error::InvalidWeekday`] for numbers outside 1..=7.
    pub fn new(days: impl IntoIterator<Item = u8>) -> Result<Self> {
        let mut set = BTreeSet::new();
        for day in days {
            if !(1..=7).contains(&day) {
                return Err(Error::InvalidWeekday(day));
            }
            set.insert(day);
        }
        Ok(Self { days: set })
    }

    /// Monday through Friday.
    pub fn monday_to_friday() -> Self {
        Self {
            days: (1..=5).collect(),
        }
    }

    /// No weekday restriction (every weekday is a working day).
    pub fn unrestricted() -> Self {
        Self {
            days: BTreeSet::new(),
        }
    }

    /// Creates a set from chrono weekdays.
    pub fn from_weekdays(weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            days: weekdays
                .into_iter()
                .map(|w| w.number_from_monday() as u8)
                .collect(),
        }
    }

    /// Whether the weekday counts as a working day.
    #[inline]
    pub fn contains(&self, weekday: Weekday) -> bool {
        self.days.is_empty() || self.days.contains(&(weekday.number_from_monday() as u8))
    }

    /// Whether no weekday restriction is configured.
    pub fn is_unrestricted(&self) -> bool {
        self.days.is_empty()
    }

    /// Configured ISO weekday numbers in ascending order.
    pub fn iso_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.days.iter().copied()
    }
}

impl Default for WorkingDays {
    fn default() -> Self {
        Self::monday_to_friday()
    }
}

impl TryFrom<Vec<u8>> for WorkingDays {
    type Error = Error;

    fn try_from(days: Vec<u8>) -> Result<Self> {
        Self::new(days)
    }
}

impl From<WorkingDays> for Vec<u8> {
    fn from(days: WorkingDays) -> Self {
        days.days.into_iter().collect()
    }
}

/// Parses a comma-separated list of ISO weekday numbers (`"1,2,3,4,5"`).
///
/// A blank string yields the unrestricted set.
impl FromStr for WorkingDays {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut days = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day: u8 = part
                .parse()
                .map_err(|_| Error::Config(format!("not a weekday number: '{part}'")))?;
            days.push(day);
        }
        Self::new(days)
    }
}

impl fmt::Display for WorkingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.days.iter().map(u8::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Working-day calendar shared by every work item of a scheduling pass.
///
/// Items opt out of it individually via `ignore_non_working_days`, see
/// [`Calendar::days_for`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Weekdays counted as working days.
    pub working_days: WorkingDays,
    /// Specific dates that are never working days (holidays).
    pub non_working_dates: BTreeSet<NaiveDate>,
}

impl Calendar {
    /// Creates a calendar with the given working weekdays and no holidays.
    pub fn new(working_days: WorkingDays) -> Self {
        Self {
            working_days,
            non_working_dates: BTreeSet::new(),
        }
    }

    /// A calendar where every day is a working day.
    pub fn all_days() -> Self {
        Self::new(WorkingDays::unrestricted())
    }

    /// Adds a specific non-working date.
    pub fn with_non_working_date(mut self, date: NaiveDate) -> Self {
        self.non_working_dates.insert(date);
        self
    }

    /// Adds several non-working dates.
    pub fn with_non_working_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.non_working_dates.extend(dates);
        self
    }

    /// Whether `date` is a working day.
    pub fn is_working(&self, date: NaiveDate) -> bool {
        if self.non_working_dates.contains(&date) {
            return false;
        }
        self.working_days.contains(date.weekday())
    }

    /// Returns the day predicate for an item.
    ///
    /// `ignore_non_working_days = true` yields the "every day counts"
    /// predicate; otherwise the predicate delegates to [`Calendar::is_working`].
    pub fn days_for(&self, ignore_non_working_days: bool) -> DayPredicate<'_> {
        if ignore_non_working_days {
            DayPredicate::all()
        } else {
            DayPredicate::working(self)
        }
    }

    /// Number of qualifying days in `[start, due]`, both ends inclusive.
    pub fn span(&self, start: NaiveDate, due: NaiveDate, ignore_non_working_days: bool) -> u32 {
        self.days_for(ignore_non_working_days).span(start, due)
    }

    /// Advances `date` by `n` qualifying days (see module docs).
    pub fn add_working_days(
        &self,
        date: NaiveDate,
        n: u32,
        ignore_non_working_days: bool,
    ) -> Option<NaiveDate> {
        self.days_for(ignore_non_working_days).add_days(date, n)
    }

    /// Moves `date` back by `n` qualifying days.
    pub fn subtract_working_days(
        &self,
        date: NaiveDate,
        n: u32,
        ignore_non_working_days: bool,
    ) -> Option<NaiveDate> {
        self.days_for(ignore_non_working_days).subtract_days(date, n)
    }

    /// First qualifying day at or after `date`.
    pub fn soonest_working_day(
        &self,
        date: NaiveDate,
        ignore_non_working_days: bool,
    ) -> Option<NaiveDate> {
        self.days_for(ignore_non_working_days).soonest(date)
    }

    /// Due date of a span of `duration` qualifying days starting at `start`.
    ///
    /// Durations 0 and 1 both yield a single-day span.
    pub fn due_date_for(
        &self,
        start: NaiveDate,
        duration: u32,
        ignore_non_working_days: bool,
    ) -> Option<NaiveDate> {
        self.add_working_days(start, duration.saturating_sub(1), ignore_non_working_days)
    }

    /// Start date of a span of `duration` qualifying days ending at `due`.
    pub fn start_date_for(
        &self,
        due: NaiveDate,
        duration: u32,
        ignore_non_working_days: bool,
    ) -> Option<NaiveDate> {
        self.subtract_working_days(due, duration.saturating_sub(1), ignore_non_working_days)
    }
}

/// Predicate deciding which days count, either "all days" or the working
/// days of a calendar.
#[derive(Debug, Clone, Copy)]
pub struct DayPredicate<'a> {
    calendar: Option<&'a Calendar>,
}

impl<'a> DayPredicate<'a> {
    /// Every day counts.
    pub fn all() -> Self {
        Self { calendar: None }
    }

    /// Only working days of `calendar` count.
    pub fn working(calendar: &'a Calendar) -> Self {
        Self {
            calendar: Some(calendar),
        }
    }

    /// Whether this predicate counts every day.
    pub fn is_all_days(&self) -> bool {
        self.calendar.is_none()
    }

    /// Whether `date` counts.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.calendar {
            None => true,
            Some(cal) => cal.is_working(date),
        }
    }

    /// Inclusive count of qualifying days in `[start, due]`. Zero if `due < start`.
    pub fn span(&self, start: NaiveDate, due: NaiveDate) -> u32 {
        if due < start {
            return 0;
        }
        if self.is_all_days() {
            return ((due - start).num_days() + 1) as u32;
        }
        start
            .iter_days()
            .take_while(|d| *d <= due)
            .filter(|d| self.contains(*d))
            .count() as u32
    }

    /// First qualifying day at or after `date`.
    ///
    /// Terminates because at most seven consecutive weekdays plus the
    /// finite holiday list can be skipped.
    pub fn soonest(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date;
        while !self.contains(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    /// Last qualifying day at or before `date`.
    pub fn latest(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date;
        while !self.contains(current) {
            current = current.pred_opt()?;
        }
        Some(current)
    }

    /// Advances by `n` qualifying days.
    pub fn add_days(&self, date: NaiveDate, n: u32) -> Option<NaiveDate> {
        if self.is_all_days() {
            return date.checked_add_days(Days::new(u64::from(n)));
        }
        let mut current = self.soonest(date)?;
        for _ in 0..n {
            current = self.soonest(current.succ_opt()?)?;
        }
        Some(current)
    }

    /// Moves back by `n` qualifying days.
    pub fn subtract_days(&self, date: NaiveDate, n: u32) -> Option<NaiveDate> {
        if self.is_all_days() {
            return date.checked_sub_days(Days::new(u64::from(n)));
        }
        let mut current = self.latest(date)?;
        for _ in 0..n {
            current = self.latest(current.pred_opt()?)?;
        }
        Some(current)
    }
}
