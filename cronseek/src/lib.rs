//! Finds the next and previous times a five-field cron schedule fires.
//!
//! A [`Schedule`] is built from the allowed values of its five fields, either directly with
//! [`build_schedule`] or by parsing a cron expression. Searches are done at minute precision on
//! naive (timezone-less) date times, and are bounded by [`SearchLimits`] so a schedule that never
//! fires, or fires too rarely, reports [`SearchExhausted`] instead of looping.
//!
//! # Example
//! ```
//! use cronseek::Schedule;
//! use chrono::NaiveDate;
//!
//! let schedule: Schedule = "30 18 * * *".parse().expect("Couldn't parse expression!");
//! let reference = NaiveDate::from_ymd_opt(2015, 10, 12).unwrap().and_hms_opt(18, 33, 0).unwrap();
//!
//! let next = schedule.next_after(reference).unwrap();
//! assert_eq!(next.to_string(), "2015-10-13 18:30:00");
//!
//! let last = schedule.last_before(reference).unwrap();
//! assert_eq!(last.to_string(), "2015-10-12 18:30:00");
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(not(any(feature = "std", test)))]
extern crate alloc;

mod field;
pub mod parse;
mod search;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use core::str::FromStr;

use self::parse::CronExpr;
use self::search::Direction;

pub use self::field::{Field, FieldMatcher, FieldSpec, Values};
pub use self::parse::ParseError;
pub use self::search::{OccurrenceIter, Occurrences, SearchExhausted, SearchLimits};

/// Returns the number of days in the month, 28-31
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if year % 4 != 0 {
                28
            } else if year % 100 != 0 {
                29
            } else if year % 400 != 0 {
                28
            } else {
                29
            }
        }
    }
}

/// A validated cron schedule: the allowed values of its five fields and the limits its searches
/// run under.
///
/// # Example
/// ```
/// use cronseek::Schedule;
/// use chrono::NaiveDate;
///
/// let schedule: Schedule = "*/10 0 * OCT MON".parse().expect("Couldn't parse expression!");
/// let start = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// for time in schedule.iter_after(start).take(5) {
///     // Prints
///     // 1970-10-05 00:00:00
///     // 1970-10-05 00:10:00
///     // 1970-10-05 00:20:00
///     // 1970-10-05 00:30:00
///     // 1970-10-05 00:40:00
///     println!("{}", time);
///     assert!(schedule.contains(time));
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Schedule {
    minutes: FieldMatcher,
    hours: FieldMatcher,
    days_of_month: FieldMatcher,
    months: FieldMatcher,
    days_of_week: FieldMatcher,
    limits: SearchLimits,
}

impl FromStr for Schedule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_expr(&s.parse()?)
    }
}

impl Schedule {
    /// Validates the allowed values of each field and builds a schedule with the default search
    /// limits. Fails on the first field, in expression order, that's empty or has a value outside
    /// its domain.
    ///
    /// # Example
    /// ```
    /// use cronseek::{Field, FieldSpec, ParseError, Schedule};
    ///
    /// // 09:00 and 17:00 on weekdays
    /// let schedule = Schedule::new(
    ///     FieldSpec::one(0),
    ///     FieldSpec::many(vec![9, 17]),
    ///     FieldSpec::All,
    ///     FieldSpec::All,
    ///     FieldSpec::many(1..=5),
    /// );
    /// assert!(schedule.is_ok());
    ///
    /// let sunday_as_seven = Schedule::new(
    ///     FieldSpec::one(0),
    ///     FieldSpec::one(0),
    ///     FieldSpec::All,
    ///     FieldSpec::All,
    ///     FieldSpec::one(7),
    /// );
    /// assert_eq!(
    ///     sunday_as_seven,
    ///     Err(ParseError::OutOfDomain { field: Field::DayOfWeek, value: 7 }),
    /// );
    /// ```
    pub fn new(
        minute: FieldSpec,
        hour: FieldSpec,
        day_of_month: FieldSpec,
        month: FieldSpec,
        day_of_week: FieldSpec,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            minutes: FieldMatcher::new(Field::Minute, &minute)?,
            hours: FieldMatcher::new(Field::Hour, &hour)?,
            days_of_month: FieldMatcher::new(Field::DayOfMonth, &day_of_month)?,
            months: FieldMatcher::new(Field::Month, &month)?,
            days_of_week: FieldMatcher::new(Field::DayOfWeek, &day_of_week)?,
            limits: SearchLimits::new(),
        })
    }

    /// Builds a schedule from a parsed expression.
    pub fn from_expr(expr: &CronExpr) -> Result<Self, ParseError> {
        let [minute, hour, day_of_month, month, day_of_week] = expr.expand()?;
        Self::new(minute, hour, day_of_month, month, day_of_week)
    }

    /// Replaces the limits searches on this schedule run under.
    #[inline]
    pub fn with_limits(self, limits: SearchLimits) -> Self {
        Self { limits, ..self }
    }

    /// The limits searches on this schedule run under
    #[inline]
    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Returns the allowed values of the given field.
    pub fn field(&self, field: Field) -> &FieldMatcher {
        match field {
            Field::Minute => &self.minutes,
            Field::Hour => &self.hours,
            Field::DayOfMonth => &self.days_of_month,
            Field::Month => &self.months,
            Field::DayOfWeek => &self.days_of_week,
        }
    }

    /// Returns whether this schedule will ever match any given time.
    ///
    /// Some schedules can never match. If a schedule only matches a day of the month that's
    /// beyond the last day of every month it matches, it never fires.
    ///
    /// # Example
    /// ```
    /// use cronseek::Schedule;
    ///
    /// // Does have any since February has a 29th day on leap years
    /// assert!("* * 29 2 *".parse::<Schedule>().unwrap().any());
    ///
    /// // Does not have any since November does not have a 31st day
    /// assert!(!"* * 31 11 *".parse::<Schedule>().unwrap().any());
    /// ```
    #[inline]
    pub fn any(&self) -> bool {
        // a restricted day of the week always has a day to offer
        if !self.days_of_week.is_wildcard() || self.days_of_month.is_wildcard() {
            return true;
        }

        // 2000 is a leap year, so February is counted with 29 days
        let longest_month = self
            .months
            .values()
            .map(|month| days_in_month(2000, month))
            .max();

        longest_month.map_or(false, |max| self.days_of_month.first() <= max)
    }

    /// Returns whether this schedule fires in the minute of the given time. Seconds are ignored.
    ///
    /// # Example
    /// ```
    /// use cronseek::Schedule;
    /// use chrono::NaiveDate;
    ///
    /// let schedule: Schedule = "*/10 0 * OCT MON".parse().expect("Couldn't parse expression!");
    ///
    /// // check if a given time is contained in an expression
    /// let time = NaiveDate::from_ymd_opt(2020, 10, 19).unwrap().and_hms_opt(0, 30, 15).unwrap();
    /// assert!(schedule.contains(time));
    /// ```
    #[inline]
    pub fn contains(&self, dt: NaiveDateTime) -> bool {
        self.minutes.contains(dt.minute())
            && self.hours.contains(dt.hour())
            && self.months.contains(dt.month())
            && self.contains_day(dt.date())
    }

    #[inline]
    fn contains_day(&self, date: NaiveDate) -> bool {
        let day_of_month = || self.days_of_month.contains(date.day());
        let day_of_week = || {
            self.days_of_week
                .contains(date.weekday().num_days_from_sunday())
        };

        match (
            self.days_of_month.is_wildcard(),
            self.days_of_week.is_wildcard(),
        ) {
            (true, true) => true,
            (true, false) => day_of_week(),
            (false, true) => day_of_month(),
            (false, false) => day_of_month() || day_of_week(),
        }
    }

    /// Returns the first time after the minute of `reference` that this schedule fires. The
    /// reference minute itself is never returned.
    ///
    /// # Example
    /// ```
    /// use cronseek::Schedule;
    /// use chrono::NaiveDate;
    ///
    /// let schedule: Schedule = "*/10 * * * *".parse().expect("Couldn't parse expression!");
    /// let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    /// // the given date matches the expression, but only later times are returned
    /// assert_eq!(
    ///     schedule.next_after(date),
    ///     Ok(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 10, 0).unwrap()),
    /// );
    /// ```
    #[inline]
    pub fn next_after(&self, reference: NaiveDateTime) -> Result<NaiveDateTime, SearchExhausted> {
        self.search(reference, Direction::Forward)
    }

    /// Returns the last time before the minute of `reference` that this schedule fired. The
    /// reference minute itself is never returned.
    ///
    /// # Example
    /// ```
    /// use cronseek::Schedule;
    /// use chrono::NaiveDate;
    ///
    /// let schedule: Schedule = "*/10 * * * *".parse().expect("Couldn't parse expression!");
    /// let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 5, 0).unwrap();
    /// assert_eq!(
    ///     schedule.last_before(date),
    ///     Ok(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()),
    /// );
    /// ```
    #[inline]
    pub fn last_before(&self, reference: NaiveDateTime) -> Result<NaiveDateTime, SearchExhausted> {
        self.search(reference, Direction::Backward)
    }

    /// Creates an iterator of the times this schedule fires after `reference`, in ascending
    /// order. The iterator ends once a search is exhausted.
    ///
    /// # Example
    /// ```
    /// use cronseek::Schedule;
    /// use chrono::NaiveDate;
    ///
    /// let schedule: Schedule = "*/10 * * * *".parse().expect("Couldn't parse expression!");
    /// let start = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    /// for time in schedule.iter_after(start).take(5) {
    ///     // Prints
    ///     // 1970-01-01 00:10:00
    ///     // 1970-01-01 00:20:00
    ///     // 1970-01-01 00:30:00
    ///     // 1970-01-01 00:40:00
    ///     // 1970-01-01 00:50:00
    ///     println!("{}", time)
    /// }
    /// ```
    #[inline]
    pub fn iter_after(&self, reference: NaiveDateTime) -> OccurrenceIter<'_> {
        OccurrenceIter::new(self, reference, Direction::Forward)
    }

    /// Creates an iterator of the times this schedule fired before `reference`, in descending
    /// order. The iterator ends once a search is exhausted.
    #[inline]
    pub fn iter_before(&self, reference: NaiveDateTime) -> OccurrenceIter<'_> {
        OccurrenceIter::new(self, reference, Direction::Backward)
    }

    /// Returns up to `count` times this schedule fires after `reference`, in ascending order.
    /// The result is incomplete if a search was exhausted first, or if `count` is above the
    /// schedule's [`SearchLimits::max_occurrences`].
    pub fn next_occurrences(&self, reference: NaiveDateTime, count: usize) -> Occurrences {
        Occurrences::take(self.iter_after(reference), count)
    }

    /// Returns up to `count` times this schedule fired before `reference`, in descending order.
    /// The result is incomplete if a search was exhausted first, or if `count` is above the
    /// schedule's [`SearchLimits::max_occurrences`].
    pub fn last_occurrences(&self, reference: NaiveDateTime, count: usize) -> Occurrences {
        Occurrences::take(self.iter_before(reference), count)
    }
}

/// Builds a schedule from the allowed values of its five fields. Same as [`Schedule::new`].
#[inline]
pub fn build_schedule(
    minute: FieldSpec,
    hour: FieldSpec,
    day_of_month: FieldSpec,
    month: FieldSpec,
    day_of_week: FieldSpec,
) -> Result<Schedule, ParseError> {
    Schedule::new(minute, hour, day_of_month, month, day_of_week)
}

/// Same as [`Schedule::next_after`].
#[inline]
pub fn next_occurrence(
    schedule: &Schedule,
    reference: NaiveDateTime,
) -> Result<NaiveDateTime, SearchExhausted> {
    schedule.next_after(reference)
}

/// Same as [`Schedule::last_before`].
#[inline]
pub fn last_occurrence(
    schedule: &Schedule,
    reference: NaiveDateTime,
) -> Result<NaiveDateTime, SearchExhausted> {
    schedule.last_before(reference)
}

/// Same as [`Schedule::next_occurrences`].
#[inline]
pub fn next_occurrences(schedule: &Schedule, reference: NaiveDateTime, count: usize) -> Occurrences {
    schedule.next_occurrences(reference, count)
}

/// Same as [`Schedule::last_occurrences`].
#[inline]
pub fn last_occurrences(schedule: &Schedule, reference: NaiveDateTime, count: usize) -> Occurrences {
    schedule.last_occurrences(reference, count)
}
