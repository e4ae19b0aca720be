//! The occurrence search: walking a calendar cursor forward or backward until every field of a
//! schedule matches.
//!
//! Each pass of the search climbs down a ladder of fields, month, day, hour and minute. At every
//! rung the cursor either already matches, moves to the nearest allowed value inside the current
//! unit (resetting the finer fields), or runs out of allowed values and carries into the next
//! coarser unit. A carry restarts the ladder from the month, since moving a coarse field
//! invalidates whatever the finer fields had found.

#[cfg(not(any(feature = "std", test)))]
use alloc::vec::Vec;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use core::cmp;
use core::iter::FusedIterator;
use core::slice;
use tracing::{debug, trace};

use crate::{days_in_month, Schedule};

/// Bounds on how far a single search may travel before giving up.
///
/// # Example
/// ```
/// use cronseek::{Schedule, SearchLimits};
/// use chrono::NaiveDate;
///
/// let leap_days: Schedule = "0 0 29 2 *".parse().unwrap();
/// let after_2096 = NaiveDate::from_ymd_opt(2096, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// // 2100 isn't a leap year, so the next leap day is 8 years away
/// assert!(leap_days.next_after(after_2096).is_ok());
///
/// let impatient = leap_days.with_limits(SearchLimits::new().with_max_years(4));
/// assert!(impatient.next_after(after_2096).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct SearchLimits {
    /// The number of calendar years a search may move away from its first candidate minute (the
    /// minute after or before the reference) before it reports [`SearchExhausted`].
    pub max_years: u32,
    /// The most times a bounded-sequence query collects, whatever count it was asked for.
    pub max_occurrences: usize,
}

impl SearchLimits {
    /// The default year bound. The longest gap between two occurrences of a schedule that can
    /// match at all is 8 years, a February 29th across a skipped century leap year.
    pub const DEFAULT_MAX_YEARS: u32 = 10;

    /// The default ceiling on bounded-sequence queries.
    pub const DEFAULT_MAX_OCCURRENCES: usize = 100_000;

    /// Creates limits with their default values
    pub const fn new() -> Self {
        Self {
            max_years: Self::DEFAULT_MAX_YEARS,
            max_occurrences: Self::DEFAULT_MAX_OCCURRENCES,
        }
    }

    /// Sets the year bound
    pub const fn with_max_years(self, max_years: u32) -> Self {
        Self { max_years, ..self }
    }

    /// Sets the ceiling on bounded-sequence queries
    pub const fn with_max_occurrences(self, max_occurrences: usize) -> Self {
        Self {
            max_occurrences,
            ..self
        }
    }

    #[inline]
    fn exceeded(&self, from_year: i32, to_year: i32) -> bool {
        (i64::from(to_year) - i64::from(from_year)).unsigned_abs() > u64::from(self.max_years)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::new()
    }
}

/// An error returned when no matching time was found within the search limits of a schedule.
///
/// A schedule that can never match, like one for February 31st, reports this straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("no matching time within {max_years} years of the reference time")]
pub struct SearchExhausted {
    max_years: u32,
}

impl SearchExhausted {
    /// The year bound the search gave up at
    pub fn max_years(&self) -> u32 {
        self.max_years
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

/// The unit a carry moved the cursor into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Day,
    Hour,
}

/// The outcome of one pass down the field ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Every field matches the cursor
    Matched,
    /// A field ran out of values and the cursor moved into the next (or previous) unit
    Carried(Unit),
}

/// A calendar position with minute precision. Always a real date: every field is within its
/// domain and the day exists in its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

impl Cursor {
    /// Truncates the seconds of the given time
    fn new(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }

    fn to_datetime(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            0,
        )
    }

    #[inline]
    fn in_calendar(&self) -> bool {
        (NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&self.year)
    }

    #[inline]
    fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    fn start_month(&mut self, month: u32) {
        *self = Self {
            month,
            day: 1,
            hour: 0,
            minute: 0,
            ..*self
        };
    }

    fn start_day(&mut self, day: u32) {
        *self = Self {
            day,
            hour: 0,
            minute: 0,
            ..*self
        };
    }

    fn start_hour(&mut self, hour: u32) {
        self.hour = hour;
        self.minute = 0;
    }

    fn advance_year(&mut self) {
        self.year = self.year.saturating_add(1);
        self.start_month(1);
    }

    fn advance_month(&mut self) {
        if self.month == 12 {
            self.advance_year();
        } else {
            self.start_month(self.month + 1);
        }
    }

    fn advance_day(&mut self) {
        if self.day >= self.days_in_month() {
            self.advance_month();
        } else {
            self.start_day(self.day + 1);
        }
    }

    fn advance_hour(&mut self) {
        if self.hour == 23 {
            self.advance_day();
        } else {
            self.start_hour(self.hour + 1);
        }
    }

    fn advance_minute(&mut self) {
        if self.minute == 59 {
            self.advance_hour();
        } else {
            self.minute += 1;
        }
    }

    fn end_month(&mut self, month: u32) {
        self.month = month;
        let day = self.days_in_month();
        self.end_day(day);
    }

    fn end_day(&mut self, day: u32) {
        *self = Self {
            day,
            hour: 23,
            minute: 59,
            ..*self
        };
    }

    fn end_hour(&mut self, hour: u32) {
        self.hour = hour;
        self.minute = 59;
    }

    fn retreat_year(&mut self) {
        self.year = self.year.saturating_sub(1);
        self.end_month(12);
    }

    fn retreat_month(&mut self) {
        if self.month == 1 {
            self.retreat_year();
        } else {
            self.end_month(self.month - 1);
        }
    }

    fn retreat_day(&mut self) {
        if self.day == 1 {
            self.retreat_month();
        } else {
            self.end_day(self.day - 1);
        }
    }

    fn retreat_hour(&mut self) {
        if self.hour == 0 {
            self.retreat_day();
        } else {
            self.end_hour(self.hour - 1);
        }
    }

    fn retreat_minute(&mut self) {
        if self.minute == 0 {
            self.retreat_hour();
        } else {
            self.minute -= 1;
        }
    }
}

/// The day of the week, 0-6 (Sun-Sat)
#[inline]
fn weekday(year: i32, month: u32, day: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.weekday().num_days_from_sunday())
}

impl Schedule {
    /// Finds the closest matching time strictly after (or before) the minute of `reference`.
    pub(crate) fn search(
        &self,
        reference: NaiveDateTime,
        direction: Direction,
    ) -> Result<NaiveDateTime, SearchExhausted> {
        let exhausted = SearchExhausted {
            max_years: self.limits.max_years,
        };

        if !self.any() {
            debug!("schedule can never match, skipping search");
            return Err(exhausted);
        }

        let mut cursor = Cursor::new(reference);
        match direction {
            Direction::Forward => cursor.advance_minute(),
            Direction::Backward => cursor.retreat_minute(),
        }
        let start_year = cursor.year;

        loop {
            if !cursor.in_calendar() {
                debug!(year = cursor.year, "search left the representable calendar");
                return Err(exhausted);
            }
            if self.limits.exceeded(start_year, cursor.year) {
                debug!(
                    %reference,
                    max_years = self.limits.max_years,
                    "search exceeded its year bound"
                );
                return Err(exhausted);
            }

            let step = match direction {
                Direction::Forward => self.step_forward(&mut cursor),
                Direction::Backward => self.step_backward(&mut cursor),
            };
            match step {
                Step::Matched => return cursor.to_datetime().ok_or(exhausted),
                Step::Carried(unit) => trace!(
                    ?unit,
                    year = cursor.year,
                    month = cursor.month,
                    day = cursor.day,
                    hour = cursor.hour,
                    "carried"
                ),
            }
        }
    }

    /// One pass down the ladder, moving the cursor forward in time.
    fn step_forward(&self, cursor: &mut Cursor) -> Step {
        match self.months.smallest_at_least(cursor.month) {
            Some(month) if month == cursor.month => {}
            Some(month) => cursor.start_month(month),
            None => {
                cursor.advance_year();
                return Step::Carried(Unit::Year);
            }
        }

        match self.next_day_in_month(cursor.year, cursor.month, cursor.day) {
            Some(day) if day == cursor.day => {}
            Some(day) => cursor.start_day(day),
            None => {
                cursor.advance_month();
                return Step::Carried(Unit::Month);
            }
        }

        match self.hours.smallest_at_least(cursor.hour) {
            Some(hour) if hour == cursor.hour => {}
            Some(hour) => cursor.start_hour(hour),
            None => {
                cursor.advance_day();
                return Step::Carried(Unit::Day);
            }
        }

        match self.minutes.smallest_at_least(cursor.minute) {
            Some(minute) => {
                cursor.minute = minute;
                Step::Matched
            }
            None => {
                cursor.advance_hour();
                Step::Carried(Unit::Hour)
            }
        }
    }

    /// One pass down the ladder, moving the cursor backward in time.
    fn step_backward(&self, cursor: &mut Cursor) -> Step {
        match self.months.largest_at_most(cursor.month) {
            Some(month) if month == cursor.month => {}
            Some(month) => cursor.end_month(month),
            None => {
                cursor.retreat_year();
                return Step::Carried(Unit::Year);
            }
        }

        match self.previous_day_in_month(cursor.year, cursor.month, cursor.day) {
            Some(day) if day == cursor.day => {}
            Some(day) => cursor.end_day(day),
            None => {
                cursor.retreat_month();
                return Step::Carried(Unit::Month);
            }
        }

        match self.hours.largest_at_most(cursor.hour) {
            Some(hour) if hour == cursor.hour => {}
            Some(hour) => cursor.end_hour(hour),
            None => {
                cursor.retreat_day();
                return Step::Carried(Unit::Day);
            }
        }

        match self.minutes.largest_at_most(cursor.minute) {
            Some(minute) => {
                cursor.minute = minute;
                Step::Matched
            }
            None => {
                cursor.retreat_hour();
                Step::Carried(Unit::Hour)
            }
        }
    }

    /// Gets the first day of the month, starting at `day` inclusive, matching the day of the
    /// month or day of the week fields.
    fn next_day_in_month(&self, year: i32, month: u32, day: u32) -> Option<u32> {
        let last_day = days_in_month(year, month);

        let by_day_of_month = || {
            self.days_of_month
                .smallest_at_least(day)
                .filter(|&next| next <= last_day)
        };
        let by_day_of_week = || {
            let current = weekday(year, month, day)?;
            let offset = match self.days_of_week.smallest_at_least(current) {
                Some(next) => next - current,
                // nothing left this week, go to the first day in the next one
                None => self.days_of_week.first() + 7 - current,
            };
            Some(day + offset).filter(|&next| next <= last_day)
        };

        match (
            self.days_of_month.is_wildcard(),
            self.days_of_week.is_wildcard(),
        ) {
            (true, true) => Some(day),
            (true, false) => by_day_of_week(),
            (false, true) => by_day_of_month(),
            (false, false) => match (by_day_of_month(), by_day_of_week()) {
                (Some(a), Some(b)) => Some(cmp::min(a, b)),
                (a, b) => a.or(b),
            },
        }
    }

    /// Gets the last day of the month, starting at `day` inclusive and going back, matching the
    /// day of the month or day of the week fields.
    fn previous_day_in_month(&self, year: i32, month: u32, day: u32) -> Option<u32> {
        let by_day_of_month = || self.days_of_month.largest_at_most(day);
        let by_day_of_week = || {
            let current = weekday(year, month, day)?;
            let offset = match self.days_of_week.largest_at_most(current) {
                Some(previous) => current - previous,
                None => current + 7 - self.days_of_week.last(),
            };
            day.checked_sub(offset).filter(|&previous| previous >= 1)
        };

        match (
            self.days_of_month.is_wildcard(),
            self.days_of_week.is_wildcard(),
        ) {
            (true, true) => Some(day),
            (true, false) => by_day_of_week(),
            (false, true) => by_day_of_month(),
            (false, false) => match (by_day_of_month(), by_day_of_week()) {
                (Some(a), Some(b)) => Some(cmp::max(a, b)),
                (a, b) => a.or(b),
            },
        }
    }
}

/// An iterator over the matching times of a schedule, moving away from a reference time one
/// occurrence at a time. Ends once a search is exhausted.
///
/// Created with [`Schedule::iter_after`] and [`Schedule::iter_before`].
#[derive(Debug, Clone)]
pub struct OccurrenceIter<'a> {
    schedule: &'a Schedule,
    direction: Direction,
    reference: Option<NaiveDateTime>,
}

impl<'a> OccurrenceIter<'a> {
    pub(crate) fn new(
        schedule: &'a Schedule,
        reference: NaiveDateTime,
        direction: Direction,
    ) -> Self {
        Self {
            schedule,
            direction,
            reference: Some(reference),
        }
    }

    /// Returns the underlying schedule.
    pub fn schedule(&self) -> &'a Schedule {
        self.schedule
    }
}

impl Iterator for OccurrenceIter<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let reference = self.reference?;
        match self.schedule.search(reference, self.direction) {
            Ok(time) => {
                self.reference = Some(time);
                Some(time)
            }
            Err(_) => {
                self.reference = None;
                None
            }
        }
    }
}

impl FusedIterator for OccurrenceIter<'_> {}

/// A bounded run of occurrences, as returned by [`Schedule::next_occurrences`] and
/// [`Schedule::last_occurrences`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrences {
    times: Vec<NaiveDateTime>,
    complete: bool,
}

impl Occurrences {
    pub(crate) fn take(iter: OccurrenceIter<'_>, count: usize) -> Self {
        let max_occurrences = iter.schedule().limits.max_occurrences;
        if count > max_occurrences {
            debug!(count, max_occurrences, "clamping occurrence count");
        }

        let times: Vec<_> = iter.take(cmp::min(count, max_occurrences)).collect();
        let complete = times.len() == count;
        Self { times, complete }
    }

    /// Returns whether as many times were found as were asked for. If not, a search was
    /// exhausted or the count was above [`SearchLimits::max_occurrences`].
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The times found, ordered moving away from the reference
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// The number of times found
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns whether no times were found.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterates over the times found
    pub fn iter(&self) -> slice::Iter<'_, NaiveDateTime> {
        self.times.iter()
    }

    /// Consumes the result, returning the times found
    pub fn into_times(self) -> Vec<NaiveDateTime> {
        self.times
    }
}

impl IntoIterator for Occurrences {
    type Item = NaiveDateTime;
    type IntoIter = <Vec<NaiveDateTime> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.times.into_iter()
    }
}

impl<'a> IntoIterator for &'a Occurrences {
    type Item = &'a NaiveDateTime;
    type IntoIter = slice::Iter<'a, NaiveDateTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    const FORMAT: &str = "%F %R";

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, FORMAT).expect("Failed to parse date")
    }

    fn times(times: &[&str]) -> Vec<NaiveDateTime> {
        times.iter().map(|&s| at(s)).collect()
    }

    fn schedule(cron: &str) -> Schedule {
        cron.parse().expect("Failed to parse cron expression")
    }

    fn assert_next(cron: &str, from: &str, expected: &[&str]) {
        let found = schedule(cron)
            .iter_after(at(from))
            .take(expected.len())
            .collect::<Vec<_>>();
        assert_eq!(found, times(expected), "next times of \"{}\" after {}", cron, from);
    }

    fn assert_last(cron: &str, from: &str, expected: &[&str]) {
        let found = schedule(cron)
            .iter_before(at(from))
            .take(expected.len())
            .collect::<Vec<_>>();
        assert_eq!(found, times(expected), "last times of \"{}\" before {}", cron, from);
    }

    #[test]
    fn daily_at_18_30() {
        let cron = schedule("30 18 * * *");
        let reference = at("2015-10-12 18:33");

        assert_eq!(cron.next_after(reference), Ok(at("2015-10-13 18:30")));
        assert_eq!(cron.last_before(reference), Ok(at("2015-10-12 18:30")));
    }

    #[test]
    fn reference_minute_is_excluded() {
        assert_next("30 18 * * *", "2015-10-12 18:30", &["2015-10-13 18:30"]);
        assert_last("30 18 * * *", "2015-10-12 18:30", &["2015-10-11 18:30"]);
        assert_next("* * * * *", "2015-10-12 18:30", &["2015-10-12 18:31"]);
        assert_last("* * * * *", "2015-10-12 18:30", &["2015-10-12 18:29"]);
    }

    #[test]
    fn reference_seconds_are_truncated() {
        let cron = schedule("30 18 * * *");
        let day = NaiveDate::from_ymd_opt(2015, 10, 12).unwrap();

        let before = day.and_hms_opt(18, 29, 59).unwrap();
        assert_eq!(cron.next_after(before), Ok(at("2015-10-12 18:30")));

        let during = day.and_hms_milli_opt(18, 30, 30, 500).unwrap();
        assert_eq!(cron.next_after(during), Ok(at("2015-10-13 18:30")));
        assert_eq!(cron.last_before(during), Ok(at("2015-10-11 18:30")));

        let next = cron.next_after(before).unwrap();
        assert_eq!(next.second(), 0);
        assert_eq!(next.nanosecond(), 0);
    }

    #[test]
    fn day_of_month_or_day_of_week() {
        // the 1st of every month and every Monday
        let cron = "0 0 1 * 1";
        assert_next(
            cron,
            "2024-01-01 00:00",
            &[
                "2024-01-08 00:00",
                "2024-01-15 00:00",
                "2024-01-22 00:00",
                "2024-01-29 00:00",
                "2024-02-01 00:00", // Thursday
                "2024-02-05 00:00",
                "2024-02-12 00:00",
                "2024-02-19 00:00",
                "2024-02-26 00:00",
                "2024-03-01 00:00", // Friday
                "2024-03-04 00:00",
            ],
        );
        assert_last(
            cron,
            "2024-03-04 00:00",
            &[
                "2024-03-01 00:00",
                "2024-02-26 00:00",
                "2024-02-19 00:00",
                "2024-02-12 00:00",
                "2024-02-05 00:00",
                "2024-02-01 00:00",
                "2024-01-29 00:00",
            ],
        );
    }

    #[test]
    fn wildcard_day_of_week_is_not_a_full_list() {
        // only the 15th
        assert_next(
            "0 0 15 * *",
            "2024-01-01 00:00",
            &["2024-01-15 00:00", "2024-02-15 00:00"],
        );
        // the 15th or any day of the week, so every day
        assert_next(
            "0 0 15 * 0-6",
            "2024-01-01 00:00",
            &["2024-01-02 00:00", "2024-01-03 00:00"],
        );
    }

    #[test]
    fn both_day_fields_wildcard_matches_every_day() {
        let cron = schedule("0 12 * * *");
        let found = cron.next_occurrences(at("2024-02-27 13:00"), 4);

        assert!(found.is_complete());
        assert_eq!(
            found.into_times(),
            times(&[
                "2024-02-28 12:00",
                "2024-02-29 12:00",
                "2024-03-01 12:00",
                "2024-03-02 12:00",
            ])
        );
    }

    #[test]
    fn weekdays_only() {
        assert_next("0 9 * * 1-5", "2024-01-05 09:00", &["2024-01-08 09:00"]);
        assert_last("0 9 * * MON-FRI", "2024-01-08 09:00", &["2024-01-05 09:00"]);
    }

    #[test]
    fn weekday_across_month_ends() {
        assert_next("0 0 * * SUN", "2024-01-29 00:00", &["2024-02-04 00:00"]);
        assert_last("0 0 * * SAT", "2024-02-02 00:00", &["2024-01-27 00:00"]);
    }

    #[test]
    fn thirty_first_skips_short_months() {
        let cron = "0 0 31 * *";
        assert_next(
            cron,
            "2021-01-31 00:00",
            &[
                "2021-03-31 00:00",
                "2021-05-31 00:00",
                "2021-07-31 00:00",
                "2021-08-31 00:00",
                "2021-10-31 00:00",
                "2021-12-31 00:00",
                "2022-01-31 00:00",
            ],
        );
        assert_last(
            cron,
            "2021-03-31 00:00",
            &["2021-01-31 00:00", "2020-12-31 00:00", "2020-10-31 00:00"],
        );
    }

    #[test]
    fn year_boundaries() {
        assert_next("* * * * *", "2020-12-31 23:59", &["2021-01-01 00:00"]);
        assert_last("* * * * *", "2021-01-01 00:00", &["2020-12-31 23:59"]);
        assert_next("59 23 31 12 *", "2020-12-31 23:59", &["2021-12-31 23:59"]);
        assert_last("59 23 31 12 *", "2021-06-01 00:00", &["2020-12-31 23:59"]);
        assert_next("0 0 1 1 *", "2020-01-01 00:01", &["2021-01-01 00:00"]);
    }

    #[test]
    fn leap_days() {
        let cron = "0 0 29 2 *";
        assert_next(
            cron,
            "2088-01-01 00:00",
            &[
                "2088-02-29 00:00",
                "2092-02-29 00:00",
                "2096-02-29 00:00",
                // 2100 isn't a leap year
                "2104-02-29 00:00",
            ],
        );
        assert_last(cron, "2104-02-01 00:00", &["2096-02-29 00:00"]);
    }

    #[test]
    fn february_31st_never_matches() {
        let cron = schedule("0 0 31 2 *");
        let reference = at("2024-01-01 00:00");

        assert_eq!(
            cron.next_after(reference),
            Err(SearchExhausted {
                max_years: SearchLimits::DEFAULT_MAX_YEARS
            })
        );
        assert!(cron.last_before(reference).is_err());
        assert_eq!(cron.iter_after(reference).next(), None);
    }

    #[test]
    fn year_bound_cuts_sequences_short() {
        let cron = schedule("0 0 29 2 *").with_limits(SearchLimits::new().with_max_years(4));

        let found = cron.next_occurrences(at("2088-01-01 00:00"), 5);
        assert!(!found.is_complete());
        assert_eq!(
            found.times(),
            &times(&["2088-02-29 00:00", "2092-02-29 00:00", "2096-02-29 00:00"])[..]
        );

        let err = cron.next_after(at("2096-03-01 00:00")).unwrap_err();
        assert_eq!(err.max_years(), 4);
    }

    #[test]
    fn zero_year_bound_stays_within_the_first_candidate_year() {
        let cron = schedule("* * * * *").with_limits(SearchLimits::new().with_max_years(0));

        assert_eq!(
            cron.next_after(at("2020-12-31 23:58")),
            Ok(at("2020-12-31 23:59"))
        );
        // the first candidate is already in 2021
        assert_eq!(
            cron.next_after(at("2020-12-31 23:59")),
            Ok(at("2021-01-01 00:00"))
        );
        assert_eq!(
            cron.last_before(at("2021-01-01 00:00")),
            Ok(at("2020-12-31 23:59"))
        );

        let new_year = schedule("0 0 1 1 *").with_limits(SearchLimits::new().with_max_years(0));
        assert!(new_year.next_after(at("2020-06-01 00:00")).is_err());
        assert!(new_year.last_before(at("2020-06-01 00:00")).is_err());
    }

    #[test]
    fn year_bound_cuts_backward_sequences_short() {
        let cron = schedule("0 0 29 2 *").with_limits(SearchLimits::new().with_max_years(4));

        let found = cron.last_occurrences(at("2112-01-01 00:00"), 5);
        assert!(!found.is_complete());
        // 2096 is 8 years before 2104
        assert_eq!(
            found.into_times(),
            times(&["2108-02-29 00:00", "2104-02-29 00:00"])
        );
    }

    #[test]
    fn calendar_edges_are_exhausted() {
        let cron = schedule("* * * * *");

        assert_eq!(
            cron.next_after(NaiveDateTime::MAX),
            Err(SearchExhausted {
                max_years: SearchLimits::DEFAULT_MAX_YEARS
            })
        );
        assert!(cron.last_before(NaiveDateTime::MIN).is_err());
        assert_eq!(cron.iter_after(NaiveDateTime::MAX).next(), None);
    }

    #[test]
    fn occurrence_count_is_clamped() {
        let cron = schedule("* * * * *").with_limits(SearchLimits::new().with_max_occurrences(3));
        let reference = at("2020-01-01 00:00");

        let found = cron.next_occurrences(reference, 5);
        assert!(!found.is_complete());
        assert_eq!(
            found.into_times(),
            times(&["2020-01-01 00:01", "2020-01-01 00:02", "2020-01-01 00:03"])
        );

        let found = cron.last_occurrences(reference, usize::MAX);
        assert!(!found.is_complete());
        assert_eq!(found.len(), 3);

        let found = cron.next_occurrences(reference, 3);
        assert!(found.is_complete());
    }

    #[test]
    fn one_hundred_daily_occurrences() {
        let cron = schedule("30 18 * * *");
        let found = cron.next_occurrences(at("2015-10-12 18:33"), 100);

        assert!(found.is_complete());
        assert_eq!(found.len(), 100);
        assert_eq!(found.times()[0], at("2015-10-13 18:30"));
        for pair in found.times().windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::hours(24));
        }

        let found = cron.last_occurrences(at("2015-10-12 18:33"), 100);
        assert!(found.is_complete());
        assert_eq!(found.times()[0], at("2015-10-12 18:30"));
        for pair in found.times().windows(2) {
            assert_eq!(pair[0] - pair[1], Duration::hours(24));
        }
    }

    #[test]
    fn zero_occurrences_is_complete() {
        let found = schedule("* * * * *").next_occurrences(at("2020-01-01 00:00"), 0);
        assert!(found.is_complete());
        assert!(found.is_empty());
    }

    #[test]
    fn iterator_is_fused_after_exhaustion() {
        let cron = schedule("0 0 29 2 *").with_limits(SearchLimits::new().with_max_years(1));
        let mut iter = cron.iter_after(at("2024-01-01 00:00"));

        assert_eq!(iter.next(), Some(at("2024-02-29 00:00")));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[rstest]
    #[case("*/7 9-17 * * 1-5")]
    #[case("0 0 1 * 1")]
    #[case("15,45 */6 * * *")]
    #[case("0 12 13 * FRI")]
    #[case("30 18 * * *")]
    #[case("0 0 31 * *")]
    #[case("0 0 29 2 *")]
    fn chained_searches_match_sequences(#[case] cron: &str) {
        let cron = schedule(cron);
        let reference = at("2019-12-30 07:45");

        let mut next = reference;
        let mut last = reference;
        let mut chained_next = Vec::new();
        let mut chained_last = Vec::new();
        for _ in 0..25 {
            next = cron.next_after(next).unwrap();
            last = cron.last_before(last).unwrap();
            chained_next.push(next);
            chained_last.push(last);
        }

        assert_eq!(cron.next_occurrences(reference, 25).into_times(), chained_next);
        assert_eq!(cron.last_occurrences(reference, 25).into_times(), chained_last);
    }

    #[rstest]
    #[case("*/7 9-17 * * 1-5")]
    #[case("0 0 1 * 1")]
    #[case("15,45 */6 * * *")]
    #[case("0 12 13 * FRI")]
    #[case("0 0 31 * *")]
    #[case("0 0 29 2 *")]
    fn forward_then_backward_brackets(#[case] cron: &str) {
        let cron = schedule(cron);
        for reference in &["2015-10-12 18:33", "2099-12-31 23:59", "2024-02-29 00:00"] {
            let reference = at(reference);

            let next = cron.next_after(reference).unwrap();
            let last = cron.last_before(next).unwrap();
            assert!(last <= reference);
            assert_eq!(cron.next_after(last), Ok(next));

            let last = cron.last_before(reference).unwrap();
            let next = cron.next_after(last).unwrap();
            assert!(next >= reference);
            assert_eq!(cron.last_before(next), Ok(last));
        }
    }

    #[rstest]
    #[case("*/7 9-17 * * 1-5")]
    #[case("0 0 1 * 1")]
    #[case("15,45 */6 * * *")]
    #[case("0 12 13 * FRI")]
    #[case("0 12 * * 0,6")]
    fn searches_skip_no_matching_minute(#[case] cron: &str) {
        let cron = schedule(cron);
        for reference in &["2020-02-27 23:59", "2021-12-31 12:00", "2024-02-29 08:03"] {
            let reference = at(reference);

            let next = cron.next_after(reference).unwrap();
            assert!(next > reference && cron.contains(next));
            let mut minute = reference + Duration::minutes(1);
            while minute < next {
                assert!(!cron.contains(minute), "skipped over {}", minute);
                minute += Duration::minutes(1);
            }

            let last = cron.last_before(reference).unwrap();
            assert!(last < reference && cron.contains(last));
            let mut minute = reference - Duration::minutes(1);
            while minute > last {
                assert!(!cron.contains(minute), "skipped over {}", minute);
                minute -= Duration::minutes(1);
            }
        }
    }

    #[test]
    fn limits_builder() {
        assert_eq!(SearchLimits::default(), SearchLimits::new());
        assert_eq!(SearchLimits::new().max_years, 10);
        assert_eq!(SearchLimits::new().with_max_years(3).max_years, 3);
        assert_eq!(SearchLimits::new().max_occurrences, 100_000);

        let limits = SearchLimits::new()
            .with_max_occurrences(7)
            .with_max_years(2);
        assert_eq!(limits.max_occurrences, 7);
        assert_eq!(limits.max_years, 2);
    }

    #[test]
    fn exhausted_message() {
        let err = SearchExhausted { max_years: 10 };
        assert_eq!(
            err.to_string(),
            "no matching time within 10 years of the reference time"
        );
    }
}
