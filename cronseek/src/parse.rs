//! Parsing of five-field cron expressions into the value sets a [`Schedule`] is built from.
//!
//! The grammar is the classic crontab one: `*`, values, `a-b` ranges (wrapping around the end of
//! the field when `a > b`), `/step` suffixes and comma separated lists, with month and weekday
//! names and the `@daily`-style shortcuts.
//!
//! [`Schedule`]: ../struct.Schedule.html

#[cfg(not(any(feature = "std", test)))]
use alloc::vec::{self, Vec};

use core::iter::{Chain, Once};
use core::slice;
use core::str::FromStr;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, space1},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{preceded, tuple},
    IResult,
};

#[cfg(any(feature = "std", test))]
use std::vec;

use crate::field::{Field, FieldSpec};

/// An error returned if a schedule can't be built from the given fields or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A field doesn't allow any value, so the schedule could never fire
    #[error("the {field} field doesn't allow any values")]
    EmptyField {
        /// The empty field
        field: Field,
    },
    /// A value is outside the domain of its field, like an hour of 25
    #[error("{value} is out of range for the {field} field")]
    OutOfDomain {
        /// The field the value was given for
        field: Field,
        /// The offending value
        value: u32,
    },
    /// The expression string isn't a valid cron expression
    #[error("failed to parse cron expression")]
    InvalidExpression,
}

/// Either one value, a range, or a step expression. Values are unchecked until the expression is
/// expanded for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrsExpr {
    /// One value
    One(u32),
    /// A '-' character. If the start is greater than the end the range wraps around the field.
    Range(u32, u32),
    /// A '/' character.
    Step {
        /// The start value. If the start value is '*', this is the min value of the field.
        start: u32,
        /// The end value. If the step expression does not specify a value, this is the max value
        /// of the field.
        end: u32,
        /// The step value.
        step: u32,
    },
}

/// A set of expressions with at least one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exprs {
    /// The first expression
    pub first: OrsExpr,
    /// The rest of the other expressions in the set.
    pub tail: Vec<OrsExpr>,
}

/// An immutable iterator over all expressions in a set of [`Exprs`]
pub type ExprsIter<'a> = Chain<Once<&'a OrsExpr>, slice::Iter<'a, OrsExpr>>;

/// An owned iterator over all expressions in a set of [`Exprs`]
pub type IntoExprsIter = Chain<Once<OrsExpr>, vec::IntoIter<OrsExpr>>;

impl Exprs {
    /// Creates a new set of [`Exprs`] using the first given [`OrsExpr`]
    pub fn new(first: OrsExpr) -> Self {
        Self {
            first,
            tail: Vec::new(),
        }
    }

    /// Iterates over all expressions in this set
    pub fn iter(&self) -> ExprsIter {
        core::iter::once(&self.first).chain(self.tail.iter())
    }
}

impl IntoIterator for Exprs {
    type Item = OrsExpr;
    type IntoIter = IntoExprsIter;

    fn into_iter(self) -> Self::IntoIter {
        core::iter::once(self.first).chain(self.tail)
    }
}

impl<'a> IntoIterator for &'a Exprs {
    type Item = &'a OrsExpr;
    type IntoIter = ExprsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A field expression that can take a '*' or many exprs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Expr {
    /// A '*' character
    All,
    /// Possibly multiple unique, ranges, or steps
    Many(Exprs),
}

impl Expr {
    /// Expands the expression into the values it allows for `field`.
    ///
    /// In the day of week field `7` is accepted as another name for Sunday and folds into `0`.
    ///
    /// # Example
    /// ```
    /// use cronseek::parse::{Expr, Exprs, OrsExpr};
    /// use cronseek::{Field, FieldSpec};
    ///
    /// let hours = Expr::Many(Exprs::new(OrsExpr::Range(22, 2)));
    /// assert_eq!(hours.expand(Field::Hour), Ok(FieldSpec::Many(vec![22, 23, 0, 1, 2])));
    /// ```
    pub fn expand(&self, field: Field) -> Result<FieldSpec, ParseError> {
        let exprs = match self {
            Expr::All => return Ok(FieldSpec::All),
            Expr::Many(exprs) => exprs,
        };

        let check = |value: u32| match (field, value) {
            (Field::DayOfWeek, 7) => Ok(0),
            (_, value) if field.in_domain(value) => Ok(value),
            (_, value) => Err(ParseError::OutOfDomain { field, value }),
        };

        let mut values = Vec::new();
        for expr in exprs {
            let (start, end, step) = match *expr {
                OrsExpr::One(value) => {
                    values.push(check(value)?);
                    continue;
                }
                OrsExpr::Range(start, end) => (start, end, 1),
                OrsExpr::Step { start, end, step } => (start, end, step),
            };
            if step == 0 {
                return Err(ParseError::InvalidExpression);
            }

            let (start, end) = (check(start)?, check(end)?);
            let step = step as usize;
            if start <= end {
                values.extend((start..=end).step_by(step));
            } else {
                // wrap around, for example hours 22-2 are 22,23,0,1,2
                let back = start..=field.max();
                let front = field.min()..=end;
                values.extend(back.chain(front).step_by(step));
            }
        }

        Ok(FieldSpec::Many(values))
    }
}

/// A parsed cron expression. This can be expanded field by field or built straight into a
/// [`Schedule`](../struct.Schedule.html).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CronExpr {
    /// The minute part of the expression
    pub minutes: Expr,
    /// The hour part of the expression
    pub hours: Expr,
    /// The day of the month part of the expression
    pub days_of_month: Expr,
    /// The month part of the expression
    pub months: Expr,
    /// The day of the week part of the expression.
    pub days_of_week: Expr,
}

impl CronExpr {
    /// Expands every field, in expression order.
    pub fn expand(&self) -> Result<[FieldSpec; 5], ParseError> {
        Ok([
            self.minutes.expand(Field::Minute)?,
            self.hours.expand(Field::Hour)?,
            self.days_of_month.expand(Field::DayOfMonth)?,
            self.months.expand(Field::Month)?,
            self.days_of_week.expand(Field::DayOfWeek)?,
        ])
    }
}

const SHORTCUTS: [(&str, &str); 7] = [
    ("@yearly", "0 0 1 1 *"),
    ("@annually", "0 0 1 1 *"),
    ("@monthly", "0 0 1 * *"),
    ("@weekly", "0 0 * * 0"),
    ("@daily", "0 0 * * *"),
    ("@midnight", "0 0 * * *"),
    ("@hourly", "0 * * * *"),
];

fn shortcut(s: &str) -> Option<&'static str> {
    SHORTCUTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|&(_, expr)| expr)
}

#[inline]
fn map_digit1(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

/// A step is any number but zero
#[inline]
fn step_digit(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| {
        s.parse::<u32>().ok().filter(|&step| step != 0).ok_or(())
    })(input)
}

fn month(s: &str) -> IResult<&str, u32> {
    alt((
        map_digit1,
        map(tag_no_case("JAN"), |_| 1),
        map(tag_no_case("FEB"), |_| 2),
        map(tag_no_case("MAR"), |_| 3),
        map(tag_no_case("APR"), |_| 4),
        map(tag_no_case("MAY"), |_| 5),
        map(tag_no_case("JUN"), |_| 6),
        map(tag_no_case("JUL"), |_| 7),
        map(tag_no_case("AUG"), |_| 8),
        map(tag_no_case("SEP"), |_| 9),
        map(tag_no_case("OCT"), |_| 10),
        map(tag_no_case("NOV"), |_| 11),
        map(tag_no_case("DEC"), |_| 12),
    ))(s)
}

fn weekday(s: &str) -> IResult<&str, u32> {
    alt((
        map_digit1,
        map(tag_no_case("SUN"), |_| 0),
        map(tag_no_case("MON"), |_| 1),
        map(tag_no_case("TUE"), |_| 2),
        map(tag_no_case("WED"), |_| 3),
        map(tag_no_case("THU"), |_| 4),
        map(tag_no_case("FRI"), |_| 5),
        map(tag_no_case("SAT"), |_| 6),
    ))(s)
}

/// A parser for one value of the field, numeric or named
fn value(field: Field) -> impl Fn(&str) -> IResult<&str, u32> {
    move |input: &str| match field {
        Field::Month => month(input),
        Field::DayOfWeek => weekday(input),
        _ => map_digit1(input),
    }
}

/// A parser that can parse a single value, a range of values, or a step expression
fn ors_expr(field: Field) -> impl Fn(&str) -> IResult<&str, OrsExpr> {
    move |input: &str| {
        let (input, star) = opt(char('*'))(input)?;
        if star.is_some() {
            // a star in a list only makes sense with a step
            return map(preceded(char('/'), step_digit), |step| OrsExpr::Step {
                start: field.min(),
                end: field.max(),
                step,
            })(input);
        }

        let (input, start) = value(field)(input)?;
        match opt(alt((char('/'), char('-'))))(input)? {
            (input, Some('/')) => map(step_digit, |step| OrsExpr::Step {
                start,
                end: field.max(),
                step,
            })(input),
            (input, Some('-')) => {
                let (input, end) = value(field)(input)?;
                match opt(preceded(char('/'), step_digit))(input)? {
                    (input, Some(step)) => Ok((input, OrsExpr::Step { start, end, step })),
                    (input, None) => Ok((input, OrsExpr::Range(start, end))),
                }
            }
            (input, _) => Ok((input, OrsExpr::One(start))),
        }
    }
}

/// Consumes a set of trailing ORS expressions
fn tail_ors_exprs(mut input: &str, field: Field, mut exprs: Exprs) -> IResult<&str, Exprs> {
    loop {
        let comma = opt(char(','))(input)?;
        input = comma.0;
        if comma.1.is_none() {
            break Ok((input, exprs));
        }

        let expr = ors_expr(field)(input)?;
        input = expr.0;
        exprs.tail.push(expr.1);
    }
}

/// A parser that can parse delimited expressions for the given field.
fn expr(field: Field) -> impl Fn(&str) -> IResult<&str, Expr> {
    move |input: &str| {
        // A star without a step is the wildcard. Return Expr::All and expect the next parser to
        // fail if anything invalid follows it.
        let (rest, star) = opt(char('*'))(input)?;
        if star.is_some() && !rest.starts_with('/') {
            return Ok((rest, Expr::All));
        }

        let (input, first) = ors_expr(field)(input)?;
        let (input, exprs) = tail_ors_exprs(input, field, Exprs::new(first))?;

        Ok((input, Expr::Many(exprs)))
    }
}

impl FromStr for CronExpr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = if s.starts_with('@') {
            shortcut(s).ok_or(ParseError::InvalidExpression)?
        } else {
            s
        };

        let (_, expr) = all_consuming(map(
            tuple((
                expr(Field::Minute),
                space1,
                expr(Field::Hour),
                space1,
                expr(Field::DayOfMonth),
                space1,
                expr(Field::Month),
                space1,
                expr(Field::DayOfWeek),
            )),
            |(minutes, _, hours, _, days_of_month, _, months, _, days_of_week)| CronExpr {
                minutes,
                hours,
                days_of_month,
                months,
                days_of_week,
            },
        ))(s)
        .map_err(|_| ParseError::InvalidExpression)?;

        Ok(expr)
    }
}
