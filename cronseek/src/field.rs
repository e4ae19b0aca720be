//! Allowed-value sets for the five calendar fields of a schedule.

#[cfg(not(any(feature = "std", test)))]
use alloc::{vec, vec::Vec};

use core::fmt::{self, Display, Formatter};
use core::iter::FusedIterator;

use crate::parse::ParseError;

/// One of the five calendar fields of a cron schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Minute of the hour, 0-59
    Minute,
    /// Hour of the day, 0-23
    Hour,
    /// Day of the month, 1-31
    DayOfMonth,
    /// Month of the year, 1-12
    Month,
    /// Day of the week, 0-6 (Sun-Sat)
    DayOfWeek,
}

impl Field {
    /// All fields, in the order they're written in an expression.
    pub const ALL: [Field; 5] = [
        Field::Minute,
        Field::Hour,
        Field::DayOfMonth,
        Field::Month,
        Field::DayOfWeek,
    ];

    /// The smallest value in this field's domain
    #[inline]
    pub const fn min(self) -> u32 {
        match self {
            Field::Minute | Field::Hour | Field::DayOfWeek => 0,
            Field::DayOfMonth | Field::Month => 1,
        }
    }

    /// The largest value in this field's domain
    #[inline]
    pub const fn max(self) -> u32 {
        match self {
            Field::Minute => 59,
            Field::Hour => 23,
            Field::DayOfMonth => 31,
            Field::Month => 12,
            Field::DayOfWeek => 6,
        }
    }

    /// Returns whether `value` is within this field's domain.
    #[inline]
    pub const fn in_domain(self, value: u32) -> bool {
        value >= self.min() && value <= self.max()
    }

    #[inline]
    const fn domain_bits(self) -> u64 {
        // every value min..=max, bit `v` standing for value `v`
        let upper = (1u64 << (self.max() + 1)) - 1;
        let lower = (1u64 << self.min()) - 1;
        upper & !lower
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Field::Minute => "minute",
            Field::Hour => "hour",
            Field::DayOfMonth => "day of month",
            Field::Month => "month",
            Field::DayOfWeek => "day of week",
        }
        .fmt(f)
    }
}

/// The allowed values of a field before validation.
///
/// `All` is the `*` wildcard. It is kept apart from a list naming every value of the domain
/// because a wildcard day field takes no part in the day-of-month / day-of-week disjunction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldSpec {
    /// A `*`, every value in the domain
    All,
    /// An expanded list of values. Order and duplicates don't matter.
    Many(Vec<u32>),
}

impl FieldSpec {
    /// A spec allowing only `value`.
    pub fn one(value: u32) -> Self {
        FieldSpec::Many(vec![value])
    }

    /// A spec allowing every value yielded by `values`.
    pub fn many<I: IntoIterator<Item = u32>>(values: I) -> Self {
        FieldSpec::Many(values.into_iter().collect())
    }
}

impl From<Vec<u32>> for FieldSpec {
    fn from(values: Vec<u32>) -> Self {
        FieldSpec::Many(values)
    }
}

impl From<&[u32]> for FieldSpec {
    fn from(values: &[u32]) -> Self {
        FieldSpec::many(values.iter().copied())
    }
}

/// A validated, non-empty set of allowed values for one field.
///
/// Values are kept as a bit-mask where bit `v` is set when `v` is allowed, so every query is a
/// couple of shifts and a bit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldMatcher {
    field: Field,
    bits: u64,
    wildcard: bool,
}

impl FieldMatcher {
    const BITS: u32 = 64;

    /// Validates `spec` against the domain of `field`.
    ///
    /// # Example
    /// ```
    /// use cronseek::{Field, FieldMatcher, FieldSpec, ParseError};
    ///
    /// let hours = FieldMatcher::new(Field::Hour, &FieldSpec::many(vec![6, 18])).unwrap();
    /// assert_eq!(hours.smallest_at_least(7), Some(18));
    /// assert_eq!(hours.largest_at_most(5), None);
    ///
    /// assert_eq!(
    ///     FieldMatcher::new(Field::Hour, &FieldSpec::one(24)),
    ///     Err(ParseError::OutOfDomain { field: Field::Hour, value: 24 }),
    /// );
    /// ```
    pub fn new(field: Field, spec: &FieldSpec) -> Result<Self, ParseError> {
        match spec {
            FieldSpec::All => Ok(Self {
                field,
                bits: field.domain_bits(),
                wildcard: true,
            }),
            FieldSpec::Many(values) => {
                let mut bits = 0u64;
                for &value in values {
                    if !field.in_domain(value) {
                        return Err(ParseError::OutOfDomain { field, value });
                    }
                    bits |= 1 << value;
                }

                if bits == 0 {
                    return Err(ParseError::EmptyField { field });
                }

                Ok(Self {
                    field,
                    bits,
                    wildcard: false,
                })
            }
        }
    }

    /// The field this set of values belongs to
    #[inline]
    pub fn field(&self) -> Field {
        self.field
    }

    /// Returns whether this set was written as a `*`.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Returns whether `value` is allowed.
    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        value < Self::BITS && self.bits & (1 << value) != 0
    }

    /// The smallest allowed value greater than or equal to `value`.
    #[inline]
    pub fn smallest_at_least(&self, value: u32) -> Option<u32> {
        if value >= Self::BITS {
            return None;
        }
        // clear the values we're already past, the first set bit is the answer
        let bottom_cleared = (self.bits >> value) << value;
        let trailing_zeros = bottom_cleared.trailing_zeros();
        if trailing_zeros < Self::BITS {
            Some(trailing_zeros)
        } else {
            None
        }
    }

    /// The largest allowed value less than or equal to `value`.
    #[inline]
    pub fn largest_at_most(&self, value: u32) -> Option<u32> {
        let shift = (Self::BITS - 1).saturating_sub(value);
        let top_cleared = (self.bits << shift) >> shift;
        if top_cleared == 0 {
            None
        } else {
            Some(Self::BITS - 1 - top_cleared.leading_zeros())
        }
    }

    /// The smallest allowed value.
    #[inline]
    pub fn first(&self) -> u32 {
        self.bits.trailing_zeros()
    }

    /// The largest allowed value.
    #[inline]
    pub fn last(&self) -> u32 {
        Self::BITS - 1 - self.bits.leading_zeros()
    }

    /// Iterates over the allowed values in ascending order.
    pub fn values(&self) -> Values {
        Values(self.bits)
    }
}

/// An iterator over the allowed values of a [`FieldMatcher`], in ascending order.
#[derive(Debug, Clone)]
pub struct Values(u64);

impl Iterator for Values {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            return None;
        }
        let value = self.0.trailing_zeros();
        // drop the lowest set bit
        self.0 &= self.0 - 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Values {}
impl FusedIterator for Values {}
