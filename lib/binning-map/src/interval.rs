use std::fmt;

use ordered_float::NotNan;

/// A declared interval.
///
/// Intervals are real numbers that can never be `NaN`, which gives them a total order and allows them to be hashed.
/// Negative zero is normalized to positive zero, so `-0.0` and `0.0` are the same interval.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Interval(NotNan<f64>);

impl Interval {
    /// Creates a new `Interval` from the given value.
    ///
    /// Returns `None` if the value is `NaN`.
    pub fn new(value: f64) -> Option<Self> {
        // Adding positive zero turns negative zero into positive zero, and leaves every other value untouched.
        NotNan::new(value + 0.0).ok().map(Self)
    }

    /// Returns the value of this interval.
    pub fn value(self) -> f64 {
        self.0.into_inner()
    }

    /// Returns the absolute distance between this interval and the given key.
    pub(crate) fn distance(self, key: f64) -> f64 {
        (self.value() - key).abs()
    }
}

impl From<Interval> for f64 {
    fn from(interval: Interval) -> Self {
        interval.value()
    }
}

impl PartialEq<f64> for Interval {
    fn eq(&self, other: &f64) -> bool {
        self.value() == *other
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}
