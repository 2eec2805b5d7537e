use std::ops::AddAssign;

use crate::error::{InvalidKey, Result};
use crate::{BinningMap, Iter};

/// A mutable mapping from real-valued keys to values held per interval.
///
/// This is the interface that generic code, such as statistical routines which count observations per bin, programs
/// against. Keyed operations resolve their key to an interval first, while [`update`][Self::update] stores its keys
/// literally.
pub trait BinnedMapping {
    /// The type of value held for each interval.
    type Value;

    /// Iterator over intervals and their values, in ascending order of interval.
    type Iter<'a>: Iterator<Item = (f64, &'a Self::Value)>
    where
        Self: 'a;

    /// Gets a reference to the value for the interval that `key` resolves to.
    ///
    /// # Errors
    ///
    /// If `key` cannot be resolved, an error is returned.
    fn get(&self, key: f64) -> Result<&Self::Value>;

    /// Gets a mutable reference to the value for the interval that `key` resolves to.
    ///
    /// # Errors
    ///
    /// If `key` cannot be resolved, an error is returned.
    fn get_mut(&mut self, key: f64) -> Result<&mut Self::Value>;

    /// Sets the value for the interval that `key` resolves to.
    ///
    /// # Errors
    ///
    /// If `key` cannot be resolved, an error is returned.
    fn set(&mut self, key: f64, value: Self::Value) -> Result<()>;

    /// Deletes the interval that `key` resolves to.
    ///
    /// # Errors
    ///
    /// If `key` cannot be resolved, or the interval is not present, an error is returned.
    fn delete(&mut self, key: f64) -> Result<()>;

    /// Returns the number of intervals.
    fn len(&self) -> usize;

    /// Returns `true` if there are no intervals.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the intervals in ascending order.
    fn interval_values(&self) -> Vec<f64>;

    /// Returns an iterator over the intervals and their values, in ascending order of interval.
    fn iter(&self) -> Self::Iter<'_>;

    /// Merges the given pairs, storing each key literally as an interval.
    ///
    /// # Errors
    ///
    /// If any key is not a valid interval, an error is returned and nothing is merged.
    fn update<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (f64, Self::Value)>;
}

impl<V> BinnedMapping for BinningMap<V> {
    type Value = V;
    type Iter<'a>
        = Iter<'a, V>
    where
        Self: 'a;

    fn get(&self, key: f64) -> Result<&V> {
        BinningMap::get(self, key)
    }

    fn get_mut(&mut self, key: f64) -> Result<&mut V> {
        BinningMap::get_mut(self, key)
    }

    fn set(&mut self, key: f64, value: V) -> Result<()> {
        BinningMap::set(self, key, value)
    }

    fn delete(&mut self, key: f64) -> Result<()> {
        BinningMap::delete(self, key)
    }

    fn len(&self) -> usize {
        BinningMap::len(self)
    }

    fn interval_values(&self) -> Vec<f64> {
        BinningMap::interval_values(self)
    }

    fn iter(&self) -> Iter<'_, V> {
        BinningMap::iter(self)
    }

    fn update<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (f64, V)>,
    {
        BinningMap::update(self, pairs)
    }
}

/// Counts each observation against the interval it resolves to.
///
/// Each observation increments the value of its interval by one. The observations are walked twice, once to validate
/// them and once to count them, so the iterator must be cloneable. Nothing is buffered.
///
/// # Errors
///
/// If any observation is `NaN`, or the mapping holds no intervals, an error is returned and no observation is counted.
pub fn observe<M, I>(mapping: &mut M, observations: I) -> Result<()>
where
    M: BinnedMapping,
    M::Value: AddAssign + From<u8>,
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let observations = observations.into_iter();
    if let Some(key) = observations.clone().find(|key| key.is_nan()) {
        return InvalidKey { key }.fail();
    }

    for observation in observations {
        *mapping.get_mut(observation)? += M::Value::from(1);
    }

    Ok(())
}
