//! Binning map.

use std::{cell::RefCell, cmp::Ordering, fmt, mem};

use smallvec::SmallVec;
use snafu::{ensure, OptionExt as _};
use tracing::debug;

use crate::error::{BinningError, InvalidConfiguration, InvalidKey, KeyNotPresent, Result};
use crate::{nearest_position, BinningConfiguration, CacheStats, Interval, ResolutionCache};

/// An interval and its value.
#[derive(Clone, Debug, PartialEq)]
struct Entry<V> {
    interval: Interval,
    value: V,
}

type Entries<V> = SmallVec<[Entry<V>; 8]>;

/// A map from real-valued keys to the value of their nearest declared interval.
///
/// The map holds exactly one value per declared interval, with entries always kept in ascending order of their
/// interval. Keyed operations ([`get`][Self::get], [`get_mut`][Self::get_mut], [`set`][Self::set], and
/// [`delete`][Self::delete]) resolve the given key to its nearest interval before operating on that interval's value:
///
/// - keys at or below the lowest interval resolve to the lowest interval
/// - keys at or above the highest interval resolve to the highest interval
/// - keys in between resolve to the closest interval, with ties going to the larger interval
///
/// Bulk updates via [`update`][Self::update] are the exception: they store keys literally, introducing new intervals
/// for keys that are not already declared.
///
/// ## In-place updates
///
/// There are no dedicated methods for compound updates such as incrementing a count. They are composed from the keyed
/// accessors instead, either with [`get_mut`][Self::get_mut] or by reading and then writing:
///
/// ```
/// # use binning_map::BinningMap;
/// let mut bins = BinningMap::<u32>::new([0.0, 10.0]).unwrap();
///
/// *bins.get_mut(7.0).unwrap() += 1;
///
/// let current = *bins.get(8.0).unwrap();
/// bins.set(8.0, current * 10).unwrap();
///
/// assert_eq!(bins.get(10.0).unwrap(), &10);
/// ```
///
/// ## Thread safety
///
/// Resolutions are memoized in a cache that is updated even by shared reads, so the map is not `Sync`. Callers that need
/// to share a map between threads must serialize access to it, such as by wrapping it in a `Mutex`. The map is `Send`
/// whenever `V` is.
pub struct BinningMap<V> {
    entries: Entries<V>,
    cache: RefCell<ResolutionCache>,
}

impl<V: Default> BinningMap<V> {
    /// Creates a new `BinningMap` with the given intervals, each holding the default value of `V`.
    ///
    /// The intervals do not need to be sorted.
    ///
    /// # Errors
    ///
    /// If no intervals are given, if any interval is `NaN`, or if any interval is given more than once, an error is
    /// returned.
    pub fn new<I>(intervals: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::from_configuration(intervals, &BinningConfiguration::default())
    }

    /// Creates a new `BinningMap` with the given intervals and configuration, each interval holding the default value of
    /// `V`.
    ///
    /// # Errors
    ///
    /// If no intervals are given, if any interval is `NaN`, or if any interval is given more than once, an error is
    /// returned.
    pub fn from_configuration<I>(intervals: I, config: &BinningConfiguration) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::from_pairs(
            intervals.into_iter().map(|interval| (interval, V::default())),
            config.resolution_cache_capacity(),
        )
    }
}

impl<V> BinningMap<V> {
    /// Creates a new `BinningMap` from the given intervals and their initial values.
    ///
    /// The pairs do not need to be sorted by interval.
    ///
    /// # Errors
    ///
    /// If no pairs are given, if any interval is `NaN`, or if any interval is given more than once, an error is
    /// returned.
    pub fn with_values<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, V)>,
    {
        Self::from_pairs(pairs, BinningConfiguration::default().resolution_cache_capacity())
    }

    /// Sets the capacity of the resolution cache.
    ///
    /// Any resolutions cached so far are dropped. A capacity of zero disables the cache.
    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        let cache = ResolutionCache::new(capacity, self.entries.iter().map(|entry| entry.interval));
        Self {
            entries: self.entries,
            cache: RefCell::new(cache),
        }
    }

    fn from_pairs<I>(pairs: I, cache_capacity: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, V)>,
    {
        let mut entries = pairs
            .into_iter()
            .map(|(interval, value)| {
                let interval = Interval::new(interval).context(InvalidConfiguration {
                    reason: "intervals must not be NaN",
                })?;
                Ok::<_, BinningError>(Entry { interval, value })
            })
            .collect::<Result<Entries<V>>>()?;

        ensure!(
            !entries.is_empty(),
            InvalidConfiguration {
                reason: "at least one interval is required",
            }
        );

        entries.sort_by_key(|entry| entry.interval);
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].interval == pair[1].interval) {
            return InvalidConfiguration {
                reason: format!("interval {} was declared more than once", pair[0].interval),
            }
            .fail();
        }

        let cache = ResolutionCache::new(cache_capacity, entries.iter().map(|entry| entry.interval));
        debug!(intervals = entries.len(), cache_capacity, "Created binning map.");

        Ok(Self {
            entries,
            cache: RefCell::new(cache),
        })
    }

    /// Returns the number of intervals in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no intervals.
    ///
    /// This can only happen once every interval has been deleted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the given key to its nearest interval.
    ///
    /// # Errors
    ///
    /// If the key is `NaN`, or the map holds no intervals, an error is returned.
    pub fn resolve(&self, key: f64) -> Result<f64> {
        self.position_of(key).map(|idx| self.entries[idx].interval.value())
    }

    /// Gets a reference to the value of the interval nearest to the given key.
    ///
    /// # Errors
    ///
    /// If the key is `NaN`, or the map holds no intervals, an error is returned.
    pub fn get(&self, key: f64) -> Result<&V> {
        let idx = self.position_of(key)?;
        Ok(&self.entries[idx].value)
    }

    /// Gets a mutable reference to the value of the interval nearest to the given key.
    ///
    /// # Errors
    ///
    /// If the key is `NaN`, or the map holds no intervals, an error is returned.
    pub fn get_mut(&mut self, key: f64) -> Result<&mut V> {
        let idx = self.position_of(key)?;
        Ok(&mut self.entries[idx].value)
    }

    /// Sets the value of the interval nearest to the given key, overwriting its previous value.
    ///
    /// # Errors
    ///
    /// If the key is `NaN`, or the map holds no intervals, an error is returned.
    pub fn set(&mut self, key: f64, value: V) -> Result<()> {
        *self.get_mut(key)? = value;
        Ok(())
    }

    /// Deletes the interval nearest to the given key, along with its value.
    ///
    /// This shrinks the set of intervals, so later keys that resolved to the deleted interval will resolve to one of its
    /// former neighbors instead.
    ///
    /// # Errors
    ///
    /// If the key is `NaN`, an error is returned. If the map holds no intervals, there is no interval for the key to
    /// resolve to, and [`BinningError::KeyNotPresent`] is returned.
    pub fn delete(&mut self, key: f64) -> Result<()> {
        self.remove(key).map(|_| ())
    }

    /// Removes the interval nearest to the given key, returning the interval and its value.
    ///
    /// # Errors
    ///
    /// If the key is `NaN`, or the map holds no intervals, an error is returned.
    pub fn remove(&mut self, key: f64) -> Result<(f64, V)> {
        ensure!(!key.is_nan(), InvalidKey { key });
        ensure!(!self.entries.is_empty(), KeyNotPresent { interval: key });

        let idx = self.position_of(key)?;
        Ok(self.remove_at(idx))
    }

    /// Deletes the given interval, without resolving it, returning its value.
    ///
    /// # Errors
    ///
    /// If the given value is not exactly one of the intervals in the map, an error is returned.
    pub fn delete_interval(&mut self, interval: f64) -> Result<V> {
        let idx = Interval::new(interval)
            .and_then(|interval| self.entries.binary_search_by_key(&interval, |entry| entry.interval).ok())
            .context(KeyNotPresent { interval })?;

        Ok(self.remove_at(idx).1)
    }

    fn remove_at(&mut self, idx: usize) -> (f64, V) {
        let entry = self.entries.remove(idx);
        self.invalidate_cache();
        (entry.interval.value(), entry.value)
    }

    /// Merges the given pairs into the map, storing each key literally rather than resolving it.
    ///
    /// Keys which match an existing interval overwrite that interval's value. Keys which do not match any existing
    /// interval are added as new intervals. When the same key is given more than once, the last value given wins.
    ///
    /// # Errors
    ///
    /// If any key is `NaN`, an error is returned and the map is left unchanged.
    pub fn update<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (f64, V)>,
    {
        let mut incoming = pairs
            .into_iter()
            .map(|(key, value)| {
                let interval = Interval::new(key).context(InvalidKey { key })?;
                Ok::<_, BinningError>(Entry { interval, value })
            })
            .collect::<Result<Vec<_>>>()?;

        if incoming.is_empty() {
            return Ok(());
        }

        // The sort is stable, so among equal keys the last one given stays last, and wins when deduplicating.
        incoming.sort_by_key(|entry| entry.interval);
        let mut deduped: Vec<Entry<V>> = Vec::with_capacity(incoming.len());
        for entry in incoming {
            match deduped.last_mut() {
                Some(last) if last.interval == entry.interval => *last = entry,
                _ => deduped.push(entry),
            }
        }

        let existing = mem::take(&mut self.entries);
        let mut merged = Entries::<V>::with_capacity(existing.len() + deduped.len());
        let mut introduced = 0usize;

        let mut existing = existing.into_iter().peekable();
        let mut incoming = deduped.into_iter().peekable();
        loop {
            let ordering = match (existing.peek(), incoming.peek()) {
                (Some(current), Some(update)) => current.interval.cmp(&update.interval),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };

            match ordering {
                Ordering::Less => merged.extend(existing.next()),
                Ordering::Greater => {
                    introduced += 1;
                    merged.extend(incoming.next());
                }
                Ordering::Equal => {
                    existing.next();
                    merged.extend(incoming.next());
                }
            }
        }

        self.entries = merged;

        if introduced > 0 {
            debug!(
                introduced,
                intervals = self.entries.len(),
                "Bulk update introduced new intervals."
            );
            self.invalidate_cache();
        }

        Ok(())
    }

    /// Returns `true` if the given value is exactly one of the intervals in the map.
    ///
    /// The value is not resolved.
    pub fn contains_interval(&self, interval: f64) -> bool {
        Interval::new(interval)
            .map(|interval| {
                self.entries
                    .binary_search_by_key(&interval, |entry| entry.interval)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Returns an iterator over the intervals of the map, in ascending order.
    pub fn intervals(&self) -> Intervals<'_, V> {
        Intervals {
            inner: self.entries.iter(),
        }
    }

    /// Returns the intervals of the map, in ascending order.
    pub fn interval_values(&self) -> Vec<f64> {
        self.intervals().collect()
    }

    /// Returns an iterator over the values of the map, in ascending order of their interval.
    pub fn values(&self) -> Values<'_, V> {
        Values {
            inner: self.entries.iter(),
        }
    }

    /// Returns an iterator over the intervals and values of the map, in ascending order of interval.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Returns an iterator over the intervals and mutable values of the map, in ascending order of interval.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }

    /// Returns the hit and miss counters of the resolution cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    fn position_of(&self, key: f64) -> Result<usize> {
        let interval = Interval::new(key).context(InvalidKey { key })?;
        let resolve = || nearest_position(&self.entries, key, |entry| entry.interval);

        // Empty maps are resolved directly so that they report the resolver's error.
        if self.entries.is_empty() {
            return resolve();
        }

        self.cache.borrow_mut().get_or_resolve(interval, resolve)
    }

    fn invalidate_cache(&mut self) {
        self.cache
            .get_mut()
            .rebind(self.entries.iter().map(|entry| entry.interval));
    }
}

impl<V: Clone> Clone for BinningMap<V> {
    fn clone(&self) -> Self {
        let capacity = self.cache.borrow().capacity();
        Self {
            entries: self.entries.clone(),
            cache: RefCell::new(ResolutionCache::new(
                capacity,
                self.entries.iter().map(|entry| entry.interval),
            )),
        }
    }
}

impl<V: PartialEq> PartialEq for BinningMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V: fmt::Debug> fmt::Debug for BinningMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: fmt::Display> fmt::Display for BinningMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (interval, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", interval, value)?;
        }
        write!(f, "}}")
    }
}

impl<'a, V> IntoIterator for &'a BinningMap<V> {
    type Item = (f64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut BinningMap<V> {
    type Item = (f64, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An iterator over the intervals of a [`BinningMap`].
///
/// Created by [`BinningMap::intervals`].
pub struct Intervals<'a, V> {
    inner: std::slice::Iter<'a, Entry<V>>,
}

impl<V> Iterator for Intervals<'_, V> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| entry.interval.value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Intervals<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|entry| entry.interval.value())
    }
}

impl<V> ExactSizeIterator for Intervals<'_, V> {}

/// An iterator over the values of a [`BinningMap`].
///
/// Created by [`BinningMap::values`].
pub struct Values<'a, V> {
    inner: std::slice::Iter<'a, Entry<V>>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| &entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Values<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|entry| &entry.value)
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

/// An iterator over the intervals and values of a [`BinningMap`].
///
/// Created by [`BinningMap::iter`].
pub struct Iter<'a, V> {
    inner: std::slice::Iter<'a, Entry<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (f64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (entry.interval.value(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|entry| (entry.interval.value(), &entry.value))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// An iterator over the intervals and mutable values of a [`BinningMap`].
///
/// Created by [`BinningMap::iter_mut`].
pub struct IterMut<'a, V> {
    inner: std::slice::IterMut<'a, Entry<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (f64, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (entry.interval.value(), &mut entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|entry| (entry.interval.value(), &mut entry.value))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
