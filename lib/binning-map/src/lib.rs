//! A mapping from arbitrary real-valued keys to the nearest of a fixed set of declared intervals.
//!
//! [`BinningMap`] holds one value per declared interval, kept in ascending interval order. Every keyed read or write
//! first resolves the given key to its nearest interval, clamping keys that fall outside of the declared range to the
//! lowest or highest interval, and then operates on the value stored for that interval. This makes it a natural fit for
//! counting observations into a fixed set of bins:
//!
//! ```
//! use binning_map::BinningMap;
//!
//! let mut bins = BinningMap::<u64>::new([-6.0, -3.0, 0.0, 3.0, 6.0]).unwrap();
//!
//! for observation in [3.0, 7.0, 11.0, 6.5, -1_000_000.0, 0.5] {
//!     *bins.get_mut(observation).unwrap() += 1;
//! }
//!
//! assert_eq!(bins.to_string(), "{-6: 1, -3: 0, 0: 1, 3: 1, 6: 3}");
//! ```
//!
//! # Resolution
//!
//! Keys equidistant from two neighboring intervals resolve to the larger of the two, so with intervals `0` and `3`, the
//! key `1.5` resolves to `3`. `NaN` keys are rejected with [`BinningError::InvalidKey`].
//!
//! Resolution is memoized per map by a bounded LRU cache (see [`ResolutionCache`]), which is invalidated whenever the
//! set of intervals changes.
//!
//! # Bulk updates
//!
//! [`BinningMap::update`] operates at the storage level rather than the resolution level: keys given to it are stored
//! literally, and any key which is not already a declared interval becomes a new interval.
#![deny(missing_docs)]

mod cache;
pub use self::cache::{CacheStats, ResolutionCache};

mod config;
pub use self::config::BinningConfiguration;

mod error;
pub use self::error::{BinningError, Result};

mod hash;

mod interval;
pub use self::interval::Interval;

mod map;
pub use self::map::{BinningMap, Intervals, Iter, IterMut, Values};

mod resolve;
pub use self::resolve::{nearest_position, resolve_nearest};

mod traits;
pub use self::traits::{observe, BinnedMapping};
