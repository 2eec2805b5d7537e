use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt as _};

use crate::error::{Configuration, InvalidConfiguration, Result};

const fn default_resolution_cache_capacity() -> usize {
    256
}

/// Binning map configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BinningConfiguration {
    /// Maximum number of resolved keys to memoize per map.
    ///
    /// Resolving a key against the declared intervals is a binary search. When the same keys are seen repeatedly, such
    /// as when counting observations that take on a small number of distinct values, memoizing the resolution of
    /// recently seen keys avoids repeating that search. Least recently used resolutions are evicted once the limit is
    /// reached.
    ///
    /// Setting this to zero disables memoization.
    ///
    /// Defaults to 256.
    #[serde(default = "default_resolution_cache_capacity")]
    resolution_cache_capacity: usize,
}

impl BinningConfiguration {
    /// Creates a new `BinningConfiguration` from the given figment.
    ///
    /// # Errors
    ///
    /// If the configuration cannot be extracted, such as when a field has the wrong type, an error is returned.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        figment.extract().context(Configuration)
    }

    /// Creates a new `BinningConfiguration` from environment variables with the given prefix.
    ///
    /// Field names are matched case-insensitively after the prefix is stripped, so with a prefix of `BINNING`, the cache
    /// capacity is read from `BINNING_RESOLUTION_CACHE_CAPACITY`. A trailing `_` is added to the prefix if it does not
    /// already end with one. Fields which are not set fall back to their defaults.
    ///
    /// # Errors
    ///
    /// If the prefix is empty, or the configuration cannot be extracted, an error is returned.
    pub fn from_environment(prefix: &str) -> Result<Self> {
        ensure!(
            !prefix.is_empty(),
            InvalidConfiguration {
                reason: "environment variable prefix must not be empty",
            }
        );

        let prefix = if prefix.ends_with('_') {
            prefix.to_string()
        } else {
            format!("{}_", prefix)
        };

        let figment = Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(&prefix));
        Self::from_figment(&figment)
    }

    /// Sets the maximum number of resolved keys to memoize per map.
    pub fn with_resolution_cache_capacity(mut self, capacity: usize) -> Self {
        self.resolution_cache_capacity = capacity;
        self
    }

    /// Returns the maximum number of resolved keys to memoize per map.
    pub fn resolution_cache_capacity(&self) -> usize {
        self.resolution_cache_capacity
    }
}

impl Default for BinningConfiguration {
    fn default() -> Self {
        Self {
            resolution_cache_capacity: default_resolution_cache_capacity(),
        }
    }
}
