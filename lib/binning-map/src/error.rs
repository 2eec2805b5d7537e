use snafu::Snafu;

/// A binning map error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum BinningError {
    /// The declared intervals, or the configuration used to build a map, were not valid.
    #[snafu(display("Invalid binning configuration: {}.", reason))]
    InvalidConfiguration {
        /// Description of what made the configuration invalid.
        reason: String,
    },

    /// The given key is not a totally-ordered number.
    #[snafu(display("Key '{}' cannot be resolved to an interval.", key))]
    InvalidKey {
        /// The offending key.
        key: f64,
    },

    /// The interval targeted by a delete is not present in the map.
    #[snafu(display("Interval '{}' is not present in the map.", interval))]
    KeyNotPresent {
        /// The interval that was targeted.
        interval: f64,
    },

    /// Configuration could not be extracted from its providers.
    #[snafu(display("Failed to extract binning configuration."))]
    Configuration {
        /// Error source.
        source: figment::Error,
    },
}

/// Result type for binning map operations.
pub type Result<T, E = BinningError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = InvalidConfiguration {
            reason: "at least one interval is required",
        }
        .build();
        assert_eq!(
            err.to_string(),
            "Invalid binning configuration: at least one interval is required."
        );

        let err = InvalidKey { key: f64::NAN }.build();
        assert_eq!(err.to_string(), "Key 'NaN' cannot be resolved to an interval.");

        let err = KeyNotPresent { interval: 3.0 }.build();
        assert_eq!(err.to_string(), "Interval '3' is not present in the map.");
    }
}
