//! Timestamped cache entries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached value with the instant it was written.
///
/// Immutable once built; the store replaces entries wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// When the value was written.
    pub creation_time: DateTime<Utc>,
    /// The cached value.
    pub value: V,
}

impl<V> CacheEntry<V> {
    /// Wraps a value stamped with the current instant.
    pub fn new(value: V) -> Self {
        Self::with_creation_time(value, Utc::now())
    }

    /// Wraps a value with an explicit creation instant.
    pub fn with_creation_time(value: V, creation_time: DateTime<Utc>) -> Self {
        Self {
            creation_time,
            value,
        }
    }

    /// Time elapsed since the entry was written.
    ///
    /// A creation time in the future (clock skew) counts as zero age.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.creation_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Returns true if the entry is younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}
