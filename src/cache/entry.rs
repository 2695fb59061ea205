//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// Represents a single cache entry with value and access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// Wall-clock time the key was first stored
    pub created_at: DateTime<Utc>,
    /// Wall-clock time of the last read or write
    pub last_access_at: DateTime<Utc>,
    /// Number of reads and writes since the key was first stored
    pub access_count: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Time to live; `None` or zero means the entry never expires
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        let now = Utc::now();
        Self {
            value,
            expires_at: expiry_from(ttl),
            created_at: now,
            last_access_at: now,
            access_count: 1,
        }
    }

    // == Replace ==
    /// Replaces the value and expiry, keeping the creation time.
    pub fn replace(&mut self, value: V, ttl: Option<Duration>) {
        self.value = value;
        self.expires_at = expiry_from(ttl);
        self.touch();
    }

    // == Touch ==
    /// Records an access.
    pub fn touch(&mut self) {
        self.last_access_at = Utc::now();
        self.access_count += 1;
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is strictly past its
    /// expiration instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a caller-supplied instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }
}

fn expiry_from(ttl: Option<Duration>) -> Option<Instant> {
    match ttl {
        Some(ttl) if !ttl.is_zero() => Instant::now().checked_add(ttl),
        _ => None,
    }
}
