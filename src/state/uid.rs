//! Connection identity generation.
//!
//! Identities are `client<N>` with N assigned in registration order,
//! starting at 1. The counter belongs to one hub instance, is monotonic,
//! and never hands out a number twice, even after the connection is gone.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every peer identity.
pub const IDENTITY_PREFIX: &str = "client";

const IDENTITY_COUNTER_START: u64 = 1;

/// Registry key for a live connection. Its number is the identity suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnId(u64);

impl ConnId {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Identity string shown to peers and written to the log.
    pub fn identity(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", IDENTITY_PREFIX, self.0)
    }
}

/// Generator for sequential connection identities.
#[derive(Debug)]
pub struct IdentityGenerator {
    counter: AtomicU64,
}

impl IdentityGenerator {
    /// Create a generator whose first identity is `client1`.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(IDENTITY_COUNTER_START),
        }
    }

    /// Allocate the next identity.
    pub fn next(&self) -> ConnId {
        ConnId(self.counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of identities handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed) - IDENTITY_COUNTER_START
    }
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        Self::new()
    }
}
