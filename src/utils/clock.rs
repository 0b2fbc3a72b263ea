//! Time source for deadline checks.
//!
//! The ledger itself has no notion of block time; callers decide where "now"
//! comes from. [`SystemClock`] reads the host's unix time, tests usually pin
//! a fixed instant.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current unix timestamp, in seconds.
pub trait Clock {
    /// Returns the current unix timestamp.
    fn now(&self) -> u64;
}

/// [`Clock`] backed by the host's system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after the unix epoch")
            .as_secs()
    }
}
