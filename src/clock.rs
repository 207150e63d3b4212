//! Injectable time source.
//!
//! Every timestamp the service produces (nonce creation, TTL checks, user
//! login times, token `iat`/`exp`) comes from a [`Clock`], so expiry can be
//! driven deterministically in tests with [`FakeClock`].

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Abstracts the wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
///
/// Not used by the server itself; exported so unit and downstream tests can
/// drive expiry deterministically. Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct FakeClock {
    t: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::new_set(Utc::now())
    }

    pub fn new_set(t: DateTime<Utc>) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
        }
    }

    pub fn set(&self, t: DateTime<Utc>) {
        let mut state = self.t.lock().unwrap_or_else(|e| e.into_inner());
        *state = t;
    }

    pub fn advance(&self, quantum: Duration) {
        let mut state = self.t.lock().unwrap_or_else(|e| e.into_inner());
        *state += quantum;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.t.lock().unwrap_or_else(|e| e.into_inner())
    }
}
