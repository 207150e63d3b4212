//! Outstanding login challenges, one per address.
//!
//! Invariants:
//! - at most one live record per address; issuing a new challenge replaces the old
//! - a record older than the TTL is treated as absent and evicted when seen
//! - a record is removed the moment it is consumed, so a nonce can win
//!   `consume` at most once
//!
//! Consumed nonces leave a tombstone for one TTL so a replay can be told
//! apart from a challenge that never existed. Tombstones are never consumable.
//!
//! All operations run under a single lock, which makes `issue_challenge`,
//! `peek` and `consume` linearizable for every address. Expired records for
//! addresses that never come back linger until [`NonceStore::sweep_expired`]
//! runs.

use crate::auth::address::Address;
use crate::auth::challenge::{build_message, generate_challenge_nonce};
use crate::clock::Clock;
use crate::models::NonceRecord;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default challenge lifetime: 5 minutes.
pub const DEFAULT_CHALLENGE_TTL_SECS: u64 = 5 * 60;

#[derive(Debug)]
struct SpentNonce {
    nonce: String,
    consumed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct NonceStoreState {
    live: HashMap<Address, NonceRecord>,
    spent: HashMap<Address, SpentNonce>,
}

pub struct NonceStore {
    state: Mutex<NonceStoreState>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl NonceStore {
    pub fn new(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        let ttl_secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        Self {
            state: Mutex::new(NonceStoreState::default()),
            ttl: Duration::try_seconds(ttl_secs).unwrap_or(Duration::MAX),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, NonceStoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_stale(&self, now: DateTime<Utc>, since: DateTime<Utc>) -> bool {
        now - since > self.ttl
    }

    /// Create a fresh challenge for `address`, replacing any outstanding one.
    pub fn issue_challenge(&self, address: &Address, domain: &str) -> NonceRecord {
        let nonce = generate_challenge_nonce();
        let record = NonceRecord {
            address: address.clone(),
            message: build_message(domain, address, &nonce),
            nonce,
            created_at: self.clock.now(),
            consumed: false,
        };

        let replaced = self.lock().live.insert(address.clone(), record.clone());
        if replaced.is_some() {
            tracing::debug!(address = %address, "Replaced outstanding challenge");
        }

        record
    }

    /// Live record for `address`, evicting it if it has expired.
    pub fn peek(&self, address: &Address) -> Option<NonceRecord> {
        let now = self.clock.now();
        let mut state = self.lock();

        let record = state.live.get(address)?;
        if self.is_stale(now, record.created_at) {
            state.live.remove(address);
            return None;
        }

        Some(record.clone())
    }

    /// Consume `nonce` for `address`.
    ///
    /// Returns `true` exactly once per issued challenge: the record must be
    /// present, unexpired, unconsumed and carry the same nonce. Any failed
    /// check leaves the store untouched (except for evicting an expired record).
    pub fn consume(&self, address: &Address, nonce: &str) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();

        let Some(record) = state.live.get_mut(address) else {
            return false;
        };
        if self.is_stale(now, record.created_at) {
            state.live.remove(address);
            return false;
        }
        if record.consumed || record.nonce != nonce {
            return false;
        }

        record.consumed = true;
        state.live.remove(address);
        state.spent.insert(
            address.clone(),
            SpentNonce {
                nonce: nonce.to_string(),
                consumed_at: now,
            },
        );
        true
    }

    /// Whether `nonce` was consumed for `address` within the last TTL.
    pub fn was_consumed(&self, address: &Address, nonce: &str) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();

        let Some(spent) = state.spent.get(address) else {
            return false;
        };
        if self.is_stale(now, spent.consumed_at) {
            state.spent.remove(address);
            return false;
        }

        spent.nonce == nonce
    }

    /// Evict every expired record and tombstone. Returns the number of
    /// live records removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();

        let before = state.live.len();
        state.live.retain(|_, r| now - r.created_at <= self.ttl);
        state.spent.retain(|_, s| now - s.consumed_at <= self.ttl);
        before - state.live.len()
    }

    /// Number of live records currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
