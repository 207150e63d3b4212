//! Directory of accounts that have logged in.
//!
//! Users are created on first successful login and never removed. The
//! creation timestamp is fixed at that point; only `last_login_at` moves.

use crate::auth::address::Address;
use crate::clock::Clock;
use crate::models::User;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct UserDirectory {
    users: Mutex<HashMap<Address, User>>,
    clock: Arc<dyn Clock>,
}

impl UserDirectory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Address, User>> {
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create the user on first sight, otherwise bump `last_login_at`.
    pub fn record_login(&self, address: &Address) -> User {
        let now = self.clock.now();
        let mut users = self.lock();

        let user = users.entry(address.clone()).or_insert_with(|| {
            tracing::info!(action = "user_created", address = %address, "First login");
            User {
                address: address.clone(),
                created_at: now,
                last_login_at: now,
            }
        });
        user.last_login_at = now;

        user.clone()
    }

    pub fn lookup(&self, address: &Address) -> Option<User> {
        self.lock().get(address).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
