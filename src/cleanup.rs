//! Background sweep for expired challenges.
//!
//! Challenge expiry is enforced on access, so a record for an address that
//! never returns would otherwise stay in memory forever. This job
//! periodically evicts everything past its TTL.

use crate::service::AuthService;
use std::sync::Arc;
use std::time::Duration;

/// Run the sweep loop.
///
/// Evicts expired challenges every `interval`. Never returns.
pub async fn run_sweep_loop(auth: Arc<AuthService>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        let removed = auth.sweep_expired_challenges();
        if removed > 0 {
            tracing::info!(
                removed = removed,
                pending = auth.pending_challenges(),
                "Challenge sweep completed"
            );
        }
    }
}
