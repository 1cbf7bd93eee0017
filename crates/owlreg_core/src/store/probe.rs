//! Connection probing with bounded retry and schema self-repair.
//!
//! # Responsibility
//! - Turn one adapter's cheap probe into a bounded startup readiness
//!   check: retry with a fixed backoff, then attempt schema bootstrap
//!   once before giving up.
//!
//! # Invariants
//! - The attempt count and backoff are bounded; no step waits forever.
//! - Sleeps are scheduled, never spun.

use crate::store::RegistrationStore;
use log::{info, warn};
use std::thread;
use std::time::Duration;

/// Bounded retry parameters for connection probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Probes one store until it answers, sleeping `backoff` between attempts.
///
/// On persistent failure one schema bootstrap runs as self-repair (this
/// covers a database that has not been created yet), followed by a final
/// probe before giving up.
pub fn test_connection(store: &dyn RegistrationStore, policy: RetryPolicy) -> bool {
    let backend = store.backend();
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if store.probe() {
            info!(
                "event=connection_probe module=store backend={backend} status=ok attempt={attempt}"
            );
            return true;
        }
        warn!(
            "event=connection_probe module=store backend={backend} status=retry attempt={attempt} max_attempts={max_attempts}"
        );
        if attempt < max_attempts {
            thread::sleep(policy.backoff);
        }
    }

    match store.ensure_schema() {
        Ok(()) => {
            let repaired = store.probe();
            info!(
                "event=schema_repair module=store backend={backend} status={}",
                if repaired { "ok" } else { "error" }
            );
            repaired
        }
        Err(err) => {
            warn!(
                "event=schema_repair module=store backend={backend} status=error error_kind={} error={err}",
                err.kind()
            );
            false
        }
    }
}
