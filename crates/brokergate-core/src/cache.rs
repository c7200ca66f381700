//! Time-bounded, single-entry cache for the store handle.
//!
//! Opening a store connection is the expensive part of a decision, so the
//! handle is built once and reused until its TTL runs out. The cache lock is
//! held across construction: concurrent cold-start callers wait for the first
//! one and then share its handle instead of each opening their own.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use brokergate_contracts::error::BrokerGateResult;

use crate::traits::{StoreConnector, StoreHandle};

/// Default lifetime of a cached handle.
pub const DEFAULT_HANDLE_TTL: Duration = Duration::from_secs(5 * 60);

/// Wall-clock source for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// `Clock` backed by `Utc::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CachedHandle {
    handle: StoreHandle,
    created_at: DateTime<Utc>,
}

/// Owns the one store handle shared by every decision in the process.
pub struct HandleCache {
    connector: Box<dyn StoreConnector>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: Mutex<Option<CachedHandle>>,
}

impl HandleCache {
    /// Create an empty cache. Nothing is connected until the first `acquire`.
    pub fn new(connector: Box<dyn StoreConnector>, ttl: Duration) -> Self {
        Self::with_clock(connector, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(connector: Box<dyn StoreConnector>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            connector,
            ttl,
            clock,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached handle, building a new one if there is none or the
    /// current one has outlived the TTL.
    ///
    /// A connector failure is returned unchanged and leaves the cache empty,
    /// so the next call retries. The same holds when a connector panicked
    /// while holding the lock.
    pub fn acquire(&self) -> BrokerGateResult<StoreHandle> {
        let mut entry = self.lock_entry();

        let now = self.clock.now();
        if let Some(cached) = entry.as_ref() {
            // A clock that moved backwards counts as zero age.
            let age = now
                .signed_duration_since(cached.created_at)
                .to_std()
                .unwrap_or_default();
            if age < self.ttl {
                return Ok(Arc::clone(&cached.handle));
            }
            debug!(age_secs = age.as_secs(), "store handle expired");
        }

        *entry = None;
        let handle = self.connector.connect()?;
        debug!(ttl_secs = self.ttl.as_secs(), "store handle created");

        *entry = Some(CachedHandle {
            handle: Arc::clone(&handle),
            created_at: now,
        });
        Ok(handle)
    }

    /// Drop the cached handle; the next `acquire` reconnects.
    pub fn invalidate(&self) {
        *self.lock_entry() = None;
    }

    // A poisoned lock only means a connect panicked part way through; the
    // entry it guards is dropped so the caller reconnects.
    fn lock_entry(&self) -> MutexGuard<'_, Option<CachedHandle>> {
        self.entry.lock().unwrap_or_else(|poisoned| {
            warn!("store handle cache recovered after a panicked connect");
            self.entry.clear_poison();
            let mut entry = poisoned.into_inner();
            *entry = None;
            entry
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
