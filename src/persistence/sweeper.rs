//! Reclamation of inflight messages that were never acknowledged.
//!
//! The store never schedules a sweep itself; the owning broker (or the
//! `popstore sweep` command) decides when to run one.

use chrono::Utc;
use tracing::debug;

use super::{RecordKind, Store};
use crate::utils::error::Result;

/// Delete every inflight message with `created < expiry` or `created == 0`.
///
/// Stops at the first failed deletion and returns its error. Deletes are
/// idempotent, so the next sweep picks up whatever was left behind.
pub fn clear_expired_inflight<S: Store + ?Sized>(store: &S, expiry: i64) -> Result<usize> {
    let mut removed = 0;
    for message in store.read_inflight()? {
        if message.is_expired(expiry) {
            store.delete(RecordKind::Inflight, &message.id)?;
            removed += 1;
        }
    }
    debug!(expiry, removed, "swept expired inflight messages");
    Ok(removed)
}

/// Runs sweeps for a fixed inflight retention period.
#[derive(Debug, Clone, Copy)]
pub struct Sweeper {
    inflight_ttl: i64,
}

impl Sweeper {
    /// `inflight_ttl` is in seconds; 0 disables sweeping.
    pub fn new(inflight_ttl: i64) -> Self {
        Self { inflight_ttl }
    }

    pub fn inflight_ttl(&self) -> i64 {
        self.inflight_ttl
    }

    /// Oldest `created` timestamp that survives a sweep at `now`.
    pub fn threshold(&self, now: i64) -> i64 {
        now.saturating_sub(self.inflight_ttl)
    }

    pub fn run<S: Store + ?Sized>(&self, store: &S, now: i64) -> Result<usize> {
        if self.inflight_ttl <= 0 {
            return Ok(0);
        }
        store.clear_expired_inflight(self.threshold(now))
    }

    pub fn run_now<S: Store + ?Sized>(&self, store: &S) -> Result<usize> {
        self.run(store, Utc::now().timestamp())
    }
}
