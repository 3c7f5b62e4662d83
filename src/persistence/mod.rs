//! The `persistence` module is the durable state layer of the broker.
//!
//! It stores server info, client sessions, subscriptions and inflight/retained
//! messages so that broker state can be rebuilt after a restart.
//!
//! - `record`: the persisted record shapes and their kind discriminator.
//! - `codec`: conversion between records and stored bytes.
//! - `sled_store`: the durable `Store` backed by an embedded `sled` database.
//! - `memory`: a non-durable `Store` with the same contract, for tests.
//! - `sweeper`: reclamation of expired inflight messages.
//! - `lock`: the exclusive file lock taken while a store is open.

pub mod codec;
pub mod lock;
pub mod memory;
pub mod record;
pub mod sled_store;
pub mod sweeper;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::error::Result;

pub use memory::MemoryStore;
pub use record::{
    Client, FixedHeader, Message, MessageKind, Record, RecordKind, SERVER_INFO_ID, ServerInfo,
    Subscription, SystemInfo, Will,
};
pub use sled_store::SledStore;
pub use sweeper::Sweeper;

/// File used when no path (or `.`) is configured.
pub const DEFAULT_PATH: &str = "popstore.db";

/// How long `open` waits for the exclusive lock by default.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(250);

/// Options for opening a store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub path: PathBuf,
    pub lock_timeout: Duration,
    /// Flush to disk before every `save`/`delete` returns.
    pub flush_on_write: bool,
}

impl StoreOptions {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path = if path.as_os_str().is_empty() || path == Path::new(".") {
            PathBuf::from(DEFAULT_PATH)
        } else {
            path.to_path_buf()
        };
        Self {
            path,
            ..Default::default()
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_flush_on_write(mut self, flush: bool) -> Self {
        self.flush_on_write = flush;
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            flush_on_write: true,
        }
    }
}

/// Contract shared by every store backend.
///
/// A broker is constructed with one handle, opens it at startup, bulk-reads
/// each kind to rebuild its in-memory state and writes deltas while running.
/// Every operation on a handle that is not open fails with
/// `StoreError::Unavailable`.
pub trait Store: Send + Sync {
    fn open(&self) -> Result<()>;

    /// Flush and release the handle. Closing twice is a no-op.
    fn close(&self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Upsert one record by primary key in a single atomic write.
    fn save(&self, record: &Record) -> Result<()>;

    /// Remove one record. Removing an absent id succeeds.
    ///
    /// For `Inflight`/`Retained` only a message stored under that kind is
    /// removed; a message with the same id under the other kind stays.
    fn delete(&self, kind: RecordKind, id: &str) -> Result<()>;

    /// Every record of `kind`, in no particular order.
    fn find_by_kind(&self, kind: RecordKind) -> Result<Vec<Record>>;

    /// The singleton server info row, or its zero value on a fresh store.
    fn read_server_info(&self) -> Result<ServerInfo>;

    /// Delete inflight messages created before `expiry` (unix seconds) or of
    /// unknown age. Returns how many were removed.
    fn clear_expired_inflight(&self, expiry: i64) -> Result<usize> {
        sweeper::clear_expired_inflight(self, expiry)
    }

    fn read_clients(&self) -> Result<Vec<Client>> {
        Ok(self
            .find_by_kind(RecordKind::Client)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Client(c) => Some(c),
                _ => None,
            })
            .collect())
    }

    fn read_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self
            .find_by_kind(RecordKind::Subscription)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Subscription(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    fn read_inflight(&self) -> Result<Vec<Message>> {
        read_messages(self, MessageKind::Inflight)
    }

    fn read_retained(&self) -> Result<Vec<Message>> {
        read_messages(self, MessageKind::Retained)
    }
}

fn read_messages<S: Store + ?Sized>(store: &S, kind: MessageKind) -> Result<Vec<Message>> {
    Ok(store
        .find_by_kind(kind.into())?
        .into_iter()
        .filter_map(|r| match r {
            Record::Message(m) if m.kind == kind => Some(m),
            _ => None,
        })
        .collect())
}
