//! Persistence layer backed by `sled`
//!
//! Each record kind gets its own tree, keyed by primary id:
//! - `server_info`: the singleton row under [`SERVER_INFO_ID`]
//! - `clients`, `subscriptions`: one row per id
//! - `messages`: inflight and retained messages together
//!
//! `message_kinds` is a secondary index over `messages`. Its keys are the
//! message kind tag followed by the message id, so a prefix scan yields the
//! ids of one kind without decoding the other. A message row and its index
//! entry are always written in the same transaction.

use std::convert::Infallible;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use tracing::debug;

use super::codec;
use super::lock::FileLock;
use super::record::{Message, MessageKind, Record, RecordKind, SERVER_INFO_ID, ServerInfo};
use super::{Store, StoreOptions};
use crate::utils::error::{Result, StoreError};

const ENGINE_RETRY_INTERVAL: Duration = Duration::from_millis(10);

fn index_key(kind: MessageKind, id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(id.len() + 1);
    key.push(kind.tag());
    key.extend_from_slice(id.as_bytes());
    key
}

fn tx_error(err: TransactionError<Infallible>) -> StoreError {
    match err {
        TransactionError::Storage(e) => StoreError::Persist(e),
        TransactionError::Abort(never) => match never {},
    }
}

/// Open engine plus the lock that keeps other processes out.
struct Inner {
    db: Db,
    server_info: Tree,
    clients: Tree,
    subscriptions: Tree,
    messages: Tree,
    message_kinds: Tree,
    // declared last: dropped only after the engine has released its files
    _lock: FileLock,
}

impl Inner {
    fn new(db: Db, lock: FileLock) -> sled::Result<Self> {
        Ok(Self {
            server_info: db.open_tree("server_info")?,
            clients: db.open_tree("clients")?,
            subscriptions: db.open_tree("subscriptions")?,
            messages: db.open_tree("messages")?,
            message_kinds: db.open_tree("message_kinds")?,
            db,
            _lock: lock,
        })
    }

    fn tree(&self, kind: RecordKind) -> &Tree {
        match kind {
            RecordKind::ServerInfo => &self.server_info,
            RecordKind::Client => &self.clients,
            RecordKind::Subscription => &self.subscriptions,
            RecordKind::Inflight | RecordKind::Retained => &self.messages,
        }
    }

    fn put(&self, kind: RecordKind, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.tree(kind).insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    fn save_message(&self, message: &Message) -> Result<()> {
        let bytes = codec::encode(message)?;
        let id = message.id.as_bytes();
        let indexed = index_key(message.kind, &message.id);
        let empty: &[u8] = &[];

        (&self.messages, &self.message_kinds)
            .transaction(
                |(messages, kinds)| -> ConflictableTransactionResult<(), Infallible> {
                    // a message may switch kind on overwrite; drop its old index entry
                    for kind in [MessageKind::Inflight, MessageKind::Retained] {
                        if kind != message.kind {
                            kinds.remove(index_key(kind, &message.id))?;
                        }
                    }
                    messages.insert(id, bytes.as_slice())?;
                    kinds.insert(indexed.as_slice(), empty)?;
                    Ok(())
                },
            )
            .map_err(tx_error)
    }

    fn delete_message(&self, kind: MessageKind, id: &str) -> Result<()> {
        let indexed = index_key(kind, id);

        (&self.messages, &self.message_kinds)
            .transaction(
                |(messages, kinds)| -> ConflictableTransactionResult<(), Infallible> {
                    if kinds.remove(indexed.as_slice())?.is_some() {
                        messages.remove(id.as_bytes())?;
                    }
                    Ok(())
                },
            )
            .map_err(tx_error)
    }

    fn scan_all(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let tree = self.tree(kind);
        let mut records = Vec::new();
        for entry in tree.iter() {
            let (_, value) = entry?;
            let record = match kind {
                RecordKind::Client => Record::Client(codec::decode(&value)?),
                RecordKind::Subscription => Record::Subscription(codec::decode(&value)?),
                _ => Record::ServerInfo(codec::decode(&value)?),
            };
            records.push(record);
        }
        Ok(records)
    }

    fn scan_messages(&self, kind: MessageKind) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for entry in self.message_kinds.scan_prefix([kind.tag()]) {
            let (key, _) = entry?;
            // row removed between the index scan and this read
            let Some(value) = self.messages.get(&key[1..])? else {
                continue;
            };
            let message: Message = codec::decode(&value)?;
            if message.kind == kind {
                records.push(Record::Message(message));
            }
        }
        Ok(records)
    }

    fn commit(&self, flush: bool) -> Result<()> {
        if flush {
            self.db.flush()?;
        }
        Ok(())
    }
}

/// Durable store in a `sled` database.
pub struct SledStore {
    options: StoreOptions,
    inner: RwLock<Option<Inner>>,
}

impl SledStore {
    /// Create an unopened handle; nothing touches the disk until `open`.
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            inner: RwLock::new(None),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn path(&self) -> &Path {
        &self.options.path
    }

    fn with_inner<T>(&self, f: impl FnOnce(&Inner) -> Result<T>) -> Result<T> {
        let guard = self.inner.read();
        let inner = guard.as_ref().ok_or(StoreError::Unavailable)?;
        f(inner)
    }

    fn open_engine(&self, started: Instant) -> Result<Db> {
        let path = &self.options.path;
        loop {
            match sled::Config::new().path(path).open() {
                Ok(db) => return Ok(db),
                // the engine's own file lock can outlive a handle closed moments ago
                Err(sled::Error::Io(_)) if started.elapsed() < self.options.lock_timeout => {
                    thread::sleep(ENGINE_RETRY_INTERVAL);
                }
                Err(source) => {
                    return Err(StoreError::OpenFailure {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
    }
}

impl Store for SledStore {
    fn open(&self) -> Result<()> {
        let mut guard = self.inner.write();
        if guard.is_some() {
            return Ok(());
        }

        let started = Instant::now();
        let lock = FileLock::acquire(&self.options.path, self.options.lock_timeout)?;
        let db = self.open_engine(started)?;
        let inner = Inner::new(db, lock).map_err(|source| StoreError::OpenFailure {
            path: self.options.path.clone(),
            source,
        })?;
        *guard = Some(inner);

        debug!(path = %self.options.path.display(), "store opened");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let Some(inner) = self.inner.write().take() else {
            return Ok(());
        };
        let flushed = inner.db.flush();
        drop(inner);

        debug!(path = %self.options.path.display(), "store closed");
        flushed?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.read().is_some()
    }

    fn save(&self, record: &Record) -> Result<()> {
        self.with_inner(|inner| {
            match record {
                Record::ServerInfo(v) => {
                    inner.put(RecordKind::ServerInfo, SERVER_INFO_ID, codec::encode(v)?)?
                }
                Record::Client(v) => inner.put(RecordKind::Client, &v.id, codec::encode(v)?)?,
                Record::Subscription(v) => {
                    inner.put(RecordKind::Subscription, &v.id, codec::encode(v)?)?
                }
                Record::Message(m) => inner.save_message(m)?,
            }
            inner.commit(self.options.flush_on_write)
        })
    }

    fn delete(&self, kind: RecordKind, id: &str) -> Result<()> {
        self.with_inner(|inner| {
            match kind.message_kind() {
                Some(message_kind) => inner.delete_message(message_kind, id)?,
                None => {
                    // the singleton lives under its fixed key whatever id is given
                    let key = if kind == RecordKind::ServerInfo {
                        SERVER_INFO_ID
                    } else {
                        id
                    };
                    inner.tree(kind).remove(key.as_bytes())?;
                }
            }
            inner.commit(self.options.flush_on_write)
        })
    }

    fn find_by_kind(&self, kind: RecordKind) -> Result<Vec<Record>> {
        self.with_inner(|inner| match kind.message_kind() {
            Some(message_kind) => inner.scan_messages(message_kind),
            None => inner.scan_all(kind),
        })
    }

    fn read_server_info(&self) -> Result<ServerInfo> {
        self.with_inner(|inner| match inner.server_info.get(SERVER_INFO_ID)? {
            Some(value) => codec::decode(&value),
            None => Ok(ServerInfo::default()),
        })
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("path", &self.options.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for SledStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
