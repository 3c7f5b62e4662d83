//! In-memory `Store` backend.
//!
//! Nothing survives a restart. It follows the same contract as `SledStore`
//! (open/close lifecycle, upserts, idempotent deletes, kind isolation) so
//! broker code can be tested without touching the disk.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::Store;
use super::record::{Client, Message, Record, RecordKind, ServerInfo, Subscription};
use crate::utils::error::{Result, StoreError};

#[derive(Debug, Default)]
struct Tables {
    server_info: Option<ServerInfo>,
    clients: HashMap<String, Client>,
    subscriptions: HashMap<String, Subscription>,
    messages: HashMap<String, Message>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Option<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn open(&self) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.is_none() {
            *tables = Some(Tables::default());
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.tables.write().take();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.tables.read().is_some()
    }

    fn save(&self, record: &Record) -> Result<()> {
        let mut guard = self.tables.write();
        let tables = guard.as_mut().ok_or(StoreError::Unavailable)?;
        match record.clone() {
            Record::ServerInfo(v) => tables.server_info = Some(v),
            Record::Client(v) => {
                tables.clients.insert(v.id.clone(), v);
            }
            Record::Subscription(v) => {
                tables.subscriptions.insert(v.id.clone(), v);
            }
            Record::Message(v) => {
                tables.messages.insert(v.id.clone(), v);
            }
        }
        Ok(())
    }

    fn delete(&self, kind: RecordKind, id: &str) -> Result<()> {
        let mut guard = self.tables.write();
        let tables = guard.as_mut().ok_or(StoreError::Unavailable)?;
        match kind {
            RecordKind::ServerInfo => tables.server_info = None,
            RecordKind::Client => {
                tables.clients.remove(id);
            }
            RecordKind::Subscription => {
                tables.subscriptions.remove(id);
            }
            RecordKind::Inflight | RecordKind::Retained => {
                if tables
                    .messages
                    .get(id)
                    .is_some_and(|m| RecordKind::from(m.kind) == kind)
                {
                    tables.messages.remove(id);
                }
            }
        }
        Ok(())
    }

    fn find_by_kind(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let guard = self.tables.read();
        let tables = guard.as_ref().ok_or(StoreError::Unavailable)?;
        let records = match kind {
            RecordKind::ServerInfo => tables
                .server_info
                .iter()
                .cloned()
                .map(Record::ServerInfo)
                .collect(),
            RecordKind::Client => tables.clients.values().cloned().map(Record::Client).collect(),
            RecordKind::Subscription => tables
                .subscriptions
                .values()
                .cloned()
                .map(Record::Subscription)
                .collect(),
            RecordKind::Inflight | RecordKind::Retained => tables
                .messages
                .values()
                .filter(|m| RecordKind::from(m.kind) == kind)
                .cloned()
                .map(Record::Message)
                .collect(),
        };
        Ok(records)
    }

    fn read_server_info(&self) -> Result<ServerInfo> {
        let guard = self.tables.read();
        let tables = guard.as_ref().ok_or(StoreError::Unavailable)?;
        Ok(tables.server_info.clone().unwrap_or_default())
    }
}
