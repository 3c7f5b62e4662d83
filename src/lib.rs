//! # PopStore
//!
//! `popstore` is the durable state layer of a publish/subscribe broker. It
//! keeps server info, client sessions, subscriptions and inflight/retained
//! messages in an embedded `sled` database so the broker can rebuild its
//! in-memory state after a restart.
//!
//! ## Core Modules
//!
//! - `persistence`: the `Store` contract, its `sled` and in-memory backends,
//!   record shapes and the inflight expiry sweeper.
//! - `config`: loading store and sweep settings from files and environment.
//! - `auth`: stateless allow/deny access controllers for the broker runtime.
//! - `utils`: the shared error type and logging bootstrap.

pub mod auth;
pub mod config;
pub mod persistence;
pub mod utils;

pub use persistence::{Record, RecordKind, SledStore, Store, StoreOptions};
pub use utils::error::{Result, StoreError};
