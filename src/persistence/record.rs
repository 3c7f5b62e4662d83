//! Record shapes persisted by the store.
//!
//! Inflight and retained messages share the `Message` shape and are told apart
//! by `Message::kind`. Every shape converts into the tagged `Record` enum used
//! at the `Store` boundary.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed primary key of the singleton server info row.
pub const SERVER_INFO_ID: &str = "server_info";

/// Discriminator over the five persisted record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    ServerInfo,
    Client,
    Subscription,
    Inflight,
    Retained,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::ServerInfo,
        RecordKind::Client,
        RecordKind::Subscription,
        RecordKind::Inflight,
        RecordKind::Retained,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::ServerInfo => "server_info",
            RecordKind::Client => "client",
            RecordKind::Subscription => "subscription",
            RecordKind::Inflight => "inflight",
            RecordKind::Retained => "retained",
        }
    }

    /// The message discriminator for the two message kinds, `None` otherwise.
    pub fn message_kind(&self) -> Option<MessageKind> {
        match self {
            RecordKind::Inflight => Some(MessageKind::Inflight),
            RecordKind::Retained => Some(MessageKind::Retained),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which of the two message lifecycles a `Message` belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Sent with QoS 1/2 and not yet acknowledged.
    #[default]
    Inflight,
    /// Last retained publish for its topic.
    Retained,
}

impl MessageKind {
    /// Single-byte tag used as the kind index key prefix.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            MessageKind::Inflight => b'i',
            MessageKind::Retained => b'r',
        }
    }
}

impl From<MessageKind> for RecordKind {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Inflight => RecordKind::Inflight,
            MessageKind::Retained => RecordKind::Retained,
        }
    }
}

/// Broker statistics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub version: String,
    pub started: i64,
    pub time: i64,
    pub uptime: i64,
    pub bytes_recv: i64,
    pub bytes_sent: i64,
    pub clients_connected: i64,
    pub clients_disconnected: i64,
    pub clients_maximum: i64,
    pub clients_total: i64,
    pub connections_total: i64,
    pub messages_recv: i64,
    pub messages_sent: i64,
    pub publish_dropped: i64,
    pub publish_recv: i64,
    pub publish_sent: i64,
    pub retained: i64,
    pub inflight: i64,
    pub subscriptions: i64,
}

/// Singleton row; always stored under [`SERVER_INFO_ID`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub id: String,
    pub info: SystemInfo,
}

impl ServerInfo {
    pub fn new(info: SystemInfo) -> Self {
        Self {
            id: SERVER_INFO_ID.to_string(),
            info,
        }
    }
}

/// Last will and testament registered by a client at connect time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Will {
    pub topic: String,
    pub message: Vec<u8>,
    pub qos: u8,
    pub retain: bool,
}

/// A known client session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub id: String,
    pub client_id: String,
    pub listener: String,
    pub username: Vec<u8>,
    pub protocol_version: u8,
    pub clean_session: bool,
    /// Topic filter to granted QoS.
    pub subscriptions: HashMap<String, u8>,
    pub will: Will,
}

/// One (client, filter) subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub id: String,
    pub client: String,
    pub filter: String,
    pub qos: u8,
}

/// Fixed header fields of the publish packet a message was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedHeader {
    pub packet_type: u8,
    pub qos: u8,
    pub dup: bool,
    pub retain: bool,
    pub remaining: u32,
}

/// Inflight or retained message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    pub kind: MessageKind,
    pub client: String,
    pub topic: String,
    pub payload: Vec<u8>,
    pub fixed_header: FixedHeader,
    pub packet_id: u16,
    /// Unix seconds; 0 means unknown age.
    pub created: i64,
    pub sent: i64,
    pub resends: u32,
}

impl Message {
    pub fn inflight(id: impl Into<String>, topic: impl Into<String>, created: i64) -> Self {
        Self {
            id: id.into(),
            kind: MessageKind::Inflight,
            topic: topic.into(),
            created,
            ..Default::default()
        }
    }

    pub fn retained(id: impl Into<String>, topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            kind: MessageKind::Retained,
            topic: topic.into(),
            payload,
            ..Default::default()
        }
    }

    /// Whether a sweep with the given threshold reclaims this message.
    pub fn is_expired(&self, expiry: i64) -> bool {
        self.created < expiry || self.created == 0
    }
}

/// Any persisted record, tagged by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    ServerInfo(ServerInfo),
    Client(Client),
    Subscription(Subscription),
    Message(Message),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::ServerInfo(_) => RecordKind::ServerInfo,
            Record::Client(_) => RecordKind::Client,
            Record::Subscription(_) => RecordKind::Subscription,
            Record::Message(m) => m.kind.into(),
        }
    }

    /// Primary key within the record's container.
    pub fn key(&self) -> &str {
        match self {
            Record::ServerInfo(_) => SERVER_INFO_ID,
            Record::Client(c) => &c.id,
            Record::Subscription(s) => &s.id,
            Record::Message(m) => &m.id,
        }
    }
}

impl From<ServerInfo> for Record {
    fn from(v: ServerInfo) -> Self {
        Record::ServerInfo(v)
    }
}

impl From<Client> for Record {
    fn from(v: Client) -> Self {
        Record::Client(v)
    }
}

impl From<Subscription> for Record {
    fn from(v: Subscription) -> Self {
        Record::Subscription(v)
    }
}

impl From<Message> for Record {
    fn from(v: Message) -> Self {
        Record::Message(v)
    }
}
