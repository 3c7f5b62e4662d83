use std::time::Duration;

use serde::Deserialize;

use crate::persistence::{DEFAULT_LOCK_TIMEOUT, DEFAULT_PATH, StoreOptions};

/// Top-level configuration settings.
///
/// Includes the store's own settings and the broker-owned settings the
/// maintenance binary needs to run sweeps.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    pub broker: BrokerSettings,
    pub log: LogSettings,
}

/// Where the store lives and how it is opened.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub path: String,
    pub lock_timeout_ms: u64,
    pub flush_on_write: bool,
}

/// Settings owned by the broker rather than the store.
///
/// The inflight TTL is handed to the sweeper; the store never reads it.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub inflight_ttl_secs: i64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub store: Option<PartialStoreSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialStoreSettings {
    pub path: Option<String>,
    pub lock_timeout_ms: Option<u64>,
    pub flush_on_write: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub inflight_ttl_secs: Option<i64>,
    pub sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings {
                path: DEFAULT_PATH.to_string(),
                lock_timeout_ms: DEFAULT_LOCK_TIMEOUT.as_millis() as u64,
                flush_on_write: true,
            },
            broker: BrokerSettings {
                inflight_ttl_secs: 60 * 60 * 24,
                sweep_interval_secs: 60,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Overlay whatever was specified onto `base`.
    pub fn merge(self, base: Settings) -> Settings {
        let store = self.store;
        let broker = self.broker;
        let log = self.log;

        Settings {
            store: StoreSettings {
                path: store
                    .as_ref()
                    .and_then(|s| s.path.clone())
                    .unwrap_or(base.store.path),
                lock_timeout_ms: store
                    .as_ref()
                    .and_then(|s| s.lock_timeout_ms)
                    .unwrap_or(base.store.lock_timeout_ms),
                flush_on_write: store
                    .as_ref()
                    .and_then(|s| s.flush_on_write)
                    .unwrap_or(base.store.flush_on_write),
            },
            broker: BrokerSettings {
                inflight_ttl_secs: broker
                    .as_ref()
                    .and_then(|b| b.inflight_ttl_secs)
                    .unwrap_or(base.broker.inflight_ttl_secs),
                sweep_interval_secs: broker
                    .as_ref()
                    .and_then(|b| b.sweep_interval_secs)
                    .unwrap_or(base.broker.sweep_interval_secs),
            },
            log: LogSettings {
                level: log.and_then(|l| l.level).unwrap_or(base.log.level),
            },
        }
    }
}

impl BrokerSettings {
    /// Interval between repeated sweeps; `override_secs` wins over the
    /// configured value. Never shorter than one second.
    pub fn sweep_interval(&self, override_secs: Option<u64>) -> Duration {
        Duration::from_secs(override_secs.unwrap_or(self.sweep_interval_secs).max(1))
    }
}

impl From<&StoreSettings> for StoreOptions {
    fn from(settings: &StoreSettings) -> Self {
        StoreOptions::new(&settings.path)
            .with_lock_timeout(Duration::from_millis(settings.lock_timeout_ms))
            .with_flush_on_write(settings.flush_on_write)
    }
}
