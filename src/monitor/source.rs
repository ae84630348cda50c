//! State source contract and the epoch token.

use async_trait::async_trait;
use std::time::Duration;

/// Opaque version token of the cluster state. The empty string means unknown.
///
/// Only equality is meaningful to the gateway; ordering belongs to the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Epoch(String);

impl Epoch {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The "no value obtained yet" epoch.
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Epoch {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Epoch {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Tracks the current state epoch and notifies waiters when it changes.
///
/// Both operations are called concurrently from many requests.
#[async_trait]
pub trait StateSource: Send + Sync {
    /// The current epoch, or `None` if no value is available yet. Never blocks.
    fn current_version(&self) -> Option<Epoch>;

    /// Wait up to `timeout` for the epoch to differ from `current`, then return
    /// the latest known epoch (which may still equal `current`).
    async fn wait_for_change(&self, timeout: Duration, current: &Epoch) -> Epoch;
}
