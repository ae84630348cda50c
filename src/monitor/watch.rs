//! In-process state source backed by a `tokio::sync::watch` channel.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;

use crate::monitor::source::{Epoch, StateSource};

/// A state source whose epoch is pushed in by its owner.
///
/// Every waiter holds its own receiver, so a single `publish` wakes all of them.
#[derive(Debug)]
pub struct WatchStateSource {
    tx: watch::Sender<Epoch>,
}

impl WatchStateSource {
    /// Create a source whose epoch starts out unknown.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Epoch::unknown());
        Self { tx }
    }

    /// Replace the current epoch. Waiters are only woken if the value changed.
    pub fn publish(&self, epoch: Epoch) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == epoch {
                false
            } else {
                *current = epoch;
                true
            }
        });
        if changed {
            tracing::debug!(epoch = %self.tx.borrow().as_str(), "Epoch changed");
        }
        changed
    }

    /// Number of requests currently waiting for a change.
    pub fn waiter_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for WatchStateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateSource for WatchStateSource {
    fn current_version(&self) -> Option<Epoch> {
        let epoch = self.tx.borrow();
        if epoch.is_unknown() {
            None
        } else {
            Some(epoch.clone())
        }
    }

    async fn wait_for_change(&self, timeout: Duration, current: &Epoch) -> Epoch {
        let mut rx = self.tx.subscribe();
        let changed = match tokio::time::timeout(timeout, rx.wait_for(|epoch| epoch != current)).await {
            Ok(Ok(epoch)) => Some(Epoch::clone(&epoch)),
            // Elapsed, or the sender is gone (it cannot be while `self` is alive).
            _ => None,
        };
        match changed {
            Some(epoch) => epoch,
            None => self.tx.borrow().clone(),
        }
    }
}
