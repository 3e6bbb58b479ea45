//! In-process change notifications, one revision counter per user.
//!
//! Backends bump a user's revision after every committed write; listeners
//! wake up and re-read. Several writes between two wake-ups coalesce into a
//! single notification.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracker_core::model::UserKey;

#[derive(Clone, Default)]
pub struct ChangeFeed {
    channels: Arc<Mutex<HashMap<UserKey, watch::Sender<u64>>>>,
}

impl ChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for writes under `user`. Writes made before this call are not reported.
    #[must_use]
    pub fn subscribe(&self, user: &UserKey) -> ChangeListener {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = channels
            .entry(user.clone())
            .or_insert_with(|| watch::channel(0).0);
        ChangeListener {
            rx: sender.subscribe(),
        }
    }

    /// Record a committed write under `user`.
    ///
    /// A user whose listeners have all been dropped loses its channel here.
    pub fn notify(&self, user: &UserKey) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = channels.get(user) else {
            return;
        };
        if sender.receiver_count() == 0 {
            channels.remove(user);
            return;
        }
        sender.send_modify(|revision| *revision += 1);
    }

    #[cfg(test)]
    fn tracked_users(&self) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Receiving end of a `ChangeFeed` subscription.
#[derive(Debug)]
pub struct ChangeListener {
    rx: watch::Receiver<u64>,
}

impl ChangeListener {
    /// Wait for the next write. Returns `false` once the feed is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Number of writes observed on this channel so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.rx.borrow()
    }
}
