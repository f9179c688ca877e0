use std::fmt;

use tokio::sync::mpsc;

use crate::domain::StatusUpdate;

pub type StatusSender = mpsc::UnboundedSender<StatusUpdate>;

/// Status updates for one submitted extrinsic. Yields nothing once unsubscribed;
/// dropping it unsubscribes.
pub struct StatusSubscription {
    updates: mpsc::UnboundedReceiver<StatusUpdate>,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl StatusSubscription {
    pub fn new(
        updates: mpsc::UnboundedReceiver<StatusUpdate>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            updates,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn channel(unsubscribe: impl FnOnce() + Send + 'static) -> (StatusSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, unsubscribe))
    }

    pub async fn next(&mut self) -> Option<StatusUpdate> {
        if !self.is_active() {
            return None;
        }
        self.updates.recv().await
    }

    /// Returns `false` when the subscription was already torn down.
    pub fn unsubscribe(&mut self) -> bool {
        match self.unsubscribe.take() {
            Some(unsubscribe) => {
                self.updates.close();
                unsubscribe();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.unsubscribe.is_some()
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for StatusSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
