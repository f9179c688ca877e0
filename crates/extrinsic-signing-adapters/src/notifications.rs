use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use extrinsic_signing_core::{Notification, NotificationKind, NotificationPort};

/// Append-only notification sink.
#[derive(Debug, Clone, Default)]
pub struct NotificationAdapter {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationAdapter {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent().into_iter().map(|n| n.kind).collect()
    }
}

impl NotificationPort for NotificationAdapter {
    fn notify(&self, notification: Notification) {
        info!(
            kind = ?notification.kind,
            title = %notification.title,
            subtitle = %notification.subtitle,
            "notification"
        );
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
