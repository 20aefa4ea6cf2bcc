use tokio::sync::broadcast;

use crate::models::{Notice, NoticeLevel};

/// Fan-out of operator notices to every open console event stream.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notice: Notice) {
        if notice.level == NoticeLevel::Error {
            tracing::warn!(
                booking_id = ?notice.booking_id,
                service_id = ?notice.service_id,
                message = %notice.message,
                "operator error notice"
            );
        } else {
            tracing::info!(
                booking_id = ?notice.booking_id,
                service_id = ?notice.service_id,
                message = %notice.message,
                "operator notice"
            );
        }
        // No subscribers is fine
        let _ = self.tx.send(notice);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}
