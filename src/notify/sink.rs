use crate::notify::types::{Notice, Severity};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Receives every status message the queue emits.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Writes notices to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notice: &Notice) {
        match notice.severity {
            Severity::Info | Severity::Success => {
                tracing::info!(severity = %notice.severity, "{}", notice.message)
            }
            Severity::Warning => tracing::warn!("{}", notice.message),
            Severity::Error => tracing::error!("{}", notice.message),
        }
    }
}

/// Fans notices out to any number of async subscribers (UI, websocket, ...).
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(256)
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notice: &Notice) {
        // No subscribers is fine
        let _ = self.tx.send(notice.clone());
    }
}

/// Keeps every notice in memory; handy for tests and batch reports.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.message.clone()).collect()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().push(notice.clone());
    }
}
