//! Upload queue with validation, previews and a pluggable transport.
//!
//! Files pass through [`validation`] into an ordered [`queue::UploadQueue`],
//! which uploads Pending records one at a time through a
//! [`transport::Transport`] and reports every state change to
//! [`notify::NotificationSink`]s.

pub mod config;
pub mod metrics;
pub mod notify;
pub mod queue;
pub mod record;
pub mod transport;
pub mod validation;

pub use queue::{BatchSummary, QueueError, QueueStats, UploadQueue};
pub use record::{FileRecord, FileStatus, RawFile};
pub use transport::{SimulatedTransport, SimulatorConfig, Transport};
pub use validation::{AcceptedTypes, UploadRules};
