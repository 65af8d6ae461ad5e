//! Metrics and observability module
//!
//! Key metrics exposed:
//! - Files enqueued and rejected at the validation gate
//! - Uploads started, completed and failed (by reason)
//! - Upload duration and size distributions
//! - Queue composition by status

pub mod exporter;
pub mod recorder;

pub use exporter::{render_metrics, start_metrics_server, MetricsConfig, MetricsError};
pub use recorder::{init_metrics, record_queue_composition, UploadTimer};
