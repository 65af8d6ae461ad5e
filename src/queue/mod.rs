mod controller;
mod error;
mod types;

pub use controller::UploadQueue;
pub use error::{QueueError, QueueResult};
pub use types::{BatchOutcome, BatchSummary, EnqueueReport, QueueStats};
