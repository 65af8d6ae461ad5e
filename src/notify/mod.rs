mod sink;
mod types;

pub(crate) use types::plural;
pub use sink::{BroadcastSink, MemorySink, NotificationSink, TracingSink};
pub use types::{Notice, Severity};
