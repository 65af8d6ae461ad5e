use crate::record::FileRecord;
use crate::transport::error::TransferResult;
use crate::transport::types::{ProgressSender, UploadReceipt};
use async_trait::async_trait;

/// Moves one file to the remote side.
///
/// Implementations report progress as percentages on `progress` while the
/// upload runs and resolve to a receipt or a per-file failure. The sender is
/// dropped when the call returns, which ends the progress stream.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn upload(
        &self,
        record: &FileRecord,
        progress: ProgressSender,
    ) -> TransferResult<UploadReceipt>;
}
