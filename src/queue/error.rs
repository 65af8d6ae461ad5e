use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Cannot remove {0} while it is uploading")]
    CannotRemoveUploading(String),

    #[error("An upload batch is already running")]
    BatchInProgress,

    #[error("Record error: {0}")]
    Record(#[from] crate::record::RecordError),
}

pub type QueueResult<T> = Result<T, QueueError>;
