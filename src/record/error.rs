use crate::record::types::FileStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid state transition for {id}: cannot handle {event} while {from}")]
    InvalidTransition {
        id: String,
        from: FileStatus,
        event: String,
    },

    #[error("Progress out of range: {0}")]
    ProgressOutOfRange(u8),
}

pub type RecordResult<T> = Result<T, RecordError>;
