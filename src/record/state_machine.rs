use crate::record::error::{RecordError, RecordResult};
use crate::record::types::{FileRecord, FileStatus};
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    Start,
    Progress {
        percent: u8,
    },
    Complete {
        description: Option<String>,
        uploaded_at: DateTime<Utc>,
    },
    Fail {
        error: String,
    },
    Retry,
}

impl fmt::Display for RecordEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordEvent::Start => f.write_str("start"),
            RecordEvent::Progress { percent } => write!(f, "progress({percent})"),
            RecordEvent::Complete { .. } => f.write_str("complete"),
            RecordEvent::Fail { .. } => f.write_str("fail"),
            RecordEvent::Retry => f.write_str("retry"),
        }
    }
}

impl FileRecord {
    /// Apply an event and return the resulting record.
    ///
    /// The receiver is left untouched so callers can swap the new record into
    /// a fresh list while readers keep their old snapshot.
    pub fn transition(&self, event: RecordEvent) -> RecordResult<FileRecord> {
        let mut next = self.clone();

        match (self.status, event) {
            (FileStatus::Pending, RecordEvent::Start) => {
                next.status = FileStatus::Uploading;
                next.progress = 0;
                next.error = None;
            }

            (FileStatus::Uploading, RecordEvent::Progress { percent }) => {
                if percent > 100 {
                    return Err(RecordError::ProgressOutOfRange(percent));
                }
                next.progress = percent;
            }

            (
                FileStatus::Uploading,
                RecordEvent::Complete {
                    description,
                    uploaded_at,
                },
            ) => {
                next.status = FileStatus::Completed;
                next.progress = 100;
                next.error = None;
                next.description = description;
                next.uploaded_at = Some(uploaded_at);
            }

            (FileStatus::Uploading, RecordEvent::Fail { error }) => {
                next.status = FileStatus::Error;
                next.progress = 0;
                next.error = Some(error);
            }

            (FileStatus::Error, RecordEvent::Retry) => {
                next.status = FileStatus::Pending;
                next.progress = 0;
                next.error = None;
            }

            (from, event) => {
                return Err(RecordError::InvalidTransition {
                    id: self.id.clone(),
                    from,
                    event: event.to_string(),
                });
            }
        }

        Ok(next)
    }
}
