use crate::record::{format_file_size, FileRecord, FileStatus};
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Result of handing a selection of files to the queue
#[derive(Debug, Default)]
pub struct EnqueueReport {
    pub accepted: usize,
    pub rejected: Vec<ValidationError>,
}

/// Pure projection of the record list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total_files: usize,
    pub total_bytes: u64,
    pub pending: usize,
    pub uploading: usize,
    pub completed: usize,
    pub failed: usize,
    /// Completed share of all records, rounded percent
    pub completion_rate: u8,
}

impl QueueStats {
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut stats = QueueStats {
            total_files: records.len(),
            ..Default::default()
        };

        for record in records {
            stats.total_bytes += record.size;
            match record.status {
                FileStatus::Pending => stats.pending += 1,
                FileStatus::Uploading => stats.uploading += 1,
                FileStatus::Completed => stats.completed += 1,
                FileStatus::Error => stats.failed += 1,
            }
        }

        if stats.total_files > 0 {
            let rate = stats.completed as f64 / stats.total_files as f64 * 100.0;
            stats.completion_rate = rate.round() as u8;
        }

        stats
    }

    pub fn formatted_total_size(&self) -> String {
        format_file_size(self.total_bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOutcome {
    /// Nothing was pending when the batch started
    Empty,
    AllSucceeded,
    Partial,
    NoneSucceeded,
}

/// Summary of one `upload_all` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Removed from the queue before their turn came
    pub skipped: usize,
}

impl BatchSummary {
    pub fn outcome(&self) -> BatchOutcome {
        if self.total == 0 {
            BatchOutcome::Empty
        } else if self.succeeded == self.total {
            BatchOutcome::AllSucceeded
        } else if self.succeeded == 0 {
            BatchOutcome::NoneSucceeded
        } else {
            BatchOutcome::Partial
        }
    }

    /// Files that reached Completed or Error, or were skipped
    pub fn finished(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawFile, RecordEvent};

    fn record(name: &str, size: usize) -> FileRecord {
        FileRecord::pending(name.into(), RawFile::new(name, "text/plain", vec![0u8; size]), None)
    }

    #[test]
    fn test_stats_projection() {
        let pending = record("a.txt", 1024);
        let uploading = record("b.txt", 1024).transition(RecordEvent::Start).unwrap();
        let failed = uploading
            .transition(RecordEvent::Fail {
                error: "Network connection lost".into(),
            })
            .unwrap();
        let completed = record("c.txt", 2048)
            .transition(RecordEvent::Start)
            .unwrap()
            .transition(RecordEvent::Complete {
                description: None,
                uploaded_at: chrono::Utc::now(),
            })
            .unwrap();

        let stats = QueueStats::from_records(&[pending, uploading, failed, completed]);
        assert_eq!(stats.total_files, 4);
        assert_eq!(stats.total_bytes, 5 * 1024);
        assert_eq!(
            (stats.pending, stats.uploading, stats.completed, stats.failed),
            (1, 1, 1, 1)
        );
        assert_eq!(stats.completion_rate, 25);
        assert_eq!(stats.formatted_total_size(), "5 KB");
    }

    #[test]
    fn test_empty_stats() {
        let stats = QueueStats::from_records(&[]);
        assert_eq!(stats, QueueStats::default());
        assert_eq!(stats.formatted_total_size(), "0 Bytes");
    }

    #[test]
    fn test_batch_outcome() {
        let summary = |succeeded, failed| BatchSummary {
            total: succeeded + failed,
            succeeded,
            failed,
            skipped: 0,
        };

        assert_eq!(BatchSummary::default().outcome(), BatchOutcome::Empty);
        assert_eq!(summary(3, 0).outcome(), BatchOutcome::AllSucceeded);
        assert_eq!(summary(2, 1).outcome(), BatchOutcome::Partial);
        assert_eq!(summary(0, 2).outcome(), BatchOutcome::NoneSucceeded);
    }
}
