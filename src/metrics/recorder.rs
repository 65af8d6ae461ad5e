//! Metrics recorder for upload queue operations

use crate::queue::QueueStats;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    describe_metrics();
}

/// Register descriptions with whichever recorder is installed right now
pub(crate) fn describe_metrics() {
    describe_counter!(
        "dropqueue_files_enqueued_total",
        "Files accepted into the upload queue"
    );
    describe_counter!(
        "dropqueue_files_rejected_total",
        "Files rejected by validation"
    );
    describe_counter!(
        "dropqueue_uploads_started_total",
        "Uploads handed to the transport"
    );
    describe_counter!(
        "dropqueue_uploads_completed_total",
        "Uploads that completed successfully"
    );
    describe_counter!("dropqueue_uploads_failed_total", "Uploads that failed");

    describe_gauge!("dropqueue_queue_records", "Queue records by status");

    describe_histogram!(
        "dropqueue_upload_duration_seconds",
        "Time from upload start to outcome"
    );
    describe_histogram!("dropqueue_upload_size_bytes", "Size of uploaded files");
}

// ============== Validation ==============

pub fn record_files_enqueued(count: usize) {
    counter!("dropqueue_files_enqueued_total").increment(count as u64);
}

pub fn record_file_rejected(reason: &str) {
    counter!("dropqueue_files_rejected_total", "reason" => reason.to_string()).increment(1);
}

// ============== Uploads ==============

pub fn record_upload_started(size: u64) {
    counter!("dropqueue_uploads_started_total").increment(1);
    histogram!("dropqueue_upload_size_bytes").record(size as f64);
}

pub fn record_upload_completed(duration: Duration) {
    counter!("dropqueue_uploads_completed_total").increment(1);
    histogram!("dropqueue_upload_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_upload_failed(reason: &str, duration: Duration) {
    counter!("dropqueue_uploads_failed_total", "reason" => reason.to_string()).increment(1);
    histogram!("dropqueue_upload_duration_seconds").record(duration.as_secs_f64());
}

// ============== Queue ==============

/// Publish the per-status record counts
pub fn record_queue_composition(stats: &QueueStats) {
    gauge!("dropqueue_queue_records", "status" => "pending").set(stats.pending as f64);
    gauge!("dropqueue_queue_records", "status" => "uploading").set(stats.uploading as f64);
    gauge!("dropqueue_queue_records", "status" => "completed").set(stats.completed as f64);
    gauge!("dropqueue_queue_records", "status" => "error").set(stats.failed as f64);
}

/// Times a single upload and records its outcome
pub struct UploadTimer {
    start_time: Instant,
}

impl UploadTimer {
    pub fn start(size: u64) -> Self {
        record_upload_started(size);
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn complete(self) {
        record_upload_completed(self.elapsed());
    }

    pub fn fail(self, reason: &str) {
        record_upload_failed(reason, self.elapsed());
    }
}
