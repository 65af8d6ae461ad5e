use crate::metrics::recorder::{record_file_rejected, record_files_enqueued};
use crate::metrics::{init_metrics, record_queue_composition, UploadTimer};
use crate::notify::{plural, Notice, NotificationSink, TracingSink};
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::types::{BatchOutcome, BatchSummary, EnqueueReport, QueueStats};
use crate::record::{generate_record_id, FileRecord, FileStatus, RawFile, RecordEvent};
use crate::transport::{progress_channel, ProgressReceiver, Transport};
use crate::validation::{admit, UploadRules};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ordered upload queue driving one file at a time through a [`Transport`].
///
/// The record list is copy-on-write: every mutation installs a new list, so a
/// snapshot taken by a reader never changes underneath it.
pub struct UploadQueue {
    records: Arc<RwLock<Arc<Vec<FileRecord>>>>,
    transport: Arc<dyn Transport>,
    rules: Arc<UploadRules>,
    sinks: Arc<Vec<Arc<dyn NotificationSink>>>,

    // Set while upload_all runs
    batch_active: Arc<AtomicBool>,
    overall_progress: Arc<RwLock<f32>>,
}

/// Clears the batch flag and overall progress however the batch ends
struct BatchGuard<'a> {
    active: &'a AtomicBool,
    progress: &'a RwLock<f32>,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        *self.progress.write() = 0.0;
        self.active.store(false, Ordering::SeqCst);
    }
}

impl UploadQueue {
    pub fn new(transport: Arc<dyn Transport>, rules: UploadRules) -> Self {
        init_metrics();
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(TracingSink)];

        Self {
            records: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            transport,
            rules: Arc::new(rules),
            sinks: Arc::new(sinks),
            batch_active: Arc::new(AtomicBool::new(false)),
            overall_progress: Arc::new(RwLock::new(0.0)),
        }
    }

    /// Add a notification subscriber
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        Arc::make_mut(&mut self.sinks).push(sink);
        self
    }

    pub fn rules(&self) -> &UploadRules {
        &self.rules
    }

    /// Consistent view of the whole queue
    pub fn snapshot(&self) -> Arc<Vec<FileRecord>> {
        self.records.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<FileRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats::from_records(&self.snapshot())
    }

    pub fn is_uploading(&self) -> bool {
        self.batch_active.load(Ordering::SeqCst)
    }

    /// Share of the running batch that has finished, 0 when idle
    pub fn overall_progress(&self) -> f32 {
        *self.overall_progress.read()
    }

    /// Validate `files` and append the accepted ones as Pending records
    pub async fn enqueue(&self, files: Vec<RawFile>) -> EnqueueReport {
        let admission = admit(files, &self.rules).await;

        for rejection in &admission.rejected {
            record_file_rejected(rejection.reason());
            self.notify(Notice::warning(rejection.to_string()));
        }

        let accepted = admission.accepted.len();
        if accepted > 0 {
            {
                let mut guard = self.records.write();
                let list = Arc::make_mut(&mut *guard);
                let mut ids: HashSet<String> = list.iter().map(|r| r.id.clone()).collect();

                for mut record in admission.accepted {
                    while ids.contains(&record.id) {
                        record.id = generate_record_id();
                    }
                    ids.insert(record.id.clone());
                    list.push(record);
                }
            }

            record_files_enqueued(accepted);
            self.publish_stats();
            self.notify(Notice::success(format!(
                "{} added to upload queue",
                plural(accepted, "file")
            )));
        }

        EnqueueReport {
            accepted,
            rejected: admission.rejected,
        }
    }

    /// Remove a record that is not currently uploading
    pub fn remove(&self, id: &str) -> QueueResult<FileRecord> {
        let removed = {
            let mut guard = self.records.write();
            let idx = guard
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| QueueError::RecordNotFound(id.to_string()))?;

            if !guard[idx].status.is_removable() {
                return Err(QueueError::CannotRemoveUploading(id.to_string()));
            }

            Arc::make_mut(&mut *guard).remove(idx)
        };

        self.publish_stats();
        self.notify(Notice::info("File removed from queue"));
        Ok(removed)
    }

    /// Upload every record that is Pending right now, strictly one at a time.
    ///
    /// A failed file does not stop the batch. Only an orchestration defect
    /// (an illegal record transition) is returned as an error.
    pub async fn upload_all(&self) -> QueueResult<BatchSummary> {
        if self.batch_active.swap(true, Ordering::SeqCst) {
            return Err(QueueError::BatchInProgress);
        }
        let _guard = BatchGuard {
            active: &self.batch_active,
            progress: &self.overall_progress,
        };

        let batch: Vec<String> = self
            .snapshot()
            .iter()
            .filter(|r| r.status == FileStatus::Pending)
            .map(|r| r.id.clone())
            .collect();

        if batch.is_empty() {
            self.notify(Notice::warning("No files to upload"));
            return Ok(BatchSummary::default());
        }

        tracing::info!("Starting upload batch of {} files", batch.len());
        *self.overall_progress.write() = 0.0;

        let mut summary = BatchSummary {
            total: batch.len(),
            ..Default::default()
        };

        for id in &batch {
            match self.upload_one(id).await {
                Ok(Some(true)) => summary.succeeded += 1,
                Ok(Some(false)) => summary.failed += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!("Upload batch aborted: {}", e);
                    self.notify(Notice::error("Upload process failed"));
                    return Err(e);
                }
            }

            let finished = summary.finished() as f32 / summary.total as f32 * 100.0;
            *self.overall_progress.write() = finished;
        }

        tracing::info!(
            "Upload batch finished: {} succeeded, {} failed, {} skipped",
            summary.succeeded,
            summary.failed,
            summary.skipped
        );

        match summary.outcome() {
            BatchOutcome::AllSucceeded => self.notify(Notice::success(format!(
                "All {} files uploaded successfully!",
                summary.total
            ))),
            _ => self.notify(Notice::warning(format!(
                "{} of {} files uploaded successfully",
                summary.succeeded, summary.total
            ))),
        }

        Ok(summary)
    }

    /// Put every failed record back to Pending without starting an upload
    pub fn retry_failed(&self) -> QueueResult<usize> {
        let retried = {
            let mut guard = self.records.write();
            let failed = guard
                .iter()
                .filter(|r| r.status == FileStatus::Error)
                .count();

            if failed > 0 {
                let list = Arc::make_mut(&mut *guard);
                for record in list.iter_mut().filter(|r| r.status == FileStatus::Error) {
                    *record = record.transition(RecordEvent::Retry)?;
                }
            }
            failed
        };

        if retried == 0 {
            self.notify(Notice::info("No failed uploads to retry"));
            return Ok(0);
        }

        self.publish_stats();
        self.notify(Notice::info(format!(
            "{} reset to pending",
            plural(retried, "failed upload")
        )));
        Ok(retried)
    }

    /// Drop every Completed record, keeping the others in order
    pub fn clear_completed(&self) -> usize {
        let cleared = {
            let mut guard = self.records.write();
            let before = guard.len();
            let kept: Vec<FileRecord> = guard
                .iter()
                .filter(|r| r.status != FileStatus::Completed)
                .cloned()
                .collect();
            let cleared = before - kept.len();

            if cleared > 0 {
                *guard = Arc::new(kept);
            }
            cleared
        };

        if cleared == 0 {
            self.notify(Notice::info("No completed uploads to clear"));
            return 0;
        }

        self.publish_stats();
        self.notify(Notice::success(format!(
            "{} cleared",
            plural(cleared, "completed upload")
        )));
        cleared
    }

    /// Run one record through the transport.
    ///
    /// Returns `Some(true)` on success, `Some(false)` on a transfer failure and
    /// `None` when the record left the queue before its turn.
    async fn upload_one(&self, id: &str) -> QueueResult<Option<bool>> {
        let Some(record) = self.start_pending(id)? else {
            tracing::debug!("Skipping {}: no longer pending", id);
            return Ok(None);
        };

        self.publish_stats();
        tracing::debug!("Uploading {} ({})", record.name, record.id);
        self.notify(Notice::info(format!("Uploading {}", record.name)));

        let timer = UploadTimer::start(record.size);
        let (tx, rx) = progress_channel();
        let (outcome, ()) = tokio::join!(
            self.transport.upload(&record, tx),
            self.track_progress(id, rx)
        );

        let succeeded = match outcome {
            Ok(receipt) => {
                self.apply(
                    id,
                    RecordEvent::Complete {
                        description: receipt.description,
                        uploaded_at: receipt.uploaded_at,
                    },
                )?;
                timer.complete();
                self.notify(Notice::success(format!(
                    "{} uploaded successfully",
                    record.name
                )));
                true
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.is_empty() {
                    message = "Upload failed".to_string();
                }

                self.apply(
                    id,
                    RecordEvent::Fail {
                        error: message.clone(),
                    },
                )?;
                timer.fail(e.reason());
                self.notify(Notice::error(format!(
                    "Failed to upload {}: {}",
                    record.name, message
                )));
                false
            }
        };

        self.publish_stats();
        Ok(Some(succeeded))
    }

    /// Pending -> Uploading in one step; `None` if the record is gone or no longer Pending
    fn start_pending(&self, id: &str) -> QueueResult<Option<FileRecord>> {
        let mut guard = self.records.write();
        let Some(idx) = guard
            .iter()
            .position(|r| r.id == id && r.status == FileStatus::Pending)
        else {
            return Ok(None);
        };

        let started = guard[idx].transition(RecordEvent::Start)?;
        Arc::make_mut(&mut *guard)[idx] = started.clone();
        Ok(Some(started))
    }

    async fn track_progress(&self, id: &str, mut rx: ProgressReceiver) {
        while let Some(event) = rx.recv().await {
            if let Err(e) = self.apply(id, RecordEvent::Progress { percent: event.percent }) {
                tracing::debug!("Ignoring progress for {}: {}", id, e);
            }
        }
    }

    /// Apply an event to one record and install the updated list
    fn apply(&self, id: &str, event: RecordEvent) -> QueueResult<Option<FileRecord>> {
        let mut guard = self.records.write();
        let Some(idx) = guard.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        let next = guard[idx].transition(event)?;
        Arc::make_mut(&mut *guard)[idx] = next.clone();
        Ok(Some(next))
    }

    fn notify(&self, notice: Notice) {
        for sink in self.sinks.iter() {
            sink.notify(&notice);
        }
    }

    fn publish_stats(&self) {
        record_queue_composition(&self.stats());
    }
}

impl Clone for UploadQueue {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            transport: self.transport.clone(),
            rules: self.rules.clone(),
            sinks: self.sinks.clone(),
            batch_active: self.batch_active.clone(),
            overall_progress: self.overall_progress.clone(),
        }
    }
}
