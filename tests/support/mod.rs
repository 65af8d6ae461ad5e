//! Deterministic collaborators for exercising the queue without randomness

use async_trait::async_trait;
use chrono::Utc;
use dropqueue::record::FileStatus;
use dropqueue::transport::{
    DescriptionError, DescriptionRequest, DescriptionResponse, DescriptionResult,
    DescriptionService, ProgressEvent, ProgressSender, TransferError, TransferResult,
    UploadReceipt,
};
use dropqueue::{FileRecord, Transport, UploadQueue};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// What the queue looked like when an upload started
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Observation {
    pub file: String,
    pub uploading: usize,
    pub overall_progress: f32,
    pub statuses: Vec<(String, FileStatus)>,
}

/// Transport that follows a per-file script of outcomes.
///
/// Files without a script succeed. Each upload sends progress in four steps,
/// sleeping `step_delay` between them.
#[derive(Default)]
pub struct ScriptedTransport {
    plan: Mutex<HashMap<String, VecDeque<TransferError>>>,
    step_delay: Duration,
    log: Mutex<Vec<String>>,
    observer: Mutex<Option<UploadQueue>>,
    observations: Mutex<Vec<Observation>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            step_delay,
            ..Default::default()
        }
    }

    /// Fail the next upload of `name` with `error`; queued failures are used in order
    pub fn fail_next(&self, name: &str, error: TransferError) {
        self.plan
            .lock()
            .entry(name.to_string())
            .or_default()
            .push_back(error);
    }

    /// Let the transport look at the queue each time an upload starts
    pub fn observe(&self, queue: &UploadQueue) {
        *self.observer.lock() = Some(queue.clone());
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn upload(
        &self,
        record: &FileRecord,
        progress: ProgressSender,
    ) -> TransferResult<UploadReceipt> {
        self.log.lock().push(format!("start:{}", record.name));

        let observer = self.observer.lock().clone();
        if let Some(queue) = observer {
            let snapshot = queue.snapshot();
            self.observations.lock().push(Observation {
                file: record.name.clone(),
                uploading: queue.stats().uploading,
                overall_progress: queue.overall_progress(),
                statuses: snapshot
                    .iter()
                    .map(|r| (r.name.clone(), r.status))
                    .collect(),
            });
        }

        for percent in [25, 50, 75, 100] {
            tokio::time::sleep(self.step_delay).await;
            let _ = progress.send(ProgressEvent { percent });
        }

        self.log.lock().push(format!("end:{}", record.name));

        let scripted = self
            .plan
            .lock()
            .get_mut(&record.name)
            .and_then(|q| q.pop_front());
        if let Some(error) = scripted {
            return Err(error);
        }

        Ok(UploadReceipt {
            file_id: format!("remote-{}", record.id),
            filename: record.name.clone(),
            size: record.size,
            mime_type: record.mime_type.clone(),
            description: None,
            uploaded_at: Utc::now(),
            url: format!("mem://{}", record.name),
        })
    }
}

/// Description service that remembers its requests and replies from a fixed answer
pub struct RecordingDescriber {
    answer: DescriptionResult<DescriptionResponse>,
    requests: Mutex<Vec<DescriptionRequest>>,
}

#[allow(dead_code)]
impl RecordingDescriber {
    pub fn answering(description: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(DescriptionResponse {
                success: true,
                description: description.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: Err(DescriptionError::Unavailable("connection refused".into())),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<DescriptionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl DescriptionService for RecordingDescriber {
    async fn describe(&self, request: DescriptionRequest) -> DescriptionResult<DescriptionResponse> {
        self.requests.lock().push(request);
        self.answer.clone()
    }
}
