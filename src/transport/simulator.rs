use crate::record::{generate_file_id, FileRecord};
use crate::transport::description::{describe_image, DescriptionService};
use crate::transport::error::{TransferError, TransferResult};
use crate::transport::transport::Transport;
use crate::transport::types::{ProgressEvent, ProgressSender, UploadReceipt};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Tuning for the fake upload. Defaults reproduce the demo timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub base_delay_min_ms: f64,
    pub base_delay_max_ms: f64,
    /// Extra simulated time per megabyte
    pub ms_per_mb: f64,
    /// Delay before the first progress tick
    pub initial_delay_ms: f64,
    pub min_increment: f64,
    pub max_increment: f64,
    /// Per-tick jitter, drawn from `[-noise, noise)`; capped at `min_increment`
    pub noise: f64,
    /// Probability that a finished upload is reported as failed
    pub failure_rate: f64,
    /// Multiplier applied to every simulated delay
    pub time_scale: f64,
    pub seed: Option<u64>,
    pub url_base: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            base_delay_min_ms: 500.0,
            base_delay_max_ms: 1500.0,
            ms_per_mb: 200.0,
            initial_delay_ms: 100.0,
            min_increment: 5.0,
            max_increment: 20.0,
            noise: 5.0,
            failure_rate: 0.1,
            time_scale: 1.0,
            seed: None,
            url_base: "https://example.com/uploads".to_string(),
        }
    }
}

impl SimulatorConfig {
    /// Total simulated duration for a file of `size` bytes, given a base delay
    pub fn total_duration_ms(&self, base_delay_ms: f64, size: u64) -> f64 {
        base_delay_ms + (size as f64 / BYTES_PER_MB) * self.ms_per_mb
    }

    /// Replace non-finite values with their defaults and clamp the rest into range
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f64, fallback: f64| {
            if value.is_finite() {
                value
            } else {
                fallback
            }
        };

        self.base_delay_min_ms =
            finite_or(self.base_delay_min_ms, defaults.base_delay_min_ms).max(0.0);
        self.base_delay_max_ms = finite_or(self.base_delay_max_ms, defaults.base_delay_max_ms);
        self.ms_per_mb = finite_or(self.ms_per_mb, defaults.ms_per_mb).max(0.0);
        self.initial_delay_ms = finite_or(self.initial_delay_ms, defaults.initial_delay_ms);
        self.min_increment = finite_or(self.min_increment, defaults.min_increment);
        self.max_increment = finite_or(self.max_increment, defaults.max_increment);
        self.noise = finite_or(self.noise, defaults.noise);
        self.failure_rate = finite_or(self.failure_rate, defaults.failure_rate);
        self.time_scale = finite_or(self.time_scale, defaults.time_scale);

        self.min_increment = self.min_increment.clamp(1.0, 100.0);
        self.max_increment = self.max_increment.max(self.min_increment);
        self.noise = self.noise.clamp(0.0, self.min_increment);
        self.failure_rate = self.failure_rate.clamp(0.0, 1.0);
        self.time_scale = self.time_scale.max(0.0);
        self.base_delay_max_ms = self.base_delay_max_ms.max(self.base_delay_min_ms);
        self
    }
}

/// Transport that fabricates progress and outcome without touching the network.
pub struct SimulatedTransport {
    config: SimulatorConfig,
    rng: Arc<Mutex<StdRng>>,
    describer: Option<Arc<dyn DescriptionService>>,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl SimulatedTransport {
    pub fn new(config: SimulatorConfig) -> Self {
        let config = config.sanitized();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            rng: Arc::new(Mutex::new(rng)),
            describer: None,
        }
    }

    pub fn with_describer(mut self, describer: Arc<dyn DescriptionService>) -> Self {
        self.describer = Some(describer);
        self
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn sample(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.lock().gen_range(low..high)
    }

    /// Real time to wait for `ms` of simulated time; saturates instead of overflowing
    fn delay_for(&self, ms: f64) -> Duration {
        let scaled = ms * self.config.time_scale;
        if scaled.is_nan() || scaled <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(scaled / 1000.0).unwrap_or(Duration::MAX)
    }

    async fn pause(&self, ms: f64) {
        let delay = self.delay_for(ms);
        if !delay.is_zero() {
            time::sleep(delay).await;
        }
    }

    fn draw_outcome(&self) -> Option<TransferError> {
        let mut rng = self.rng.lock();
        if rng.gen_bool(self.config.failure_rate) {
            Some(TransferError::random(&mut *rng))
        } else {
            None
        }
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn upload(
        &self,
        record: &FileRecord,
        progress: ProgressSender,
    ) -> TransferResult<UploadReceipt> {
        let base_delay = self.sample(self.config.base_delay_min_ms, self.config.base_delay_max_ms);
        let total_ms = self.config.total_duration_ms(base_delay, record.size);
        let increment = self.sample(self.config.min_increment, self.config.max_increment);
        let tick_ms = total_ms / 100.0 * increment;

        tracing::debug!(
            "Simulating upload of {} ({} bytes): ~{:.0}ms, step {:.1}%",
            record.name,
            record.size,
            total_ms,
            increment
        );

        self.pause(self.config.initial_delay_ms).await;

        let mut percent = 0.0_f64;
        loop {
            let noise = self.sample(-self.config.noise, self.config.noise);
            percent = (percent + increment + noise).clamp(0.0, 100.0);

            // Receiver may have gone away; the upload still runs to completion
            let _ = progress.send(ProgressEvent {
                percent: percent.round() as u8,
            });

            if percent >= 100.0 {
                break;
            }
            self.pause(tick_ms).await;
        }

        if let Some(error) = self.draw_outcome() {
            tracing::debug!("Simulated failure for {}: {}", record.name, error);
            return Err(error);
        }

        let description = if record.is_image() {
            Some(describe_image(self.describer.as_deref(), record).await)
        } else {
            None
        };

        let file_id = generate_file_id();
        let url = format!("{}/{}-{}", self.config.url_base, file_id, record.name);

        Ok(UploadReceipt {
            file_id,
            filename: record.name.clone(),
            size: record.size,
            mime_type: record.mime_type.clone(),
            description,
            uploaded_at: Utc::now(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawFile;
    use crate::transport::description::DESCRIPTION_PLACEHOLDER;
    use crate::transport::types::progress_channel;

    fn record(name: &str, mime: &str, size: usize) -> FileRecord {
        FileRecord::pending("r".into(), RawFile::new(name, mime, vec![0u8; size]), None)
    }

    fn transport(failure_rate: f64, seed: u64) -> SimulatedTransport {
        SimulatedTransport::new(SimulatorConfig {
            failure_rate,
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn test_total_duration_scales_with_size() {
        let config = SimulatorConfig::default();
        assert_eq!(config.total_duration_ms(500.0, 0), 500.0);
        assert_eq!(config.total_duration_ms(500.0, 2 * 1024 * 1024), 900.0);
    }

    #[test]
    fn test_sanitized_config() {
        let config = SimulatorConfig {
            noise: 50.0,
            failure_rate: 3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.noise, config.min_increment);
        assert_eq!(config.failure_rate, 1.0);
    }

    #[test]
    fn test_non_finite_values_fall_back_to_defaults() {
        let config = SimulatorConfig {
            failure_rate: f64::NAN,
            time_scale: f64::INFINITY,
            noise: f64::NAN,
            min_increment: f64::NEG_INFINITY,
            ms_per_mb: f64::NAN,
            ..Default::default()
        }
        .sanitized();

        let defaults = SimulatorConfig::default();
        assert_eq!(config.failure_rate, defaults.failure_rate);
        assert_eq!(config.time_scale, defaults.time_scale);
        assert_eq!(config.noise, defaults.noise);
        assert_eq!(config.min_increment, defaults.min_increment);
        assert_eq!(config.ms_per_mb, defaults.ms_per_mb);
    }

    #[test]
    fn test_huge_time_scale_saturates_delay() {
        let transport = SimulatedTransport::new(SimulatorConfig {
            time_scale: 1e308,
            ..Default::default()
        });
        assert_eq!(transport.delay_for(100.0), Duration::MAX);
        assert_eq!(transport.delay_for(0.0), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nan_config_still_uploads() {
        let transport = SimulatedTransport::new(SimulatorConfig {
            failure_rate: f64::NAN,
            time_scale: f64::NAN,
            seed: Some(8),
            ..Default::default()
        });
        let (tx, _rx) = progress_channel();

        // Either outcome is fine; drawing it must not panic
        let _ = transport
            .upload(&record("notes.txt", "text/plain", 64), tx)
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_monotonic_and_ends_at_100() {
        let transport = transport(0.0, 42);
        let (tx, mut rx) = progress_channel();

        let receipt = transport
            .upload(&record("notes.txt", "text/plain", 1024), tx)
            .await
            .unwrap();

        let mut ticks = Vec::new();
        while let Some(event) = rx.recv().await {
            ticks.push(event.percent);
        }

        assert!(!ticks.is_empty());
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ticks.last(), Some(&100));
        assert_eq!(receipt.filename, "notes.txt");
        assert_eq!(receipt.size, 1024);
        assert!(receipt.description.is_none());
        assert!(receipt.url.ends_with(&format!("{}-notes.txt", receipt.file_id)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_tracks_simulated_duration() {
        let transport = transport(0.0, 9);
        let (tx, _rx) = progress_channel();

        let started = time::Instant::now();
        transport
            .upload(&record("big.txt", "text/plain", 10 * 1024 * 1024), tx)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        // 2.5s-3.5s of simulated time for 10 MB, spread over the ticks
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed <= Duration::from_millis(8000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_failure_uses_fixed_messages() {
        let transport = transport(1.0, 3);

        for _ in 0..10 {
            let (tx, _rx) = progress_channel();
            let err = transport
                .upload(&record("notes.txt", "text/plain", 10), tx)
                .await
                .unwrap_err();
            assert!(TransferError::SIMULATED.contains(&err));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_rate_is_roughly_ten_percent() {
        let transport = SimulatedTransport::new(SimulatorConfig {
            seed: Some(1234),
            time_scale: 0.0,
            ..Default::default()
        });

        let mut failures = 0;
        for _ in 0..1000 {
            let (tx, _rx) = progress_channel();
            if transport
                .upload(&record("a.txt", "text/plain", 1), tx)
                .await
                .is_err()
            {
                failures += 1;
            }
        }

        assert!((50..=150).contains(&failures), "failures = {failures}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_without_service_gets_placeholder() {
        let transport = transport(0.0, 5);
        let (tx, _rx) = progress_channel();

        let receipt = transport
            .upload(&record("photo.png", "image/png", 256), tx)
            .await
            .unwrap();
        assert_eq!(receipt.description.as_deref(), Some(DESCRIPTION_PLACEHOLDER));
    }
}
