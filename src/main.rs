use anyhow::{bail, Context, Result};
use dropqueue::config::Settings;
use dropqueue::metrics::{render_metrics, start_metrics_server, MetricsConfig};
use dropqueue::notify::BroadcastSink;
use dropqueue::record::format_file_size;
use dropqueue::{RawFile, SimulatedTransport, UploadQueue};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dropqueue=info")),
        )
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("usage: dropqueue <FILE>...");
    }

    let settings = Settings::from_env().context("Failed to load settings")?;

    if let Some(addr) = settings.metrics_addr {
        start_metrics_server(MetricsConfig::with_addr(addr))
            .context("Failed to start metrics exporter")?;
    }

    println!("DropQueue - simulated upload queue");
    println!("==================================\n");
    println!("  Max file size:  {}", format_file_size(settings.max_file_size));
    println!("  Accepted types: {}", settings.accepted_types);
    println!("  Failure rate:   {:.0}%\n", settings.failure_rate * 100.0);

    let transport = SimulatedTransport::new(settings.simulator_config());
    let notices = BroadcastSink::default();
    let queue = UploadQueue::new(Arc::new(transport), settings.upload_rules())
        .with_sink(Arc::new(notices.clone()));

    // Print notices as they arrive
    let mut rx = notices.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notice) => println!("  [{}] {}", notice.severity, notice.message),
                Err(RecvError::Lagged(skipped)) => println!("  ... {skipped} notices dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = RawFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {path}"))?;
        files.push(file);
    }

    queue.enqueue(files).await;
    let summary = queue.upload_all().await.context("Upload batch failed")?;
    let records = queue.snapshot();
    let stats = queue.stats();

    // Dropping the last sender ends the printer
    drop(queue);
    drop(notices);
    printer.await.context("Notice printer crashed")?;

    println!("\nQueue ({} files, {})", stats.total_files, stats.formatted_total_size());
    println!("--------------------------------------------------------------");
    for record in records.iter() {
        let detail = record
            .error
            .as_deref()
            .or(record.description.as_deref())
            .unwrap_or("");
        println!(
            "  {:<10} {:>3}%  {:<28} {:>10}  {}",
            record.status.as_str(),
            record.progress,
            record.name,
            format_file_size(record.size),
            detail
        );
    }

    println!(
        "\n  {} of {} uploaded, {} failed, {} skipped ({}% of queue completed)",
        summary.succeeded, summary.total, summary.failed, summary.skipped, stats.completion_rate
    );

    if let Some(exposition) = render_metrics() {
        tracing::debug!("Final metrics:\n{}", exposition);
    }

    Ok(())
}
