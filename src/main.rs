//! Fraud Ring Forensics - Main Entry Point
//!
//! Consumes finished analysis results from NATS, derives the configured graph
//! view and every ring ledger, and publishes the export document. Given a
//! file argument, processes that single analysis result and exits.

use anyhow::{Context, Result};
use chrono::Utc;
use fraud_ring_forensics::{
    config::{AppConfig, LoggingConfig},
    consumer::AnalysisConsumer,
    export::{project, ExportDocument},
    graph::ledger::time_span,
    metrics::{ForensicsMetrics, MetricsReporter},
    producer::{ExportFileWriter, ExportProducer},
    session::ForensicSession,
    triage::{has_critical_ring, rank_rings, RingHeader},
};
use futures::StreamExt;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Export document of one ingested analysis result
struct Processed {
    session_id: Uuid,
    document: ExportDocument,
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("fraud_ring_forensics={}", config.level).parse()?);

    if config.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

/// Ingest one analysis payload, log its derived views, and project the export.
fn analyze(payload: &[u8], config: &AppConfig, metrics: &ForensicsMetrics) -> Result<Processed> {
    let start_time = Instant::now();

    let result = match AnalysisConsumer::decode(payload) {
        Ok(result) => result,
        Err(e) => {
            metrics.record_rejected();
            return Err(e);
        }
    };

    let session = ForensicSession::from_analysis(&result);
    let session_id = session.session_id();
    let graph = session.graph();
    let tiers = graph.tier_counts();

    info!(
        session_id = %session_id,
        nodes = graph.nodes().len(),
        links = graph.links().len(),
        rings = graph.rings().len(),
        critical = tiers.critical,
        suspicious = tiers.suspicious,
        neutral = tiers.neutral,
        "Forensic graph constructed"
    );

    let selection = config.view.selection();
    let view = session.view(&selection);
    info!(
        session_id = %session_id,
        mode = ?selection.mode(),
        visible_nodes = view.nodes.len(),
        visible_links = view.links.len(),
        "Default view derived"
    );

    if has_critical_ring(graph.rings()) {
        warn!(session_id = %session_id, "Critical fraud rings present");
    }

    for ring in rank_rings(graph.rings()) {
        let header = RingHeader::from(ring);
        let ledger = session.ledger(&ring.ring_id);
        let undated = ledger.iter().filter(|tx| tx.occurred_at.is_none()).count();
        metrics.record_undated(undated);

        let span = time_span(&ledger);
        info!(
            ring_id = %header.ring_id,
            pattern = %header.pattern_type,
            risk_score = header.risk_score,
            badge = header.badge.label(),
            members = header.member_count,
            transactions = ledger.len(),
            undated,
            first = ?span.map(|(first, _)| first),
            last = ?span.map(|(_, last)| last),
            total_value = header.total_value.as_deref().unwrap_or("n/a"),
            "Ring ledger reconstructed"
        );
    }

    let document = project(&result);
    metrics.record_analysis(graph, start_time.elapsed());

    Ok(Processed {
        session_id,
        document,
    })
}

/// Process a single analysis file and exit
fn run_file(
    path: &str,
    config: &AppConfig,
    metrics: &ForensicsMetrics,
    writer: Option<&ExportFileWriter>,
) -> Result<()> {
    info!(path = %path, "Processing analysis file");

    let payload = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let processed = analyze(&payload, config, metrics)?;

    match writer {
        Some(writer) => {
            writer.write(&processed.document, Utc::now())?;
        }
        None => {
            let json = processed.document.to_json(config.export.pretty)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            stdout.write_all(b"\n")?;
        }
    }
    metrics.record_export();
    metrics.print_summary();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging)?;
    info!("Starting Fraud Ring Forensics");

    match config_error {
        Some(e) => warn!(error = format!("{:#}", e), "Configuration unavailable, using defaults"),
        None => info!("Configuration loaded successfully"),
    }

    let metrics = Arc::new(ForensicsMetrics::new());
    let writer = ExportFileWriter::from_config(&config.export);

    if let Some(path) = std::env::args().nth(1) {
        return run_file(&path, &config, &metrics, writer.as_ref());
    }

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats.url))?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = AnalysisConsumer::new(client.clone(), &config.nats.analysis_subject);
    let producer = Arc::new(ExportProducer::new(client.clone(), &config.nats.export_subject));

    let num_workers = config.pipeline.workers.max(1);
    info!(
        workers = num_workers,
        analysis_subject = %consumer.subject(),
        export_subject = %producer.subject(),
        publish = config.export.publish,
        "Starting analysis processing loop"
    );

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let config = Arc::new(config);

    // Periodic summary every 60 seconds
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 60);
        reporter.start().await;
    });

    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let producer = producer.clone();
        let metrics = metrics.clone();
        let config = config.clone();
        let writer = writer.clone();

        tokio::spawn(async move {
            let processed = match analyze(&message.payload, &config, &metrics) {
                Ok(processed) => processed,
                Err(e) => {
                    warn!(error = format!("{:#}", e), "Skipping analysis message");
                    drop(permit);
                    return;
                }
            };
            let session_id = processed.session_id;
            let mut delivered = false;

            if config.export.publish {
                match producer.publish(&processed.document, session_id).await {
                    Ok(()) => delivered = true,
                    Err(e) => error!(
                        session_id = %session_id,
                        error = %e,
                        "Failed to publish export document"
                    ),
                }
            }

            if let Some(writer) = &writer {
                match writer.write(&processed.document, Utc::now()) {
                    Ok(_) => delivered = true,
                    Err(e) => error!(
                        session_id = %session_id,
                        error = format!("{:#}", e),
                        "Failed to write export artifact"
                    ),
                }
            }

            if delivered {
                metrics.record_export();
            }

            // Release permit when done
            drop(permit);
        });
    }

    info!("Forensics service shutting down...");
    metrics.print_summary();

    Ok(())
}
