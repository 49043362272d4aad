//! Processing metrics for the forensics service.

use crate::graph::model::GraphModel;
use crate::types::risk::TierCounts;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for analysis processing
pub struct ForensicsMetrics {
    /// Analysis results ingested
    pub analyses_ingested: AtomicU64,
    /// Payloads that were not JSON
    pub analyses_rejected: AtomicU64,
    /// Export documents delivered (published or written)
    pub exports_delivered: AtomicU64,
    /// Links dropped from views for missing or unknown endpoints
    pub dangling_links: AtomicU64,
    /// Ring transactions whose timestamp could not be parsed
    pub undated_transactions: AtomicU64,
    /// Accounts seen per tier
    tier_counts: RwLock<TierCounts>,
    /// Per-analysis processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ForensicsMetrics {
    pub fn new() -> Self {
        Self {
            analyses_ingested: AtomicU64::new(0),
            analyses_rejected: AtomicU64::new(0),
            exports_delivered: AtomicU64::new(0),
            dangling_links: AtomicU64::new(0),
            undated_transactions: AtomicU64::new(0),
            tier_counts: RwLock::new(TierCounts::default()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record an ingested graph
    pub fn record_analysis(&self, graph: &GraphModel, processing_time: Duration) {
        self.analyses_ingested.fetch_add(1, Ordering::Relaxed);
        self.dangling_links
            .fetch_add(graph.dangling_links() as u64, Ordering::Relaxed);

        let counts = graph.tier_counts();
        if let Ok(mut totals) = self.tier_counts.write() {
            totals.critical += counts.critical;
            totals.suspicious += counts.suspicious;
            totals.neutral += counts.neutral;
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    pub fn record_rejected(&self) {
        self.analyses_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_undated(&self, count: usize) {
        self.undated_transactions
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_export(&self) {
        self.exports_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let Ok(times) = self.processing_times.read() else {
            return ProcessingStats::default();
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    pub fn get_tier_counts(&self) -> TierCounts {
        self.tier_counts.read().map(|c| *c).unwrap_or_default()
    }

    /// Analyses ingested per minute since start
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.analyses_ingested.load(Ordering::Relaxed) as f64 * 60.0 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let ingested = self.analyses_ingested.load(Ordering::Relaxed);
        let rejected = self.analyses_rejected.load(Ordering::Relaxed);
        let exports = self.exports_delivered.load(Ordering::Relaxed);
        let dangling = self.dangling_links.load(Ordering::Relaxed);
        let undated = self.undated_transactions.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();
        let tiers = self.get_tier_counts();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            FRAUD RING FORENSICS - METRICS SUMMARY            ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Analyses Ingested: {:>8}  │  Rejected: {:>8}          ║",
            ingested, rejected
        );
        info!(
            "║ Exports Delivered: {:>8}  │  Rate: {:>8.2} /min        ║",
            exports,
            self.get_throughput()
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>6} p50={:>6} p99={:>6}     ║",
            processing.mean_us, processing.p50_us, processing.p99_us
        );
        info!(
            "║ Dangling Links: {:>8}  │  Undated Ring Transactions: {:>6} ║",
            dangling, undated
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Accounts: critical={:>7} suspicious={:>7} neutral={:>7}  ║",
            tiers.critical, tiers.suspicious, tiers.neutral
        );
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ForensicsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: std::sync::Arc<ForensicsMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ForensicsMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisResult;
    use serde_json::json;

    #[test]
    fn test_metrics_recording() {
        let metrics = ForensicsMetrics::new();
        let result: AnalysisResult = serde_json::from_value(json!({
            "graph_data": {
                "nodes": [
                    {"id": "A", "suspicion_score": 95},
                    {"id": "B", "suspicion_score": 55},
                    {"id": "C"}
                ],
                "links": [
                    {"source": "A", "target": "B"},
                    {"source": "A", "target": "GHOST"}
                ]
            }
        }))
        .unwrap();
        let graph = GraphModel::from_analysis(&result);

        metrics.record_analysis(&graph, Duration::from_micros(120));
        metrics.record_analysis(&graph, Duration::from_micros(80));
        metrics.record_export();
        metrics.record_rejected();
        metrics.record_undated(3);

        assert_eq!(metrics.analyses_ingested.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.dangling_links.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.undated_transactions.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.exports_delivered.load(Ordering::Relaxed), 1);

        let tiers = metrics.get_tier_counts();
        assert_eq!((tiers.critical, tiers.suspicious, tiers.neutral), (2, 2, 2));

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_us, 100);
        assert_eq!(stats.max_us, 120);
    }

    #[test]
    fn test_empty_stats() {
        let metrics = ForensicsMetrics::new();
        assert_eq!(metrics.get_processing_stats().count, 0);
        assert_eq!(metrics.get_tier_counts().total(), 0);
    }
}
