//! Test Analysis Publisher
//!
//! Generates synthetic analysis results (accounts, cycle rings, internal and
//! external transactions) and publishes them to NATS for service testing.

use chrono::{Duration as ChronoDuration, Utc};
use fraud_ring_forensics::types::{
    AnalysisResult, AnalysisSummary, GraphData, RawAccount, RawTransaction, RingRecord,
    SuspiciousAccount,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const PATTERNS: [&str; 3] = ["cycle", "smurfing", "layered_shell"];

/// Synthetic analysis generator
struct AnalysisGenerator {
    rng: rand::rngs::ThreadRng,
    analysis_counter: u64,
}

impl AnalysisGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            analysis_counter: 0,
        }
    }

    /// Generate one analysis result with `accounts` accounts and `rings` rings
    fn generate(&mut self, accounts: usize, rings: usize) -> AnalysisResult {
        let started = Instant::now();
        self.analysis_counter += 1;

        let ids: Vec<String> = (0..accounts).map(|i| format!("ACC_{:05}", i)).collect();
        let mut nodes: Vec<RawAccount> = ids
            .iter()
            .map(|id| RawAccount {
                id: Some(id.clone()),
                suspicion_score: Some(self.rng.gen_range(0.0..45.0)),
                ring: Vec::new(),
            })
            .collect();

        let mut fraud_rings = Vec::new();
        let mut suspicious_accounts = Vec::new();
        let mut links = Vec::new();
        let base_time = Utc::now() - ChronoDuration::days(7);

        let mut pool: Vec<usize> = (0..accounts).collect();
        pool.shuffle(&mut self.rng);
        let mut remaining = pool.as_slice();

        for ring_index in 0..rings {
            let size = self.rng.gen_range(3..=5);
            if remaining.len() < size {
                break;
            }
            let (members, rest) = remaining.split_at(size);
            remaining = rest;

            let ring_id = format!("RING_{:03}", ring_index + 1);
            let pattern = PATTERNS[ring_index % PATTERNS.len()];
            let risk_score = self.rng.gen_range(55.0..99.0);
            let mut amount = self.rng.gen_range(5000.0..20000.0_f64).round();
            let mut total_value = 0.0;

            // Money moves around the cycle, shaving a fee at each hop
            for (hop, &member) in members.iter().enumerate() {
                let next = members[(hop + 1) % members.len()];
                links.push(RawTransaction {
                    source: Some(ids[member].clone()),
                    target: Some(ids[next].clone()),
                    amount: Some(amount),
                    timestamp: Some(
                        (base_time + ChronoDuration::hours(2 * hop as i64))
                            .format("%Y-%m-%d %H:%M:%S")
                            .to_string(),
                    ),
                });
                total_value += amount;
                amount = (amount * 0.99).round();
            }

            for &member in members {
                let score = self.rng.gen_range(55.0..99.0);
                nodes[member].suspicion_score = Some(score);
                nodes[member].ring.push(ring_id.clone());
                suspicious_accounts.push(SuspiciousAccount {
                    account_id: Some(ids[member].clone()),
                    suspicion_score: Some(score),
                    detected_patterns: vec![format!("{}_member", pattern)],
                    ring_id: Some(ring_id.clone()),
                });
            }

            fraud_rings.push(RingRecord {
                ring_id: Some(ring_id),
                member_accounts: members.iter().map(|&m| ids[m].clone()).collect(),
                pattern_type: Some(pattern.to_string()),
                risk_score: Some(risk_score),
                total_value: Some(total_value),
            });
        }

        // Background noise between arbitrary accounts
        for _ in 0..accounts * 2 {
            let source = self.rng.gen_range(0..accounts);
            let target = self.rng.gen_range(0..accounts);
            if source == target {
                continue;
            }
            links.push(RawTransaction {
                source: Some(ids[source].clone()),
                target: Some(ids[target].clone()),
                amount: Some(self.rng.gen_range(10.0..2500.0_f64).round()),
                timestamp: Some(
                    (base_time + ChronoDuration::minutes(self.rng.gen_range(0..10_080)))
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                ),
            });
        }

        AnalysisResult {
            summary: Some(AnalysisSummary {
                total_accounts_analyzed: Some(accounts.into()),
                suspicious_accounts_flagged: Some(suspicious_accounts.len().into()),
                fraud_rings_detected: Some(fraud_rings.len().into()),
                processing_time_seconds: Some(started.elapsed().as_secs_f64()),
            }),
            suspicious_accounts,
            fraud_rings,
            graph_data: Some(GraphData { nodes, links }),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_publisher=info".parse()?),
        )
        .init();

    info!("Starting Test Analysis Publisher");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("analysis.results");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(5);
    let accounts: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(200).max(2);
    let rings: usize = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(4);
    let delay_ms: u64 = args.get(6).and_then(|s| s.parse().ok()).unwrap_or(1000);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        accounts = accounts,
        rings = rings,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, accounts, rings, delay_ms).await;
        }
    };

    let mut generator = AnalysisGenerator::new();

    for i in 0..count {
        let analysis = generator.generate(accounts, rings);
        let payload = serde_json::to_vec(&analysis)?;

        client.publish(subject.to_string(), payload.into()).await?;

        info!(
            analysis = generator.analysis_counter,
            rings = analysis.fraud_rings.len(),
            flagged = analysis.suspicious_accounts.len(),
            "Published {}/{} analysis results",
            i + 1,
            count
        );

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    client.flush().await?;
    info!("Completed! Published {} analysis results", count);

    Ok(())
}

async fn run_dry_mode(
    count: u64,
    accounts: usize,
    rings: usize,
    delay_ms: u64,
) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = AnalysisGenerator::new();

    for i in 0..count {
        let analysis = generator.generate(accounts, rings);
        let json = serde_json::to_string_pretty(&analysis.fraud_rings)?;
        info!("Sample analysis {} rings:\n{}", i + 1, json);

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
