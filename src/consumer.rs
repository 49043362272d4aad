//! NATS message consumer for finished analysis results

use crate::types::AnalysisResult;
use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use tracing::{debug, info};

/// Consumer for receiving analysis results from NATS
pub struct AnalysisConsumer {
    client: Client,
    subject: String,
}

impl AnalysisConsumer {
    /// Create a new analysis consumer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe to the analysis subject
    pub async fn subscribe(&self) -> Result<Subscriber> {
        let subscriber = self.client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "Subscribed to analysis subject");
        Ok(subscriber)
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Decode one message payload into an analysis result.
    ///
    /// Shape problems are absorbed by the lenient field readers; only a
    /// payload that is not JSON at all is an error.
    pub fn decode(payload: &[u8]) -> Result<AnalysisResult> {
        let result =
            AnalysisResult::from_slice(payload).context("Analysis payload is not valid JSON")?;

        debug!(
            bytes = payload.len(),
            accounts = result.suspicious_accounts.len(),
            rings = result.fraud_rings.len(),
            has_graph = result.graph_data.is_some(),
            "Analysis payload decoded"
        );
        Ok(result)
    }
}
