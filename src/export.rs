//! Projection of an analysis result into the forensic export document.
//!
//! The export is a whitelist: each field is re-selected from the input, so
//! extra or renamed upstream fields never leak into it. The bulk graph is
//! deliberately left out. Field order is fixed for deterministic output.

use crate::types::analysis::{AnalysisResult, AnalysisSummary, RingRecord, SuspiciousAccount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Default artifact file name prefix.
pub const DEFAULT_FILE_PREFIX: &str = "fincen_extract";

/// Canonical export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub suspicious_accounts: Vec<ExportedAccount>,
    pub fraud_rings: Vec<ExportedRing>,
    pub summary: ExportedSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedAccount {
    pub account_id: String,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    pub ring_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedRing {
    pub ring_id: String,
    pub member_accounts: Vec<String>,
    pub pattern_type: String,
    pub risk_score: f64,
}

/// Aggregate counters, re-emitted exactly as supplied. Counters absent
/// upstream stay absent and are omitted from the serialized document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportedSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_accounts_analyzed: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspicious_accounts_flagged: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraud_rings_detected: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<f64>,
}

impl From<&SuspiciousAccount> for ExportedAccount {
    fn from(account: &SuspiciousAccount) -> Self {
        Self {
            account_id: account.account_id.clone().unwrap_or_default(),
            suspicion_score: account.suspicion_score.unwrap_or(0.0),
            detected_patterns: account.detected_patterns.clone(),
            ring_id: account.ring_id.clone().unwrap_or_default(),
        }
    }
}

impl From<&RingRecord> for ExportedRing {
    fn from(ring: &RingRecord) -> Self {
        Self {
            ring_id: ring.ring_id.clone().unwrap_or_default(),
            member_accounts: ring.member_accounts.clone(),
            pattern_type: ring.pattern_type.clone().unwrap_or_default(),
            risk_score: ring.risk_score.unwrap_or(0.0),
        }
    }
}

impl From<&AnalysisSummary> for ExportedSummary {
    fn from(summary: &AnalysisSummary) -> Self {
        Self {
            total_accounts_analyzed: summary.total_accounts_analyzed.clone(),
            suspicious_accounts_flagged: summary.suspicious_accounts_flagged.clone(),
            fraud_rings_detected: summary.fraud_rings_detected.clone(),
            processing_time_seconds: summary.processing_time_seconds,
        }
    }
}

/// Project an analysis result into its export document.
pub fn project(result: &AnalysisResult) -> ExportDocument {
    ExportDocument {
        suspicious_accounts: result
            .suspicious_accounts
            .iter()
            .map(ExportedAccount::from)
            .collect(),
        fraud_rings: result.fraud_rings.iter().map(ExportedRing::from).collect(),
        summary: result
            .summary
            .as_ref()
            .map(ExportedSummary::from)
            .unwrap_or_default(),
    }
}

impl ExportDocument {
    /// Serialize to JSON; `pretty` indents with two spaces.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<Vec<u8>> {
        if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        }
    }
}

/// Artifact file name for an export taken at `at`.
pub fn artifact_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.json", prefix, at.timestamp_millis())
}
