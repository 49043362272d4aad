//! Wire-level analysis result handed over by the external detection engine.
//!
//! Every field is optional and read through the [`lenient`](super::lenient)
//! helpers. Nothing here substitutes defaults; that happens once, where
//! [`GraphModel`](crate::graph::GraphModel) and the export projector read
//! these records.

use super::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Complete output of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Per-account flag records
    #[serde(default, deserialize_with = "lenient::records")]
    pub suspicious_accounts: Vec<SuspiciousAccount>,

    /// Detected fraud rings
    #[serde(default, deserialize_with = "lenient::records")]
    pub fraud_rings: Vec<RingRecord>,

    /// Aggregate counters
    #[serde(default, deserialize_with = "lenient::record")]
    pub summary: Option<AnalysisSummary>,

    /// Bulk account/transaction graph
    #[serde(default, deserialize_with = "lenient::record")]
    pub graph_data: Option<GraphData>,
}

impl AnalysisResult {
    /// Parse a result from raw JSON bytes.
    ///
    /// Fails only when the payload is not JSON at all; shape problems inside
    /// a valid document are absorbed.
    pub fn from_slice(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    pub fn from_json_str(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}

/// Account flagged by the detection engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    #[serde(default, deserialize_with = "lenient::text")]
    pub account_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub suspicion_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub detected_patterns: Vec<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub ring_id: Option<String>,
}

/// Fraud ring as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RingRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub ring_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub member_accounts: Vec<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub pattern_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub risk_score: Option<f64>,

    /// Sum of internal transaction amounts, when precomputed upstream
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_value: Option<f64>,
}

/// Scalar counters describing the analysis run. Values are carried as
/// supplied, fractional or negative ones included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default, deserialize_with = "lenient::counter")]
    pub total_accounts_analyzed: Option<Number>,

    #[serde(default, deserialize_with = "lenient::counter")]
    pub suspicious_accounts_flagged: Option<Number>,

    #[serde(default, deserialize_with = "lenient::counter")]
    pub fraud_rings_detected: Option<Number>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub processing_time_seconds: Option<f64>,
}

/// Node and link collections of the full graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default, deserialize_with = "lenient::records")]
    pub nodes: Vec<RawAccount>,

    #[serde(default, deserialize_with = "lenient::records")]
    pub links: Vec<RawTransaction>,
}

/// Account node as it arrives on the wire.
///
/// Renderer-owned fields (`x`, `y`, `vx`, `vy`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAccount {
    #[serde(default, deserialize_with = "lenient::identifier")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub suspicion_score: Option<f64>,

    /// Ring memberships; a bare string is a single membership
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub ring: Vec<String>,
}

/// Transaction link as it arrives on the wire.
///
/// `source` and `target` may be bare ids or embedded node objects; both are
/// normalized to the bare id while deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default, deserialize_with = "lenient::identifier")]
    pub source: Option<String>,

    #[serde(default, deserialize_with = "lenient::identifier")]
    pub target: Option<String>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<f64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub timestamp: Option<String>,
}
