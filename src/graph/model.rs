//! Typed account/transaction graph, built once per analysis result.
//!
//! This is the only place where defaults are substituted for graph records:
//!
//! | Field                     | Missing or unreadable becomes |
//! |---------------------------|-------------------------------|
//! | account id                | `""`                          |
//! | suspicion score           | `0.0`                         |
//! | ring memberships          | empty list                    |
//! | link endpoint             | `None` (never matches an id)  |
//! | transaction amount        | `0.0`                         |
//! | transaction timestamp     | `""` (unparseable)            |
//! | ring id / pattern type    | `""`                          |
//! | ring risk score           | `0.0`                         |
//!
//! The graph is immutable after construction. A new analysis replaces it
//! wholesale, with a fresh session id.

use crate::types::analysis::{AnalysisResult, RawAccount, RawTransaction, RingRecord};
use crate::types::risk::{RiskTier, TierCounts};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// Account node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub suspicion_score: f64,
    /// Ids of every ring this account belongs to
    #[serde(rename = "ring")]
    pub ring_ids: Vec<String>,
}

impl Account {
    pub fn tier(&self) -> RiskTier {
        RiskTier::from_score(self.suspicion_score)
    }

    pub fn in_ring(&self, ring_id: &str) -> bool {
        self.ring_ids.iter().any(|r| r == ring_id)
    }
}

impl From<&RawAccount> for Account {
    fn from(raw: &RawAccount) -> Self {
        Self {
            id: raw.id.clone().unwrap_or_default(),
            suspicion_score: raw.suspicion_score.unwrap_or(0.0),
            ring_ids: raw.ring.clone(),
        }
    }
}

/// Directed transaction link with normalized endpoints.
///
/// Parallel transactions between the same pair stay distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub source: Option<String>,
    pub target: Option<String>,
    pub amount: f64,
    pub timestamp: String,
}

impl Transaction {
    /// Both endpoint ids, when both are present.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        Some((self.source.as_deref()?, self.target.as_deref()?))
    }

    /// Whether both endpoints are in `ids`.
    pub fn connects_within(&self, ids: &HashSet<&str>) -> bool {
        self.endpoints()
            .is_some_and(|(source, target)| ids.contains(source) && ids.contains(target))
    }
}

impl From<&RawTransaction> for Transaction {
    fn from(raw: &RawTransaction) -> Self {
        Self {
            source: raw.source.clone(),
            target: raw.target.clone(),
            amount: raw.amount.unwrap_or(0.0),
            timestamp: raw.timestamp.clone().unwrap_or_default(),
        }
    }
}

/// Fraud ring with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    pub ring_id: String,
    pub member_accounts: Vec<String>,
    pub pattern_type: String,
    pub risk_score: f64,
    /// Surfaced as supplied upstream, never recomputed here
    pub total_value: Option<f64>,
}

impl FraudRing {
    pub fn members(&self) -> HashSet<&str> {
        self.member_accounts.iter().map(String::as_str).collect()
    }
}

impl From<&RingRecord> for FraudRing {
    fn from(record: &RingRecord) -> Self {
        Self {
            ring_id: record.ring_id.clone().unwrap_or_default(),
            member_accounts: record.member_accounts.clone(),
            pattern_type: record.pattern_type.clone().unwrap_or_default(),
            risk_score: record.risk_score.unwrap_or(0.0),
            total_value: record.total_value,
        }
    }
}

/// Full graph of one analysis session.
#[derive(Debug, Clone)]
pub struct GraphModel {
    session_id: Uuid,
    nodes: Vec<Account>,
    links: Vec<Transaction>,
    rings: Vec<FraudRing>,
}

impl GraphModel {
    /// Build a graph from raw node and link records.
    ///
    /// Never fails: malformed records are kept with defaults substituted.
    pub fn new(nodes: &[RawAccount], links: &[RawTransaction]) -> Self {
        let substituted_ids = nodes.iter().filter(|n| n.id.is_none()).count();
        let substituted_scores = nodes.iter().filter(|n| n.suspicion_score.is_none()).count();
        let missing_endpoints = links
            .iter()
            .filter(|l| l.source.is_none() || l.target.is_none())
            .count();

        let graph = Self {
            session_id: Uuid::new_v4(),
            nodes: nodes.iter().map(Account::from).collect(),
            links: links.iter().map(Transaction::from).collect(),
            rings: Vec::new(),
        };

        debug!(
            session_id = %graph.session_id,
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            substituted_ids,
            substituted_scores,
            missing_endpoints,
            "Graph model constructed"
        );

        let dangling = graph.dangling_links();
        if dangling > 0 {
            warn!(
                session_id = %graph.session_id,
                dangling,
                "Links reference accounts absent from the node set"
            );
        }

        graph
    }

    /// Build the graph and ring set of an analysis result.
    pub fn from_analysis(result: &AnalysisResult) -> Self {
        let graph = match &result.graph_data {
            Some(data) => Self::new(&data.nodes, &data.links),
            None => Self::new(&[], &[]),
        };
        graph.with_rings(&result.fraud_rings)
    }

    /// Attach the rings reported alongside this graph.
    pub fn with_rings(mut self, rings: &[RingRecord]) -> Self {
        self.rings = rings.iter().map(FraudRing::from).collect();
        self
    }

    /// Identity of this graph instance, for keying derived-view caches.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn nodes(&self) -> &[Account] {
        &self.nodes
    }

    pub fn links(&self) -> &[Transaction] {
        &self.links
    }

    pub fn rings(&self) -> &[FraudRing] {
        &self.rings
    }

    /// Look up a ring by id. The first match wins if ids repeat.
    pub fn ring(&self, ring_id: &str) -> Option<&FraudRing> {
        self.rings.iter().find(|r| r.ring_id == ring_id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Links with a missing endpoint or an endpoint absent from the node set.
    pub fn dangling_links(&self) -> usize {
        let ids = self.node_ids();
        self.links.iter().filter(|l| !l.connects_within(&ids)).count()
    }

    pub fn tier_counts(&self) -> TierCounts {
        self.nodes.iter().map(Account::tier).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis(value: serde_json::Value) -> AnalysisResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_substituted() {
        let result = analysis(json!({
            "graph_data": {
                "nodes": [{"suspicion_score": "bad"}, {"id": "B"}],
                "links": [{"source": "B"}]
            },
            "fraud_rings": [{"member_accounts": ["B"]}]
        }));
        let graph = GraphModel::from_analysis(&result);

        assert_eq!(graph.nodes()[0].id, "");
        assert_eq!(graph.nodes()[0].suspicion_score, 0.0);
        assert!(graph.nodes()[1].ring_ids.is_empty());

        let link = &graph.links()[0];
        assert_eq!(link.target, None);
        assert_eq!(link.amount, 0.0);
        assert_eq!(link.timestamp, "");
        assert!(link.endpoints().is_none());

        let ring = &graph.rings()[0];
        assert_eq!(ring.ring_id, "");
        assert_eq!(ring.risk_score, 0.0);
        assert_eq!(ring.total_value, None);
    }

    #[test]
    fn test_missing_graph_data() {
        let graph = GraphModel::from_analysis(&AnalysisResult::default());
        assert!(graph.nodes().is_empty());
        assert!(graph.links().is_empty());
        assert!(graph.rings().is_empty());
    }

    #[test]
    fn test_dangling_links_counted() {
        let result = analysis(json!({
            "graph_data": {
                "nodes": [{"id": "A"}, {"id": "B"}],
                "links": [
                    {"source": "A", "target": "B"},
                    {"source": "A", "target": "GHOST"},
                    {"source": {"id": "B"}, "target": null}
                ]
            }
        }));
        let graph = GraphModel::from_analysis(&result);
        assert_eq!(graph.links().len(), 3);
        assert_eq!(graph.dangling_links(), 2);
    }

    #[test]
    fn test_ring_lookup_and_membership() {
        let result = analysis(json!({
            "graph_data": {
                "nodes": [{"id": "A", "suspicion_score": 91, "ring": ["R1", "R2"]}]
            },
            "fraud_rings": [
                {"ring_id": "R1", "member_accounts": ["A", "B"], "pattern_type": "cycle", "risk_score": 88},
                {"ring_id": "R2", "member_accounts": ["A"], "pattern_type": "smurfing", "risk_score": 61}
            ]
        }));
        let graph = GraphModel::from_analysis(&result);

        assert!(graph.nodes()[0].in_ring("R2"));
        assert!(!graph.nodes()[0].in_ring("R3"));
        assert_eq!(graph.ring("R2").map(|r| r.pattern_type.as_str()), Some("smurfing"));
        assert!(graph.ring("R9").is_none());
        assert!(graph.ring("R1").unwrap().members().contains("B"));
    }

    #[test]
    fn test_sessions_are_distinct() {
        let a = GraphModel::new(&[], &[]);
        let b = GraphModel::new(&[], &[]);
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_tier_counts() {
        let result = analysis(json!({
            "graph_data": {
                "nodes": [
                    {"id": "A", "suspicion_score": 90},
                    {"id": "B", "suspicion_score": 60},
                    {"id": "C", "suspicion_score": 10},
                    {"id": "D"}
                ]
            }
        }));
        let counts = GraphModel::from_analysis(&result).tier_counts();
        assert_eq!((counts.critical, counts.suspicious, counts.neutral), (1, 1, 2));
    }
}
