//! Displayable subgraph derivation from a ring-selection state.

use super::model::{Account, GraphModel, Transaction};
use crate::types::risk::is_high_risk;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Transient view selection owned by the caller.
///
/// An isolated ring takes precedence over the high-risk-only flag. An empty
/// ring id counts as no isolation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub isolated_ring_id: Option<String>,
    #[serde(default)]
    pub high_risk_only: bool,
}

/// Effective filter mode of a [`Selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode<'a> {
    Isolated(&'a str),
    HighRiskOnly,
    All,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn isolate(ring_id: impl Into<String>) -> Self {
        Self {
            isolated_ring_id: Some(ring_id.into()),
            high_risk_only: false,
        }
    }

    pub fn high_risk() -> Self {
        Self {
            isolated_ring_id: None,
            high_risk_only: true,
        }
    }

    pub fn mode(&self) -> ViewMode<'_> {
        match self.isolated_ring_id.as_deref() {
            Some(ring_id) if !ring_id.is_empty() => ViewMode::Isolated(ring_id),
            _ if self.high_risk_only => ViewMode::HighRiskOnly,
            _ => ViewMode::All,
        }
    }
}

/// Filtered node and link collections handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Subgraph {
    pub nodes: Vec<Account>,
    pub links: Vec<Transaction>,
}

impl Subgraph {
    /// Every link connects two nodes of this subgraph.
    pub fn is_referentially_closed(&self) -> bool {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.links.iter().all(|l| l.connects_within(&ids))
    }
}

/// Derive the subgraph visible under `selection`.
///
/// Nodes are kept by selection mode; a link is kept only when both its
/// endpoints are kept nodes. Input order is preserved in both collections.
pub fn derive(graph: &GraphModel, selection: &Selection) -> Subgraph {
    let mode = selection.mode();
    let nodes: Vec<Account> = graph
        .nodes()
        .iter()
        .filter(|node| match mode {
            ViewMode::Isolated(ring_id) => node.in_ring(ring_id),
            ViewMode::HighRiskOnly => is_high_risk(node.suspicion_score),
            ViewMode::All => true,
        })
        .cloned()
        .collect();

    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let links: Vec<Transaction> = graph
        .links()
        .iter()
        .filter(|link| link.connects_within(&kept))
        .cloned()
        .collect();

    debug!(
        session_id = %graph.session_id(),
        mode = ?mode,
        nodes = nodes.len(),
        links = links.len(),
        "Subgraph derived"
    );

    Subgraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisResult;
    use serde_json::json;

    fn sample_graph() -> GraphModel {
        let result: AnalysisResult = serde_json::from_value(json!({
            "graph_data": {
                "nodes": [
                    {"id": "A", "suspicion_score": 90, "ring": ["R1"]},
                    {"id": "B", "suspicion_score": 60, "ring": ["R1"]},
                    {"id": "C", "suspicion_score": 10}
                ],
                "links": [
                    {"source": "A", "target": "B", "amount": 5000, "timestamp": "2024-01-02T00:00:00Z"},
                    {"source": "B", "target": "C", "amount": 100, "timestamp": "2024-01-01T00:00:00Z"}
                ]
            },
            "fraud_rings": [{"ring_id": "R1", "member_accounts": ["A", "B"], "pattern_type": "cycle", "risk_score": 90}]
        }))
        .unwrap();
        GraphModel::from_analysis(&result)
    }

    fn ids(subgraph: &Subgraph) -> Vec<&str> {
        subgraph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_isolate_ring() {
        let graph = sample_graph();
        let view = derive(&graph, &Selection::isolate("R1"));

        assert_eq!(ids(&view), vec!["A", "B"]);
        assert_eq!(view.links.len(), 1);
        assert_eq!(view.links[0].endpoints(), Some(("A", "B")));
        assert!(view.is_referentially_closed());
    }

    #[test]
    fn test_high_risk_only() {
        let graph = sample_graph();
        let view = derive(&graph, &Selection::high_risk());

        assert_eq!(ids(&view), vec!["A", "B"]);
        assert_eq!(view.links.len(), 1);
    }

    #[test]
    fn test_no_selection_keeps_everything() {
        let graph = sample_graph();
        let view = derive(&graph, &Selection::all());

        assert_eq!(ids(&view), vec!["A", "B", "C"]);
        assert_eq!(view.links.len(), 2);
    }

    #[test]
    fn test_isolation_takes_precedence() {
        let graph = sample_graph();
        let both = Selection {
            isolated_ring_id: Some("R1".to_string()),
            high_risk_only: true,
        };
        assert_eq!(derive(&graph, &both), derive(&graph, &Selection::isolate("R1")));
    }

    #[test]
    fn test_empty_ring_id_is_not_isolation() {
        let selection = Selection {
            isolated_ring_id: Some(String::new()),
            high_risk_only: true,
        };
        assert_eq!(selection.mode(), ViewMode::HighRiskOnly);
    }

    #[test]
    fn test_unknown_ring_yields_empty_view() {
        let graph = sample_graph();
        let view = derive(&graph, &Selection::isolate("R404"));
        assert!(view.nodes.is_empty());
        assert!(view.links.is_empty());
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let graph = sample_graph();
        let selection = Selection::high_risk();
        assert_eq!(derive(&graph, &selection), derive(&graph, &selection));
    }

    #[test]
    fn test_dangling_and_partial_links_dropped() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "graph_data": {
                "nodes": [{"id": "A"}, {"id": "B"}],
                "links": [
                    {"source": "A", "target": "GHOST"},
                    {"source": {"id": "A", "x": 12.0}, "target": {"id": "B", "y": 4.0}},
                    {"source": "B"},
                    {"source": "A", "target": "B"}
                ]
            }
        }))
        .unwrap();
        let graph = GraphModel::from_analysis(&result);
        let view = derive(&graph, &Selection::all());

        assert_eq!(view.links.len(), 2);
        assert!(view.is_referentially_closed());
    }

    #[test]
    fn test_node_in_several_rings_appears_under_each() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "graph_data": {
                "nodes": [
                    {"id": "A", "ring": ["R1"]},
                    {"id": "HUB", "ring": ["R1", "R2"]},
                    {"id": "D", "ring": ["R2"]}
                ],
                "links": [
                    {"source": "A", "target": "HUB", "amount": 900},
                    {"source": "HUB", "target": "D", "amount": 850},
                    {"source": "D", "target": "A", "amount": 800}
                ]
            }
        }))
        .unwrap();
        let graph = GraphModel::from_analysis(&result);

        let second = derive(&graph, &Selection::isolate("R2"));
        assert_eq!(ids(&second), vec!["HUB", "D"]);
        assert_eq!(second.links.len(), 1);
        assert_eq!(second.links[0].endpoints(), Some(("HUB", "D")));

        let first = derive(&graph, &Selection::isolate("R1"));
        assert_eq!(ids(&first), vec!["A", "HUB"]);
        assert_eq!(first.links[0].endpoints(), Some(("A", "HUB")));
    }

    #[test]
    fn test_closure_holds_for_every_mode() {
        let graph = sample_graph();
        let selections = [
            Selection::all(),
            Selection::high_risk(),
            Selection::isolate("R1"),
            Selection::isolate("missing"),
        ];
        for selection in &selections {
            assert!(derive(&graph, selection).is_referentially_closed());
        }
    }
}
