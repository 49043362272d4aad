//! Analysis session: one immutable graph plus memoized derived views.
//!
//! The filter and ledger functions are pure; caching is done here, keyed by
//! selection (for subgraphs) and ring id (for ledgers). A new analysis
//! result starts a new session instead of patching this one.

use crate::graph::filter::{derive, Selection, Subgraph};
use crate::graph::ledger::{reconstruct, InternalTransaction};
use crate::graph::model::GraphModel;
use crate::types::analysis::AnalysisResult;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

pub struct ForensicSession {
    graph: Arc<GraphModel>,
    views: RwLock<HashMap<Selection, Arc<Subgraph>>>,
    ledgers: RwLock<HashMap<String, Arc<Vec<InternalTransaction>>>>,
}

impl ForensicSession {
    pub fn new(graph: GraphModel) -> Self {
        Self {
            graph: Arc::new(graph),
            views: RwLock::new(HashMap::new()),
            ledgers: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_analysis(result: &AnalysisResult) -> Self {
        Self::new(GraphModel::from_analysis(result))
    }

    pub fn graph(&self) -> &Arc<GraphModel> {
        &self.graph
    }

    pub fn session_id(&self) -> Uuid {
        self.graph.session_id()
    }

    /// Subgraph visible under `selection`, computed once per selection.
    pub fn view(&self, selection: &Selection) -> Arc<Subgraph> {
        if let Ok(views) = self.views.read() {
            if let Some(view) = views.get(selection) {
                return view.clone();
            }
        }

        let view = Arc::new(derive(&self.graph, selection));
        match self.views.write() {
            Ok(mut views) => {
                debug!(session_id = %self.session_id(), selection = ?selection, "View cached");
                views.entry(selection.clone()).or_insert(view).clone()
            }
            Err(_) => view,
        }
    }

    /// Internal ledger of a ring, computed once per ring id.
    ///
    /// An unknown ring id yields an empty ledger, which is not cached.
    pub fn ledger(&self, ring_id: &str) -> Arc<Vec<InternalTransaction>> {
        if let Ok(ledgers) = self.ledgers.read() {
            if let Some(ledger) = ledgers.get(ring_id) {
                return ledger.clone();
            }
        }

        let Some(ring) = self.graph.ring(ring_id) else {
            return Arc::new(Vec::new());
        };

        let ledger = Arc::new(reconstruct(Some(ring), &self.graph));
        match self.ledgers.write() {
            Ok(mut ledgers) => ledgers.entry(ring_id.to_string()).or_insert(ledger).clone(),
            Err(_) => ledger,
        }
    }

    /// Number of memoized subgraph views.
    pub fn cached_views(&self) -> usize {
        self.views.read().map(|v| v.len()).unwrap_or(0)
    }

    /// Number of memoized ring ledgers.
    pub fn cached_ledgers(&self) -> usize {
        self.ledgers.read().map(|l| l.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> ForensicSession {
        let result: AnalysisResult = serde_json::from_value(json!({
            "graph_data": {
                "nodes": [
                    {"id": "A", "suspicion_score": 90, "ring": "R1"},
                    {"id": "B", "suspicion_score": 60, "ring": ["R1"]},
                    {"id": "C", "suspicion_score": 10}
                ],
                "links": [
                    {"source": "A", "target": "B", "amount": 5000, "timestamp": "2024-01-02 00:00:00"},
                    {"source": "B", "target": "C", "amount": 100, "timestamp": "2024-01-01 00:00:00"}
                ]
            },
            "fraud_rings": [{"ring_id": "R1", "member_accounts": ["A", "B"], "pattern_type": "cycle", "risk_score": 90}]
        }))
        .unwrap();
        ForensicSession::from_analysis(&result)
    }

    #[test]
    fn test_view_is_memoized() {
        let session = session();
        let first = session.view(&Selection::isolate("R1"));
        let second = session.view(&Selection::isolate("R1"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.cached_views(), 1);

        session.view(&Selection::all());
        assert_eq!(session.cached_views(), 2);
    }

    #[test]
    fn test_cached_view_matches_fresh_derivation() {
        let session = session();
        let selection = Selection::high_risk();
        let cached = session.view(&selection);
        assert_eq!(*cached, derive(session.graph(), &selection));
    }

    #[test]
    fn test_ledger_is_memoized() {
        let session = session();
        let first = session.ledger("R1");
        let second = session.ledger("R1");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert!(session.ledger("missing").is_empty());
    }

    #[test]
    fn test_unknown_ring_ledger_not_cached() {
        let session = session();
        for ring_id in ["R404", "R405", ""] {
            assert!(session.ledger(ring_id).is_empty());
        }
        assert_eq!(session.cached_ledgers(), 0);

        session.ledger("R1");
        assert_eq!(session.cached_ledgers(), 1);
    }

    #[test]
    fn test_concurrent_readers() {
        let session = Arc::new(session());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = session.clone();
                std::thread::spawn(move || session.view(&Selection::isolate("R1")).nodes.len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
