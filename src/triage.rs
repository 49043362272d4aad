//! Ring triage ordering and ring header data.

use crate::graph::model::FraudRing;
use crate::style::amount_label;
use crate::types::risk::{RiskTier, CRITICAL_THRESHOLD};
use serde::Serialize;

/// Rings ordered by descending risk score. Ties keep input order.
pub fn rank_rings(rings: &[FraudRing]) -> Vec<&FraudRing> {
    let mut ranked: Vec<&FraudRing> = rings.iter().collect();
    ranked.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    ranked
}

/// Badge tier of a ring: Critical above the critical threshold, otherwise
/// Suspicious. A detected ring is never shown as Neutral.
pub fn ring_badge(ring: &FraudRing) -> RiskTier {
    if ring.risk_score > CRITICAL_THRESHOLD {
        RiskTier::Critical
    } else {
        RiskTier::Suspicious
    }
}

pub fn has_critical_ring(rings: &[FraudRing]) -> bool {
    rings.iter().any(|r| ring_badge(r) == RiskTier::Critical)
}

/// Header data for a selected ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingHeader {
    pub ring_id: String,
    pub pattern_type: String,
    pub risk_score: f64,
    pub badge: RiskTier,
    pub member_count: usize,
    /// Externally supplied total, labelled; absent when not supplied
    pub total_value: Option<String>,
}

impl From<&FraudRing> for RingHeader {
    fn from(ring: &FraudRing) -> Self {
        Self {
            ring_id: ring.ring_id.clone(),
            pattern_type: ring.pattern_type.clone(),
            risk_score: ring.risk_score,
            badge: ring_badge(ring),
            member_count: ring.member_accounts.len(),
            total_value: ring.total_value.map(amount_label),
        }
    }
}
