//! Time-ordered ledger of the transactions internal to one ring.

use super::model::{FraudRing, GraphModel};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Naive layouts accepted after RFC 3339; naive values are read as UTC.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Transaction whose both endpoints belong to the ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternalTransaction {
    pub source_id: String,
    pub target_id: String,
    pub amount: f64,
    /// Timestamp as supplied upstream
    pub timestamp: String,
    /// Parsed instant; `None` when the timestamp could not be read
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Parse an upstream timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Reconstruct the internal ledger of `ring`.
///
/// Keeps every link whose both endpoints are ring members and orders them by
/// parsed instant, ascending. The sort is stable, so ties keep input order.
/// Transactions with unparseable timestamps stay in the ledger and sort
/// before every dated one. An absent ring yields an empty ledger.
pub fn reconstruct(ring: Option<&FraudRing>, graph: &GraphModel) -> Vec<InternalTransaction> {
    let Some(ring) = ring else {
        return Vec::new();
    };

    let members = ring.members();
    let mut ledger: Vec<InternalTransaction> = graph
        .links()
        .iter()
        .filter_map(|link| {
            let (source, target) = link.endpoints()?;
            if !(members.contains(source) && members.contains(target)) {
                return None;
            }
            Some(InternalTransaction {
                source_id: source.to_string(),
                target_id: target.to_string(),
                amount: link.amount,
                timestamp: link.timestamp.clone(),
                occurred_at: parse_timestamp(&link.timestamp),
            })
        })
        .collect();

    ledger.sort_by_key(|tx| tx.occurred_at);

    let undated = ledger.iter().filter(|tx| tx.occurred_at.is_none()).count();
    debug!(
        ring_id = %ring.ring_id,
        members = members.len(),
        transactions = ledger.len(),
        undated,
        "Ring ledger reconstructed"
    );

    ledger
}

/// First and last dated instants of a ledger.
pub fn time_span(ledger: &[InternalTransaction]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut dated = ledger.iter().filter_map(|tx| tx.occurred_at);
    let first = dated.next()?;
    let last = dated.last().unwrap_or(first);
    Some((first, last))
}
