//! Risk tier classification shared by the subgraph filter and the visual
//! encoding of accounts and rings.

use serde::{Deserialize, Serialize};

/// Scores strictly above this are high risk: the Suspicious/Neutral split
/// and the high-risk-only view filter both read this constant.
pub const HIGH_RISK_THRESHOLD: f64 = 50.0;

/// Scores strictly above this are Critical.
pub const CRITICAL_THRESHOLD: f64 = 80.0;

/// Discrete risk tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Neutral,
    Suspicious,
    Critical,
}

impl RiskTier {
    /// Classify a suspicion score.
    ///
    /// Negative scores are valid and classify as Neutral. NaN fails both
    /// comparisons and is Neutral as well.
    pub fn from_score(score: f64) -> Self {
        if score > CRITICAL_THRESHOLD {
            RiskTier::Critical
        } else if is_high_risk(score) {
            RiskTier::Suspicious
        } else {
            RiskTier::Neutral
        }
    }

    /// Classify a possibly absent score; absent counts as 0.
    pub fn from_optional_score(score: Option<f64>) -> Self {
        Self::from_score(score.unwrap_or(0.0))
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Neutral => "neutral",
            RiskTier::Suspicious => "suspicious",
            RiskTier::Critical => "critical",
        }
    }
}

/// Whether a score passes the high-risk-only view filter.
pub fn is_high_risk(score: f64) -> bool {
    score > HIGH_RISK_THRESHOLD
}

/// Classify a suspicion score into a [`RiskTier`].
pub fn classify(score: f64) -> RiskTier {
    RiskTier::from_score(score)
}

/// Number of accounts per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub critical: u64,
    pub suspicious: u64,
    pub neutral: u64,
}

impl TierCounts {
    pub fn record(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Critical => self.critical += 1,
            RiskTier::Suspicious => self.suspicious += 1,
            RiskTier::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.critical + self.suspicious + self.neutral
    }
}

impl FromIterator<RiskTier> for TierCounts {
    fn from_iter<I: IntoIterator<Item = RiskTier>>(iter: I) -> Self {
        let mut counts = TierCounts::default();
        for tier in iter {
            counts.record(tier);
        }
        counts
    }
}
