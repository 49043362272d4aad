//! Type definitions for the forensic graph engine

pub mod analysis;
pub mod lenient;
pub mod risk;

pub use analysis::{
    AnalysisResult, AnalysisSummary, GraphData, RawAccount, RawTransaction, RingRecord,
    SuspiciousAccount,
};
pub use risk::{classify, is_high_risk, RiskTier, TierCounts};
