//! Fraud Ring Forensics Library
//!
//! Graph derivation and ring reconstruction over the output of an external
//! fraud-detection engine: filtered renderable subgraphs, time-ordered ring
//! ledgers, risk tiers, and a stable export document.

pub mod config;
pub mod consumer;
pub mod export;
pub mod graph;
pub mod metrics;
pub mod producer;
pub mod session;
pub mod style;
pub mod triage;
pub mod types;

pub use config::AppConfig;
pub use consumer::AnalysisConsumer;
pub use export::{project, ExportDocument};
pub use graph::{derive, reconstruct, GraphModel, Selection, Subgraph};
pub use producer::{ExportFileWriter, ExportProducer};
pub use session::ForensicSession;
pub use types::{classify, AnalysisResult, RiskTier};
