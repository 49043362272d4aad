//! Account/transaction graph and the views derived from it

pub mod filter;
pub mod ledger;
pub mod model;

pub use filter::{derive, Selection, Subgraph, ViewMode};
pub use ledger::{parse_timestamp, reconstruct, InternalTransaction};
pub use model::{Account, FraudRing, GraphModel, Transaction};
