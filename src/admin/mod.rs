//! The node admin API: method table, typed results, and the high-level
//! client with a default per-call timeout.

pub mod client;
pub mod methods;
pub mod numeric;
pub mod types;

pub use client::{AdminClient, AdminError, FetchResult};
pub use methods::{Method, ResponseKind};
pub use numeric::{NumericError, NumericValue};
pub use types::{NodeInfoError, NodeType, NodeTypeKind, NodeState};
