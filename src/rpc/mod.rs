//! Line-delimited JSON-RPC 2.0 over TCP.
//!
//! Layering, bottom up: [`codec`] is the pure encode/decode of newline-framed
//! payloads, [`conn`] performs exactly one dial/write/read cycle per call and
//! races the read against cancellation, and [`client`] ties both together
//! with per-instance correlation-id bookkeeping.

pub mod client;
pub mod codec;
pub mod conn;
pub mod error;
pub mod types;

pub use client::TcpClient;
pub use conn::TlsOptions;
pub use error::{ClientError, CodecError, RpcError, TransportError};
pub use types::{BatchResponse, EntryError, Request, Response};
