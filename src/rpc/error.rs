//! Error taxonomy for the RPC layer.
//!
//! Three distinct failure families, kept apart so callers can tell them
//! apart: transport errors (the call never completed), codec errors (the
//! frame arrived but is not valid JSON-RPC), and [`RpcError`] (a well-formed
//! response in which the remote rejected the call).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;
/// Sentinel for the implementation-defined server-error range.
pub const SERVER_ERROR: i64 = -32000;

/// Inclusive range reserved for implementation-defined server errors.
pub const SERVER_ERROR_RANGE: std::ops::RangeInclusive<i64> = -32099..=-32000;

/// The error object carried inside an otherwise well-formed response.
///
/// This is both a data record (it round-trips through serde) and a
/// propagated failure value.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("rpc error code {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Whether the code falls in the implementation-defined server-error range.
    pub fn is_server_error(&self) -> bool {
        SERVER_ERROR_RANGE.contains(&self.code)
    }

    /// Code comparison. Matching against [`SERVER_ERROR`] matches the whole
    /// reserved range, not just -32000.
    pub fn matches(&self, code: i64) -> bool {
        if code == SERVER_ERROR && self.is_server_error() {
            return true;
        }
        self.code == code
    }
}

/// Failures while encoding requests or decoding response frames. No I/O here.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A batch call needs at least one request.
    #[error("empty batch: no requests to encode")]
    EmptyBatch,

    #[error("failed to serialize request: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The frame is not valid JSON-RPC. Distinct from a response that
    /// carries an `error` member, which decodes fine.
    #[error("malformed response frame: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Failures in the dial/write/read cycle of a single call.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to connect to {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {addr} failed: {source}")]
    Tls {
        addr: String,
        #[source]
        source: native_tls::Error,
    },

    #[error("failed to send request: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to read response: {0}")]
    Read(#[source] std::io::Error),

    /// The peer closed the connection before a full newline-terminated
    /// frame arrived.
    #[error("connection closed before a full response frame arrived")]
    UnexpectedEof,

    /// The caller's cancellation token fired before the response arrived.
    #[error("call canceled before a response arrived")]
    Canceled,
}

/// Anything that can go wrong in a [`crate::rpc::TcpClient`] call.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The configured per-call timeout elapsed. Carries the configured value
    /// so "no response within 5s" reads differently from "canceled".
    #[error("no response within the configured timeout of {timeout:?}")]
    DeadlineExceeded { timeout: Duration },
}
