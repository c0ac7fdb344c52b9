//! JSON-RPC request and response types.
//!
//! Requests carry their correlation id as `Option<i64>`: `None` until the
//! client stamps one immediately before serialization, `Some` afterwards and
//! never mutated again. Serializing an unstamped request fails rather than
//! inventing a placeholder id. Responses keep `result` as a raw JSON
//! fragment so callers (notably the numeric decoder) see the exact wire text.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::rpc::error::RpcError;

/// Protocol version tag written into every frame.
pub const PROTOCOL_VERSION: &str = "2.0";

/// A single JSON-RPC request.
#[derive(Debug, Clone)]
pub struct Request {
    id: Option<i64>,
    pub method: String,
    pub params: Option<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id: None,
            method: method.into(),
            params,
        }
    }

    /// Request with positional string params, the shape the admin API takes.
    pub fn with_string_params(method: impl Into<String>, params: &[&str]) -> Self {
        let params = params.iter().map(|p| Value::from(*p)).collect();
        Self::new(method, Some(Value::Array(params)))
    }

    /// The correlation id, once stamped by the client.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Assign the correlation id. Called exactly once, right before encoding.
    pub(crate) fn stamp(&mut self, id: i64) {
        debug_assert!(self.id.is_none(), "request id stamped twice");
        self.id = Some(id);
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // An unstamped request must not reach the wire: a fabricated id
        // would collide with (or masquerade as) a real correlation id.
        let Some(id) = self.id else {
            return Err(serde::ser::Error::custom(
                "request has no correlation id; ids are assigned by the client before encoding",
            ));
        };
        // Field order matters only for readability, but keep it stable:
        // {"jsonrpc":"2.0","id":N,"method":...,"params":...}
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("jsonrpc", PROTOCOL_VERSION)?;
        map.serialize_entry("id", &id)?;
        map.serialize_entry("method", &self.method)?;
        map.serialize_entry("params", &self.params)?;
        map.end()
    }
}

/// A single JSON-RPC response frame.
///
/// At most one of `result`/`error` is populated; both may be absent for
/// void-style methods. Unknown fields and a missing `jsonrpc` tag are
/// tolerated — the admin socket predates strict 2.0 compliance.
#[derive(Debug, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Box<RawValue>>,
    #[serde(default)]
    pub error: Option<RpcError>,
    #[serde(default)]
    pub id: Option<i64>,
}

impl Response {
    /// The remote rejection, if the response carries one. A `Some` here means
    /// the call completed at the transport level but the node refused it.
    pub fn err(&self) -> Option<&RpcError> {
        self.error.as_ref()
    }

    /// The raw JSON text of `result`, exactly as it appeared on the wire.
    pub fn raw_result(&self) -> Option<&str> {
        self.result.as_deref().map(RawValue::get)
    }

    /// Deserialize `result` into a caller-supplied type. An absent result
    /// decodes as JSON `null`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.raw_result().unwrap_or("null"))
    }

    /// `result` as a JSON string.
    pub fn string(&self) -> Result<String, serde_json::Error> {
        self.decode()
    }
}

/// Outcome of decoding a batch frame.
///
/// The array either parses or it does not; when it parses, entries that
/// carry an `error` member are collected here without discarding the
/// successfully decoded siblings. Transport-level success never implies
/// per-entry success.
#[derive(Debug, Default)]
pub struct BatchResponse {
    /// All decoded responses, in request order once the client has matched
    /// them back by id.
    pub responses: Vec<Response>,
    /// Per-entry rejections, each pointing at its entry in `responses`.
    pub errors: Vec<EntryError>,
}

impl BatchResponse {
    /// True when every entry decoded without a populated `error` member.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The responses, or the first per-entry rejection if any entry failed.
    pub fn into_clean(self) -> Result<Vec<Response>, EntryError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.responses),
        }
    }
}

/// One failed entry inside an otherwise decodable batch.
#[derive(Debug, Clone, thiserror::Error)]
#[error("batch entry {index} (id {id:?}) failed: {error}")]
pub struct EntryError {
    /// Position of the failing entry in [`BatchResponse::responses`]. The
    /// codec sets this to the wire position; the client remaps it when it
    /// reorders responses into request order.
    pub index: usize,
    /// Echoed correlation id, when the peer supplied one.
    pub id: Option<i64>,
    pub error: RpcError,
}
