//! Pure wire codec for newline-delimited JSON-RPC frames.
//!
//! One frame is one JSON value followed by a single `\n`; the newline is the
//! framing, there is no length prefix. Batches are one JSON array per frame,
//! still with a single trailing newline. Nothing here touches a socket.

use crate::rpc::error::CodecError;
use crate::rpc::types::{BatchResponse, EntryError, Request, Response};

/// Encode one request as a newline-terminated frame.
pub fn encode_request(request: &Request) -> Result<Vec<u8>, CodecError> {
    let mut frame = serde_json::to_vec(request).map_err(CodecError::Serialize)?;
    frame.push(b'\n');
    Ok(frame)
}

/// Encode a non-empty sequence of requests as one array frame.
pub fn encode_batch(requests: &[Request]) -> Result<Vec<u8>, CodecError> {
    if requests.is_empty() {
        return Err(CodecError::EmptyBatch);
    }
    let mut frame = serde_json::to_vec(requests).map_err(CodecError::Serialize)?;
    frame.push(b'\n');
    Ok(frame)
}

/// Decode one response frame. A structurally malformed payload is a
/// [`CodecError::Malformed`]; a response whose `error` member is populated
/// decodes successfully and is the caller's to inspect.
pub fn decode_response(frame: &[u8]) -> Result<Response, CodecError> {
    serde_json::from_slice(frame).map_err(CodecError::Malformed)
}

/// Decode a batch frame.
///
/// If the array itself fails to parse the error is returned directly. If it
/// parses, per-entry `error` members are collected into the outcome while
/// the decoded responses — including the failed ones — are all returned.
pub fn decode_batch(frame: &[u8]) -> Result<BatchResponse, CodecError> {
    let responses: Vec<Response> = serde_json::from_slice(frame).map_err(CodecError::Malformed)?;
    let errors = responses
        .iter()
        .enumerate()
        .filter_map(|(index, resp)| {
            resp.err().map(|error| EntryError {
                index,
                id: resp.id,
                error: error.clone(),
            })
        })
        .collect();
    Ok(BatchResponse { responses, errors })
}
