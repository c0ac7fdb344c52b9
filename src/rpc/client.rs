//! The low-level RPC client.
//!
//! `TcpClient` owns the dial address, the TLS options, and the correlation
//! counter. The counter is a plain atomic on the instance — two clients count
//! independently, and concurrent calls on one client never collide. Calls
//! carry no other shared state: each one encodes, sends over its own
//! connection, and decodes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::rpc::codec;
use crate::rpc::conn::{self, TlsOptions};
use crate::rpc::error::ClientError;
use crate::rpc::types::{BatchResponse, Request, Response};

pub struct TcpClient {
    addr: String,
    tls: Option<TlsOptions>,
    counter: AtomicI64,
}

impl TcpClient {
    /// Plaintext client for `addr` (`host:port`). Ids start at 1.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            tls: None,
            counter: AtomicI64::new(0),
        }
    }

    /// Client that dials through TLS with the given pass-through options.
    pub fn with_tls(addr: impl Into<String>, tls: TlsOptions) -> Self {
        Self {
            tls: Some(tls),
            ..Self::new(addr)
        }
    }

    pub fn address(&self) -> &str {
        &self.addr
    }

    fn next_id(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Issue a single call. Runs until completion or error; pair with
    /// [`TcpClient::call_with_cancel`] or an outer `tokio::time::timeout`
    /// when a bound is needed.
    pub async fn call(&self, request: Request) -> Result<Response, ClientError> {
        self.call_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Issue a single call, aborting (and closing the connection) as soon as
    /// `cancel` fires.
    pub async fn call_with_cancel(
        &self,
        mut request: Request,
        cancel: &CancellationToken,
    ) -> Result<Response, ClientError> {
        request.stamp(self.next_id());
        let payload = codec::encode_request(&request)?;
        let frame = conn::send(&self.addr, self.tls.as_ref(), &payload, cancel).await?;
        Ok(codec::decode_response(&frame)?)
    }

    /// Issue several calls as one batch frame. Responses come back in
    /// request order; see [`TcpClient::call_batch_with_cancel`].
    pub async fn call_batch(&self, requests: Vec<Request>) -> Result<BatchResponse, ClientError> {
        self.call_batch_with_cancel(requests, &CancellationToken::new())
            .await
    }

    /// Batch variant of [`TcpClient::call_with_cancel`].
    ///
    /// Every request is stamped before the single combined send. The decoded
    /// responses are matched back to the requests by echoed id, so a peer
    /// that reorders entries inside the array still yields responses in
    /// request order. Only when the peer omits ids (or the counts disagree)
    /// does wire position decide.
    pub async fn call_batch_with_cancel(
        &self,
        mut requests: Vec<Request>,
        cancel: &CancellationToken,
    ) -> Result<BatchResponse, ClientError> {
        for request in &mut requests {
            request.stamp(self.next_id());
        }
        let payload = codec::encode_batch(&requests)?;
        let frame = conn::send(&self.addr, self.tls.as_ref(), &payload, cancel).await?;
        let batch = codec::decode_batch(&frame)?;
        Ok(reorder_to_request_order(&requests, batch))
    }
}

/// Match responses back to their requests by echoed correlation id.
///
/// Responses whose id is missing or unknown keep their relative wire order
/// and fill the remaining slots, which degrades to the positional behavior
/// for peers that do not echo ids. Entry-error indices are remapped along
/// with the responses they point at.
fn reorder_to_request_order(requests: &[Request], batch: BatchResponse) -> BatchResponse {
    if batch.responses.len() != requests.len() {
        return batch;
    }

    let slot_of: HashMap<i64, usize> = requests
        .iter()
        .enumerate()
        .filter_map(|(slot, req)| req.id().map(|id| (id, slot)))
        .collect();

    let mut slots: Vec<Option<(usize, Response)>> = Vec::with_capacity(requests.len());
    slots.resize_with(requests.len(), || None);
    let mut unmatched = Vec::new();
    for (wire_index, resp) in batch.responses.into_iter().enumerate() {
        match resp.id.and_then(|id| slot_of.get(&id).copied()) {
            Some(slot) if slots[slot].is_none() => slots[slot] = Some((wire_index, resp)),
            _ => unmatched.push((wire_index, resp)),
        }
    }

    let mut unmatched = unmatched.into_iter();
    let mut responses = Vec::with_capacity(slots.len());
    let mut final_of_wire: HashMap<usize, usize> = HashMap::new();
    for slot in slots {
        let entry = match slot {
            Some(entry) => Some(entry),
            None => unmatched.next(),
        };
        if let Some((wire_index, resp)) = entry {
            final_of_wire.insert(wire_index, responses.len());
            responses.push(resp);
        }
    }

    let errors = batch
        .errors
        .into_iter()
        .map(|mut err| {
            if let Some(&index) = final_of_wire.get(&err.index) {
                err.index = index;
            }
            err
        })
        .collect();

    BatchResponse { responses, errors }
}
