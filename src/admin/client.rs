//! High-level admin client.
//!
//! Wraps [`TcpClient`] with the default per-call timeout and the typed
//! getters the collector layer consumes. Transport failures surface first;
//! a response that arrived but carries an `error` member surfaces as
//! [`AdminError::Rpc`]. Nothing here retries — that stays with the caller.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::admin::methods::{self, Method, ResponseKind};
use crate::admin::numeric::{NumericError, NumericValue};
use crate::admin::types::{NodeState, NodeType};
use crate::config::Config;
use crate::rpc::conn::TlsOptions;
use crate::rpc::error::{ClientError, RpcError};
use crate::rpc::types::{BatchResponse, Request, Response};
use crate::rpc::TcpClient;

#[derive(Error, Debug)]
pub enum AdminError {
    /// The call never completed: transport, codec, or timeout.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The call completed and the node rejected it.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Numeric(#[from] NumericError),

    #[error("failed to decode result: {0}")]
    Decode(#[source] serde_json::Error),

    /// The peer answered a batch with the wrong number of entries.
    #[error("batch returned {got} entries, expected {expected}")]
    BatchShape { expected: usize, got: usize },
}

/// A result decoded according to the method's registered response kind.
#[derive(Debug)]
pub enum FetchResult {
    Numeric(NumericValue),
    Json(Value),
}

impl std::fmt::Display for FetchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchResult::Numeric(n) => write!(f, "{}", n),
            FetchResult::Json(v) => write!(f, "{}", v),
        }
    }
}

pub struct AdminClient {
    rpc: TcpClient,
    timeout: Duration,
}

impl AdminClient {
    /// Client with a per-call timeout. A zero timeout waits indefinitely
    /// unless the caller cancels.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            rpc: TcpClient::new(addr),
            timeout,
        }
    }

    /// TLS variant of [`AdminClient::new`].
    pub fn with_tls(addr: impl Into<String>, timeout: Duration, tls: TlsOptions) -> Self {
        Self {
            rpc: TcpClient::with_tls(addr, tls),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let timeout = config.timeout;
        if config.tls {
            Self::with_tls(
                config.address.clone(),
                timeout,
                TlsOptions {
                    domain: None,
                    accept_invalid_certs: config.tls_insecure,
                },
            )
        } else {
            Self::new(config.address.clone(), timeout)
        }
    }

    pub fn address(&self) -> &str {
        self.rpc.address()
    }

    async fn with_deadline<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        if self.timeout.is_zero() {
            return fut.await;
        }
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(ClientError::DeadlineExceeded {
                timeout: self.timeout,
            }),
        }
    }

    /// Issue one call under the default timeout and check the response's
    /// error member.
    pub async fn call(&self, request: Request) -> Result<Response, AdminError> {
        let response = self.with_deadline(self.rpc.call(request)).await?;
        if let Some(err) = response.err() {
            return Err(AdminError::Rpc(err.clone()));
        }
        Ok(response)
    }

    /// Like [`AdminClient::call`], but aborting as soon as `cancel` fires.
    pub async fn call_with_cancel(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<Response, AdminError> {
        let response = self
            .with_deadline(self.rpc.call_with_cancel(request, cancel))
            .await?;
        if let Some(err) = response.err() {
            return Err(AdminError::Rpc(err.clone()));
        }
        Ok(response)
    }

    /// Issue a batch under the default timeout. Per-entry rejections stay in
    /// the returned [`BatchResponse`] so partial successes are not discarded.
    pub async fn call_batch(&self, requests: Vec<Request>) -> Result<BatchResponse, AdminError> {
        Ok(self.with_deadline(self.rpc.call_batch(requests)).await?)
    }

    /// Call any method and decode per the response-type registry.
    pub async fn fetch(&self, request: Request) -> Result<FetchResult, AdminError> {
        let kind = methods::response_kind_of(&request.method);
        let response = self.call(request).await?;
        match kind {
            ResponseKind::Numeric => Ok(FetchResult::Numeric(NumericValue::from_response(
                &response,
            )?)),
            ResponseKind::Generic => Ok(FetchResult::Json(
                response.decode().map_err(AdminError::Decode)?,
            )),
        }
    }

    async fn numeric(&self, method: Method) -> Result<i64, AdminError> {
        let response = self.call(method.request()).await?;
        let value = NumericValue::from_response(&response)?;
        debug!(method = %method, value = %value, "numeric result");
        Ok(value.to_i64())
    }

    pub async fn current_mini_epoch(&self) -> Result<i64, AdminError> {
        self.numeric(Method::GetCurrentMiniEpoch).await
    }

    pub async fn current_ds_epoch(&self) -> Result<i64, AdminError> {
        self.numeric(Method::GetCurrentDSEpoch).await
    }

    pub async fn prev_difficulty(&self) -> Result<i64, AdminError> {
        self.numeric(Method::GetPrevDifficulty).await
    }

    pub async fn prev_ds_difficulty(&self) -> Result<i64, AdminError> {
        self.numeric(Method::GetPrevDSDifficulty).await
    }

    pub async fn node_type(&self) -> Result<NodeType, AdminError> {
        let response = self.call(Method::GetNodeType.request()).await?;
        response.decode().map_err(AdminError::Decode)
    }

    pub async fn node_state(&self) -> Result<NodeState, AdminError> {
        let response = self.call(Method::GetNodeState.request()).await?;
        response.decode().map_err(AdminError::Decode)
    }

    /// Opaque mempool lookup; the node's answer shape varies by version.
    pub async fn is_txn_in_mempool(&self, txn_hash: &str) -> Result<Value, AdminError> {
        let response = self
            .call(Method::IsTxnInMemPool.request_with(&[txn_hash]))
            .await?;
        response.decode().map_err(AdminError::Decode)
    }

    /// Fetch several numeric gauges in one batch frame, values returned in
    /// the same order as `methods`.
    pub async fn numeric_batch(&self, methods: &[Method]) -> Result<Vec<i64>, AdminError> {
        let requests = methods.iter().map(|m| m.request()).collect();
        let batch = self.call_batch(requests).await?;
        let responses = batch.into_clean().map_err(|entry| entry.error)?;
        if responses.len() != methods.len() {
            return Err(AdminError::BatchShape {
                expected: methods.len(),
                got: responses.len(),
            });
        }
        responses
            .iter()
            .map(|resp| Ok(NumericValue::from_response(resp)?.to_i64()))
            .collect()
    }

    /// Mini and DS epoch in one frame.
    pub async fn epochs(&self) -> Result<(i64, i64), AdminError> {
        let values = self
            .numeric_batch(&[Method::GetCurrentMiniEpoch, Method::GetCurrentDSEpoch])
            .await?;
        Ok((values[0], values[1]))
    }
}
