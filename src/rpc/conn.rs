//! Per-call connection driver.
//!
//! Every logical call owns its own connection: dial, write the full payload,
//! wait for one newline-terminated frame, close. The read runs as a spawned
//! task that owns the stream and hands its outcome back through a single-use
//! oneshot channel; the call site races that handoff against the caller's
//! cancellation token. The connection is dropped on every exit path —
//! success, failure, or cancellation — and is never reused.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::rpc::error::TransportError;

/// TLS pass-through options. Certificate management stays with the operator;
/// this only forwards what the handshake needs.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Server name for SNI and verification. Defaults to the host part of
    /// the dial address.
    pub domain: Option<String>,
    /// Accept certificates that fail verification. For lab setups with
    /// self-signed node certs.
    pub accept_invalid_certs: bool,
}

trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// Aborts the reader task when dropped. The task owns the stream, so this
/// ties the connection's lifetime to the call future itself: an outer
/// timeout that drops the call also closes the socket, not just the
/// cancellation branch below.
struct ReaderGuard(JoinHandle<()>);

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn dial(
    addr: &str,
    tls: Option<&TlsOptions>,
    cancel: &CancellationToken,
) -> Result<Box<dyn Stream>, TransportError> {
    let tcp = tokio::select! {
        res = TcpStream::connect(addr) => res.map_err(|source| TransportError::Dial {
            addr: addr.to_string(),
            source,
        })?,
        _ = cancel.cancelled() => return Err(TransportError::Canceled),
    };

    let Some(opts) = tls else {
        return Ok(Box::new(tcp));
    };

    let connector = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(opts.accept_invalid_certs)
        .build()
        .map_err(|source| TransportError::Tls {
            addr: addr.to_string(),
            source,
        })?;
    let connector = tokio_native_tls::TlsConnector::from(connector);
    let domain = match &opts.domain {
        Some(domain) => domain.clone(),
        None => addr.split(':').next().unwrap_or(addr).to_string(),
    };
    let stream = tokio::select! {
        res = connector.connect(&domain, tcp) => res.map_err(|source| TransportError::Tls {
            addr: addr.to_string(),
            source,
        })?,
        _ = cancel.cancelled() => return Err(TransportError::Canceled),
    };
    Ok(Box::new(stream))
}

/// Perform one write/read cycle against `addr` and return the raw frame,
/// newline included. Dial, write, and read are all raced against `cancel`.
pub(crate) async fn send(
    addr: &str,
    tls: Option<&TlsOptions>,
    payload: &[u8],
    cancel: &CancellationToken,
) -> Result<Vec<u8>, TransportError> {
    let mut stream = dial(addr, tls, cancel).await?;

    debug!(addr = %addr, bytes = payload.len(), "sending request");
    tokio::select! {
        res = stream.write_all(payload) => res.map_err(TransportError::Write)?,
        _ = cancel.cancelled() => return Err(TransportError::Canceled),
    }

    // The reader task owns the stream from here on; aborting the task drops
    // the stream, which closes the descriptor.
    let (done_tx, done_rx) = oneshot::channel();
    let reader = ReaderGuard(tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut frame = Vec::new();
        let outcome = match reader.read_until(b'\n', &mut frame).await {
            Ok(0) => Err(TransportError::UnexpectedEof),
            Ok(_) if !frame.ends_with(b"\n") => Err(TransportError::UnexpectedEof),
            Ok(_) => Ok(frame),
            Err(source) => Err(TransportError::Read(source)),
        };
        let _ = done_tx.send(outcome);
    }));

    tokio::select! {
        handoff = done_rx => match handoff {
            Ok(outcome) => {
                let frame = outcome?;
                debug!(addr = %addr, bytes = frame.len(), "got response");
                Ok(frame)
            }
            // Reader dropped its sender without reporting: treat as a reset.
            Err(_) => Err(TransportError::UnexpectedEof),
        },
        _ = cancel.cancelled() => {
            drop(reader);
            debug!(addr = %addr, "call canceled before a response arrived");
            Err(TransportError::Canceled)
        }
    }
}
