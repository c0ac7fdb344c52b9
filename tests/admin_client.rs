//! End-to-end tests against a stub admin socket.
//!
//! Each stub accepts connections on an ephemeral port, reads one
//! newline-terminated frame, and answers with whatever the scenario closure
//! produces. The client opens a fresh connection per call, so the stubs loop
//! over accepts.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use ziladmin::admin::{AdminClient, AdminError, Method, NodeState, NodeTypeKind};
use ziladmin::rpc::{ClientError, Request, TcpClient, TransportError};

/// Stub server: for every connection, read one request line and reply with
/// `reply(line)`. `None` means "go silent" (keep the connection open).
async fn spawn_stub<F>(reply: F) -> SocketAddr
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reply = Arc::new(reply);
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let reply = reply.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                let mut line = String::new();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    return;
                }
                match reply(line.trim_end()) {
                    Some(response) => {
                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.write_all(b"\n").await;
                    }
                    None => {
                        // Hold the connection open without answering until
                        // the client gives up.
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            });
        }
    });
    addr
}

fn echo_id(request_line: &str) -> i64 {
    let value: Value = serde_json::from_str(request_line).expect("stub got malformed request");
    value["id"].as_i64().expect("request without id")
}

#[tokio::test]
async fn test_numeric_result_as_string() {
    let addr = spawn_stub(|line| {
        Some(format!(
            r#"{{"id":{},"jsonrpc":"2.0","result":"1934"}}"#,
            echo_id(line)
        ))
    })
    .await;

    let client = AdminClient::new(addr.to_string(), Duration::from_secs(5));
    assert_eq!(client.current_mini_epoch().await.unwrap(), 1934);
}

#[tokio::test]
async fn test_numeric_result_as_bare_number() {
    let addr = spawn_stub(|line| {
        Some(format!(
            r#"{{"id":{},"jsonrpc":"2.0","result":1934}}"#,
            echo_id(line)
        ))
    })
    .await;

    let client = AdminClient::new(addr.to_string(), Duration::from_secs(5));
    assert_eq!(client.current_ds_epoch().await.unwrap(), 1934);
}

#[tokio::test]
async fn test_batch_epochs_in_request_order() {
    // Reply entries reversed relative to the request array; the client must
    // still hand results back in request order by matching ids.
    let addr = spawn_stub(|line| {
        let requests: Vec<Value> = serde_json::from_str(line).unwrap();
        assert_eq!(requests.len(), 2);
        let first = requests[0]["id"].as_i64().unwrap();
        let second = requests[1]["id"].as_i64().unwrap();
        Some(format!(
            r#"[{{"id":{second},"jsonrpc":"2.0","result":"1935"}},{{"id":{first},"jsonrpc":"2.0","result":"1934"}}]"#
        ))
    })
    .await;

    let client = AdminClient::new(addr.to_string(), Duration::from_secs(5));
    let (mini, ds) = client.epochs().await.unwrap();
    assert_eq!((mini, ds), (1934, 1935));
}

#[tokio::test]
async fn test_batch_returns_one_response_per_request() {
    let addr = spawn_stub(|line| {
        let requests: Vec<Value> = serde_json::from_str(line).unwrap();
        let entries: Vec<String> = requests
            .iter()
            .map(|req| {
                format!(
                    r#"{{"id":{},"jsonrpc":"2.0","result":"7"}}"#,
                    req["id"].as_i64().unwrap()
                )
            })
            .collect();
        Some(format!("[{}]", entries.join(",")))
    })
    .await;

    let client = AdminClient::new(addr.to_string(), Duration::from_secs(5));
    let values = client
        .numeric_batch(&[
            Method::GetCurrentMiniEpoch,
            Method::GetCurrentDSEpoch,
            Method::GetPrevDifficulty,
        ])
        .await
        .unwrap();
    assert_eq!(values, vec![7, 7, 7]);
}

#[tokio::test]
async fn test_batch_partial_failure_keeps_successes() {
    let addr = spawn_stub(|line| {
        let requests: Vec<Value> = serde_json::from_str(line).unwrap();
        let first = requests[0]["id"].as_i64().unwrap();
        let second = requests[1]["id"].as_i64().unwrap();
        Some(format!(
            r#"[{{"id":{first},"jsonrpc":"2.0","result":"1934"}},{{"id":{second},"jsonrpc":"2.0","error":{{"code":-32601,"message":"unknown method"}}}}]"#
        ))
    })
    .await;

    let client = TcpClient::new(addr.to_string());
    let batch = client
        .call_batch(vec![
            Method::GetCurrentMiniEpoch.request(),
            Method::GetCurrentDSEpoch.request(),
        ])
        .await
        .unwrap();

    assert_eq!(batch.responses.len(), 2);
    assert!(!batch.is_clean());
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].error.code, -32601);
    // The successful sibling is still there and decodable.
    assert_eq!(batch.responses[0].raw_result(), Some(r#""1934""#));
    assert!(batch.responses[1].err().is_some());
}

#[tokio::test]
async fn test_rpc_error_surfaces_with_code() {
    let addr = spawn_stub(|line| {
        Some(format!(
            r#"{{"id":{},"jsonrpc":"2.0","error":{{"code":-32601,"message":"METHOD_NOT_FOUND"}}}}"#,
            echo_id(line)
        ))
    })
    .await;

    let client = AdminClient::new(addr.to_string(), Duration::from_secs(5));
    match client.current_mini_epoch().await {
        Err(AdminError::Rpc(err)) => assert_eq!(err.code, -32601),
        other => panic!("expected rpc error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_malformed_frame_is_codec_error() {
    let addr = spawn_stub(|_| Some(r#"{"jsonrpc":"2.0","id":1,"result""#.to_string())).await;

    let client = TcpClient::new(addr.to_string());
    match client.call(Method::GetNodeState.request()).await {
        Err(ClientError::Codec(_)) => {}
        other => panic!("expected codec error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_timeout_carries_configured_duration() {
    let addr = spawn_stub(|_| None).await; // accepts, never replies

    let timeout = Duration::from_millis(200);
    let client = AdminClient::new(addr.to_string(), timeout);
    let started = Instant::now();
    match client.current_mini_epoch().await {
        Err(AdminError::Client(ClientError::DeadlineExceeded { timeout: reported })) => {
            assert_eq!(reported, timeout);
        }
        other => panic!("expected deadline error, got {:?}", other.err()),
    }
    // Bounded margin: well before the stub's 30s silence window.
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_cancel_mid_read_closes_connection() {
    // The stub reports EOF on its side of the socket, proving the client
    // dropped the connection after cancellation.
    let (eof_tx, mut eof_rx) = mpsc::unbounded_channel();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        // Never reply; wait for the client to hang up.
        let mut rest = String::new();
        let n = reader.read_line(&mut rest).await.unwrap_or(0);
        let _ = eof_tx.send(n == 0);
    });

    let client = TcpClient::new(addr.to_string());
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    match client
        .call_with_cancel(Method::GetNodeState.request(), &cancel)
        .await
    {
        Err(ClientError::Transport(TransportError::Canceled)) => {}
        other => panic!("expected cancellation, got {:?}", other.err()),
    }
    assert!(started.elapsed() < Duration::from_secs(2));

    let saw_eof = tokio::time::timeout(Duration::from_secs(5), eof_rx.recv())
        .await
        .expect("stub never observed the connection closing")
        .unwrap();
    assert!(saw_eof, "stub read data instead of EOF after cancel");
}

#[tokio::test]
async fn test_timeout_closes_connection() {
    // Same shape as the cancellation test, but driven by the default
    // timeout: the stub must observe EOF after the deadline fires, or the
    // socket is leaking.
    let (eof_tx, mut eof_rx) = mpsc::unbounded_channel();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        // Never reply; wait for the client to hang up.
        let mut rest = String::new();
        let n = reader.read_line(&mut rest).await.unwrap_or(0);
        let _ = eof_tx.send(n == 0);
    });

    let client = AdminClient::new(addr.to_string(), Duration::from_millis(100));
    match client.current_mini_epoch().await {
        Err(AdminError::Client(ClientError::DeadlineExceeded { .. })) => {}
        other => panic!("expected deadline error, got {:?}", other.err()),
    }

    let saw_eof = tokio::time::timeout(Duration::from_secs(5), eof_rx.recv())
        .await
        .expect("stub never observed the connection closing")
        .unwrap();
    assert!(saw_eof, "socket still open after the timeout returned");
}

#[tokio::test]
async fn test_dial_failure_is_transport_error() {
    // Bind a port, then drop the listener so the address refuses connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TcpClient::new(addr.to_string());
    match client.call(Method::GetNodeState.request()).await {
        Err(ClientError::Transport(TransportError::Dial { .. })) => {}
        other => panic!("expected dial error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_eof_before_frame_boundary() {
    // Reply without the newline terminator, then close.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let mut socket = reader.into_inner();
        socket
            .write_all(br#"{"jsonrpc":"2.0","id":1,"resu"#)
            .await
            .unwrap();
        // socket drops here: EOF mid-frame
    });

    let client = TcpClient::new(addr.to_string());
    match client.call(Method::GetNodeState.request()).await {
        Err(ClientError::Transport(TransportError::UnexpectedEof)) => {}
        other => panic!("expected eof error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_correlation_ids_increase_across_calls() {
    let (id_tx, mut id_rx) = mpsc::unbounded_channel();
    let addr = spawn_stub(move |line| {
        let id = echo_id(line);
        let _ = id_tx.send(id);
        Some(format!(r#"{{"id":{},"jsonrpc":"2.0","result":"1"}}"#, id))
    })
    .await;

    let client = TcpClient::new(addr.to_string());
    for _ in 0..3 {
        client.call(Method::GetCurrentMiniEpoch.request()).await.unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(id_rx.recv().await.unwrap());
    }
    assert_eq!(seen, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_typed_node_introspection() {
    let addr = spawn_stub(|line| {
        let value: Value = serde_json::from_str(line).unwrap();
        let id = value["id"].as_i64().unwrap();
        let result = match value["method"].as_str().unwrap() {
            "GetNodeType" => r#""Shard Node of shard 2""#,
            "GetNodeState" => r#""POW_SUBMISSION""#,
            other => panic!("unexpected method {}", other),
        };
        Some(format!(
            r#"{{"id":{},"jsonrpc":"2.0","result":{}}}"#,
            id, result
        ))
    })
    .await;

    let client = AdminClient::new(addr.to_string(), Duration::from_secs(5));
    let node_type = client.node_type().await.unwrap();
    assert_eq!(node_type.kind, NodeTypeKind::ShardNode);
    assert_eq!(node_type.shard_id, Some(2));
    assert_eq!(client.node_state().await.unwrap(), NodeState::PowSubmission);
}

#[tokio::test]
async fn test_zero_timeout_waits_for_slow_reply() {
    // The delay has to live in the async path so it yields instead of
    // blocking the test runtime.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let id = echo_id(line.trim_end());
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut socket = reader.into_inner();
        let reply = format!("{{\"id\":{},\"jsonrpc\":\"2.0\",\"result\":\"9\"}}\n", id);
        socket.write_all(reply.as_bytes()).await.unwrap();
    });

    // Zero timeout: wait as long as it takes.
    let client = AdminClient::new(addr.to_string(), Duration::ZERO);
    assert_eq!(client.current_mini_epoch().await.unwrap(), 9);
}
