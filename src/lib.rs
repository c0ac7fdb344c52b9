//! ziladmin: a typed JSON-RPC client for a Zilliqa node's admin ("status") API.
//!
//! The node exposes a line-delimited JSON-RPC 2.0 endpoint on a local TCP
//! socket (optionally behind TLS). This crate provides the transport and
//! decoding layers on top of it:
//!
//! - [`rpc`] — the wire codec, the per-call connection driver, and the
//!   low-level [`rpc::TcpClient`] with single and batched calls.
//! - [`admin`] — the admin method table, the numeric result decoder, and the
//!   [`admin::AdminClient`] with typed getters and a default timeout.
//! - [`config`] — environment-derived client configuration.

pub mod admin;
pub mod config;
pub mod rpc;
