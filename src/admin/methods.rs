//! The admin method table and the response-type registry.
//!
//! The registry is a fixed mapping from method to decoding strategy,
//! realized as an exhaustive match so adding a method forces a decision.
//! Methods the table does not know decode as [`ResponseKind::Generic`].

use crate::rpc::types::Request;

/// How a method's `result` payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Opaque payload; the caller picks raw text, string, or a typed decode.
    Generic,
    /// A number that may arrive as either a JSON decimal string or a bare
    /// JSON number, because upstream values can exceed 64-bit range.
    Numeric,
}

/// The admin ("status") API method set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetCurrentMiniEpoch,
    GetCurrentDSEpoch,
    GetNodeType,
    GetDSCommittee,
    GetNodeState,
    GetPrevDifficulty,
    GetPrevDSDifficulty,
    GetSendSCCallsToDS,
    IsTxnInMemPool,
    AddToBlacklistExclusion,
    RemoveFromBlacklistExclusion,
    ToggleSendSCCallsToDS,
    DisablePoW,
    ToggleDisableTxns,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::GetCurrentMiniEpoch => "GetCurrentMiniEpoch",
            Method::GetCurrentDSEpoch => "GetCurrentDSEpoch",
            Method::GetNodeType => "GetNodeType",
            Method::GetDSCommittee => "GetDSCommittee",
            Method::GetNodeState => "GetNodeState",
            Method::GetPrevDifficulty => "GetPrevDifficulty",
            Method::GetPrevDSDifficulty => "GetPrevDSDifficulty",
            Method::GetSendSCCallsToDS => "GetSendSCCallsToDS",
            Method::IsTxnInMemPool => "IsTxnInMemPool",
            Method::AddToBlacklistExclusion => "AddToBlacklistExclusion",
            Method::RemoveFromBlacklistExclusion => "RemoveFromBlacklistExclusion",
            Method::ToggleSendSCCallsToDS => "ToggleSendSCCallsToDS",
            Method::DisablePoW => "DisablePoW",
            Method::ToggleDisableTxns => "ToggleDisableTxns",
        }
    }

    pub fn from_name(name: &str) -> Option<Method> {
        Some(match name {
            "GetCurrentMiniEpoch" => Method::GetCurrentMiniEpoch,
            "GetCurrentDSEpoch" => Method::GetCurrentDSEpoch,
            "GetNodeType" => Method::GetNodeType,
            "GetDSCommittee" => Method::GetDSCommittee,
            "GetNodeState" => Method::GetNodeState,
            "GetPrevDifficulty" => Method::GetPrevDifficulty,
            "GetPrevDSDifficulty" => Method::GetPrevDSDifficulty,
            "GetSendSCCallsToDS" => Method::GetSendSCCallsToDS,
            "IsTxnInMemPool" => Method::IsTxnInMemPool,
            "AddToBlacklistExclusion" => Method::AddToBlacklistExclusion,
            "RemoveFromBlacklistExclusion" => Method::RemoveFromBlacklistExclusion,
            "ToggleSendSCCallsToDS" => Method::ToggleSendSCCallsToDS,
            "DisablePoW" => Method::DisablePoW,
            "ToggleDisableTxns" => Method::ToggleDisableTxns,
            _ => return None,
        })
    }

    /// The decoding strategy for this method's result.
    pub fn response_kind(self) -> ResponseKind {
        match self {
            Method::GetCurrentMiniEpoch
            | Method::GetCurrentDSEpoch
            | Method::GetPrevDifficulty
            | Method::GetPrevDSDifficulty => ResponseKind::Numeric,
            Method::GetNodeType
            | Method::GetDSCommittee
            | Method::GetNodeState
            | Method::GetSendSCCallsToDS
            | Method::IsTxnInMemPool
            | Method::AddToBlacklistExclusion
            | Method::RemoveFromBlacklistExclusion
            | Method::ToggleSendSCCallsToDS
            | Method::DisablePoW
            | Method::ToggleDisableTxns => ResponseKind::Generic,
        }
    }

    /// A parameterless request for this method.
    pub fn request(self) -> Request {
        Request::new(self.name(), None)
    }

    /// A request with positional string params, for the methods that take
    /// them (`IsTxnInMemPool`, the blacklist-exclusion pair).
    pub fn request_with(self, params: &[&str]) -> Request {
        Request::with_string_params(self.name(), params)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry lookup by wire name. Unregistered methods get the generic
/// passthrough decoder.
pub fn response_kind_of(method: &str) -> ResponseKind {
    match Method::from_name(method) {
        Some(method) => method.response_kind(),
        None => ResponseKind::Generic,
    }
}
