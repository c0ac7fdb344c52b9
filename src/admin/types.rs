//! Typed results for the node-introspection methods.
//!
//! The node reports its role and consensus state as display strings
//! (`"Shard Node of shard 3"`, `"POW_SUBMISSION"`); these parse into proper
//! types at the decode boundary so the rest of the program never string-matches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeInfoError {
    #[error("unknown node type {0:?}")]
    UnknownNodeType(String),

    /// A recognized prefix whose trailing number failed to parse.
    #[error("malformed numeric suffix in node type {0:?}")]
    BadSuffix(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTypeKind {
    NotInNetwork,
    Seed,
    Lookup,
    DsNode,
    ShardNode,
}

/// The node's role in the network, as reported by `GetNodeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct NodeType {
    pub kind: NodeTypeKind,
    /// Populated for shard nodes.
    pub shard_id: Option<u32>,
    /// Populated when the node is out of the network: the epoch it has
    /// synced to.
    pub till_epoch: Option<u64>,
}

impl NodeType {
    fn plain(kind: NodeTypeKind) -> Self {
        Self {
            kind,
            shard_id: None,
            till_epoch: None,
        }
    }
}

impl FromStr for NodeType {
    type Err = NodeInfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("Not in network") {
            let till_epoch = trailing_number(s)?;
            return Ok(Self {
                kind: NodeTypeKind::NotInNetwork,
                shard_id: None,
                till_epoch: Some(till_epoch),
            });
        }
        if s.starts_with("Shard Node of") {
            let shard_id = trailing_number(s)? as u32;
            return Ok(Self {
                kind: NodeTypeKind::ShardNode,
                shard_id: Some(shard_id),
                till_epoch: None,
            });
        }
        match s {
            "Seed" => Ok(Self::plain(NodeTypeKind::Seed)),
            "Lookup" => Ok(Self::plain(NodeTypeKind::Lookup)),
            "DS Node" => Ok(Self::plain(NodeTypeKind::DsNode)),
            other => Err(NodeInfoError::UnknownNodeType(other.to_string())),
        }
    }
}

impl TryFrom<String> for NodeType {
    type Error = NodeInfoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeTypeKind::NotInNetwork => write!(
                f,
                "Not in network, synced till epoch {}",
                self.till_epoch.unwrap_or(0)
            ),
            NodeTypeKind::Seed => f.write_str("Seed"),
            NodeTypeKind::Lookup => f.write_str("Lookup"),
            NodeTypeKind::DsNode => f.write_str("DS Node"),
            NodeTypeKind::ShardNode => {
                write!(f, "Shard Node of shard {}", self.shard_id.unwrap_or(0))
            }
        }
    }
}

fn trailing_number(s: &str) -> Result<u64, NodeInfoError> {
    s.rsplit(' ')
        .next()
        .and_then(|word| word.parse().ok())
        .ok_or_else(|| NodeInfoError::BadSuffix(s.to_string()))
}

/// The node's consensus state, as reported by `GetNodeState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeState {
    PowSubmission,
    DsblockConsensusPrep,
    DsblockConsensus,
    MicroblockSubmission,
    FinalblockConsensusPrep,
    FinalblockConsensus,
    ViewchangeConsensusPrep,
    ViewchangeConsensus,
    Error,
    Sync,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::PowSubmission => "POW_SUBMISSION",
            NodeState::DsblockConsensusPrep => "DSBLOCK_CONSENSUS_PREP",
            NodeState::DsblockConsensus => "DSBLOCK_CONSENSUS",
            NodeState::MicroblockSubmission => "MICROBLOCK_SUBMISSION",
            NodeState::FinalblockConsensusPrep => "FINALBLOCK_CONSENSUS_PREP",
            NodeState::FinalblockConsensus => "FINALBLOCK_CONSENSUS",
            NodeState::ViewchangeConsensusPrep => "VIEWCHANGE_CONSENSUS_PREP",
            NodeState::ViewchangeConsensus => "VIEWCHANGE_CONSENSUS",
            NodeState::Error => "ERROR",
            NodeState::Sync => "SYNC",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
