//! Routing graph input model.
//!
//! # Responsibilities
//! - Represent the compiled routing graph handed in by the upstream
//!   chain compiler: routers, splitters, resolvers, redirect edges
//! - Address nodes through an arena keyed by stable string ids, so
//!   shared sub-targets can be referenced without duplicate ownership
//!
//! # Design Decisions
//! - The graph is read-only input for one compilation pass; nothing in
//!   this crate mutates it
//! - Node references are ids, not pointers; a dangling id is reported
//!   as `MalformedChain` by the walker, never a panic

pub mod lb;
pub mod matcher;
pub mod target;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::graph::lb::LoadBalancerPolicy;
use crate::graph::matcher::MatchPredicate;
use crate::graph::target::Target;

/// Stable node identifier within one routing graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Application protocol of a compiled chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Grpc,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("http"),
            Protocol::Grpc => f.write_str("grpc"),
            Protocol::Tcp => f.write_str("tcp"),
        }
    }
}

/// A compiled routing graph for one logical service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingGraph {
    /// Chain name; doubles as the route-resource name for sidecars.
    pub chain_name: String,

    pub protocol: Protocol,

    /// Entry node.
    pub start: NodeId,

    /// Node arena. Multiple routers may reference the same resolver.
    pub nodes: BTreeMap<NodeId, Node>,
}

impl RoutingGraph {
    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }
}

/// A single node in the routing graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Ordered first-match-wins rule list plus a default destination.
    Router {
        rules: Vec<RouterRule>,
        default_next: NodeId,
    },

    /// Weighted traffic split across next nodes.
    Splitter { branches: Vec<SplitBranch> },

    /// Terminal node naming a concrete destination.
    Resolver {
        target: Target,

        /// Substitute this resolver for another before target naming.
        #[serde(default)]
        redirect: Option<NodeId>,

        /// Failover candidates, encoded for the data plane to try at
        /// runtime; never expanded at compile time.
        #[serde(default)]
        failover: Vec<Target>,

        #[serde(default)]
        load_balancer: Option<LoadBalancerPolicy>,
    },
}

/// One ordered (match predicate, destination) pair on a router node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterRule {
    /// Empty predicate matches every request.
    #[serde(default)]
    pub predicate: MatchPredicate,

    pub next: NodeId,

    /// Per-destination request timeout.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub retry: Option<RetryDirective>,

    /// Rewrite the matched path prefix before forwarding.
    #[serde(default)]
    pub prefix_rewrite: Option<String>,
}

impl RouterRule {
    /// Rule with a bare destination and no traffic shaping.
    pub fn to_node(next: impl Into<NodeId>) -> Self {
        Self {
            predicate: MatchPredicate::default(),
            next: next.into(),
            timeout: None,
            retry: None,
            prefix_rewrite: None,
        }
    }
}

/// One weighted branch on a splitter node. Weights are proportional
/// integers; a zero weight is legal and drops the branch from output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitBranch {
    pub weight: u32,
    pub next: NodeId,
}

/// Retry behavior attached to a router destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryDirective {
    pub num_retries: u32,
    pub retry_on_connect_failure: bool,
    pub retry_on_status_codes: Vec<u16>,
}

impl RetryDirective {
    /// True when the directive carries nothing to emit.
    pub fn is_empty(&self) -> bool {
        self.num_retries == 0
            && !self.retry_on_connect_failure
            && self.retry_on_status_codes.is_empty()
    }
}
