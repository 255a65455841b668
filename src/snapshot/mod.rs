//! Immutable per-proxy configuration snapshots.
//!
//! A snapshot is assembled by an external collaborator and handed to
//! the compiler read-only. Every compilation pass takes one snapshot
//! plus one capability set and produces a fresh, independently owned
//! result; nothing here outlives the pass or is shared across proxies.

use std::collections::BTreeMap;
use std::fmt;

use crate::graph::lb::LoadBalancerPolicy;
use crate::graph::{Protocol, RoutingGraph};

/// Everything the compiler needs to know about one proxy.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Proxy service instance the snapshot was assembled for. Used for
    /// log context only.
    pub proxy_id: String,

    /// Local datacenter; qualifies targets that carry no explicit one.
    pub datacenter: String,

    pub kind: ProxyKind,

    /// Compiled routing graphs keyed by chain name.
    pub chains: BTreeMap<String, RoutingGraph>,

    pub ingress: IngressState,
    pub terminating: TerminatingState,
}

impl ConfigSnapshot {
    pub fn new(proxy_id: impl Into<String>, datacenter: impl Into<String>, kind: ProxyKind) -> Self {
        Self {
            proxy_id: proxy_id.into(),
            datacenter: datacenter.into(),
            kind,
            chains: BTreeMap::new(),
            terminating: TerminatingState::default(),
            ingress: IngressState::default(),
        }
    }

    pub fn with_chain(mut self, graph: RoutingGraph) -> Self {
        self.chains.insert(graph.chain_name.clone(), graph);
        self
    }
}

/// Topology the proxy participates in; decides how route plan entries
/// group into resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    Sidecar,
    IngressGateway,
    TerminatingGateway,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Sidecar => f.write_str("sidecar"),
            ProxyKind::IngressGateway => f.write_str("ingress-gateway"),
            ProxyKind::TerminatingGateway => f.write_str("terminating-gateway"),
        }
    }
}

/// Ingress-gateway listener map.
#[derive(Debug, Clone, Default)]
pub struct IngressState {
    pub listeners: BTreeMap<ListenerKey, Vec<IngressUpstream>>,
}

/// Protocol+port pair identifying one ingress listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerKey {
    pub protocol: Protocol,
    pub port: u16,
}

impl ListenerKey {
    pub fn new(protocol: Protocol, port: u16) -> Self {
        Self { protocol, port }
    }

    /// Stable route-resource name for this listener.
    pub fn route_name(&self) -> String {
        format!("{}:{}", self.protocol, self.port)
    }
}

/// One upstream service exposed through an ingress listener.
#[derive(Debug, Clone)]
pub struct IngressUpstream {
    pub service: String,

    /// Configured hostnames, copied verbatim into the virtual-host
    /// domain set. Empty means a service-derived wildcard domain.
    pub hosts: Vec<String>,
}

impl IngressUpstream {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            hosts: Vec::new(),
        }
    }

    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }
}

/// Terminating-gateway service map.
#[derive(Debug, Clone, Default)]
pub struct TerminatingState {
    pub services: BTreeMap<String, TerminatingService>,
}

/// Per-service settings behind a terminating gateway.
#[derive(Debug, Clone)]
pub struct TerminatingService {
    pub protocol: Protocol,
    pub resolver: Option<ResolverOverride>,
}

/// Resolver/load-balancer override looked up by service name.
#[derive(Debug, Clone, Default)]
pub struct ResolverOverride {
    pub default_subset: Option<String>,
    pub load_balancer: Option<LoadBalancerPolicy>,
}
