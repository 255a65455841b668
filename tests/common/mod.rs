//! Shared fixtures for the compilation test suites.

#![allow(dead_code)]

use std::collections::BTreeMap;

use route_compiler::assemble::ConnectionInfo;
use route_compiler::capabilities;
use route_compiler::graph::lb::{HashPolicyRule, LbAlgorithm, LoadBalancerPolicy, RingHashConfig};
use route_compiler::graph::target::Target;
use route_compiler::graph::{Node, NodeId, Protocol, RoutingGraph, SplitBranch};
use route_compiler::snapshot::{
    ConfigSnapshot, IngressUpstream, ListenerKey, ProxyKind, ResolverOverride, TerminatingService,
};

pub const DATACENTER: &str = "dc1";

/// Connection context for a given proxy version.
pub fn connection(version: &str) -> ConnectionInfo {
    ConnectionInfo {
        token: "my-token".to_string(),
        capabilities: capabilities::resolve(version).unwrap(),
    }
}

pub fn resolver_id(service: &str) -> NodeId {
    NodeId::new(format!(
        "resolver:{}",
        Target::new(service, DATACENTER).cluster_name()
    ))
}

pub fn resolver_node(service: &str) -> (NodeId, Node) {
    (
        resolver_id(service),
        Node::Resolver {
            target: Target::new(service, DATACENTER),
            redirect: None,
            failover: Vec::new(),
            load_balancer: None,
        },
    )
}

/// Chain with a lone resolver: everything routes to one cluster.
pub fn simple_chain(service: &str) -> RoutingGraph {
    let (id, node) = resolver_node(service);
    RoutingGraph {
        chain_name: service.to_string(),
        protocol: Protocol::Http,
        start: id.clone(),
        nodes: BTreeMap::from([(id, node)]),
    }
}

/// Chain splitting `service` across `branches` of (weight, service).
pub fn splitter_chain(service: &str, branches: &[(u32, &str)]) -> RoutingGraph {
    let split_id = NodeId::new(format!("splitter:{}", service));
    let mut nodes = BTreeMap::new();

    let mut split_branches = Vec::with_capacity(branches.len());
    for (weight, branch_service) in branches {
        let (id, node) = resolver_node(branch_service);
        split_branches.push(SplitBranch {
            weight: *weight,
            next: id.clone(),
        });
        nodes.insert(id, node);
    }
    nodes.insert(
        split_id.clone(),
        Node::Splitter {
            branches: split_branches,
        },
    );

    RoutingGraph {
        chain_name: service.to_string(),
        protocol: Protocol::Http,
        start: split_id,
        nodes,
    }
}

/// Chain whose resolver carries a load-balancer policy.
pub fn lb_chain(service: &str, lb: LoadBalancerPolicy) -> RoutingGraph {
    let id = resolver_id(service);
    let node = Node::Resolver {
        target: Target::new(service, DATACENTER),
        redirect: None,
        failover: Vec::new(),
        load_balancer: Some(lb),
    };
    RoutingGraph {
        chain_name: service.to_string(),
        protocol: Protocol::Http,
        start: id.clone(),
        nodes: BTreeMap::from([(id, node)]),
    }
}

/// Chain whose entry references a node that does not exist.
pub fn dangling_chain(service: &str) -> RoutingGraph {
    RoutingGraph {
        chain_name: service.to_string(),
        protocol: Protocol::Http,
        start: NodeId::new("resolver:missing"),
        nodes: BTreeMap::new(),
    }
}

pub fn ring_hash_lb(rules: Vec<HashPolicyRule>) -> LoadBalancerPolicy {
    LoadBalancerPolicy {
        policy: LbAlgorithm::RingHash,
        ring_hash: Some(RingHashConfig {
            minimum_ring_size: 20,
            maximum_ring_size: 50,
        }),
        hash_policies: rules,
        ..LoadBalancerPolicy::default()
    }
}

pub fn sidecar_snapshot(chains: Vec<RoutingGraph>) -> ConfigSnapshot {
    let mut snap = ConfigSnapshot::new("web-sidecar", DATACENTER, ProxyKind::Sidecar);
    for chain in chains {
        snap = snap.with_chain(chain);
    }
    snap
}

pub fn ingress_snapshot(
    listeners: Vec<(ListenerKey, Vec<IngressUpstream>)>,
    chains: Vec<RoutingGraph>,
) -> ConfigSnapshot {
    let mut snap = ConfigSnapshot::new("ingress-gateway", DATACENTER, ProxyKind::IngressGateway);
    for chain in chains {
        snap = snap.with_chain(chain);
    }
    snap.ingress.listeners = listeners.into_iter().collect();
    snap
}

pub fn terminating_snapshot(
    services: Vec<(&str, Protocol, Option<ResolverOverride>)>,
) -> ConfigSnapshot {
    let mut snap = ConfigSnapshot::new(
        "terminating-gateway",
        DATACENTER,
        ProxyKind::TerminatingGateway,
    );
    for (service, protocol, resolver) in services {
        snap.terminating.services.insert(
            service.to_string(),
            TerminatingService { protocol, resolver },
        );
    }
    snap
}
