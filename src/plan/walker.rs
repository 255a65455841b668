//! Chain traversal.
//!
//! # Responsibilities
//! - Walk a routing graph from its entry node
//! - Flatten splits into proportional weighted targets
//! - Apply redirect substitution before target naming
//! - Collect failover candidates and load-balancer policy per action
//!
//! # Design Decisions
//! - First-match-wins order is preserved; the router default becomes
//!   the final catch-all entry
//! - Zero-weight branches are dropped, never emitted
//! - Dangling references and impossible edges surface as
//!   `MalformedChain` with the offending node id

use tracing::debug;

use crate::capabilities::ProxyCapabilities;
use crate::error::{CompileError, CompileResult};
use crate::graph::lb::LoadBalancerPolicy;
use crate::graph::matcher::MatchPredicate;
use crate::graph::target::Target;
use crate::graph::{Node, NodeId, RoutingGraph, SplitBranch};
use crate::plan::{PlanAction, PlanEntry, PlanTargets, RoutePlan, WeightedTarget};

/// Walk `graph` and produce its normalized route plan.
pub fn walk(graph: &RoutingGraph, caps: &ProxyCapabilities) -> CompileResult<RoutePlan> {
    let mut entries = Vec::new();

    match node(graph, &graph.start)? {
        Node::Router {
            rules,
            default_next,
        } => {
            for rule in rules {
                if rule.predicate.requires_regex() && !caps.safe_regex_match {
                    return Err(CompileError::UnsupportedFeature {
                        feature: "regex route match",
                        version: caps.release_line.clone(),
                    });
                }

                let mut action = action_for(graph, &rule.next)?;
                action.timeout = rule.timeout;
                action.retry = rule.retry.clone().filter(|r| !r.is_empty());
                action.prefix_rewrite = rule.prefix_rewrite.clone();
                entries.push(PlanEntry {
                    predicate: rule.predicate.clone(),
                    action,
                });
            }

            // The default destination is the final catch-all.
            entries.push(PlanEntry {
                predicate: MatchPredicate::default(),
                action: action_for(graph, default_next)?,
            });
        }

        // Chains without a router route everything to one action.
        Node::Splitter { .. } | Node::Resolver { .. } => {
            entries.push(PlanEntry {
                predicate: MatchPredicate::default(),
                action: action_for(graph, &graph.start)?,
            });
        }
    }

    debug!(
        chain = %graph.chain_name,
        entries = entries.len(),
        "walked routing graph"
    );

    Ok(RoutePlan {
        chain: graph.chain_name.clone(),
        protocol: graph.protocol,
        entries,
    })
}

fn node<'a>(graph: &'a RoutingGraph, id: &NodeId) -> CompileResult<&'a Node> {
    graph.node(id).ok_or_else(|| CompileError::MalformedChain {
        chain: graph.chain_name.clone(),
        node: id.to_string(),
        detail: "node does not exist",
    })
}

/// Resolve a destination node to a plan action.
fn action_for(graph: &RoutingGraph, id: &NodeId) -> CompileResult<PlanAction> {
    match node(graph, id)? {
        Node::Resolver { .. } => {
            let resolved = resolve_resolver(graph, id)?;
            Ok(PlanAction {
                targets: PlanTargets::Single {
                    cluster: resolved.cluster,
                },
                failover_targets: resolved.failover,
                timeout: None,
                retry: None,
                prefix_rewrite: None,
                load_balancer: resolved.lb,
            })
        }

        Node::Splitter { branches } => {
            let split = resolve_split(graph, branches, 0)?;
            if split.targets.is_empty() {
                return Err(CompileError::EmptyRouteSet {
                    chain: graph.chain_name.clone(),
                });
            }
            Ok(PlanAction {
                targets: PlanTargets::Weighted {
                    targets: split.targets,
                },
                failover_targets: split.failover,
                timeout: None,
                retry: None,
                prefix_rewrite: None,
                load_balancer: split.lb,
            })
        }

        Node::Router { .. } => Err(CompileError::MalformedChain {
            chain: graph.chain_name.clone(),
            node: id.to_string(),
            detail: "a router cannot be a destination node",
        }),
    }
}

struct ResolvedResolver {
    cluster: String,
    failover: Vec<String>,
    lb: Option<LoadBalancerPolicy>,
}

/// Follow redirect edges to the effective resolver, then name its
/// target. Failover stays a candidate list; it is not expanded here.
fn resolve_resolver(graph: &RoutingGraph, id: &NodeId) -> CompileResult<ResolvedResolver> {
    let mut current = id.clone();
    let mut hops = 0usize;

    loop {
        match node(graph, &current)? {
            Node::Resolver {
                target,
                redirect: Some(next),
                ..
            } => {
                hops += 1;
                if hops > graph.nodes.len() {
                    return Err(CompileError::MalformedChain {
                        chain: graph.chain_name.clone(),
                        node: target.cluster_name(),
                        detail: "redirect chain does not terminate",
                    });
                }
                current = next.clone();
            }

            Node::Resolver {
                target,
                redirect: None,
                failover,
                load_balancer,
            } => {
                return Ok(ResolvedResolver {
                    cluster: target.cluster_name(),
                    failover: failover.iter().map(Target::cluster_name).collect(),
                    lb: load_balancer.clone(),
                });
            }

            _ => {
                return Err(CompileError::MalformedChain {
                    chain: graph.chain_name.clone(),
                    node: current.to_string(),
                    detail: "redirect does not name a resolver",
                });
            }
        }
    }
}

#[derive(Default)]
struct SplitOutcome {
    targets: Vec<WeightedTarget>,
    failover: Vec<String>,
    lb: Option<LoadBalancerPolicy>,
}

/// Flatten a splitter into weighted targets. Nested splits multiply
/// weights so proportions survive; only proportionality matters, not
/// any particular total.
fn resolve_split(
    graph: &RoutingGraph,
    branches: &[SplitBranch],
    depth: usize,
) -> CompileResult<SplitOutcome> {
    if depth > graph.nodes.len() {
        return Err(CompileError::MalformedChain {
            chain: graph.chain_name.clone(),
            node: graph.start.to_string(),
            detail: "split nesting does not terminate",
        });
    }

    let mut out = SplitOutcome::default();

    for branch in branches {
        if branch.weight == 0 {
            continue;
        }

        match node(graph, &branch.next)? {
            Node::Resolver { .. } => {
                let resolved = resolve_resolver(graph, &branch.next)?;
                out.targets.push(WeightedTarget {
                    cluster: resolved.cluster,
                    weight: branch.weight,
                });
                merge_failover(&mut out.failover, resolved.failover);
                if out.lb.is_none() {
                    out.lb = resolved.lb;
                }
            }

            Node::Splitter { branches: nested } => {
                let inner = resolve_split(graph, nested, depth + 1)?;
                for target in inner.targets {
                    out.targets.push(WeightedTarget {
                        cluster: target.cluster,
                        weight: branch.weight * target.weight,
                    });
                }
                merge_failover(&mut out.failover, inner.failover);
                if out.lb.is_none() {
                    out.lb = inner.lb;
                }
            }

            Node::Router { .. } => {
                return Err(CompileError::MalformedChain {
                    chain: graph.chain_name.clone(),
                    node: branch.next.to_string(),
                    detail: "a router cannot be a split destination",
                });
            }
        }
    }

    Ok(out)
}

fn merge_failover(into: &mut Vec<String>, from: Vec<String>) {
    for cluster in from {
        if !into.contains(&cluster) {
            into.push(cluster);
        }
    }
}
