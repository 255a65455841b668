//! Route resource assembly.
//!
//! # Responsibilities
//! - Group route plan entries into route resources per topology:
//!   sidecar, ingress gateway, terminating gateway
//! - Emit only fields the connected proxy accepts (capability gating)
//! - Keep failures scoped: one bad chain never blocks the rest
//!
//! # Design Decisions
//! - Resource names are deterministic functions of the input (chain
//!   name, listener key, service name); repeated compilations of the
//!   same snapshot produce identical resources
//! - Omission is preferred over rejection wherever the degraded output
//!   is still semantically valid; hard failure otherwise

pub mod hash_policy;

use tracing::{debug, info, warn};

use crate::capabilities::ProxyCapabilities;
use crate::error::{CompileError, CompileResult};
use crate::graph::matcher::{HeaderMatchKind, MatchPredicate, PathMatch};
use crate::graph::target::Target;
use crate::graph::{Protocol, RetryDirective};
use crate::observability::metrics;
use crate::plan::{self, PlanAction, PlanTargets, RoutePlan};
use crate::snapshot::{ConfigSnapshot, IngressUpstream, ProxyKind, TerminatingService};
use crate::wire::{
    ClusterSpecifier, ClusterWeight, HeaderMatchSpecifier, HeaderMatcher, PathSpecifier,
    RegexMatcher, Route, RouteAction, RouteConfiguration, RouteMatch, VirtualHost,
    WeightedClusters,
};

/// Per-connection compilation context. The token is opaque here; the
/// transport layer uses it for authorization.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub token: String,
    pub capabilities: ProxyCapabilities,
}

/// Result of one compilation pass: the resources that compiled plus the
/// chains that did not. Nothing is silently dropped.
#[derive(Debug, Clone, Default)]
pub struct CompiledRoutes {
    /// Unordered; the envelope builder sorts by name before transmission.
    pub resources: Vec<RouteConfiguration>,
    pub failures: Vec<ChainFailure>,
}

/// One chain (or gateway service) that failed to compile.
#[derive(Debug, Clone)]
pub struct ChainFailure {
    pub chain: String,
    pub error: CompileError,
}

/// Compile every route resource for one proxy connection.
pub fn routes_from_snapshot(conn: &ConnectionInfo, snap: &ConfigSnapshot) -> CompiledRoutes {
    let caps = &conn.capabilities;

    let compiled = match snap.kind {
        ProxyKind::Sidecar => sidecar_routes(caps, snap),
        ProxyKind::IngressGateway => ingress_routes(caps, snap),
        ProxyKind::TerminatingGateway => terminating_routes(caps, snap),
    };

    for failure in &compiled.failures {
        warn!(
            proxy = %snap.proxy_id,
            chain = %failure.chain,
            error = %failure.error,
            "chain failed to compile; unrelated chains were kept"
        );
    }
    info!(
        proxy = %snap.proxy_id,
        kind = %snap.kind,
        resources = compiled.resources.len(),
        failed_chains = compiled.failures.len(),
        "compiled route resources"
    );
    metrics::record_compile_pass(
        &snap.kind.to_string(),
        compiled.resources.len(),
        compiled.failures.len(),
    );

    compiled
}

/// Plain sidecar: one route resource per discovery chain, named after
/// the chain, with a single wildcard virtual host.
fn sidecar_routes(caps: &ProxyCapabilities, snap: &ConfigSnapshot) -> CompiledRoutes {
    let mut out = CompiledRoutes::default();

    for (name, graph) in &snap.chains {
        match plan::walk(graph, caps)
            .and_then(|plan| virtual_host(&plan, caps, name, vec!["*".to_string()]))
        {
            Ok(vhost) => out.resources.push(RouteConfiguration {
                name: name.clone(),
                virtual_hosts: vec![vhost],
                validate_clusters: Some(true),
            }),
            Err(error) => out.failures.push(ChainFailure {
                chain: name.clone(),
                error,
            }),
        }
    }

    out
}

/// Ingress gateway: one route resource per listener, aggregating one
/// virtual host per upstream with its own domain set.
fn ingress_routes(caps: &ProxyCapabilities, snap: &ConfigSnapshot) -> CompiledRoutes {
    let mut out = CompiledRoutes::default();

    for (key, upstreams) in &snap.ingress.listeners {
        let mut vhosts = Vec::with_capacity(upstreams.len());

        for upstream in upstreams {
            match snap.chains.get(&upstream.service) {
                Some(graph) => {
                    let domains = ingress_domains(upstream);
                    match plan::walk(graph, caps)
                        .and_then(|plan| virtual_host(&plan, caps, &upstream.service, domains))
                    {
                        Ok(vhost) => vhosts.push(vhost),
                        Err(error) => out.failures.push(ChainFailure {
                            chain: upstream.service.clone(),
                            error,
                        }),
                    }
                }

                // No compiled chain for this upstream; it still gets a
                // minimal passthrough to its default target.
                None => {
                    debug!(service = %upstream.service, "no discovery chain, emitting passthrough");
                    vhosts.push(passthrough_virtual_host(upstream, &snap.datacenter));
                }
            }
        }

        out.resources.push(RouteConfiguration {
            name: key.route_name(),
            virtual_hosts: vhosts,
            validate_clusters: Some(true),
        });
    }

    out
}

fn ingress_domains(upstream: &IngressUpstream) -> Vec<String> {
    if upstream.hosts.is_empty() {
        vec![format!("{}.ingress.*", upstream.service)]
    } else {
        // Configured hostnames are copied verbatim, ports included.
        upstream.hosts.clone()
    }
}

fn passthrough_virtual_host(upstream: &IngressUpstream, datacenter: &str) -> VirtualHost {
    let cluster = Target::new(upstream.service.clone(), datacenter).cluster_name();
    VirtualHost {
        name: upstream.service.clone(),
        domains: ingress_domains(upstream),
        routes: vec![Route {
            route_match: RouteMatch {
                path: Some(PathSpecifier::Prefix("/".to_string())),
                headers: Vec::new(),
            },
            action: RouteAction {
                cluster: Some(ClusterSpecifier::Cluster(cluster)),
                ..RouteAction::default()
            },
        }],
    }
}

/// Terminating gateway: one route resource per HTTP-capable service,
/// shaped by its resolver/load-balancer override.
fn terminating_routes(caps: &ProxyCapabilities, snap: &ConfigSnapshot) -> CompiledRoutes {
    let mut out = CompiledRoutes::default();

    for (service, svc) in &snap.terminating.services {
        // TCP services are routed at the listener; no route resource.
        if svc.protocol == Protocol::Tcp {
            continue;
        }

        match terminating_route(service, svc, caps, &snap.datacenter) {
            Ok(resource) => out.resources.push(resource),
            Err(error) => out.failures.push(ChainFailure {
                chain: service.clone(),
                error,
            }),
        }
    }

    out
}

fn terminating_route(
    service: &str,
    svc: &TerminatingService,
    caps: &ProxyCapabilities,
    datacenter: &str,
) -> CompileResult<RouteConfiguration> {
    let mut target = Target::new(service, datacenter);
    if let Some(resolver) = &svc.resolver {
        if let Some(subset) = &resolver.default_subset {
            target = target.with_subset(subset.clone());
        }
    }

    let mut action = RouteAction {
        cluster: Some(ClusterSpecifier::Cluster(target.cluster_name())),
        ..RouteAction::default()
    };
    if let Some(lb) = svc.resolver.as_ref().and_then(|r| r.load_balancer.as_ref()) {
        hash_policy::apply_lb_policy(lb, caps, &mut action)?;
    }

    Ok(RouteConfiguration {
        name: service.to_string(),
        virtual_hosts: vec![VirtualHost {
            name: service.to_string(),
            domains: vec!["*".to_string()],
            routes: vec![Route {
                route_match: RouteMatch {
                    path: Some(PathSpecifier::Prefix("/".to_string())),
                    headers: Vec::new(),
                },
                action,
            }],
        }],
        validate_clusters: Some(true),
    })
}

/// Emit one virtual host from a route plan.
fn virtual_host(
    plan: &RoutePlan,
    caps: &ProxyCapabilities,
    name: &str,
    domains: Vec<String>,
) -> CompileResult<VirtualHost> {
    let mut routes = Vec::with_capacity(plan.entries.len());
    for entry in &plan.entries {
        routes.push(Route {
            route_match: route_match(&entry.predicate, caps)?,
            action: route_action(&entry.action, caps)?,
        });
    }

    Ok(VirtualHost {
        name: name.to_string(),
        domains,
        routes,
    })
}

/// Translate a match predicate into the wire form.
///
/// Every route needs a path specifier; the catch-all becomes the `/`
/// prefix, which matches all requests.
fn route_match(predicate: &MatchPredicate, caps: &ProxyCapabilities) -> CompileResult<RouteMatch> {
    let path = Some(match &predicate.path {
        None => PathSpecifier::Prefix("/".to_string()),
        Some(PathMatch::Exact(path)) => PathSpecifier::Exact(path.clone()),
        Some(PathMatch::Prefix(prefix)) => PathSpecifier::Prefix(prefix.clone()),
        Some(PathMatch::Regex(regex)) => {
            require_regex(caps)?;
            PathSpecifier::SafeRegex(RegexMatcher {
                regex: regex.clone(),
            })
        }
    });

    let mut headers = Vec::with_capacity(predicate.headers.len() + 1);
    for header in &predicate.headers {
        let specifier = match &header.kind {
            HeaderMatchKind::Exact(value) => HeaderMatchSpecifier::Exact(value.clone()),
            HeaderMatchKind::Present => HeaderMatchSpecifier::Present(true),
            HeaderMatchKind::Regex(regex) => {
                require_regex(caps)?;
                HeaderMatchSpecifier::SafeRegex(RegexMatcher {
                    regex: regex.clone(),
                })
            }
        };
        headers.push(HeaderMatcher {
            name: header.name.clone(),
            specifier,
        });
    }

    // Methods match on the :method pseudo-header. A list compiles to an
    // alternation, which needs the regex engine.
    match predicate.methods.as_slice() {
        [] => {}
        [method] => headers.push(HeaderMatcher {
            name: ":method".to_string(),
            specifier: HeaderMatchSpecifier::Exact(method.clone()),
        }),
        methods => {
            require_regex(caps)?;
            headers.push(HeaderMatcher {
                name: ":method".to_string(),
                specifier: HeaderMatchSpecifier::SafeRegex(RegexMatcher {
                    regex: methods.join("|"),
                }),
            });
        }
    }

    Ok(RouteMatch { path, headers })
}

fn require_regex(caps: &ProxyCapabilities) -> CompileResult<()> {
    if caps.safe_regex_match {
        Ok(())
    } else {
        // Dropping a match predicate would change routing, so there is
        // no valid degradation here.
        Err(CompileError::UnsupportedFeature {
            feature: "regex route match",
            version: caps.release_line.clone(),
        })
    }
}

/// Translate a plan action into the wire form, injecting hash policies
/// when the action carries a load-balancer policy.
fn route_action(action: &PlanAction, caps: &ProxyCapabilities) -> CompileResult<RouteAction> {
    let cluster = Some(match &action.targets {
        PlanTargets::Single { cluster } => ClusterSpecifier::Cluster(cluster.clone()),
        PlanTargets::Weighted { targets } => {
            let clusters: Vec<ClusterWeight> = targets
                .iter()
                .map(|t| ClusterWeight {
                    name: t.cluster.clone(),
                    weight: t.weight,
                })
                .collect();
            let total_weight = clusters.iter().map(|c| c.weight).sum();
            ClusterSpecifier::WeightedClusters(WeightedClusters {
                clusters,
                total_weight,
            })
        }
    });

    let mut out = RouteAction {
        cluster,
        timeout: action.timeout,
        retry_policy: action.retry.as_ref().map(retry_policy),
        prefix_rewrite: action.prefix_rewrite.clone(),
        failover_cluster_names: action.failover_targets.clone(),
        hash_policy: Vec::new(),
    };

    if let Some(lb) = &action.load_balancer {
        hash_policy::apply_lb_policy(lb, caps, &mut out)?;
    }

    Ok(out)
}

fn retry_policy(directive: &RetryDirective) -> crate::wire::RetryPolicy {
    let mut conditions = Vec::new();
    if directive.retry_on_connect_failure {
        conditions.push("connect-failure");
    }
    if !directive.retry_on_status_codes.is_empty() {
        conditions.push("retriable-status-codes");
    }

    crate::wire::RetryPolicy {
        retry_on: (!conditions.is_empty()).then(|| conditions.join(",")),
        num_retries: (directive.num_retries > 0).then_some(directive.num_retries),
        retriable_status_codes: directive.retry_on_status_codes.clone(),
    }
}
