//! End-to-end compilation tests: snapshot in, route resources out.

mod common;

use std::collections::BTreeMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use route_compiler::assemble::routes_from_snapshot;
use route_compiler::error::CompileError;
use route_compiler::graph::lb::{CookieConfig, HashPolicyRule};
use route_compiler::graph::matcher::{MatchPredicate, PathMatch};
use route_compiler::graph::target::Target;
use route_compiler::graph::{Node, NodeId, Protocol, RetryDirective, RouterRule, RoutingGraph};
use route_compiler::snapshot::{IngressUpstream, ListenerKey, ResolverOverride};
use route_compiler::wire::envelope::{create_response, ROUTE_TYPE_URL};

use common::*;

/// Router chain: /admin is shaped and rewritten, everything else falls
/// through to the chain's own service.
fn router_chain(service: &str) -> RoutingGraph {
    let (web_id, web) = resolver_node(service);
    let (admin_id, admin) = resolver_node("admin");
    let router_id = NodeId::new(format!("router:{}", service));

    let rules = vec![RouterRule {
        predicate: MatchPredicate {
            path: Some(PathMatch::Prefix("/admin".into())),
            ..MatchPredicate::default()
        },
        timeout: Some(Duration::from_secs(22)),
        retry: Some(RetryDirective {
            num_retries: 3,
            retry_on_connect_failure: true,
            ..RetryDirective::default()
        }),
        prefix_rewrite: Some("/".into()),
        ..RouterRule::to_node(admin_id.clone())
    }];

    RoutingGraph {
        chain_name: service.to_string(),
        protocol: Protocol::Http,
        start: router_id.clone(),
        nodes: BTreeMap::from([
            (
                router_id,
                Node::Router {
                    rules,
                    default_next: web_id.clone(),
                },
            ),
            (web_id, web),
            (admin_id, admin),
        ]),
    }
}

#[test]
fn test_sidecar_emits_one_resource_per_chain() {
    let snap = sidecar_snapshot(vec![simple_chain("web"), simple_chain("api")]);
    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);

    assert!(compiled.failures.is_empty());
    assert_eq!(compiled.resources.len(), 2);

    let names: Vec<&str> = compiled
        .resources
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["api", "web"]);
}

#[test]
fn test_sidecar_chain_wire_shape() {
    let snap = sidecar_snapshot(vec![router_chain("web")]);
    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);
    assert!(compiled.failures.is_empty());

    assert_eq!(
        serde_json::to_value(&compiled.resources[0]).unwrap(),
        json!({
            "name": "web",
            "virtual_hosts": [{
                "name": "web",
                "domains": ["*"],
                "routes": [
                    {
                        "match": { "prefix": "/admin" },
                        "route": {
                            "cluster": "admin.default.default.dc1",
                            "timeout": "22s",
                            "retry_policy": {
                                "retry_on": "connect-failure",
                                "num_retries": 3
                            },
                            "prefix_rewrite": "/"
                        }
                    },
                    {
                        "match": { "prefix": "/" },
                        "route": { "cluster": "web.default.default.dc1" }
                    }
                ]
            }],
            "validate_clusters": true
        })
    );
}

#[test]
fn test_splitter_drops_zero_weights_and_keeps_proportions() {
    let snap = sidecar_snapshot(vec![splitter_chain(
        "web",
        &[(0, "canary"), (10, "beta"), (90, "stable")],
    )]);
    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);
    assert!(compiled.failures.is_empty());

    let action = serde_json::to_value(&compiled.resources[0]).unwrap()["virtual_hosts"][0]
        ["routes"][0]["route"]
        .clone();
    assert_eq!(
        action,
        json!({
            "weighted_clusters": {
                "clusters": [
                    { "name": "beta.default.default.dc1", "weight": 10 },
                    { "name": "stable.default.default.dc1", "weight": 90 }
                ],
                "total_weight": 100
            }
        })
    );
}

#[test]
fn test_redirect_and_failover_encoding() {
    let real_id = resolver_id("web-east");
    let (_, real) = resolver_node("web-east");
    let alias_id = resolver_id("web");
    let alias = Node::Resolver {
        target: Target::new("web", DATACENTER),
        redirect: Some(real_id.clone()),
        failover: Vec::new(),
        load_balancer: None,
    };
    let redirect_chain = RoutingGraph {
        chain_name: "web".into(),
        protocol: Protocol::Http,
        start: alias_id.clone(),
        nodes: BTreeMap::from([(alias_id, alias), (real_id, real)]),
    };

    let failover_id = resolver_id("payments");
    let failover_node = Node::Resolver {
        target: Target::new("payments", DATACENTER),
        redirect: None,
        failover: vec![
            Target::new("payments", "dc2"),
            Target::new("payments", "dc3"),
        ],
        load_balancer: None,
    };
    let failover_chain = RoutingGraph {
        chain_name: "payments".into(),
        protocol: Protocol::Http,
        start: failover_id.clone(),
        nodes: BTreeMap::from([(failover_id, failover_node)]),
    };

    let snap = sidecar_snapshot(vec![redirect_chain, failover_chain]);
    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);
    assert!(compiled.failures.is_empty());

    let payments = serde_json::to_value(&compiled.resources[0]).unwrap();
    assert_eq!(
        payments["virtual_hosts"][0]["routes"][0]["route"],
        json!({
            "cluster": "payments.default.default.dc1",
            "failover_cluster_names": [
                "payments.default.default.dc2",
                "payments.default.default.dc3"
            ]
        })
    );

    let web = serde_json::to_value(&compiled.resources[1]).unwrap();
    assert_eq!(
        web["virtual_hosts"][0]["routes"][0]["route"]["cluster"],
        json!("web-east.default.default.dc1")
    );
}

#[test]
fn test_malformed_chain_does_not_block_others() {
    let snap = sidecar_snapshot(vec![simple_chain("web"), dangling_chain("broken")]);
    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);

    assert_eq!(compiled.resources.len(), 1);
    assert_eq!(compiled.resources[0].name, "web");

    assert_eq!(compiled.failures.len(), 1);
    assert_eq!(compiled.failures[0].chain, "broken");
    assert!(matches!(
        compiled.failures[0].error,
        CompileError::MalformedChain { ref node, .. } if node == "resolver:missing"
    ));
}

#[test]
fn test_all_zero_splitter_reports_empty_route_set() {
    let snap = sidecar_snapshot(vec![splitter_chain("web", &[(0, "canary"), (0, "stable")])]);
    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);

    assert!(compiled.resources.is_empty());
    assert_eq!(
        compiled.failures[0].error,
        CompileError::EmptyRouteSet {
            chain: "web".into()
        }
    );
}

#[test]
fn test_ingress_groups_virtual_hosts_per_listener() {
    let snap = ingress_snapshot(
        vec![
            (
                ListenerKey::new(Protocol::Http, 8080),
                vec![
                    IngressUpstream::new("foo").with_hosts([
                        "test1.example.com",
                        "test2.example.com",
                        "test2.example.com:8080",
                    ]),
                    IngressUpstream::new("bar"),
                ],
            ),
            (
                ListenerKey::new(Protocol::Http, 443),
                vec![IngressUpstream::new("baz"), IngressUpstream::new("qux")],
            ),
        ],
        // baz and qux have no compiled chain on purpose: they take the
        // minimal passthrough path.
        vec![simple_chain("foo"), simple_chain("bar")],
    );

    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);
    assert!(compiled.failures.is_empty());

    let names: Vec<&str> = compiled
        .resources
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["http:443", "http:8080"]);

    let https = &compiled.resources[0];
    assert_eq!(https.virtual_hosts.len(), 2);
    assert_eq!(https.virtual_hosts[0].name, "baz");
    assert_eq!(https.virtual_hosts[0].domains, vec!["baz.ingress.*"]);
    assert_eq!(
        serde_json::to_value(&https.virtual_hosts[0].routes[0]).unwrap(),
        json!({
            "match": { "prefix": "/" },
            "route": { "cluster": "baz.default.default.dc1" }
        })
    );

    let http = &compiled.resources[1];
    assert_eq!(http.virtual_hosts.len(), 2);
    assert_eq!(
        http.virtual_hosts[0].domains,
        vec![
            "test1.example.com",
            "test2.example.com",
            "test2.example.com:8080"
        ]
    );
    assert_eq!(http.virtual_hosts[1].domains, vec!["bar.ingress.*"]);
}

#[test]
fn test_terminating_gateway_injects_lb_overrides() {
    let snap = terminating_snapshot(vec![
        (
            "web",
            Protocol::Http,
            Some(ResolverOverride {
                default_subset: Some("v2".into()),
                load_balancer: Some(ring_hash_lb(vec![
                    HashPolicyRule::cookie("chocolate-chip", None).terminal(),
                    HashPolicyRule::header("x-user-id"),
                    HashPolicyRule::source_ip().terminal(),
                ])),
            }),
        ),
        // TCP services are routed at the listener and emit no resource.
        ("cache", Protocol::Tcp, None),
    ]);

    let compiled = routes_from_snapshot(&connection("1.25.0"), &snap);
    assert!(compiled.failures.is_empty());
    assert_eq!(compiled.resources.len(), 1);

    assert_eq!(
        serde_json::to_value(&compiled.resources[0]).unwrap(),
        json!({
            "name": "web",
            "virtual_hosts": [{
                "name": "web",
                "domains": ["*"],
                "routes": [{
                    "match": { "prefix": "/" },
                    "route": {
                        "cluster": "v2.web.default.default.dc1",
                        "hash_policy": [
                            {
                                "cookie": { "name": "chocolate-chip" },
                                "terminal": true
                            },
                            { "header": { "header_name": "x-user-id" } },
                            {
                                "connection_properties": { "source_ip": true },
                                "terminal": true
                            }
                        ]
                    }
                }]
            }],
            "validate_clusters": true
        })
    );
}

#[test]
fn test_cookie_config_fields_gated_by_proxy_version() {
    let lb = ring_hash_lb(vec![HashPolicyRule::cookie(
        "oatmeal",
        Some(CookieConfig {
            ttl: Duration::from_secs(10),
            path: Some("/oven".into()),
            session: false,
        }),
    )]);
    let snap = sidecar_snapshot(vec![lb_chain("web", lb)]);

    let new = routes_from_snapshot(&connection("1.25.0"), &snap);
    let cookie = serde_json::to_value(&new.resources[0]).unwrap()["virtual_hosts"][0]["routes"]
        [0]["route"]["hash_policy"][0]["cookie"]
        .clone();
    assert_eq!(
        cookie,
        json!({ "name": "oatmeal", "ttl": "10s", "path": "/oven" })
    );

    // Older line: the sub-fields are omitted, the directive survives.
    let old = routes_from_snapshot(&connection("1.22.0"), &snap);
    let cookie = serde_json::to_value(&old.resources[0]).unwrap()["virtual_hosts"][0]["routes"]
        [0]["route"]["hash_policy"][0]["cookie"]
        .clone();
    assert_eq!(cookie, json!({ "name": "oatmeal" }));
}

#[test]
fn test_session_cookie_fails_chain_on_old_proxies() {
    let lb = ring_hash_lb(vec![HashPolicyRule::cookie(
        "oatmeal",
        Some(CookieConfig {
            session: true,
            ..CookieConfig::default()
        }),
    )]);
    let snap = sidecar_snapshot(vec![lb_chain("web", lb), simple_chain("api")]);

    let compiled = routes_from_snapshot(&connection("1.22.0"), &snap);
    assert_eq!(compiled.resources.len(), 1);
    assert_eq!(compiled.resources[0].name, "api");
    assert_eq!(compiled.failures.len(), 1);
    assert!(matches!(
        compiled.failures[0].error,
        CompileError::UnsupportedFeature { feature, .. }
            if feature == "session cookie hash policy"
    ));
}

#[test]
fn test_every_supported_version_compiles_basic_chains() {
    let snap = sidecar_snapshot(vec![simple_chain("web")]);

    for version in ["1.21.3", "1.22.0", "1.23.1", "1.24.2", "1.25.0"] {
        let compiled = routes_from_snapshot(&connection(version), &snap);
        assert!(compiled.failures.is_empty(), "version {}", version);
        assert_eq!(compiled.resources.len(), 1, "version {}", version);
    }
}

#[test]
fn test_recompilation_is_byte_identical() {
    let snap = sidecar_snapshot(vec![
        router_chain("web"),
        splitter_chain("search", &[(60, "search-a"), (40, "search-b")]),
        lb_chain(
            "session",
            ring_hash_lb(vec![HashPolicyRule::header("x-route-key").terminal()]),
        ),
    ]);
    let conn = connection("1.25.0");

    let first = create_response(
        ROUTE_TYPE_URL,
        "00000001",
        Some("00000001"),
        routes_from_snapshot(&conn, &snap).resources,
    );
    let second = create_response(
        ROUTE_TYPE_URL,
        "00000001",
        Some("00000001"),
        routes_from_snapshot(&conn, &snap).resources,
    );

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_envelope_orders_resources_by_name() {
    // BTreeMap iteration already yields sorted chains; feed the envelope
    // deliberately unsorted input to pin the contract on the builder.
    let snap = sidecar_snapshot(vec![simple_chain("web"), simple_chain("api")]);
    let mut resources = routes_from_snapshot(&connection("1.25.0"), &snap).resources;
    resources.reverse();

    let envelope = create_response(ROUTE_TYPE_URL, "00000001", Some("00000001"), resources);
    let names: Vec<&str> = envelope
        .resources
        .iter()
        .map(|r| r.resource.name.as_str())
        .collect();
    assert_eq!(names, ["api", "web"]);
}
