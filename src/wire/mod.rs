//! Proxy wire schema for route resources.
//!
//! # Responsibilities
//! - Model the route-configuration schema the data plane accepts
//! - Keep field presence exact: an absent field and a present zero are
//!   different wire states and both are meaningful
//!
//! # Design Decisions
//! - Optional fields are `Option` + `skip_serializing_if`, never
//!   serialized defaults
//! - Durations serialize in humantime form, so an explicit zero is the
//!   visible string `"0s"` rather than a missing key
//! - Encoding is plain serde; the transport layer owns framing

pub mod envelope;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A named unit of routing configuration pushed to one proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfiguration {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_hosts: Vec<VirtualHost>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_clusters: Option<bool>,
}

/// A domain set and its ordered route entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

/// One match/action pair. Routes are evaluated in order; the first
/// match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "match")]
    pub route_match: RouteMatch,

    #[serde(rename = "route")]
    pub action: RouteAction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMatch {
    #[serde(flatten)]
    pub path: Option<PathSpecifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatcher>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathSpecifier {
    #[serde(rename = "path")]
    Exact(String),
    #[serde(rename = "prefix")]
    Prefix(String),
    #[serde(rename = "safe_regex")]
    SafeRegex(RegexMatcher),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexMatcher {
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderMatcher {
    pub name: String,

    #[serde(flatten)]
    pub specifier: HeaderMatchSpecifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeaderMatchSpecifier {
    #[serde(rename = "exact_match")]
    Exact(String),
    #[serde(rename = "present_match")]
    Present(bool),
    #[serde(rename = "safe_regex_match")]
    SafeRegex(RegexMatcher),
}

/// Forwarding behavior for a matched route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteAction {
    #[serde(flatten)]
    pub cluster: Option<ClusterSpecifier>,

    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_rewrite: Option<String>,

    /// Failover candidate clusters, in preference order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failover_cluster_names: Vec<String>,

    /// Hash inputs for ring-based load balancing, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hash_policy: Vec<HashPolicy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClusterSpecifier {
    #[serde(rename = "cluster")]
    Cluster(String),
    #[serde(rename = "weighted_clusters")]
    WeightedClusters(WeightedClusters),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedClusters {
    pub clusters: Vec<ClusterWeight>,
    pub total_weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterWeight {
    pub name: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retriable_status_codes: Vec<u16>,
}

/// One hash input directive on a route action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashPolicy {
    #[serde(flatten)]
    pub specifier: HashPolicySpecifier,

    /// Stop evaluating further hash policies once this one produces a
    /// value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HashPolicySpecifier {
    #[serde(rename = "header")]
    Header(HeaderHash),
    #[serde(rename = "cookie")]
    Cookie(CookieHash),
    #[serde(rename = "connection_properties")]
    ConnectionProperties(ConnectionPropertiesHash),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderHash {
    pub header_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieHash {
    pub name: String,

    /// Lifetime of a generated cookie. Absent means the proxy generates
    /// no TTL attribute; an explicit zero (`"0s"`) means a session
    /// cookie. The two states must never be collapsed.
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub ttl: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPropertiesHash {
    pub source_ip: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}
