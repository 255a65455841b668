//! Load-balancing policy descriptors.
//!
//! # Design Decisions
//! - A hash-policy rule hashes on exactly one request attribute, so the
//!   rule is a tagged variant; a rule naming no attribute cannot be
//!   constructed and is rejected when snapshot data is deserialized
//! - Rule order is semantically meaningful (the proxy evaluates hash
//!   inputs first-match-wins) and is preserved everywhere

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Declarative load-balancing configuration attached to a resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerPolicy {
    pub policy: LbAlgorithm,
    pub ring_hash: Option<RingHashConfig>,
    pub least_request: Option<LeastRequestConfig>,
    pub hash_policies: Vec<HashPolicyRule>,
}

impl LoadBalancerPolicy {
    /// Hash policies only apply to hash-ring algorithms; every other
    /// policy ignores them by contract.
    pub fn is_hash_based(&self) -> bool {
        matches!(self.policy, LbAlgorithm::RingHash | LbAlgorithm::Maglev)
    }
}

/// Load-balancing algorithm selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LbAlgorithm {
    /// No explicit policy configured; the data plane applies its default.
    #[default]
    Unspecified,
    RoundRobin,
    LeastRequest,
    Random,
    RingHash,
    Maglev,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingHashConfig {
    pub minimum_ring_size: u64,
    pub maximum_ring_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeastRequestConfig {
    pub choice_count: u32,
}

/// One hash input in an ordered policy list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashPolicyRule {
    pub hash_on: HashInput,

    /// Stop evaluating further hash policies once this one produces a
    /// value.
    #[serde(default)]
    pub terminal: bool,
}

impl HashPolicyRule {
    pub fn header(name: impl Into<String>) -> Self {
        Self {
            hash_on: HashInput::Header { name: name.into() },
            terminal: false,
        }
    }

    pub fn cookie(name: impl Into<String>, config: Option<CookieConfig>) -> Self {
        Self {
            hash_on: HashInput::Cookie {
                name: name.into(),
                config,
            },
            terminal: false,
        }
    }

    pub fn source_ip() -> Self {
        Self {
            hash_on: HashInput::SourceIp,
            terminal: false,
        }
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// The request attribute a rule hashes on. Exactly one per rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashInput {
    Header {
        name: String,
    },
    Cookie {
        name: String,
        #[serde(default)]
        config: Option<CookieConfig>,
    },
    SourceIp,
}

/// Generated-cookie settings for cookie hash rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie lifetime. The zero value means "not set" and is omitted
    /// from output, unless `session` forces an explicit zero.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    pub path: Option<String>,

    /// Tie the cookie's lifetime to the client session. Overrides any
    /// configured TTL.
    pub session: bool,
}
