//! Load-balancer hash-policy injection.
//!
//! # Responsibilities
//! - Translate a declarative load-balancing policy into the hash-policy
//!   directives of one route action
//! - Encode the cookie TTL rules exactly: session cookies force an
//!   explicit zero TTL, an unset TTL stays absent, a set TTL is copied
//!   verbatim
//!
//! # Design Decisions
//! - Rule order in equals directive order out; the proxy evaluates hash
//!   inputs first-match-wins, so reordering changes behavior
//! - Policies that are not hash-based leave the action untouched

use std::time::Duration;

use crate::capabilities::ProxyCapabilities;
use crate::error::{CompileError, CompileResult};
use crate::graph::lb::{CookieConfig, HashInput, LoadBalancerPolicy};
use crate::wire::{
    ConnectionPropertiesHash, CookieHash, HashPolicy, HashPolicySpecifier, HeaderHash, RouteAction,
};

/// Apply `lb` to `action`, appending one hash-policy directive per rule.
///
/// Policies other than ring-hash and maglev ignore their hash rules by
/// contract and return without modifying the action.
pub fn apply_lb_policy(
    lb: &LoadBalancerPolicy,
    caps: &ProxyCapabilities,
    action: &mut RouteAction,
) -> CompileResult<()> {
    if !lb.is_hash_based() {
        return Ok(());
    }

    for rule in &lb.hash_policies {
        let specifier = match &rule.hash_on {
            HashInput::Header { name } => HashPolicySpecifier::Header(HeaderHash {
                header_name: name.clone(),
            }),

            HashInput::Cookie { name, config } => {
                let (ttl, path) = match config {
                    Some(cfg) => cookie_ttl_and_path(cfg, caps)?,
                    None => (None, None),
                };
                HashPolicySpecifier::Cookie(CookieHash {
                    name: name.clone(),
                    ttl,
                    path,
                })
            }

            HashInput::SourceIp => {
                HashPolicySpecifier::ConnectionProperties(ConnectionPropertiesHash {
                    source_ip: true,
                })
            }
        };

        action.hash_policy.push(HashPolicy {
            specifier,
            terminal: rule.terminal,
        });
    }

    Ok(())
}

/// Encode the TTL and path of a cookie rule.
///
/// A session cookie's lifetime is tied to the client session, so any
/// configured TTL is overridden with an explicit zero on the wire. A
/// non-session cookie with an unset (zero) TTL emits no TTL field at
/// all; the two states are observably different to the proxy.
fn cookie_ttl_and_path(
    cfg: &CookieConfig,
    caps: &ProxyCapabilities,
) -> CompileResult<(Option<Duration>, Option<String>)> {
    if !caps.cookie_hash_config {
        if cfg.session {
            // The forced-zero TTL is the only way to express a session
            // cookie; without the sub-field there is no valid degraded
            // encoding.
            return Err(CompileError::UnsupportedFeature {
                feature: "session cookie hash policy",
                version: caps.release_line.clone(),
            });
        }
        // Degrade by omission: the proxy rejects TTL and path fields it
        // does not know.
        return Ok((None, None));
    }

    let ttl = if cfg.session {
        Some(Duration::ZERO)
    } else if cfg.ttl == Duration::ZERO {
        None
    } else {
        Some(cfg.ttl)
    };

    Ok((ttl, cfg.path.clone()))
}
