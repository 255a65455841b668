//! Proxy capability negotiation.
//!
//! # Responsibilities
//! - Resolve a proxy version string to a fixed set of feature flags
//! - Reject version strings outside the known release lines
//! - Provide a shared once-per-version cache (see [`registry`])
//!
//! # Design Decisions
//! - Flat lookup table keyed by release line, not per-version types
//! - Resolution is a pure function: same input, same flags
//! - Flags are immutable once resolved; consumers only read them

pub mod registry;

use crate::error::{CompileError, CompileResult};

/// Release lines the compiler knows how to emit configuration for.
/// Ordered oldest to newest.
const SUPPORTED_LINES: &[(u64, u64)] = &[(1, 21), (1, 22), (1, 23), (1, 24), (1, 25)];

/// Feature flags describing what a connected proxy build accepts.
///
/// Created once per connection and consulted read-only by the chain
/// walker and the resource assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCapabilities {
    /// Release line the flags were resolved for, e.g. `"1.23"`.
    /// Kept for error context only.
    pub release_line: String,

    /// Regex forms of path and header match predicates are legal.
    pub safe_regex_match: bool,

    /// Cookie hash directives accept the TTL and path sub-fields.
    pub cookie_hash_config: bool,
}

/// Resolve a proxy version string to its capability set.
///
/// Accepts `major.minor.patch` with an optional leading `v`; the patch
/// component is ignored for feature purposes. Unknown or out-of-range
/// release lines fail with [`CompileError::UnsupportedVersion`].
pub fn resolve(version: &str) -> CompileResult<ProxyCapabilities> {
    let (major, minor) = parse_release_line(version)
        .ok_or_else(|| CompileError::UnsupportedVersion(version.to_string()))?;

    if !SUPPORTED_LINES.contains(&(major, minor)) {
        return Err(CompileError::UnsupportedVersion(version.to_string()));
    }

    Ok(ProxyCapabilities {
        release_line: format!("{}.{}", major, minor),
        safe_regex_match: (major, minor) >= (1, 22),
        cookie_hash_config: (major, minor) >= (1, 23),
    })
}

/// Extract `(major, minor)` from a version string, or `None` if the
/// string is not a dotted numeric version.
fn parse_release_line(version: &str) -> Option<(u64, u64)> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let mut parts = version.split('.');

    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
