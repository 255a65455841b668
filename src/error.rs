//! Compiler error definitions.

use thiserror::Error;

/// Errors that can occur while compiling route resources.
///
/// Variants carry enough context (chain name, node id, feature name) to
/// diagnose the failing input without re-running the compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The proxy version string does not match any known release line.
    /// Fatal for the connection; nothing can be compiled for it.
    #[error("unsupported proxy version {0:?}")]
    UnsupportedVersion(String),

    /// The routing graph violates an input invariant (dangling node
    /// reference, impossible edge, non-terminating redirect). Indicates
    /// an upstream compilation bug; fatal for the affected chain only.
    #[error("chain {chain:?}: malformed at node {node:?}: {detail}")]
    MalformedChain {
        chain: String,
        node: String,
        detail: &'static str,
    },

    /// Every branch of a splitter carries zero weight, leaving the chain
    /// with no routable target. Fatal for the affected chain only.
    #[error("chain {chain:?}: all split branches have zero weight")]
    EmptyRouteSet { chain: String },

    /// A directive cannot be represented for the connected proxy version
    /// and no valid degraded encoding exists.
    #[error("feature {feature:?} is not supported by proxy version {version}")]
    UnsupportedFeature { feature: &'static str, version: String },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
