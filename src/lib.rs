//! Control-plane route compiler.
//!
//! Turns an internal, versioned model of a service's routing intent
//! (routers, splitters, resolvers, redirects, load-balancing policy)
//! into route-configuration resources a data-plane proxy accepts over a
//! push-based configuration protocol.
//!
//! # Architecture Overview
//!
//! ```text
//! proxy connection (version string)
//!     → capabilities (feature flags per release line)
//!          │
//! config snapshot (routing graphs + gateway maps)
//!     → plan::walker (graph → ordered route plan)
//!     → assemble (plan + capabilities → route resources)
//!          → assemble::hash_policy (LB policy → hash directives)
//!     → wire::envelope (sorted, versioned, nonced response)
//! ```
//!
//! Compilation is pure and synchronous: one snapshot in, one owned
//! resource set out. Connections compile independently; the only shared
//! state is the capability cache.

// Core pipeline
pub mod assemble;
pub mod capabilities;
pub mod graph;
pub mod plan;
pub mod snapshot;
pub mod wire;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use assemble::{routes_from_snapshot, CompiledRoutes, ConnectionInfo};
pub use capabilities::ProxyCapabilities;
pub use error::{CompileError, CompileResult};
pub use snapshot::ConfigSnapshot;
