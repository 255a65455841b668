//! Shared capability cache.
//!
//! Resolution is cheap but runs once per connection; agents holding many
//! proxy connections share one registry so each distinct version string
//! is resolved a single time. Reads are lock-free; a racing insert for
//! the same version writes the same value, so losing the race is harmless.

use dashmap::DashMap;

use crate::capabilities::{self, ProxyCapabilities};
use crate::error::CompileResult;

/// Cache of resolved capability sets keyed by the raw version string.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    cache: DashMap<String, ProxyCapabilities>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `version`, consulting the cache first.
    ///
    /// Failed resolutions are not cached: a version string unknown to
    /// this build stays an error on every call.
    pub fn resolve(&self, version: &str) -> CompileResult<ProxyCapabilities> {
        if let Some(caps) = self.cache.get(version) {
            return Ok(caps.value().clone());
        }

        let caps = capabilities::resolve(version)?;
        self.cache.insert(version.to_string(), caps.clone());
        Ok(caps)
    }

    /// Number of distinct version strings resolved so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
