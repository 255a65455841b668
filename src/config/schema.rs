//! Configuration schema definitions.
//!
//! Settings for the compiler embedded in an agent process. All types
//! derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::wire::envelope::ROUTE_TYPE_URL;

/// Root configuration for the route compiler.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CompilerConfig {
    /// Response envelope settings.
    pub envelope: EnvelopeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Response envelope settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Type URL stamped on route resources. Only override when
    /// targeting a proxy fleet with a custom resource registry.
    pub type_url: String,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            type_url: ROUTE_TYPE_URL.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit per-pass compile metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
