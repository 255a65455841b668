//! Fully-qualified routing targets.
//!
//! Cluster names must be globally unique across the whole configuration
//! set, so a target always carries service, namespace, partition and
//! datacenter, plus an optional subset.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete destination named by a resolver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Target {
    pub service: String,

    #[serde(default = "default_segment")]
    pub namespace: String,

    #[serde(default = "default_segment")]
    pub partition: String,

    pub datacenter: String,

    #[serde(default)]
    pub subset: Option<String>,
}

fn default_segment() -> String {
    "default".to_string()
}

impl Target {
    /// Target in the default namespace and partition.
    pub fn new(service: impl Into<String>, datacenter: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            namespace: default_segment(),
            partition: default_segment(),
            datacenter: datacenter.into(),
            subset: None,
        }
    }

    pub fn with_subset(mut self, subset: impl Into<String>) -> Self {
        self.subset = Some(subset.into());
        self
    }

    /// Globally unique cluster name:
    /// `[subset.]service.namespace.partition.datacenter`.
    pub fn cluster_name(&self) -> String {
        match &self.subset {
            Some(subset) => format!(
                "{}.{}.{}.{}.{}",
                subset, self.service, self.namespace, self.partition, self.datacenter
            ),
            None => format!(
                "{}.{}.{}.{}",
                self.service, self.namespace, self.partition, self.datacenter
            ),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cluster_name())
    }
}
