//! Response envelope for the push protocol.
//!
//! The envelope fixes the resource ordering and naming contract: the
//! assembler returns resources unordered, the envelope sorts them by
//! name so repeated compilations of identical input transmit identical
//! bytes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wire::RouteConfiguration;

/// Type URL identifying route-configuration resources on the wire.
pub const ROUTE_TYPE_URL: &str = "type.googleapis.com/mesh.proxy.route.v1.RouteConfiguration";

/// Outer protocol envelope delivered to one proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub version_info: String,
    pub resources: Vec<ResourceEnvelope>,
    pub type_url: String,
    pub nonce: String,
}

/// One resource wrapped with its type URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEnvelope {
    #[serde(rename = "@type")]
    pub type_url: String,

    #[serde(flatten)]
    pub resource: RouteConfiguration,
}

/// Wrap `resources` for delivery, sorted by name.
///
/// `nonce` correlates the push with the proxy's ACK; pass `None` to
/// generate one.
pub fn create_response(
    type_url: &str,
    version_info: &str,
    nonce: Option<&str>,
    mut resources: Vec<RouteConfiguration>,
) -> ResponseEnvelope {
    resources.sort_by(|a, b| a.name.cmp(&b.name));

    ResponseEnvelope {
        version_info: version_info.to_string(),
        resources: resources
            .into_iter()
            .map(|resource| ResourceEnvelope {
                type_url: type_url.to_string(),
                resource,
            })
            .collect(),
        type_url: type_url.to_string(),
        nonce: nonce
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
    }
}
