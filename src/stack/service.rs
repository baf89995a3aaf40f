//! Service, load balancer, and service-discovery declarations

use super::LogicalId;
use serde::{Deserialize, Serialize};

/// Binds a task definition to a cluster with a desired replica count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    pub cluster: LogicalId,
    pub task_definition: LogicalId,
    pub desired_count: u32,
    /// Present only when the service fronts traffic through a load balancer.
    pub load_balancer: Option<LoadBalancerSpec>,
    /// Present only when the service registers a private DNS record.
    pub discovery: Option<ServiceDiscoverySpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    /// Internet-facing when true, internal otherwise.
    pub public_facing: bool,
    pub listener_port: u16,
}

/// DNS-based registration letting other services locate this one without a
/// public load balancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDiscoverySpec {
    pub namespace: LogicalId,
    pub record_name: String,
}

/// A private DNS namespace hosting service-discovery records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSpec {
    pub name: String,
    pub network: LogicalId,
}

impl ServiceSpec {
    pub fn is_public(&self) -> bool {
        self.load_balancer
            .as_ref()
            .map(|lb| lb.public_facing)
            .unwrap_or(false)
    }
}
