//! Network boundary and access policy declarations

use super::LogicalId;
use serde::{Deserialize, Serialize};

/// A virtual network boundary for the deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub mode: NetworkMode,
}

/// Whether the deployment reuses an existing network or creates a fresh one.
///
/// Lookup is resolved by the provisioning engine at apply time; a missing
/// boundary is an engine failure, not a composition failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum NetworkMode {
    /// Reuse an existing network boundary, located by name.
    Lookup { name: String },
    /// Create a fresh network boundary.
    Create {
        cidr: String,
        max_azs: u8,
        subnets: Vec<SubnetSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetSpec {
    pub name: String,
    pub kind: SubnetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetKind {
    Public,
    Private,
}

/// A security group: a named set of allow rules attached to one network
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicySpec {
    pub name: String,
    pub network: LogicalId,
    pub allow_all_outbound: bool,
    pub rules: Vec<AccessRule>,
}

/// A single allow rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRule {
    pub direction: Direction,
    pub protocol: Protocol,
    pub port: PortRange,
    pub peer: Peer,
    pub description: String,
}

impl AccessRule {
    /// Convenience constructor for a TCP ingress rule on a single port.
    pub fn ingress_tcp(port: u16, peer: Peer, description: impl Into<String>) -> Self {
        Self {
            direction: Direction::Ingress,
            protocol: Protocol::Tcp,
            port: PortRange::single(port),
            peer,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// Inclusive port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub from: u16,
    pub to: u16,
}

impl PortRange {
    pub fn single(port: u16) -> Self {
        Self { from: port, to: port }
    }

    pub fn contains(&self, port: u16) -> bool {
        port >= self.from && port <= self.to
    }
}

/// Traffic source or destination for an access rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "peer", rename_all = "snake_case")]
pub enum Peer {
    AnyIpv4,
    Cidr { block: String },
}
