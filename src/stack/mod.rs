//! Resource model for the deployment declaration graph
//!
//! This module defines the typed configuration records that make up a
//! declaration graph: network boundary, access policy, compute cluster, log
//! group, task definition, service, service-discovery namespace, and database
//! instance. A [`DeclarationGraph`] is the complete set of declared resources
//! for one deployment, keyed by stable logical ids, before any real-world
//! resource exists.
//!
//! Nothing in this module talks to a cloud provider. Resources are plain data;
//! turning them into infrastructure is the job of a
//! [`Provisioner`](crate::engine::Provisioner) adapter.

pub mod compute;
pub mod database;
pub mod network;
pub mod service;

pub use compute::{ClusterSpec, ComputeMode, ContainerSpec, LogGroupSpec, PortMapping, TaskDefinitionSpec};
pub use database::{Credentials, DatabaseEngine, DatabaseSpec, SecretRef};
pub use network::{
    AccessPolicySpec, AccessRule, Direction, NetworkMode, NetworkSpec, Peer, PortRange, Protocol,
    SubnetKind, SubnetSpec,
};
pub use service::{LoadBalancerSpec, NamespaceSpec, ServiceDiscoverySpec, ServiceSpec};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Stable identifier for a declared resource.
///
/// Derived from the resource's construct path: the sanitized path plus the
/// first 8 hex characters of its SHA-256 digest. The id depends only on the
/// path, never on resource properties, so changing one resource's settings
/// (e.g. a database identifier) cannot rename any other resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Creates a logical id from a construct path.
    pub fn from_path(path: &str) -> Self {
        let digest = Sha256::digest(path.as_bytes());
        let suffix = &hex::encode(digest)[..8];
        let sanitized: String = path.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        LogicalId(format!("{}{}", sanitized, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deferred attribute of a declared resource.
///
/// Some values (a database's endpoint address, for instance) only exist once
/// the provisioning engine has created the resource. An `Attr` stands in for
/// such a value at composition time and renders as a `${id.attribute}` token
/// the engine resolves at apply time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub resource: LogicalId,
    pub attribute: String,
}

impl Attr {
    pub fn new(resource: LogicalId, attribute: impl Into<String>) -> Self {
        Self {
            resource,
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.resource, self.attribute)
    }
}

/// What happens to a resource when the whole declaration set is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Keep the resource (and its data) after the stack is destroyed.
    Retain,
    /// Delete the resource together with the stack.
    Destroy,
}

/// A declared resource of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResourceSpec {
    Network(NetworkSpec),
    AccessPolicy(AccessPolicySpec),
    Cluster(ClusterSpec),
    LogGroup(LogGroupSpec),
    TaskDefinition(TaskDefinitionSpec),
    Service(ServiceSpec),
    Namespace(NamespaceSpec),
    Database(DatabaseSpec),
}

impl ResourceSpec {
    /// Short kind name used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceSpec::Network(_) => "network",
            ResourceSpec::AccessPolicy(_) => "access-policy",
            ResourceSpec::Cluster(_) => "cluster",
            ResourceSpec::LogGroup(_) => "log-group",
            ResourceSpec::TaskDefinition(_) => "task-definition",
            ResourceSpec::Service(_) => "service",
            ResourceSpec::Namespace(_) => "namespace",
            ResourceSpec::Database(_) => "database",
        }
    }

    /// Logical ids of other resources this resource references.
    fn references(&self) -> Vec<&LogicalId> {
        match self {
            ResourceSpec::Network(_) => vec![],
            ResourceSpec::AccessPolicy(spec) => vec![&spec.network],
            ResourceSpec::Cluster(spec) => vec![&spec.network],
            ResourceSpec::LogGroup(_) => vec![],
            ResourceSpec::TaskDefinition(spec) => vec![&spec.container.log_group],
            ResourceSpec::Service(spec) => {
                let mut refs = vec![&spec.cluster, &spec.task_definition];
                if let Some(discovery) = &spec.discovery {
                    refs.push(&discovery.namespace);
                }
                refs
            }
            ResourceSpec::Namespace(spec) => vec![&spec.network],
            ResourceSpec::Database(spec) => vec![&spec.network, &spec.access_policy],
        }
    }
}

/// A resource together with its logical id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredResource {
    pub id: LogicalId,
    pub spec: ResourceSpec,
}

/// Structural errors in a declaration graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate logical id '{0}'")]
    DuplicateId(LogicalId),

    #[error("{kind} '{from}' references undeclared resource '{to}'")]
    DanglingReference {
        kind: &'static str,
        from: LogicalId,
        to: LogicalId,
    },
}

/// The complete set of resource declarations for one deployment.
///
/// Resources are kept in declaration order, which by construction is
/// dependency order: the composer declares a resource only after everything
/// it references. The graph also carries the deployment target (account and
/// region, either of which may be unresolved) and stack-level tags applied to
/// every resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeclarationGraph {
    resources: Vec<DeclaredResource>,
    tags: BTreeMap<String, String>,
    account: Option<String>,
    region: Option<String>,
}

impl DeclarationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the deployment target. Absent values are deferred to the
    /// provisioning engine's own defaults, never an error here.
    pub fn set_environment(&mut self, account: Option<String>, region: Option<String>) {
        self.account = account;
        self.region = region;
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Adds a stack-level tag applied to every declared resource.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Declares a resource and returns its logical id for downstream wiring.
    pub fn declare(&mut self, id: LogicalId, spec: ResourceSpec) -> LogicalId {
        self.resources.push(DeclaredResource {
            id: id.clone(),
            spec,
        });
        id
    }

    pub fn resources(&self) -> &[DeclaredResource] {
        &self.resources
    }

    pub fn get(&self, id: &LogicalId) -> Option<&DeclaredResource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    /// Iterates resources of one kind, in declaration order.
    pub fn of_kind(&self, kind: &str) -> impl Iterator<Item = &DeclaredResource> + '_ {
        let kind = kind.to_string();
        self.resources.iter().filter(move |r| r.spec.kind() == kind)
    }

    /// Checks structural consistency: unique logical ids and no references to
    /// resources outside this graph.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut seen = std::collections::BTreeSet::new();
        for resource in &self.resources {
            if !seen.insert(&resource.id) {
                return Err(GraphError::DuplicateId(resource.id.clone()));
            }
        }

        for resource in &self.resources {
            for target in resource.spec.references() {
                if self.get(target).is_none() {
                    return Err(GraphError::DanglingReference {
                        kind: resource.spec.kind(),
                        from: resource.id.clone(),
                        to: target.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_id_is_stable() {
        let a = LogicalId::from_path("Database");
        let b = LogicalId::from_path("Database");
        assert_eq!(a, b);
    }

    #[test]
    fn test_logical_id_sanitizes_path() {
        let id = LogicalId::from_path("VpcStack/Vpc");
        assert!(id.as_str().starts_with("VpcStackVpc"));
        assert!(!id.as_str().contains('/'));
    }

    #[test]
    fn test_logical_ids_differ_by_path() {
        assert_ne!(LogicalId::from_path("Cluster"), LogicalId::from_path("Service"));
    }

    #[test]
    fn test_attr_renders_as_token() {
        let attr = Attr::new(LogicalId::from_path("Db"), "Endpoint.Address");
        let rendered = attr.to_string();
        assert!(rendered.starts_with("${Db"));
        assert!(rendered.ends_with(".Endpoint.Address}"));
    }

    #[test]
    fn test_validate_rejects_dangling_reference() {
        let mut graph = DeclarationGraph::new();
        let network = LogicalId::from_path("Network");
        graph.declare(
            LogicalId::from_path("AccessPolicy"),
            ResourceSpec::AccessPolicy(AccessPolicySpec {
                name: "sg".to_string(),
                network: network.clone(),
                allow_all_outbound: true,
                rules: vec![],
            }),
        );

        let err = graph.validate().unwrap_err();
        match err {
            GraphError::DanglingReference { to, .. } => assert_eq!(to, network),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_id() {
        let mut graph = DeclarationGraph::new();
        let spec = ResourceSpec::Network(NetworkSpec {
            mode: NetworkMode::Lookup {
                name: "VpcStack/Vpc".to_string(),
            },
        });
        graph.declare(LogicalId::from_path("Network"), spec.clone());
        graph.declare(LogicalId::from_path("Network"), spec);

        assert!(matches!(graph.validate(), Err(GraphError::DuplicateId(_))));
    }

    #[test]
    fn test_tags_are_ordered() {
        let mut graph = DeclarationGraph::new();
        graph.add_tag("b", "2");
        graph.add_tag("a", "1");
        let keys: Vec<_> = graph.tags().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
