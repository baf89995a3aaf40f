//! Template-emitting provisioning adapter
//!
//! The [`TemplateEmitter`] is the default [`Provisioner`]: it converts a
//! declaration graph into a [`Template`], a serializable description of
//! resource kinds, named properties, and cross-references in the shape the
//! downstream provisioning engine consumes. Emission itself never touches
//! the cloud; apply/destroy of the template belongs to the engine.

use super::{ProvisionError, Provisioner};
use crate::stack::{
    AccessPolicySpec, Attr, ClusterSpec, ComputeMode, DatabaseEngine, DatabaseSpec,
    DeclarationGraph, Direction, LogGroupSpec, LogicalId, NamespaceSpec, NetworkMode, NetworkSpec,
    Peer, Protocol, RemovalPolicy, ServiceSpec, SubnetKind, TaskDefinitionSpec,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Template format version emitted by this crate.
pub const FORMAT_VERSION: &str = "goval-stack/1";

/// A complete provisioning template: every declared resource with its kind,
/// properties, and deletion policy, plus apply-time lookups and stack tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub format_version: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub tags: BTreeMap<String, String>,
    /// Existing resources the engine must resolve by name at apply time.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lookups: BTreeMap<LogicalId, Value>,
    pub resources: BTreeMap<LogicalId, TemplateResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateResource {
    pub kind: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
}

impl Template {
    pub fn resource(&self, id: &LogicalId) -> Option<&TemplateResource> {
        self.resources.get(id)
    }

    /// Resources of one kind, in id order.
    pub fn resources_of_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (&'a LogicalId, &'a TemplateResource)> + 'a {
        self.resources.iter().filter(move |(_, r)| r.kind == kind)
    }
}

/// Provisioner that accumulates declarations into a [`Template`].
pub struct TemplateEmitter {
    template: Template,
    session: Uuid,
}

impl TemplateEmitter {
    /// Seeds the emitter with the graph's deployment target and tags. The
    /// session id exists for log correlation only and never enters the
    /// template, keeping emission deterministic.
    pub fn for_graph(graph: &DeclarationGraph) -> Self {
        let session = Uuid::new_v4();
        debug!("template emission session {}", session);
        Self {
            template: Template {
                format_version: FORMAT_VERSION.to_string(),
                description: "goval-dictionary deployment".to_string(),
                account: graph.account().map(String::from),
                region: graph.region().map(String::from),
                tags: graph.tags().clone(),
                lookups: BTreeMap::new(),
                resources: BTreeMap::new(),
            },
            session,
        }
    }

    pub fn finish(self) -> Template {
        debug!(
            "session {} emitted {} resources",
            self.session,
            self.template.resources.len()
        );
        self.template
    }

    fn insert(&mut self, id: &LogicalId, kind: &str, properties: Value) {
        self.insert_with_policy(id, kind, properties, None)
    }

    fn insert_with_policy(
        &mut self,
        id: &LogicalId,
        kind: &str,
        properties: Value,
        removal: Option<RemovalPolicy>,
    ) {
        self.template.resources.insert(
            id.clone(),
            TemplateResource {
                kind: kind.to_string(),
                properties,
                deletion_policy: removal.map(|policy| {
                    match policy {
                        RemovalPolicy::Retain => "retain",
                        RemovalPolicy::Destroy => "delete",
                    }
                    .to_string()
                }),
            },
        );
    }
}

/// Renders a cross-reference to another resource in the same template.
fn reference(id: &LogicalId) -> String {
    format!("${{{}}}", id)
}

fn peer_value(peer: &Peer) -> Value {
    match peer {
        Peer::AnyIpv4 => json!("0.0.0.0/0"),
        Peer::Cidr { block } => json!(block),
    }
}

#[async_trait]
impl Provisioner for TemplateEmitter {
    async fn declare_network(
        &mut self,
        id: &LogicalId,
        spec: &NetworkSpec,
    ) -> Result<(), ProvisionError> {
        match &spec.mode {
            NetworkMode::Lookup { name } => {
                // Nothing to create; the engine resolves the boundary by name
                // at apply time and fails there if it is missing.
                self.template
                    .lookups
                    .insert(id.clone(), json!({ "vpc_name": name }));
            }
            NetworkMode::Create {
                cidr,
                max_azs,
                subnets,
            } => {
                let subnet_values: Vec<Value> = subnets
                    .iter()
                    .map(|subnet| {
                        json!({
                            "name": subnet.name,
                            "kind": match subnet.kind {
                                SubnetKind::Public => "public",
                                SubnetKind::Private => "private",
                            },
                        })
                    })
                    .collect();
                self.insert(
                    id,
                    "AWS::EC2::VPC",
                    json!({
                        "cidr": cidr,
                        "max_azs": max_azs,
                        "subnets": subnet_values,
                    }),
                );
            }
        }
        Ok(())
    }

    async fn declare_access_policy(
        &mut self,
        id: &LogicalId,
        spec: &AccessPolicySpec,
    ) -> Result<(), ProvisionError> {
        let rules: Vec<Value> = spec
            .rules
            .iter()
            .map(|rule| {
                json!({
                    "direction": match rule.direction {
                        Direction::Ingress => "ingress",
                        Direction::Egress => "egress",
                    },
                    "protocol": match rule.protocol {
                        Protocol::Tcp => "tcp",
                        Protocol::Udp => "udp",
                    },
                    "from_port": rule.port.from,
                    "to_port": rule.port.to,
                    "peer": peer_value(&rule.peer),
                    "description": rule.description,
                })
            })
            .collect();

        self.insert(
            id,
            "AWS::EC2::SecurityGroup",
            json!({
                "group_name": spec.name,
                "vpc": reference(&spec.network),
                "allow_all_outbound": spec.allow_all_outbound,
                "rules": rules,
            }),
        );
        Ok(())
    }

    async fn declare_cluster(
        &mut self,
        id: &LogicalId,
        spec: &ClusterSpec,
    ) -> Result<(), ProvisionError> {
        let capacity = match &spec.compute {
            ComputeMode::Serverless => json!({ "mode": "fargate" }),
            ComputeMode::HostCapacity {
                min,
                max,
                instance_type,
            } => json!({
                "mode": "ec2",
                "min_capacity": min,
                "max_capacity": max,
                "instance_type": instance_type,
            }),
        };

        self.insert(
            id,
            "AWS::ECS::Cluster",
            json!({
                "cluster_name": spec.name,
                "vpc": reference(&spec.network),
                "capacity": capacity,
            }),
        );
        Ok(())
    }

    async fn declare_log_group(
        &mut self,
        id: &LogicalId,
        spec: &LogGroupSpec,
    ) -> Result<(), ProvisionError> {
        self.insert_with_policy(
            id,
            "AWS::Logs::LogGroup",
            json!({
                "log_group_name": spec.name,
                "stream_prefix": spec.stream_prefix,
            }),
            Some(spec.removal_policy),
        );
        Ok(())
    }

    async fn declare_task_definition(
        &mut self,
        id: &LogicalId,
        spec: &TaskDefinitionSpec,
    ) -> Result<(), ProvisionError> {
        let ports: Vec<Value> = spec
            .container
            .port_mappings
            .iter()
            .map(|mapping| json!({ "container_port": mapping.container_port }))
            .collect();

        self.insert(
            id,
            "AWS::ECS::TaskDefinition",
            json!({
                "cpu": spec.cpu,
                "memory_mib": spec.memory_mib,
                "container": {
                    "name": spec.container.name,
                    "image": spec.container.image,
                    "command": spec.container.command,
                    "memory_mib": spec.container.memory_mib,
                    "log_group": reference(&spec.container.log_group),
                    "port_mappings": ports,
                },
            }),
        );
        Ok(())
    }

    async fn declare_service(
        &mut self,
        id: &LogicalId,
        spec: &ServiceSpec,
    ) -> Result<(), ProvisionError> {
        let mut properties = json!({
            "service_name": spec.name,
            "cluster": reference(&spec.cluster),
            "task_definition": reference(&spec.task_definition),
            "desired_count": spec.desired_count,
        });

        if let Some(lb) = &spec.load_balancer {
            properties["load_balancer"] = json!({
                "public_facing": lb.public_facing,
                "listener_port": lb.listener_port,
            });
        }
        if let Some(discovery) = &spec.discovery {
            properties["service_discovery"] = json!({
                "namespace": reference(&discovery.namespace),
                "record_name": discovery.record_name,
            });
        }

        self.insert(id, "AWS::ECS::Service", properties);
        Ok(())
    }

    async fn declare_namespace(
        &mut self,
        id: &LogicalId,
        spec: &NamespaceSpec,
    ) -> Result<(), ProvisionError> {
        self.insert(
            id,
            "AWS::ServiceDiscovery::PrivateDnsNamespace",
            json!({
                "name": spec.name,
                "vpc": reference(&spec.network),
            }),
        );
        Ok(())
    }

    async fn declare_database(
        &mut self,
        id: &LogicalId,
        spec: &DatabaseSpec,
    ) -> Result<(), ProvisionError> {
        let (engine, version) = match &spec.engine {
            DatabaseEngine::Postgres { version } => ("postgres", version),
            DatabaseEngine::Mysql { version } => ("mysql", version),
        };

        let endpoint = Attr::new(id.clone(), "Endpoint.Address");
        self.insert_with_policy(
            id,
            "AWS::RDS::DBInstance",
            json!({
                "instance_identifier": spec.identifier,
                "engine": engine,
                "engine_version": version,
                "instance_class": spec.instance_class,
                "database_name": spec.database_name,
                "port": spec.port,
                "master_username": spec.credentials.username,
                // Secret reference token, resolved by the engine. The value
                // never appears in the template.
                "master_password": spec.credentials.password.to_string(),
                "vpc": reference(&spec.network),
                "security_groups": [reference(&spec.access_policy)],
                "iam_authentication": spec.iam_authentication,
                "performance_insights": spec.performance_insights,
                "auto_minor_version_upgrade": spec.auto_minor_version_upgrade,
                "multi_az": spec.multi_az,
                "backup_retention_days": spec.backup_retention_days,
                "deletion_protection": spec.deletion_protection,
                "endpoint_address": endpoint.to_string(),
            }),
            Some(spec.removal_policy),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::config::DeployEnv;
    use crate::engine::synthesize;
    use crate::variant::DeploymentVariant;

    async fn emit(variant: DeploymentVariant) -> Template {
        let graph = compose(&DeployEnv::default(), &variant).unwrap();
        let mut emitter = TemplateEmitter::for_graph(&graph);
        synthesize(&graph, &mut emitter).await.unwrap();
        emitter.finish()
    }

    #[tokio::test]
    async fn test_batch_template_has_lookup_and_database() {
        let template = emit(DeploymentVariant::batch_fetch(
            crate::stack::Credentials {
                username: "root".to_string(),
                password: crate::stack::SecretRef::new("test/secret"),
            },
        ))
        .await;

        assert_eq!(template.lookups.len(), 1);
        assert_eq!(template.resources_of_kind("AWS::RDS::DBInstance").count(), 1);
        assert_eq!(template.resources_of_kind("AWS::EC2::VPC").count(), 0);
    }

    #[tokio::test]
    async fn test_database_password_is_a_secret_token() {
        let template = emit(DeploymentVariant::batch_fetch(
            crate::stack::Credentials {
                username: "root".to_string(),
                password: crate::stack::SecretRef::new("test/secret"),
            },
        ))
        .await;

        let (_, database) = template
            .resources_of_kind("AWS::RDS::DBInstance")
            .next()
            .unwrap();
        assert_eq!(
            database.properties["master_password"],
            "${secret:test/secret}"
        );
    }

    #[tokio::test]
    async fn test_server_template_creates_vpc() {
        let template = emit(DeploymentVariant::server()).await;
        assert!(template.lookups.is_empty());
        assert_eq!(template.resources_of_kind("AWS::EC2::VPC").count(), 1);
        assert_eq!(
            template
                .resources_of_kind("AWS::ServiceDiscovery::PrivateDnsNamespace")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_log_group_deletion_policy() {
        let template = emit(DeploymentVariant::server()).await;
        let (_, log_group) = template
            .resources_of_kind("AWS::Logs::LogGroup")
            .next()
            .unwrap();
        assert_eq!(log_group.deletion_policy.as_deref(), Some("delete"));
    }

    #[tokio::test]
    async fn test_template_serializes_to_json_and_yaml() {
        let template = emit(DeploymentVariant::server()).await;
        let json = serde_json::to_string_pretty(&template).unwrap();
        let yaml = serde_yaml::to_string(&template).unwrap();
        assert!(json.contains("goval-stack/1"));
        assert!(yaml.contains("goval-dictionary-cluster"));
    }
}
