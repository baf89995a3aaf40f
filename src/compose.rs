//! Stack composer
//!
//! A single stateless transformation from `(DeployEnv, DeploymentVariant)` to
//! a [`DeclarationGraph`]. Resources are declared in dependency order
//! (network boundary, access policy, cluster, log group, task definition,
//! service, plus the variant's optional database or discovery namespace), and
//! generated identifiers such as the database endpoint are threaded into
//! downstream declarations as deferred tokens.
//!
//! Composition has no side effects and performs no provider calls; the only
//! failure mode it owns is a structurally inconsistent graph, which is a bug
//! in this module rather than an operator error.

use crate::config::DeployEnv;
use crate::stack::{
    AccessPolicySpec, AccessRule, Attr, ClusterSpec, ComputeMode, ContainerSpec, DatabaseEngine,
    DatabaseSpec, DeclarationGraph, GraphError, LoadBalancerSpec, LogGroupSpec, LogicalId,
    NamespaceSpec, NetworkMode, NetworkSpec, Peer, PortMapping, RemovalPolicy, ResourceSpec,
    ServiceDiscoverySpec, ServiceSpec, SubnetKind, SubnetSpec, TaskDefinitionSpec,
};
use crate::variant::{BatchFetchConfig, DeploymentVariant, HostServerConfig, ServerConfig};
use thiserror::Error;
use tracing::{debug, info};

/// Container image pulled by reference; the service itself is external.
pub const CONTAINER_IMAGE: &str = "vuls/goval-dictionary:latest";

pub const CLUSTER_NAME: &str = "goval-dictionary-cluster";
pub const SERVICE_NAME: &str = "goval-dictionary-service";
pub const LOG_GROUP_NAME: &str = "goval-dictionary";
pub const SERVICE_TAG: &str = "goval-dictionary";

/// CPU units reserved for the task (256 = 0.25 vCPU).
pub const TASK_CPU: u32 = 256;
pub const TASK_MEMORY_MIB: u32 = 512;
pub const DESIRED_COUNT: u32 = 1;

/// Address range for freshly created network boundaries.
const NETWORK_CIDR: &str = "10.0.0.0/16";
const NETWORK_MAX_AZS: u8 = 2;

/// Composition failures. All structural; provider errors surface later, at
/// apply time, through the provisioning adapter.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("declaration graph is inconsistent: {0}")]
    InvalidGraph(#[from] GraphError),
}

/// Composes the full declaration graph for one deployment.
///
/// Absent account/region are carried through unresolved; the provisioning
/// engine applies its own defaults.
pub fn compose(
    env: &DeployEnv,
    variant: &DeploymentVariant,
) -> Result<DeclarationGraph, ComposeError> {
    info!("composing '{}' deployment ({})", variant.name(), env);

    let mut graph = DeclarationGraph::new();
    graph.set_environment(env.account.clone(), env.region.clone());
    graph.add_tag("ServiceName", SERVICE_TAG);

    match variant {
        DeploymentVariant::BatchFetch(config) => compose_batch_fetch(&mut graph, config),
        DeploymentVariant::Server(config) => {
            compose_server(&mut graph, config, ComputeMode::Serverless, config.server_command())
        }
        DeploymentVariant::ServerEc2(config) => compose_host_server(&mut graph, config),
    }

    graph.validate()?;
    debug!("declared {} resources", graph.resources().len());
    Ok(graph)
}

/// Batch fetch: reuse an existing network, declare the database, and wire its
/// endpoint into the fetch command.
fn compose_batch_fetch(graph: &mut DeclarationGraph, config: &BatchFetchConfig) {
    let network = graph.declare(
        LogicalId::from_path("Network"),
        ResourceSpec::Network(NetworkSpec {
            mode: NetworkMode::Lookup {
                name: config.network_name.clone(),
            },
        }),
    );

    let access_policy = graph.declare(
        LogicalId::from_path("AccessPolicy"),
        ResourceSpec::AccessPolicy(AccessPolicySpec {
            name: "goval-dictionary-rds-sg".to_string(),
            network: network.clone(),
            allow_all_outbound: true,
            rules: vec![AccessRule::ingress_tcp(
                config.db_port,
                Peer::AnyIpv4,
                "goval-dictionary access from local",
            )],
        }),
    );

    let database = graph.declare(
        LogicalId::from_path("Database"),
        ResourceSpec::Database(DatabaseSpec {
            identifier: config.db_identifier.clone(),
            engine: DatabaseEngine::Postgres {
                version: config.engine_version.clone(),
            },
            instance_class: config.instance_class.clone(),
            database_name: config.db_name.clone(),
            port: config.db_port,
            credentials: config.credentials.clone(),
            network: network.clone(),
            access_policy: access_policy.clone(),
            iam_authentication: true,
            performance_insights: true,
            auto_minor_version_upgrade: true,
            multi_az: false,
            backup_retention_days: config.backup_retention_days,
            deletion_protection: false,
            removal_policy: RemovalPolicy::Destroy,
        }),
    );

    // The endpoint address only exists once the engine has created the
    // database; it rides along as a deferred token.
    let endpoint = Attr::new(database, "Endpoint.Address");
    let db_url = format!(
        "jdbc:postgresql://{}:{}/{}",
        endpoint, config.db_port, config.db_name
    );

    let cluster = declare_cluster(graph, network, ComputeMode::Serverless);
    let log_group = declare_log_group(graph);
    let task_definition = declare_task(graph, log_group, config.fetch_command(&db_url));

    graph.declare(
        LogicalId::from_path("Service"),
        ResourceSpec::Service(ServiceSpec {
            name: SERVICE_NAME.to_string(),
            cluster,
            task_definition,
            desired_count: DESIRED_COUNT,
            load_balancer: None,
            discovery: None,
        }),
    );
}

/// Server shapes: fresh network, public load balancer, service discovery.
fn compose_server(
    graph: &mut DeclarationGraph,
    config: &ServerConfig,
    compute: ComputeMode,
    command: Vec<String>,
) {
    let network = graph.declare(
        LogicalId::from_path("Network"),
        ResourceSpec::Network(NetworkSpec {
            mode: NetworkMode::Create {
                cidr: NETWORK_CIDR.to_string(),
                max_azs: NETWORK_MAX_AZS,
                subnets: vec![
                    SubnetSpec {
                        name: "Public".to_string(),
                        kind: SubnetKind::Public,
                    },
                    SubnetSpec {
                        name: "Private".to_string(),
                        kind: SubnetKind::Private,
                    },
                ],
            },
        }),
    );

    graph.declare(
        LogicalId::from_path("AccessPolicy"),
        ResourceSpec::AccessPolicy(AccessPolicySpec {
            name: "goval-dictionary-service-sg".to_string(),
            network: network.clone(),
            allow_all_outbound: true,
            rules: vec![AccessRule::ingress_tcp(
                config.http_port,
                Peer::AnyIpv4,
                "goval-dictionary public http",
            )],
        }),
    );

    let cluster = declare_cluster(graph, network.clone(), compute);
    let log_group = declare_log_group(graph);
    let task_definition = declare_task(graph, log_group, command);

    let namespace = graph.declare(
        LogicalId::from_path("Namespace"),
        ResourceSpec::Namespace(NamespaceSpec {
            name: config.namespace.clone(),
            network,
        }),
    );

    graph.declare(
        LogicalId::from_path("Service"),
        ResourceSpec::Service(ServiceSpec {
            name: SERVICE_NAME.to_string(),
            cluster,
            task_definition,
            desired_count: DESIRED_COUNT,
            load_balancer: Some(LoadBalancerSpec {
                public_facing: config.public,
                listener_port: config.http_port,
            }),
            discovery: Some(ServiceDiscoverySpec {
                namespace,
                record_name: config.record_name.clone(),
            }),
        }),
    );
}

/// Host-capacity server: same wiring as the serverless server, but the
/// cluster carries capacity bounds and the image entrypoint runs unmodified.
fn compose_host_server(graph: &mut DeclarationGraph, config: &HostServerConfig) {
    compose_server(graph, &config.server, config.compute_mode(), Vec::new());
}

fn declare_cluster(
    graph: &mut DeclarationGraph,
    network: LogicalId,
    compute: ComputeMode,
) -> LogicalId {
    graph.declare(
        LogicalId::from_path("Cluster"),
        ResourceSpec::Cluster(ClusterSpec {
            name: CLUSTER_NAME.to_string(),
            network,
            compute,
        }),
    )
}

fn declare_log_group(graph: &mut DeclarationGraph) -> LogicalId {
    graph.declare(
        LogicalId::from_path("LogGroup"),
        ResourceSpec::LogGroup(LogGroupSpec {
            name: LOG_GROUP_NAME.to_string(),
            stream_prefix: LOG_GROUP_NAME.to_string(),
            removal_policy: RemovalPolicy::Destroy,
        }),
    )
}

fn declare_task(
    graph: &mut DeclarationGraph,
    log_group: LogicalId,
    command: Vec<String>,
) -> LogicalId {
    graph.declare(
        LogicalId::from_path("TaskDefinition"),
        ResourceSpec::TaskDefinition(TaskDefinitionSpec {
            cpu: TASK_CPU,
            memory_mib: TASK_MEMORY_MIB,
            container: ContainerSpec {
                name: "app".to_string(),
                image: CONTAINER_IMAGE.to_string(),
                command,
                memory_mib: TASK_MEMORY_MIB,
                log_group,
                port_mappings: vec![PortMapping {
                    container_port: crate::variant::CONTAINER_PORT,
                }],
            },
        }),
    )
}
