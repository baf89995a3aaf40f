//! Provisioning adapter interface
//!
//! The composer stays toolkit-agnostic: it produces a
//! [`DeclarationGraph`](crate::stack::DeclarationGraph) and hands it to a
//! [`Provisioner`], a narrow capability interface with one declaration method
//! per resource kind. The shipped adapter is the [`TemplateEmitter`], which
//! turns the graph into a provisioning template; tests use the
//! [`RecordingProvisioner`] fake.
//!
//! Adapters own every real-world concern: lookups, quotas, naming collisions,
//! credentials. Their failures are surfaced verbatim to the operator; this
//! module performs no retries and no local recovery.

pub mod recording;
pub mod template;

pub use recording::RecordingProvisioner;
pub use template::{Template, TemplateEmitter, TemplateResource};

use crate::stack::{
    AccessPolicySpec, ClusterSpec, DatabaseSpec, DeclarationGraph, LogGroupSpec, LogicalId,
    NamespaceSpec, NetworkSpec, ResourceSpec, ServiceSpec, TaskDefinitionSpec,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Provisioning Delegation Failure: the external engine could not locate,
/// accept, or reconcile a declared resource. Carried unchanged to the
/// operator.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A reuse-by-name lookup found nothing.
    #[error("lookup failed for '{name}': {reason}")]
    LookupFailed { name: String, reason: String },

    /// The engine rejected a declaration (quota, permission, naming
    /// collision).
    #[error("{kind} '{id}' rejected: {reason}")]
    Rejected {
        kind: &'static str,
        id: LogicalId,
        reason: String,
    },

    /// Any other engine-side failure, passed through verbatim.
    #[error("provisioning engine failure: {0}")]
    Engine(String),
}

/// Narrow capability interface over an infrastructure-as-code toolkit.
///
/// One method per resource kind; implementations decide what "declare" means
/// (emit a template fragment, call a cloud SDK, record for assertions).
#[async_trait]
pub trait Provisioner: Send {
    async fn declare_network(
        &mut self,
        id: &LogicalId,
        spec: &NetworkSpec,
    ) -> Result<(), ProvisionError>;

    async fn declare_access_policy(
        &mut self,
        id: &LogicalId,
        spec: &AccessPolicySpec,
    ) -> Result<(), ProvisionError>;

    async fn declare_cluster(
        &mut self,
        id: &LogicalId,
        spec: &ClusterSpec,
    ) -> Result<(), ProvisionError>;

    async fn declare_log_group(
        &mut self,
        id: &LogicalId,
        spec: &LogGroupSpec,
    ) -> Result<(), ProvisionError>;

    async fn declare_task_definition(
        &mut self,
        id: &LogicalId,
        spec: &TaskDefinitionSpec,
    ) -> Result<(), ProvisionError>;

    async fn declare_service(
        &mut self,
        id: &LogicalId,
        spec: &ServiceSpec,
    ) -> Result<(), ProvisionError>;

    async fn declare_namespace(
        &mut self,
        id: &LogicalId,
        spec: &NamespaceSpec,
    ) -> Result<(), ProvisionError>;

    async fn declare_database(
        &mut self,
        id: &LogicalId,
        spec: &DatabaseSpec,
    ) -> Result<(), ProvisionError>;
}

/// Walks the graph in declaration order and dispatches every resource to the
/// adapter. The first adapter error aborts the walk and propagates verbatim.
pub async fn synthesize(
    graph: &DeclarationGraph,
    provisioner: &mut dyn Provisioner,
) -> Result<(), ProvisionError> {
    for resource in graph.resources() {
        debug!("declaring {} '{}'", resource.spec.kind(), resource.id);
        match &resource.spec {
            ResourceSpec::Network(spec) => provisioner.declare_network(&resource.id, spec).await?,
            ResourceSpec::AccessPolicy(spec) => {
                provisioner.declare_access_policy(&resource.id, spec).await?
            }
            ResourceSpec::Cluster(spec) => provisioner.declare_cluster(&resource.id, spec).await?,
            ResourceSpec::LogGroup(spec) => {
                provisioner.declare_log_group(&resource.id, spec).await?
            }
            ResourceSpec::TaskDefinition(spec) => {
                provisioner
                    .declare_task_definition(&resource.id, spec)
                    .await?
            }
            ResourceSpec::Service(spec) => provisioner.declare_service(&resource.id, spec).await?,
            ResourceSpec::Namespace(spec) => {
                provisioner.declare_namespace(&resource.id, spec).await?
            }
            ResourceSpec::Database(spec) => {
                provisioner.declare_database(&resource.id, spec).await?
            }
        }
    }
    Ok(())
}
