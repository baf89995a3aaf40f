//! Recording fake for the provisioning seam
//!
//! Stands in for a real provisioning engine in tests: records every
//! declaration in order and can be armed to fail on a given resource kind,
//! simulating apply-time engine failures (lookup misses, quota rejections)
//! that must surface verbatim.

use super::{ProvisionError, Provisioner};
use crate::stack::{
    AccessPolicySpec, ClusterSpec, DatabaseSpec, LogGroupSpec, LogicalId, NamespaceSpec,
    NetworkSpec, ServiceSpec, TaskDefinitionSpec,
};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct RecordingProvisioner {
    declared: Vec<(&'static str, LogicalId)>,
    fail_on_kind: Option<(&'static str, String)>,
}

impl RecordingProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the fake to fail when the given resource kind is declared.
    pub fn fail_on(mut self, kind: &'static str, reason: impl Into<String>) -> Self {
        self.fail_on_kind = Some((kind, reason.into()));
        self
    }

    /// Declarations received so far, in order.
    pub fn declared(&self) -> &[(&'static str, LogicalId)] {
        &self.declared
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.declared.iter().map(|(kind, _)| *kind).collect()
    }

    fn record(&mut self, kind: &'static str, id: &LogicalId) -> Result<(), ProvisionError> {
        if let Some((fail_kind, reason)) = &self.fail_on_kind {
            if *fail_kind == kind {
                return Err(ProvisionError::Engine(reason.clone()));
            }
        }
        self.declared.push((kind, id.clone()));
        Ok(())
    }
}

#[async_trait]
impl Provisioner for RecordingProvisioner {
    async fn declare_network(
        &mut self,
        id: &LogicalId,
        _spec: &NetworkSpec,
    ) -> Result<(), ProvisionError> {
        self.record("network", id)
    }

    async fn declare_access_policy(
        &mut self,
        id: &LogicalId,
        _spec: &AccessPolicySpec,
    ) -> Result<(), ProvisionError> {
        self.record("access-policy", id)
    }

    async fn declare_cluster(
        &mut self,
        id: &LogicalId,
        _spec: &ClusterSpec,
    ) -> Result<(), ProvisionError> {
        self.record("cluster", id)
    }

    async fn declare_log_group(
        &mut self,
        id: &LogicalId,
        _spec: &LogGroupSpec,
    ) -> Result<(), ProvisionError> {
        self.record("log-group", id)
    }

    async fn declare_task_definition(
        &mut self,
        id: &LogicalId,
        _spec: &TaskDefinitionSpec,
    ) -> Result<(), ProvisionError> {
        self.record("task-definition", id)
    }

    async fn declare_service(
        &mut self,
        id: &LogicalId,
        _spec: &ServiceSpec,
    ) -> Result<(), ProvisionError> {
        self.record("service", id)
    }

    async fn declare_namespace(
        &mut self,
        id: &LogicalId,
        _spec: &NamespaceSpec,
    ) -> Result<(), ProvisionError> {
        self.record("namespace", id)
    }

    async fn declare_database(
        &mut self,
        id: &LogicalId,
        _spec: &DatabaseSpec,
    ) -> Result<(), ProvisionError> {
        self.record("database", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::config::DeployEnv;
    use crate::engine::synthesize;
    use crate::variant::DeploymentVariant;

    #[tokio::test]
    async fn test_records_declarations_in_dependency_order() {
        let graph = compose(&DeployEnv::default(), &DeploymentVariant::server()).unwrap();
        let mut fake = RecordingProvisioner::new();
        synthesize(&graph, &mut fake).await.unwrap();

        assert_eq!(
            fake.kinds(),
            vec![
                "network",
                "access-policy",
                "cluster",
                "log-group",
                "task-definition",
                "namespace",
                "service",
            ]
        );
    }

    #[tokio::test]
    async fn test_armed_failure_propagates_verbatim() {
        let graph = compose(&DeployEnv::default(), &DeploymentVariant::server()).unwrap();
        let mut fake = RecordingProvisioner::new().fail_on("cluster", "capacity quota exceeded");

        let err = synthesize(&graph, &mut fake).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "provisioning engine failure: capacity quota exceeded"
        );
        // Nothing after the failing declaration was attempted.
        assert_eq!(fake.kinds(), vec!["network", "access-policy"]);
    }
}
