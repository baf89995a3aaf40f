//! Compute cluster, log group, and task definition declarations

use super::{LogicalId, RemovalPolicy};
use serde::{Deserialize, Serialize};

/// A named grouping that hosts task executions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub name: String,
    pub network: LogicalId,
    pub compute: ComputeMode,
}

/// How the cluster provides compute capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "compute", rename_all = "snake_case")]
pub enum ComputeMode {
    /// Managed serverless execution; no host instances to manage.
    Serverless,
    /// Explicit host instances with fixed capacity bounds.
    HostCapacity {
        min: u32,
        max: u32,
        instance_type: String,
    },
}

/// Destination for container logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogGroupSpec {
    pub name: String,
    pub stream_prefix: String,
    pub removal_policy: RemovalPolicy,
}

/// CPU/memory reservation plus the single application container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinitionSpec {
    /// CPU units (1024 = one vCPU).
    pub cpu: u32,
    pub memory_mib: u32,
    pub container: ContainerSpec,
}

/// The application container within a task definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    /// Fully-qualified image reference, pulled by the provisioning engine.
    pub image: String,
    /// Startup command. Empty means the image entrypoint runs unmodified.
    pub command: Vec<String>,
    pub memory_mib: u32,
    pub log_group: LogicalId,
    pub port_mappings: Vec<PortMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
}

impl ComputeMode {
    pub fn is_serverless(&self) -> bool {
        matches!(self, ComputeMode::Serverless)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_mode_serverless() {
        assert!(ComputeMode::Serverless.is_serverless());
        assert!(!ComputeMode::HostCapacity {
            min: 1,
            max: 1,
            instance_type: "t3.micro".to_string(),
        }
        .is_serverless());
    }
}
