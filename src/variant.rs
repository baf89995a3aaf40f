//! Deployment variants
//!
//! The stack deploys in exactly one of three mutually exclusive shapes,
//! modeled as a tagged sum type so each shape's settings live in one record:
//!
//! - **batch-fetch**: a one-shot dictionary fetch into a managed PostgreSQL
//!   database, running on serverless compute inside an existing network
//! - **server**: the long-running dictionary HTTP server on serverless
//!   compute behind a public load balancer, with service discovery
//! - **server-ec2**: the same server shape, but on explicit host instances
//!   with fixed capacity bounds

use crate::config::ConfigError;
use crate::stack::{ComputeMode, Credentials, SecretRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ubuntu releases the batch fetch pulls OVAL definitions for.
pub const DEFAULT_OS_VERSIONS: [&str; 5] = ["14", "16", "18", "19", "20"];

/// Name of the pre-existing network boundary the batch variant reuses.
pub const DEFAULT_NETWORK_NAME: &str = "VpcStack/Vpc";

/// Default secret-store reference for the database master password.
pub const DEFAULT_DB_SECRET: &str = "goval-dictionary/db-password";

/// Port the goval-dictionary server listens on inside the container.
pub const CONTAINER_PORT: u16 = 1324;

/// A named, mutually exclusive deployment shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum DeploymentVariant {
    BatchFetch(BatchFetchConfig),
    Server(ServerConfig),
    ServerEc2(HostServerConfig),
}

/// Serverless batch fetch into a managed database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFetchConfig {
    /// Positional OS-version arguments for the fetch command.
    pub os_versions: Vec<String>,
    /// Existing network boundary to reuse, located by name.
    pub network_name: String,
    pub db_identifier: String,
    pub db_name: String,
    pub db_port: u16,
    /// PostgreSQL major version.
    pub engine_version: String,
    pub instance_class: String,
    pub backup_retention_days: u32,
    pub credentials: Credentials,
}

impl Default for BatchFetchConfig {
    fn default() -> Self {
        Self {
            os_versions: DEFAULT_OS_VERSIONS.iter().map(|v| v.to_string()).collect(),
            network_name: DEFAULT_NETWORK_NAME.to_string(),
            db_identifier: "goval-dictionary-db".to_string(),
            db_name: "govaldb".to_string(),
            db_port: 5432,
            engine_version: "12".to_string(),
            instance_class: "db.t3.micro".to_string(),
            backup_retention_days: 7,
            credentials: Credentials {
                username: "root".to_string(),
                password: SecretRef::new(DEFAULT_DB_SECRET),
            },
        }
    }
}

impl BatchFetchConfig {
    /// Builds the container startup command, interpolating the database URL
    /// produced by the composer.
    pub fn fetch_command(&self, db_url: &str) -> Vec<String> {
        let mut command = vec!["fetch-ubuntu".to_string()];
        command.extend(self.os_versions.iter().cloned());
        command.push("-dbtype=postgres".to_string());
        command.push(format!("-dbpath={}", db_url));
        command
    }
}

/// Long-running server shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Listener port on the load balancer.
    pub http_port: u16,
    pub container_port: u16,
    /// Internet-facing load balancer when true.
    pub public: bool,
    /// Private DNS namespace for service discovery.
    pub namespace: String,
    pub record_name: String,
    pub debug_sql: bool,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: 80,
            container_port: CONTAINER_PORT,
            public: true,
            namespace: "goval-dictionary.local".to_string(),
            record_name: "goval-dictionary".to_string(),
            debug_sql: true,
            log_json: true,
        }
    }
}

impl ServerConfig {
    /// Builds the server startup command.
    pub fn server_command(&self) -> Vec<String> {
        let mut command = vec!["server".to_string()];
        if self.debug_sql {
            command.push("-debug-sql".to_string());
        }
        if self.log_json {
            command.push("-log-json".to_string());
        }
        command.push(format!("-bind={}", self.bind_address));
        command
    }
}

/// Server shape on explicit host instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostServerConfig {
    pub server: ServerConfig,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub instance_type: String,
}

impl Default for HostServerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            min_capacity: 1,
            max_capacity: 1,
            instance_type: "t3.micro".to_string(),
        }
    }
}

impl HostServerConfig {
    pub fn compute_mode(&self) -> ComputeMode {
        ComputeMode::HostCapacity {
            min: self.min_capacity,
            max: self.max_capacity,
            instance_type: self.instance_type.clone(),
        }
    }
}

impl DeploymentVariant {
    /// Default batch-fetch shape with externally injected credentials.
    pub fn batch_fetch(credentials: Credentials) -> Self {
        DeploymentVariant::BatchFetch(BatchFetchConfig {
            credentials,
            ..BatchFetchConfig::default()
        })
    }

    pub fn server() -> Self {
        DeploymentVariant::Server(ServerConfig::default())
    }

    pub fn server_ec2() -> Self {
        DeploymentVariant::ServerEc2(HostServerConfig::default())
    }

    /// Stable name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            DeploymentVariant::BatchFetch(_) => "batch-fetch",
            DeploymentVariant::Server(_) => "server",
            DeploymentVariant::ServerEc2(_) => "server-ec2",
        }
    }

    /// One-line description for operator-facing listings.
    pub fn description(&self) -> &'static str {
        match self {
            DeploymentVariant::BatchFetch(_) => {
                "one-shot OVAL fetch into a managed PostgreSQL database (serverless)"
            }
            DeploymentVariant::Server(_) => {
                "dictionary HTTP server behind a public load balancer (serverless)"
            }
            DeploymentVariant::ServerEc2(_) => {
                "dictionary HTTP server behind a public load balancer (host instances)"
            }
        }
    }

    /// All shapes with their default settings, for listings.
    pub fn all_defaults() -> Vec<Self> {
        vec![
            DeploymentVariant::BatchFetch(BatchFetchConfig::default()),
            DeploymentVariant::server(),
            DeploymentVariant::server_ec2(),
        ]
    }
}

impl fmt::Display for DeploymentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeploymentVariant {
    type Err = ConfigError;

    /// Parses a variant name into its default-configured shape.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch-fetch" => Ok(DeploymentVariant::BatchFetch(BatchFetchConfig::default())),
            "server" => Ok(DeploymentVariant::server()),
            "server-ec2" => Ok(DeploymentVariant::server_ec2()),
            other => Err(ConfigError::InvalidVariant(other.to_string())),
        }
    }
}
