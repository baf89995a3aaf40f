//! Managed relational database declarations
//!
//! The database is declared with an injected secret reference for its
//! password, never a literal value: the provisioning engine resolves the
//! reference against its secret store at apply time.

use super::{LogicalId, RemovalPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A managed relational database instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    /// Instance identifier visible in the cloud console.
    pub identifier: String,
    pub engine: DatabaseEngine,
    /// Instance class, e.g. "db.t3.micro".
    pub instance_class: String,
    /// Name of the initial database created on the instance.
    pub database_name: String,
    pub port: u16,
    pub credentials: Credentials,
    pub network: LogicalId,
    pub access_policy: LogicalId,
    pub iam_authentication: bool,
    pub performance_insights: bool,
    pub auto_minor_version_upgrade: bool,
    pub multi_az: bool,
    pub backup_retention_days: u32,
    pub deletion_protection: bool,
    pub removal_policy: RemovalPolicy,
}

/// Database engine and major version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgres { version: String },
    Mysql { version: String },
}

/// Master credentials: a username plus a secret-store reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: SecretRef,
}

/// Reference into the provisioning engine's secret store. Holds the secret's
/// name, never its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretRef(String);

impl SecretRef {
    pub fn new(name: impl Into<String>) -> Self {
        SecretRef(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretRef {
    /// Renders as a resolution token, so a secret name can never leak into
    /// output as if it were the secret value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{secret:{}}}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_ref_renders_as_token() {
        let secret = SecretRef::new("goval-dictionary/db-password");
        assert_eq!(secret.to_string(), "${secret:goval-dictionary/db-password}");
        assert_eq!(secret.name(), "goval-dictionary/db-password");
    }

    #[test]
    fn test_engine_serializes_with_tag() {
        let engine = DatabaseEngine::Postgres {
            version: "12".to_string(),
        };
        let json = serde_json::to_value(&engine).unwrap();
        assert_eq!(json["engine"], "postgres");
        assert_eq!(json["version"], "12");
    }
}
