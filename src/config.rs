//! Deployment target and credential configuration
//!
//! Configuration is read from environment variables at composition start and
//! passed through unchanged. The deployment target (account and region) may
//! be entirely absent; resolution is then deferred to the provisioning
//! engine's own defaults, never treated as an error here.
//!
//! # Environment Variables
//!
//! - `CDK_DEFAULT_ACCOUNT` / `CDK_DEFAULT_REGION`: target account and region
//!   as set by the surrounding deployment toolchain
//! - `GOVAL_STACK_ACCOUNT` / `GOVAL_STACK_REGION`: explicit overrides taking
//!   precedence over the defaults above
//! - `GOVAL_STACK_DB_USER`: database master username - default: "root"
//! - `GOVAL_STACK_DB_SECRET`: secret-store reference for the database master
//!   password - default: "goval-dictionary/db-password". Only the reference
//!   name is ever read; the secret value stays in the engine's secret store.
//! - `GOVAL_STACK_LOG_LEVEL`: logging level - default: "info"

use crate::stack::{Credentials, SecretRef};
use crate::variant::DEFAULT_DB_SECRET;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use thiserror::Error;

pub const ENV_DEFAULT_ACCOUNT: &str = "CDK_DEFAULT_ACCOUNT";
pub const ENV_DEFAULT_REGION: &str = "CDK_DEFAULT_REGION";
pub const ENV_ACCOUNT_OVERRIDE: &str = "GOVAL_STACK_ACCOUNT";
pub const ENV_REGION_OVERRIDE: &str = "GOVAL_STACK_REGION";
pub const ENV_DB_USER: &str = "GOVAL_STACK_DB_USER";
pub const ENV_DB_SECRET: &str = "GOVAL_STACK_DB_SECRET";

const DEFAULT_DB_USER: &str = "root";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown deployment variant name
    #[error("invalid variant: {0}. Valid options: batch-fetch, server, server-ec2")]
    InvalidVariant(String),
}

/// Ambient deployment target identifiers.
///
/// Either field may be `None`; composition proceeds regardless and the
/// provisioning engine resolves its own defaults at apply time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeployEnv {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl DeployEnv {
    /// Reads the deployment target from the environment.
    ///
    /// Override variables win over the toolchain defaults; blank values are
    /// treated as absent.
    pub fn from_env() -> Self {
        Self {
            account: read_var(ENV_ACCOUNT_OVERRIDE).or_else(|| read_var(ENV_DEFAULT_ACCOUNT)),
            region: read_var(ENV_REGION_OVERRIDE).or_else(|| read_var(ENV_DEFAULT_REGION)),
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl fmt::Display for DeployEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "account={} region={}",
            self.account.as_deref().unwrap_or("(deferred)"),
            self.region.as_deref().unwrap_or("(deferred)")
        )
    }
}

/// Reads database master credentials from the environment.
///
/// The password is always a secret-store reference; there is no code path
/// that accepts a literal password value.
pub fn database_credentials_from_env() -> Credentials {
    Credentials {
        username: read_var(ENV_DB_USER).unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
        password: SecretRef::new(
            read_var(ENV_DB_SECRET).unwrap_or_else(|| DEFAULT_DB_SECRET.to_string()),
        ),
    }
}

fn read_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
