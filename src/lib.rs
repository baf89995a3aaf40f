//! goval-stack - deployment stack composer for goval-dictionary on AWS ECS
//!
//! This library composes the cloud resource declarations for deploying the
//! third-party `vuls/goval-dictionary` container (an OVAL vulnerability
//! dictionary service) onto a managed container platform, and synthesizes
//! them into a provisioning template. It creates no cloud resources itself:
//! applying or destroying the template is the job of an external provisioning
//! engine.
//!
//! # Core Concepts
//!
//! - **Declaration graph**: the typed set of resource declarations (network
//!   boundary, access policy, cluster, task definition, service, optional
//!   database and discovery namespace) produced for one deployment
//! - **Variant**: one of three mutually exclusive deployment shapes, modeled
//!   as a sum type - batch fetch with a managed database, serverless public
//!   server, or host-capacity public server
//! - **Provisioner**: a narrow async adapter interface over whatever
//!   infrastructure-as-code toolkit actually applies the declarations; the
//!   composer itself stays toolkit-agnostic
//!
//! # Example Usage
//!
//! ```
//! use goval_stack::compose::compose;
//! use goval_stack::config::DeployEnv;
//! use goval_stack::engine::{synthesize, TemplateEmitter};
//! use goval_stack::variant::DeploymentVariant;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Absent account/region are fine: the engine resolves its own defaults.
//! let env = DeployEnv::default();
//! let graph = compose(&env, &DeploymentVariant::server())?;
//!
//! let mut emitter = TemplateEmitter::for_graph(&graph);
//! synthesize(&graph, &mut emitter).await?;
//! let template = emitter.finish();
//!
//! println!("{}", serde_json::to_string_pretty(&template)?);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod cli;
pub mod compose;
pub mod config;
pub mod engine;
pub mod stack;
pub mod variant;

// Re-export key types for convenient access
pub use compose::{compose, ComposeError};
pub use config::{ConfigError, DeployEnv};
pub use engine::{
    synthesize, ProvisionError, Provisioner, RecordingProvisioner, Template, TemplateEmitter,
};
pub use stack::{DeclarationGraph, GraphError, LogicalId, ResourceSpec};
pub use variant::DeploymentVariant;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
