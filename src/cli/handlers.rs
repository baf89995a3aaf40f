//! Command handlers
//!
//! Each handler turns parsed arguments into an exit code, logging errors and
//! printing results. Provisioning-engine failures are printed verbatim; this
//! layer adds no recovery of its own.

use super::commands::{SynthArgs, VariantArg, VariantsArgs};
use super::output::{OutputFormatter, VariantSummary};
use crate::compose::compose;
use crate::config::{database_credentials_from_env, DeployEnv};
use crate::engine::{synthesize, TemplateEmitter};
use crate::variant::DeploymentVariant;
use anyhow::{Context, Result};
use std::fs;
use tracing::{debug, error, info};

/// Handles `goval-stack synth`.
pub async fn handle_synth(args: &SynthArgs, quiet: bool) -> i32 {
    match run_synth(args).await {
        Ok(output) => {
            match &args.output {
                Some(path) => {
                    if let Err(e) = fs::write(path, &output)
                        .with_context(|| format!("Failed to write {}", path.display()))
                    {
                        error!("{:#}", e);
                        return 1;
                    }
                    if !quiet {
                        eprintln!("Template written to {}", path.display());
                    }
                }
                None => print!("{}", output),
            }
            0
        }
        Err(e) => {
            error!("Synthesis failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn run_synth(args: &SynthArgs) -> Result<String> {
    let mut env = DeployEnv::from_env();
    if let Some(account) = &args.account {
        env = env.with_account(account.clone());
    }
    if let Some(region) = &args.region {
        env = env.with_region(region.clone());
    }
    debug!("deployment target: {}", env);

    let variant = build_variant(args.variant);
    info!("synthesizing variant '{}'", variant.name());

    let graph = compose(&env, &variant).context("Failed to compose declaration graph")?;

    let mut emitter = TemplateEmitter::for_graph(&graph);
    synthesize(&graph, &mut emitter)
        .await
        .context("Provisioning adapter rejected the declaration graph")?;
    let template = emitter.finish();

    let formatter = OutputFormatter::new(args.format.into());
    formatter.format_template(&template)
}

/// Handles `goval-stack variants`.
pub async fn handle_variants(args: &VariantsArgs) -> i32 {
    let summaries: Vec<VariantSummary> = DeploymentVariant::all_defaults()
        .iter()
        .map(VariantSummary::of)
        .collect();

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_variants(&summaries) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format variants: {:#}", e);
            1
        }
    }
}

/// Builds the selected variant; the batch shape picks up externally injected
/// database credentials.
fn build_variant(arg: VariantArg) -> DeploymentVariant {
    match arg {
        VariantArg::BatchFetch => DeploymentVariant::batch_fetch(database_credentials_from_env()),
        VariantArg::Server => DeploymentVariant::server(),
        VariantArg::ServerEc2 => DeploymentVariant::server_ec2(),
    }
}
