//! Output formatting for multiple formats
//!
//! Formatters for the provisioning template and the variant listing, in JSON,
//! YAML, and human-readable text.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::Template;
use crate::variant::DeploymentVariant;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Summary row for the variant listing.
#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub name: &'static str,
    pub description: &'static str,
    pub database: bool,
    pub load_balancer: bool,
    pub service_discovery: bool,
}

impl VariantSummary {
    pub fn of(variant: &DeploymentVariant) -> Self {
        let (database, load_balancer, service_discovery) = match variant {
            DeploymentVariant::BatchFetch(_) => (true, false, false),
            DeploymentVariant::Server(_) | DeploymentVariant::ServerEc2(_) => (false, true, true),
        };
        Self {
            name: variant.name(),
            description: variant.description(),
            database,
            load_balancer,
            service_discovery,
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a synthesized provisioning template.
    pub fn format_template(&self, template: &Template) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(template)
                .context("Failed to serialize template to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(template).context("Failed to serialize template to YAML")
            }
            OutputFormat::Human => Ok(self.format_template_human(template)),
        }
    }

    /// Formats the variant listing.
    pub fn format_variants(&self, variants: &[VariantSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(variants)
                .context("Failed to serialize variants to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(variants).context("Failed to serialize variants to YAML")
            }
            OutputFormat::Human => Ok(self.format_variants_human(variants)),
        }
    }

    fn format_template_human(&self, template: &Template) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", template.description));
        output.push_str(&format!(
            "Target: account={} region={}\n\n",
            template.account.as_deref().unwrap_or("(deferred)"),
            template.region.as_deref().unwrap_or("(deferred)")
        ));

        if !template.lookups.is_empty() {
            output.push_str("Lookups (resolved by the engine at apply time):\n");
            for (id, lookup) in &template.lookups {
                output.push_str(&format!("  {} => {}\n", id, lookup));
            }
            output.push('\n');
        }

        output.push_str(&format!("Resources ({}):\n", template.resources.len()));
        for (id, resource) in &template.resources {
            output.push_str(&format!("  {}  [{}]", id, resource.kind));
            if let Some(policy) = &resource.deletion_policy {
                output.push_str(&format!("  (on teardown: {})", policy));
            }
            output.push('\n');
        }

        if !template.tags.is_empty() {
            output.push_str("\nTags:\n");
            for (key, value) in &template.tags {
                output.push_str(&format!("  {}={}\n", key, value));
            }
        }

        output
    }

    fn format_variants_human(&self, variants: &[VariantSummary]) -> String {
        let mut output = String::new();
        output.push_str("Available deployment variants:\n\n");
        for summary in variants {
            output.push_str(&format!("  {}\n", summary.name));
            output.push_str(&format!("    {}\n", summary.description));
            let mut extras = Vec::new();
            if summary.database {
                extras.push("managed database");
            }
            if summary.load_balancer {
                extras.push("load balancer");
            }
            if summary.service_discovery {
                extras.push("service discovery");
            }
            if !extras.is_empty() {
                output.push_str(&format!("    includes: {}\n", extras.join(", ")));
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::config::DeployEnv;
    use crate::engine::{synthesize, TemplateEmitter};

    async fn sample_template() -> Template {
        let graph = compose(&DeployEnv::default(), &DeploymentVariant::server()).unwrap();
        let mut emitter = TemplateEmitter::for_graph(&graph);
        synthesize(&graph, &mut emitter).await.unwrap();
        emitter.finish()
    }

    #[tokio::test]
    async fn test_json_template_is_valid_json() {
        let template = sample_template().await;
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_template(&template)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["format_version"], "goval-stack/1");
    }

    #[tokio::test]
    async fn test_human_template_lists_resources() {
        let template = sample_template().await;
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_template(&template)
            .unwrap();
        assert!(output.contains("Resources"));
        assert!(output.contains("AWS::ECS::Service"));
        assert!(output.contains("account=(deferred)"));
    }

    #[test]
    fn test_variant_listing_human() {
        let summaries: Vec<VariantSummary> = DeploymentVariant::all_defaults()
            .iter()
            .map(VariantSummary::of)
            .collect();
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_variants(&summaries)
            .unwrap();
        assert!(output.contains("batch-fetch"));
        assert!(output.contains("server-ec2"));
        assert!(output.contains("managed database"));
    }

    #[test]
    fn test_variant_listing_yaml() {
        let summaries: Vec<VariantSummary> = DeploymentVariant::all_defaults()
            .iter()
            .map(VariantSummary::of)
            .collect();
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_variants(&summaries)
            .unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed.as_sequence().unwrap().len(), 3);
    }
}
