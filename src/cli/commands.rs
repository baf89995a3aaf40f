use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deployment stack composer for goval-dictionary on AWS ECS
#[derive(Parser, Debug)]
#[command(
    name = "goval-stack",
    about = "Deployment stack composer for goval-dictionary on AWS ECS",
    version,
    long_about = "goval-stack composes the cloud resource declarations (network, database, \
                  cluster, task, service, service discovery) for deploying the \
                  vuls/goval-dictionary container in one of three deployment shapes, and \
                  synthesizes them into a provisioning template. It never creates cloud \
                  resources itself; apply the emitted template with your provisioning engine."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Compose a deployment and emit its provisioning template",
        long_about = "Composes the declaration graph for the selected deployment variant and \
                      synthesizes it into a provisioning template.\n\n\
                      Examples:\n  \
                      goval-stack synth --variant batch-fetch\n  \
                      goval-stack synth --variant server --format json\n  \
                      goval-stack synth --variant server-ec2 --output template.yaml"
    )]
    Synth(SynthArgs),

    #[command(about = "List the available deployment variants")]
    Variants(VariantsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct SynthArgs {
    #[arg(
        long,
        value_enum,
        default_value = "batch-fetch",
        help = "Deployment variant to compose"
    )]
    pub variant: VariantArg,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "yaml",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the template to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "ACCOUNT",
        help = "Target account (overrides environment; absent values are resolved by the engine)"
    )]
    pub account: Option<String>,

    #[arg(
        long,
        value_name = "REGION",
        help = "Target region (overrides environment; absent values are resolved by the engine)"
    )]
    pub region: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct VariantsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

/// Deployment shape selector.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantArg {
    /// One-shot OVAL fetch into a managed database
    BatchFetch,
    /// Long-running server on serverless compute
    Server,
    /// Long-running server on explicit host instances
    ServerEc2,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synth_defaults() {
        let args = CliArgs::try_parse_from(["goval-stack", "synth"]).unwrap();
        match args.command {
            Commands::Synth(synth) => {
                assert_eq!(synth.variant, VariantArg::BatchFetch);
                assert_eq!(synth.format, OutputFormatArg::Yaml);
                assert_eq!(synth.output, None);
            }
            _ => panic!("expected synth command"),
        }
    }

    #[test]
    fn test_synth_variant_and_overrides() {
        let args = CliArgs::try_parse_from([
            "goval-stack",
            "synth",
            "--variant",
            "server-ec2",
            "--account",
            "123456789012",
            "--region",
            "ap-northeast-1",
        ])
        .unwrap();
        match args.command {
            Commands::Synth(synth) => {
                assert_eq!(synth.variant, VariantArg::ServerEc2);
                assert_eq!(synth.account.as_deref(), Some("123456789012"));
                assert_eq!(synth.region.as_deref(), Some("ap-northeast-1"));
            }
            _ => panic!("expected synth command"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(CliArgs::try_parse_from(["goval-stack", "-q", "-v", "variants"]).is_err());
    }
}
