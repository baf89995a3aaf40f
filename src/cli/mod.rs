pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, OutputFormatArg, SynthArgs, VariantArg, VariantsArgs};
pub use output::{OutputFormat, OutputFormatter, VariantSummary};
