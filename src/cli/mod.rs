pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use crate::core::config::OutputFormat;

#[derive(Parser)]
#[command(
    name = "uniprot-organism",
    version,
    about = "Extract and validate organism records from UniProt XML",
    long_about = "Decodes <organism> and <organismHost> elements from UniProt XML documents \
                  (plain or gzipped), checks them against the schema's cardinality rules, \
                  and re-emits them as JSON, TOML, TSV or normalized XML."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", global = true, env = "ORGANISM_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode organism records and print them
    Extract(commands::extract::ExtractArgs),

    /// Check documents against the organism schema rules
    Validate(commands::validate::ValidateArgs),
}
