use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;
use uniprot_organism::cli::{Cli, Commands};
use uniprot_organism::core::config::{default_config, load_config};
use uniprot_organism::OrganismError;

fn main() {
    // Initialize logging with ORGANISM_LOG environment variable support
    let log_level = std::env::var("ORGANISM_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<OrganismError>() {
            Some(OrganismError::Config(_)) => 2,
            Some(OrganismError::Io(_)) => 3,
            Some(OrganismError::Xml(_))
            | Some(OrganismError::SchemaViolation(_))
            | Some(OrganismError::InvalidValue(_)) => 4,
            Some(OrganismError::NotFound(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };

    match cli.command {
        Commands::Extract(args) => uniprot_organism::cli::commands::extract::run(args, &config),
        Commands::Validate(args) => uniprot_organism::cli::commands::validate::run(args, &config),
    }
}
