use crate::bio::xml::parse_organisms_file;
use crate::cli::output::*;
use crate::core::config::Config;
use clap::Args;
use colored::*;
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidateArgs {
    /// UniProt XML files (.xml or .xml.gz)
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs, config: &Config) -> anyhow::Result<()> {
    let mut codec = config.codec.clone();
    codec.strict = true;

    section_header("Organism Validation");

    let results: Vec<_> = args
        .inputs
        .par_iter()
        .map(|path| (path, parse_organisms_file(path, &codec)))
        .collect();

    let total = results.len();
    let mut first_error = None;
    let mut failures = 0;
    for (i, (path, result)) in results.into_iter().enumerate() {
        let is_last = i + 1 == total;
        let label = path.display().to_string();
        match result {
            Ok(records) => {
                let summary = format!("{} organisms", records.len());
                tree_item(is_last, &label, Some(&summary.green().to_string()));
            }
            Err(e) => {
                failures += 1;
                tree_item(is_last, &label, Some(&e.to_string().red().to_string()));
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        error(&format!("{} of {} files failed validation", failures, total));
        return Err(anyhow::Error::new(e)
            .context(format!("{} of {} files failed validation", failures, total)));
    }

    success(&format!("All {} files conform to the organism schema", total));
    Ok(())
}
