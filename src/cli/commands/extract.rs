use crate::bio::organism::OrganismRecord;
use crate::bio::xml::{parse_organisms_files, write_organisms, write_organisms_file};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::OrganismError;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ExtractArgs {
    /// UniProt XML files (.xml or .xml.gz)
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Output format: json, toml, tsv or xml (default from config)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Accept organisms that break the schema's cardinality or order rules
    #[arg(long)]
    pub lenient: bool,

    /// Write to FILE instead of stdout (xml output to *.gz is compressed)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// TOML has no top-level arrays, so records go under `[[organism]]`
#[derive(Serialize)]
struct OrganismDocument<'a> {
    organism: &'a [OrganismRecord],
}

const TSV_HEADER: &str = "scientific_name\tcommon_name\ttaxon_id\tevidence\tlineage";

fn tsv_field(value: Option<&str>) -> String {
    value.unwrap_or("").replace(['\t', '\n', '\r'], " ")
}

/// Render records in the requested format
pub fn render(
    records: &[OrganismRecord],
    format: OutputFormat,
    config: &Config,
) -> Result<String, OrganismError> {
    match format {
        OutputFormat::Json => {
            let mut json = if config.output.pretty {
                serde_json::to_string_pretty(records)?
            } else {
                serde_json::to_string(records)?
            };
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Toml => {
            let document = OrganismDocument { organism: records };
            let rendered = if config.output.pretty {
                toml::to_string_pretty(&document)
            } else {
                toml::to_string(&document)
            };
            rendered.map_err(|e| OrganismError::Serialization(e.to_string()))
        }
        OutputFormat::Tsv => {
            let mut out = String::from(TSV_HEADER);
            out.push('\n');
            for record in records {
                let taxon_id = record.taxon_id().map(|id| id.to_string());
                let lineage = record.lineage().map(|l| l.formatted());
                let row = [
                    tsv_field(record.scientific_name()),
                    tsv_field(record.common_name()),
                    tsv_field(taxon_id.as_deref()),
                    tsv_field(record.evidence()),
                    tsv_field(lineage.as_deref()),
                ];
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Xml => {
            let mut buffer = Vec::new();
            write_organisms(&mut buffer, records, &config.codec)?;
            buffer.push(b'\n');
            String::from_utf8(buffer).map_err(|e| OrganismError::Xml(e.to_string()))
        }
    }
}

pub fn run(args: ExtractArgs, config: &Config) -> anyhow::Result<()> {
    let mut config = config.clone();
    if args.lenient {
        config.codec.strict = false;
    }
    let format = args.format.unwrap_or(config.output.format);

    let records = parse_organisms_files(&args.inputs, &config.codec)?;
    tracing::info!(
        files = args.inputs.len(),
        organisms = records.len(),
        "extracted organisms"
    );

    match (&args.output, format) {
        (Some(path), OutputFormat::Xml) => write_organisms_file(path, &records, &config.codec)?,
        (Some(path), _) => std::fs::write(path, render(&records, format, &config)?)?,
        (None, _) => print!("{}", render(&records, format, &config)?),
    }

    Ok(())
}
