use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub codec: CodecConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Enforce name/dbReference/taxon cardinality and child order
    pub strict: bool,
    /// Tag written for each record; `organismHost` is the other schema use
    pub element_name: String,
    /// Spaces per nesting level when writing (0 = compact)
    pub indent: usize,
    /// Emit the UniProt default namespace on written documents
    pub namespace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Toml,
    #[serde(alias = "tab")]
    Tsv,
    Xml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "toml" => Ok(OutputFormat::Toml),
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict: true,
            element_name: "organism".to_string(),
            indent: 2,
            namespace: false,
        }
    }
}

impl CodecConfig {
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::OrganismError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::OrganismError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::OrganismError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::OrganismError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
