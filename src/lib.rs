pub mod bio;
pub mod cli;
pub mod core;

pub use crate::bio::organism::{
    DbProperty, DbReference, Lineage, OrganismName, OrganismNameType, OrganismRecord,
};
pub use crate::core::config::{CodecConfig, Config};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrganismError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for OrganismError {
    fn from(err: serde_json::Error) -> Self {
        OrganismError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrganismError>;
