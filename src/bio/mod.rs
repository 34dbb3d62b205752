pub mod organism;
pub mod taxonomy;
pub mod xml;

pub use organism::{DbReference, Lineage, OrganismName, OrganismNameType, OrganismRecord};
pub use xml::{parse_organism_str, parse_organisms_file, parse_organisms_str, write_organism_string};
