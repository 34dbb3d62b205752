/// Taxonomy queries over organism records
use crate::bio::organism::{Lineage, OrganismNameType, OrganismRecord};

/// Database name UniProt uses for NCBI taxonomy cross-references
pub const NCBI_TAXONOMY_DB: &str = "NCBI Taxonomy";

impl OrganismRecord {
    /// First name of the given type, in document order
    pub fn name_of_type(&self, name_type: OrganismNameType) -> Option<&str> {
        self.names()
            .iter()
            .find(|n| n.name_type == name_type)
            .map(|n| n.value.as_str())
    }

    pub fn scientific_name(&self) -> Option<&str> {
        self.name_of_type(OrganismNameType::Scientific)
    }

    pub fn common_name(&self) -> Option<&str> {
        self.name_of_type(OrganismNameType::Common)
    }

    /// NCBI TaxID from the first `NCBI Taxonomy` reference.
    ///
    /// Non-numeric ids yield `None` rather than an error; later references
    /// are not consulted.
    pub fn taxon_id(&self) -> Option<u32> {
        self.db_references()
            .iter()
            .find(|r| r.db_type == NCBI_TAXONOMY_DB)
            .and_then(|r| r.id.trim().parse().ok())
    }

    pub fn lineage_depth(&self) -> usize {
        self.lineage().map(|l| l.taxa().len()).unwrap_or(0)
    }
}

impl Lineage {
    /// Render in the flat-file `OC` line style: `Eukaryota; Metazoa.`
    pub fn formatted(&self) -> String {
        if self.taxa().is_empty() {
            return String::new();
        }
        format!("{}.", self.taxa().join("; "))
    }
}

/// Longest shared prefix of two lineages
pub fn common_lineage(a: &Lineage, b: &Lineage) -> Vec<String> {
    a.taxa()
        .iter()
        .zip(b.taxa().iter())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.clone())
        .collect()
}

/// Number of ranks separating two lineages through their deepest shared taxon
pub fn lineage_distance(a: &Lineage, b: &Lineage) -> usize {
    let shared = common_lineage(a, b).len();
    (a.taxa().len() - shared) + (b.taxa().len() - shared)
}
