//! In-memory shape of a UniProt `<organism>` element.
//!
//! Records are built empty and populated by appending to the live list
//! handles, the same way a decoder fills them in document order. Nothing
//! here validates cardinality; see [`crate::bio::xml::validate_schema`].
use crate::OrganismError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type attribute of an organism `<name>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganismNameType {
    Common,
    Full,
    Scientific,
    Synonym,
    Abbreviation,
}

impl OrganismNameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Full => "full",
            Self::Scientific => "scientific",
            Self::Synonym => "synonym",
            Self::Abbreviation => "abbreviation",
        }
    }
}

impl FromStr for OrganismNameType {
    type Err = OrganismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "full" => Ok(Self::Full),
            "scientific" => Ok(Self::Scientific),
            "synonym" => Ok(Self::Synonym),
            "abbreviation" => Ok(Self::Abbreviation),
            _ => Err(OrganismError::InvalidValue(format!(
                "unknown organism name type '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for OrganismNameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganismName {
    #[serde(rename = "type")]
    pub name_type: OrganismNameType,
    pub value: String,
}

impl OrganismName {
    pub fn new(name_type: OrganismNameType, value: impl Into<String>) -> Self {
        Self {
            name_type,
            value: value.into(),
        }
    }

    pub fn scientific(value: impl Into<String>) -> Self {
        Self::new(OrganismNameType::Scientific, value)
    }

    pub fn common(value: impl Into<String>) -> Self {
        Self::new(OrganismNameType::Common, value)
    }
}

/// `<property type=".." value=".."/>` child of a database reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbProperty {
    #[serde(rename = "type")]
    pub property_type: String,
    pub value: String,
}

/// Cross-reference into an external database, e.g. `NCBI Taxonomy`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbReference {
    #[serde(rename = "type")]
    pub db_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<DbProperty>,
}

impl DbReference {
    pub fn new(db_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
            id: id.into(),
            key: None,
            evidence: None,
            properties: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn with_property(mut self, property_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(DbProperty {
            property_type: property_type.into(),
            value: value.into(),
        });
        self
    }
}

/// Ordered taxonomic classification of one organism.
///
/// A lineage only ever exists inside its [`OrganismRecord`]. Taxa keep
/// source order and are never sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lineage {
    #[serde(default)]
    taxa: Vec<String>,
}

impl Lineage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taxa(&self) -> &[String] {
        &self.taxa
    }

    /// Live handle for appending taxa
    pub fn taxa_mut(&mut self) -> &mut Vec<String> {
        &mut self.taxa
    }
}

impl<S: Into<String>> FromIterator<S> for Lineage {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            taxa: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Decoded content of one `<organism>` (or `<organismHost>`) element.
///
/// `names` and `db_references` are never absent: a fresh record hands out
/// empty sequences. `lineage` and `evidence` are true optionals, so
/// `Some("")` evidence and `None` evidence are different states.
///
/// The record holds only owned data. Mutation goes through `&mut self`, so
/// sharing one across threads needs the caller's own synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganismRecord {
    #[serde(default)]
    names: Vec<OrganismName>,
    #[serde(default)]
    db_references: Vec<DbReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lineage: Option<Lineage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evidence: Option<String>,
}

impl OrganismRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[OrganismName] {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut Vec<OrganismName> {
        &mut self.names
    }

    pub fn db_references(&self) -> &[DbReference] {
        &self.db_references
    }

    pub fn db_references_mut(&mut self) -> &mut Vec<DbReference> {
        &mut self.db_references
    }

    pub fn lineage(&self) -> Option<&Lineage> {
        self.lineage.as_ref()
    }

    pub fn lineage_mut(&mut self) -> Option<&mut Lineage> {
        self.lineage.as_mut()
    }

    /// Replace the lineage; `None` clears it
    pub fn set_lineage(&mut self, lineage: Option<Lineage>) {
        self.lineage = lineage;
    }

    pub fn evidence(&self) -> Option<&str> {
        self.evidence.as_deref()
    }

    pub fn set_evidence(&mut self, evidence: Option<String>) {
        self.evidence = evidence;
    }

    pub fn with_name(mut self, name: OrganismName) -> Self {
        self.names.push(name);
        self
    }

    pub fn with_db_reference(mut self, reference: DbReference) -> Self {
        self.db_references.push(reference);
        self
    }

    pub fn with_lineage(mut self, lineage: Lineage) -> Self {
        self.lineage = Some(lineage);
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_is_empty_not_absent() {
        let record = OrganismRecord::new();
        assert!(record.names().is_empty());
        assert!(record.db_references().is_empty());
        assert!(record.lineage().is_none());
        assert!(record.evidence().is_none());
    }

    #[test]
    fn test_live_handle_is_shared() {
        let mut record = OrganismRecord::new();
        record.names_mut().push(OrganismName::scientific("Homo sapiens"));
        record.names_mut().push(OrganismName::common("Human"));

        let values: Vec<&str> = record.names().iter().map(|n| n.value.as_str()).collect();
        assert_eq!(values, vec!["Homo sapiens", "Human"]);
    }

    #[test]
    fn test_lineage_set_and_clear() {
        let mut record = OrganismRecord::new();
        let lineage: Lineage = ["Eukaryota", "Metazoa"].into_iter().collect();

        record.set_lineage(Some(lineage.clone()));
        assert_eq!(record.lineage(), Some(&lineage));

        record.set_lineage(None);
        assert!(record.lineage().is_none());
    }

    #[test]
    fn test_empty_evidence_is_present() {
        let mut record = OrganismRecord::new();
        record.set_evidence(Some(String::new()));
        assert_eq!(record.evidence(), Some(""));
    }

    #[test]
    fn test_name_type_parsing() {
        assert_eq!(
            "scientific".parse::<OrganismNameType>().unwrap(),
            OrganismNameType::Scientific
        );
        assert_eq!(OrganismNameType::Abbreviation.to_string(), "abbreviation");
        assert!(matches!(
            "Scientific".parse::<OrganismNameType>(),
            Err(OrganismError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_json_shape() {
        let record = OrganismRecord::new()
            .with_name(OrganismName::scientific("Mus musculus"))
            .with_db_reference(DbReference::new("NCBI Taxonomy", "10090"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["names"][0]["type"], "scientific");
        assert_eq!(json["dbReferences"][0]["id"], "10090");
        assert!(json.get("lineage").is_none());
    }
}
