/// Tests for the organism record data model
///
/// These tests pin down the contracts callers rely on:
/// - list accessors preserve insertion order and are live handles
/// - empty sequences and absent optionals are distinct states
/// - lineage and evidence setters round-trip exactly
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use uniprot_organism::{DbReference, Lineage, OrganismName, OrganismNameType, OrganismRecord};

#[test]
fn test_empty_record_distinguishes_empty_from_absent() {
    let record = OrganismRecord::new();

    // Sequences exist and are empty
    assert_eq!(record.names(), &[] as &[OrganismName]);
    assert_eq!(record.db_references(), &[] as &[DbReference]);

    // Optionals are absent, not empty
    assert_eq!(record.lineage(), None);
    assert_eq!(record.evidence(), None);

    // A present-but-empty lineage is a different state from no lineage
    let mut with_empty = OrganismRecord::new();
    with_empty.set_lineage(Some(Lineage::new()));
    assert_ne!(with_empty, record);
    assert_eq!(with_empty.lineage().map(|l| l.taxa().len()), Some(0));
}

#[test]
fn test_mutation_visible_through_later_handles() {
    let mut record = OrganismRecord::new();

    let handle = record.names_mut();
    handle.push(OrganismName::scientific("Homo sapiens"));

    let again = record.names_mut();
    again.push(OrganismName::common("Human"));

    assert_eq!(record.names().len(), 2);
    assert_eq!(record.names()[0].value, "Homo sapiens");
    assert_eq!(record.names()[1].value, "Human");
}

#[test]
fn test_lineage_lifecycle() {
    let mut record = OrganismRecord::new();
    assert!(record.lineage().is_none());

    let lineage: Lineage = ["Eukaryota", "Metazoa", "Chordata"].into_iter().collect();
    record.set_lineage(Some(lineage.clone()));
    assert_eq!(record.lineage(), Some(&lineage));

    record
        .lineage_mut()
        .expect("lineage was just set")
        .taxa_mut()
        .push("Craniata".to_string());
    assert_eq!(record.lineage_depth(), 4);

    record.set_lineage(None);
    assert!(record.lineage().is_none());
}

#[rstest]
#[case("")]
#[case("ECO:0000313")]
#[case("ECO:0000269|PubMed:12345")]
#[case("  padded  ")]
fn test_evidence_round_trip(#[case] evidence: &str) {
    let mut record = OrganismRecord::new();
    record.set_evidence(Some(evidence.to_string()));
    assert_eq!(record.evidence(), Some(evidence));

    record.set_evidence(None);
    assert_eq!(record.evidence(), None);
}

#[rstest]
#[case("common", OrganismNameType::Common)]
#[case("full", OrganismNameType::Full)]
#[case("scientific", OrganismNameType::Scientific)]
#[case("synonym", OrganismNameType::Synonym)]
#[case("abbreviation", OrganismNameType::Abbreviation)]
fn test_name_type_attribute_values(#[case] raw: &str, #[case] expected: OrganismNameType) {
    let parsed: OrganismNameType = raw.parse().unwrap();
    assert_eq!(parsed, expected);
    assert_eq!(parsed.as_str(), raw);
}

proptest! {
    #[test]
    fn prop_names_preserve_insertion_order(values in proptest::collection::vec(".*", 0..20)) {
        let mut record = OrganismRecord::new();
        for value in &values {
            record.names_mut().push(OrganismName::new(OrganismNameType::Synonym, value.clone()));
        }
        let stored: Vec<String> = record.names().iter().map(|n| n.value.clone()).collect();
        prop_assert_eq!(stored, values);
    }

    #[test]
    fn prop_db_references_preserve_insertion_order(ids in proptest::collection::vec("[0-9]{1,7}", 0..20)) {
        let mut record = OrganismRecord::new();
        for id in &ids {
            record.db_references_mut().push(DbReference::new("NCBI Taxonomy", id.clone()));
        }
        prop_assert_eq!(record.db_references().len(), ids.len());
        for (reference, id) in record.db_references().iter().zip(&ids) {
            prop_assert_eq!(&reference.id, id);
        }
    }

    #[test]
    fn prop_taxa_are_never_reordered(taxa in proptest::collection::vec("[A-Z][a-z]{2,12}", 0..30)) {
        let mut lineage = Lineage::new();
        for taxon in &taxa {
            lineage.taxa_mut().push(taxon.clone());
        }
        prop_assert_eq!(lineage.taxa(), taxa.as_slice());
    }
}
