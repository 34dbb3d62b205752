//! XML codec for `organismType` elements.
//!
//! Decoding streams events with `quick-xml` and matches element and
//! attribute names by local name, so both the default UniProt namespace
//! and prefixed documents are accepted. `<organism>` and `<organismHost>`
//! share the same content model and are both decoded.
use crate::bio::organism::{
    DbProperty, DbReference, Lineage, OrganismName, OrganismNameType, OrganismRecord,
};
use crate::core::config::CodecConfig;
use crate::{OrganismError, Result};
use flate2::read::GzDecoder;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

pub const UNIPROT_NAMESPACE: &str = "http://uniprot.org/uniprot";

const ORGANISM_TAG: &str = "organism";
const ORGANISM_HOST_TAG: &str = "organismHost";

fn xml_error<E: std::fmt::Display>(err: E) -> OrganismError {
    OrganismError::Xml(err.to_string())
}

/// Schema position of a child element; children must not go backwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Names,
    DbReferences,
    Lineage,
}

impl Stage {
    fn element(&self) -> &'static str {
        match self {
            Stage::Names => "name",
            Stage::DbReferences => "dbReference",
            Stage::Lineage => "lineage",
        }
    }
}

/// Streaming decoder yielding every organism element in document order.
///
/// Only one event is buffered at a time, so multi-gigabyte dumps are
/// decoded without loading the document into memory. Text content is kept
/// exactly as written; whitespace between elements is ignored.
pub struct OrganismReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    strict: bool,
    element_name: String,
    done: bool,
}

impl<'a> OrganismReader<&'a [u8]> {
    pub fn from_xml(xml: &'a str, config: &CodecConfig) -> Self {
        Self::new(xml.as_bytes(), config)
    }
}

impl<R: BufRead> OrganismReader<R> {
    pub fn new(reader: R, config: &CodecConfig) -> Self {
        Self {
            reader: Reader::from_reader(reader),
            buf: Vec::new(),
            strict: config.strict,
            element_name: config.element_name.clone(),
            done: false,
        }
    }

    fn is_organism_tag(&self, local_name: &[u8]) -> bool {
        local_name == ORGANISM_TAG.as_bytes()
            || local_name == ORGANISM_HOST_TAG.as_bytes()
            || local_name == self.element_name.as_bytes()
    }

    fn next_event(&mut self) -> Result<Event<'static>> {
        let position = self.reader.buffer_position();
        self.buf.clear();
        match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => Ok(event.into_owned()),
            Err(quick_xml::Error::Io(e)) => {
                Err(OrganismError::Io(std::io::Error::new(e.kind(), e.to_string())))
            }
            Err(e) => Err(OrganismError::Xml(format!("{} (near byte {})", e, position))),
        }
    }

    fn skip(&mut self, start: &BytesStart) -> Result<()> {
        self.buf.clear();
        self.reader
            .read_to_end_into(start.name(), &mut self.buf)
            .map_err(xml_error)?;
        Ok(())
    }

    fn next_organism(&mut self) -> Result<Option<OrganismRecord>> {
        loop {
            match self.next_event()? {
                Event::Start(e) if self.is_organism_tag(e.local_name().as_ref()) => {
                    return self.read_organism(&e, false).map(Some);
                }
                Event::Empty(e) if self.is_organism_tag(e.local_name().as_ref()) => {
                    return self.read_organism(&e, true).map(Some);
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn read_organism(&mut self, start: &BytesStart, empty: bool) -> Result<OrganismRecord> {
        let mut record = OrganismRecord::new();
        for (key, value) in attributes(start)? {
            if key == "evidence" {
                record.set_evidence(Some(value));
            }
        }

        if !empty {
            let mut stage = Stage::Names;
            loop {
                match self.next_event()? {
                    Event::Start(e) => self.read_child(&mut record, &e, false, &mut stage)?,
                    Event::Empty(e) => self.read_child(&mut record, &e, true, &mut stage)?,
                    Event::End(_) => break,
                    Event::Eof => return Err(unexpected_eof(ORGANISM_TAG)),
                    _ => {}
                }
            }
        }

        let violations = schema_violations(&record);
        if !violations.is_empty() {
            self.violation(violations.join("; "))?;
        }
        Ok(record)
    }

    fn read_child(
        &mut self,
        record: &mut OrganismRecord,
        element: &BytesStart,
        empty: bool,
        stage: &mut Stage,
    ) -> Result<()> {
        match element.local_name().as_ref() {
            b"name" => {
                self.advance(stage, Stage::Names)?;
                let name = self.read_name(element, empty)?;
                record.names_mut().push(name);
            }
            b"dbReference" => {
                self.advance(stage, Stage::DbReferences)?;
                let reference = self.read_db_reference(element, empty)?;
                record.db_references_mut().push(reference);
            }
            b"lineage" => {
                if record.lineage().is_some() {
                    self.violation("organism has more than one lineage".to_string())?;
                }
                self.advance(stage, Stage::Lineage)?;
                let lineage = self.read_lineage(element, empty)?;
                record.set_lineage(Some(lineage));
            }
            other => {
                debug!(
                    element = %String::from_utf8_lossy(other),
                    "skipping unknown organism child"
                );
                if !empty {
                    self.skip(element)?;
                }
            }
        }
        Ok(())
    }

    fn advance(&self, stage: &mut Stage, next: Stage) -> Result<()> {
        if next < *stage {
            self.violation(format!(
                "<{}> appears after <{}>",
                next.element(),
                stage.element()
            ))?;
        } else {
            *stage = next;
        }
        Ok(())
    }

    /// Fails in strict mode, logs and continues otherwise
    fn violation(&self, message: String) -> Result<()> {
        if self.strict {
            return Err(OrganismError::SchemaViolation(message));
        }
        warn!(%message, "accepting schema violation in lenient mode");
        Ok(())
    }

    fn read_name(&mut self, element: &BytesStart, empty: bool) -> Result<OrganismName> {
        let name_type = required_attribute(element, "type")?.parse::<OrganismNameType>()?;
        let value = if empty {
            String::new()
        } else {
            self.read_text(element)?
        };
        Ok(OrganismName::new(name_type, value))
    }

    fn read_db_reference(&mut self, element: &BytesStart, empty: bool) -> Result<DbReference> {
        let mut reference = DbReference::new(
            required_attribute(element, "type")?,
            required_attribute(element, "id")?,
        );
        for (key, value) in attributes(element)? {
            match key.as_str() {
                "key" => reference.key = Some(value),
                "evidence" => reference.evidence = Some(value),
                _ => {}
            }
        }
        if empty {
            return Ok(reference);
        }

        loop {
            match self.next_event()? {
                Event::Start(e) => {
                    if e.local_name().as_ref() == b"property" {
                        reference.properties.push(read_property(&e)?);
                    }
                    self.skip(&e)?;
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"property" {
                        reference.properties.push(read_property(&e)?);
                    }
                }
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof("dbReference")),
                _ => {}
            }
        }
        Ok(reference)
    }

    fn read_lineage(&mut self, element: &BytesStart, empty: bool) -> Result<Lineage> {
        let mut lineage = Lineage::new();
        if empty {
            return Ok(lineage);
        }

        loop {
            match self.next_event()? {
                Event::Start(e) => {
                    if e.local_name().as_ref() == b"taxon" {
                        let taxon = self.read_text(&e)?;
                        lineage.taxa_mut().push(taxon);
                    } else {
                        self.skip(&e)?;
                    }
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"taxon" {
                        lineage.taxa_mut().push(String::new());
                    }
                }
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof("lineage")),
                _ => {}
            }
        }
        Ok(lineage)
    }

    /// Text content up to the element's end tag, unescaped and untrimmed
    fn read_text(&mut self, element: &BytesStart) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => text.push_str(&t.unescape().map_err(xml_error)?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => break,
                Event::Eof => {
                    return Err(unexpected_eof(&String::from_utf8_lossy(
                        element.local_name().as_ref(),
                    )))
                }
                _ => {}
            }
        }
        Ok(text)
    }
}

impl<R: BufRead> Iterator for OrganismReader<R> {
    type Item = Result<OrganismRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_organism() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn unexpected_eof(element: &str) -> OrganismError {
    OrganismError::Xml(format!("unexpected end of document inside <{}>", element))
}

/// Attributes keyed by local name, values unescaped
fn attributes(element: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        out.push((key, value));
    }
    Ok(out)
}

fn required_attribute(element: &BytesStart, name: &str) -> Result<String> {
    attributes(element)?
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
        .ok_or_else(|| {
            OrganismError::SchemaViolation(format!(
                "<{}> is missing required attribute '{}'",
                String::from_utf8_lossy(element.local_name().as_ref()),
                name
            ))
        })
}

fn read_property(element: &BytesStart) -> Result<DbProperty> {
    Ok(DbProperty {
        property_type: required_attribute(element, "type")?,
        value: required_attribute(element, "value")?,
    })
}

fn schema_violations(record: &OrganismRecord) -> Vec<String> {
    let mut violations = Vec::new();
    if record.names().is_empty() {
        violations.push("organism requires at least one <name>".to_string());
    }
    if record.db_references().is_empty() {
        violations.push("organism requires at least one <dbReference>".to_string());
    }
    if let Some(lineage) = record.lineage() {
        if lineage.taxa().is_empty() {
            violations.push("<lineage> requires at least one <taxon>".to_string());
        }
    }
    violations
}

/// Check an in-memory record against the schema's cardinality rules
pub fn validate_schema(record: &OrganismRecord) -> Result<()> {
    let violations = schema_violations(record);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(OrganismError::SchemaViolation(violations.join("; ")))
    }
}

/// Decode the first organism element in `xml`
pub fn parse_organism_str(xml: &str, config: &CodecConfig) -> Result<OrganismRecord> {
    OrganismReader::from_xml(xml, config)
        .next()
        .unwrap_or_else(|| {
            Err(OrganismError::NotFound(
                "no <organism> element in document".to_string(),
            ))
        })
}

/// Decode every organism element in `xml`, in document order
pub fn parse_organisms_str(xml: &str, config: &CodecConfig) -> Result<Vec<OrganismRecord>> {
    OrganismReader::from_xml(xml, config).collect()
}

/// Open a file for streaming decode; `.gz` files are decompressed on the fly
pub fn open_organisms_file<P: AsRef<Path>>(
    path: P,
    config: &CodecConfig,
) -> Result<OrganismReader<Box<dyn BufRead + Send>>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let input: Box<dyn BufRead + Send> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(OrganismReader::new(input, config))
}

/// Decode every organism in a file (supports .gz compression)
pub fn parse_organisms_file<P: AsRef<Path>>(
    path: P,
    config: &CodecConfig,
) -> Result<Vec<OrganismRecord>> {
    let path = path.as_ref();
    let records: Vec<OrganismRecord> = open_organisms_file(path, config)?.collect::<Result<_>>()?;
    info!(path = %path.display(), organisms = records.len(), "decoded organisms");
    Ok(records)
}

/// Decode several files in parallel, concatenating results in input order
pub fn parse_organisms_files<P: AsRef<Path> + Sync>(
    paths: &[P],
    config: &CodecConfig,
) -> Result<Vec<OrganismRecord>> {
    let per_file: Result<Vec<Vec<OrganismRecord>>> = paths
        .par_iter()
        .map(|path| parse_organisms_file(path, config))
        .collect();
    Ok(per_file?.into_iter().flatten().collect())
}

fn new_writer<W: Write>(out: W, indent: usize) -> Writer<W> {
    if indent == 0 {
        Writer::new(out)
    } else {
        Writer::new_with_indent(out, b' ', indent)
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, element: BytesStart, text: &str) -> Result<()> {
    let end = element.to_end().into_owned();
    writer.write_event(Event::Start(element)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer.write_event(Event::End(end)).map_err(xml_error)?;
    Ok(())
}

fn write_record<W: Write>(
    writer: &mut Writer<W>,
    record: &OrganismRecord,
    config: &CodecConfig,
    with_namespace: bool,
) -> Result<()> {
    let mut start = BytesStart::new(config.element_name.as_str());
    if with_namespace {
        start.push_attribute(("xmlns", UNIPROT_NAMESPACE));
    }
    if let Some(evidence) = record.evidence() {
        start.push_attribute(("evidence", evidence));
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)?;

    for name in record.names() {
        let mut element = BytesStart::new("name");
        element.push_attribute(("type", name.name_type.as_str()));
        write_text_element(writer, element, &name.value)?;
    }

    for reference in record.db_references() {
        let mut element = BytesStart::new("dbReference");
        element.push_attribute(("type", reference.db_type.as_str()));
        element.push_attribute(("id", reference.id.as_str()));
        if let Some(key) = &reference.key {
            element.push_attribute(("key", key.as_str()));
        }
        if let Some(evidence) = &reference.evidence {
            element.push_attribute(("evidence", evidence.as_str()));
        }

        if reference.properties.is_empty() {
            writer.write_event(Event::Empty(element)).map_err(xml_error)?;
            continue;
        }
        writer.write_event(Event::Start(element)).map_err(xml_error)?;
        for property in &reference.properties {
            let mut child = BytesStart::new("property");
            child.push_attribute(("type", property.property_type.as_str()));
            child.push_attribute(("value", property.value.as_str()));
            writer.write_event(Event::Empty(child)).map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("dbReference")))
            .map_err(xml_error)?;
    }

    if let Some(lineage) = record.lineage() {
        if lineage.taxa().is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new("lineage")))
                .map_err(xml_error)?;
        } else {
            writer
                .write_event(Event::Start(BytesStart::new("lineage")))
                .map_err(xml_error)?;
            for taxon in lineage.taxa() {
                write_text_element(writer, BytesStart::new("taxon"), taxon)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("lineage")))
                .map_err(xml_error)?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(config.element_name.as_str())))
        .map_err(xml_error)?;
    Ok(())
}

/// Encode one record as a standalone element
pub fn write_organism_string(record: &OrganismRecord, config: &CodecConfig) -> Result<String> {
    if config.strict {
        validate_schema(record)?;
    }
    let mut writer = new_writer(Vec::new(), config.indent);
    write_record(&mut writer, record, config, config.namespace)?;
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

/// Strict-mode cardinality check over a batch, naming the first bad record
fn check_records(records: &[OrganismRecord], config: &CodecConfig) -> Result<()> {
    if !config.strict {
        return Ok(());
    }
    for (i, record) in records.iter().enumerate() {
        validate_schema(record).map_err(|e| match e {
            OrganismError::SchemaViolation(msg) => {
                OrganismError::SchemaViolation(format!("record {}: {}", i + 1, msg))
            }
            other => other,
        })?;
    }
    Ok(())
}

fn write_document<W: Write>(out: W, records: &[OrganismRecord], config: &CodecConfig) -> Result<()> {
    let mut writer = new_writer(out, config.indent);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("organisms");
    if config.namespace {
        root.push_attribute(("xmlns", UNIPROT_NAMESPACE));
    }
    writer.write_event(Event::Start(root)).map_err(xml_error)?;
    for record in records {
        write_record(&mut writer, record, config, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("organisms")))
        .map_err(xml_error)?;

    writer.into_inner().flush()?;
    Ok(())
}

/// Encode records as an `<organisms>` document.
///
/// In strict mode every record is checked before the first byte is written.
pub fn write_organisms<W: Write>(out: W, records: &[OrganismRecord], config: &CodecConfig) -> Result<()> {
    check_records(records, config)?;
    write_document(out, records, config)
}

/// Encode records to a file (supports .gz compression).
///
/// A record refused in strict mode leaves any existing file untouched.
pub fn write_organisms_file<P: AsRef<Path>>(
    path: P,
    records: &[OrganismRecord],
    config: &CodecConfig,
) -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    check_records(records, config)?;

    let path = path.as_ref();
    let file = File::create(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = BufWriter::new(encoder);
        write_document(&mut writer, records, config)?;
        // finish() writes the gzip trailer; dropping the encoder would hide its errors
        let encoder = writer.into_inner().map_err(|e| e.into_error())?;
        encoder.finish()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_document(&mut writer, records, config)?;
        writer.flush()?;
    }

    Ok(())
}
