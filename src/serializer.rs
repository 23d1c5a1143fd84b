//! Wire document serialization
//!
//! Turns a validated, normalized value tree into a namespaced XML document
//! string: one child element per key of a keyed mapping, one sibling
//! element per item of an ordered sequence, and escaped text for scalar
//! leaves. The root element declares the representation's target namespace
//! as its default namespace.
//!
//! Whether a value is a keyed mapping or an ordered sequence is decided
//! structurally: an object counts as a keyed mapping iff at least one of
//! its keys is non-numeric.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::validator::scalar_text;

/// Serializer for validated argument trees
#[derive(Debug, Clone)]
pub struct XmlSerializer {
    version: String,
    encoding: String,
}

impl Default for XmlSerializer {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
        }
    }
}

impl XmlSerializer {
    /// Serializer with the given XML declaration version and encoding
    pub fn new(version: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            encoding: encoding.into(),
        }
    }

    /// Serialize a value tree into a document rooted at `root_name`,
    /// declaring `namespace` as the default namespace
    pub fn serialize(&self, root_name: &str, namespace: &str, value: &Value) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        write(
            &mut writer,
            Event::Decl(BytesDecl::new(&self.version, Some(&self.encoding), None)),
        )?;

        let mut root = BytesStart::new(root_name);
        root.push_attribute(("xmlns", namespace));
        write(&mut writer, Event::Start(root))?;

        match value {
            Value::Object(map) => {
                for (key, nested) in map {
                    write_entry(&mut writer, key, nested)?;
                }
            }
            Value::Array(_) => {
                return Err(Error::Xml(
                    "root value must be a mapping or a scalar".to_string(),
                ));
            }
            scalar => {
                write(&mut writer, Event::Text(BytesText::new(&scalar_text(scalar))))?;
            }
        }

        write(&mut writer, Event::End(BytesEnd::new(root_name)))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Xml(format!("serialized document is not valid UTF-8: {}", e)))
    }
}

/// Write one field: sequences fan out into sibling elements under the same
/// tag; everything else becomes a single element.
fn write_entry(writer: &mut Writer<Vec<u8>>, tag: &str, value: &Value) -> Result<()> {
    if let Some(items) = as_sequence(value) {
        for item in items {
            write_element(writer, tag, item)?;
        }
        return Ok(());
    }
    write_element(writer, tag, value)
}

fn write_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            write(writer, Event::Start(BytesStart::new(tag)))?;
            for (key, nested) in map {
                write_entry(writer, key, nested)?;
            }
            write(writer, Event::End(BytesEnd::new(tag)))?;
        }
        Value::Array(items) => {
            // A sequence directly inside a sequence flattens into siblings
            for item in items {
                write_element(writer, tag, item)?;
            }
        }
        scalar => {
            write(writer, Event::Start(BytesStart::new(tag)))?;
            write(writer, Event::Text(BytesText::new(&scalar_text(scalar))))?;
            write(writer, Event::End(BytesEnd::new(tag)))?;
        }
    }
    Ok(())
}

/// An ordered-sequence view of a value: arrays always, objects only when
/// no key is non-numeric
fn as_sequence(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(map) if map.keys().all(|k| k.parse::<u64>().is_ok()) => {
            Some(map.values().collect())
        }
        _ => None,
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("failed to write XML: {}", e)))
}
