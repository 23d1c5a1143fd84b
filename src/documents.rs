//! Description document parsing
//!
//! Turns description bytes into the typed [`Node`] tree plus the document's
//! namespace-prefix table. Each element's owning namespace is resolved from
//! the prefix declarations in scope at its position, so node-kind dispatch
//! can run on (namespace, tag) pairs.
//!
//! Conformance checking of the description against its meta-schema is not
//! done here; see [`crate::transport::ConformanceChecker`].

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::NamespaceMap;
use crate::node::Node;

/// A parsed description document
#[derive(Debug, Clone)]
pub struct Document {
    /// Root node of the description
    pub root: Node,
    /// Every namespace prefix declared anywhere in the document
    pub namespaces: NamespaceMap,
}

/// Element under construction while its children are still being read
struct PendingElement {
    tag: String,
    namespace: Option<String>,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
}

/// Prefix declarations introduced by one element
struct Scope {
    prefixes: HashMap<String, String>,
    default_namespace: Option<String>,
}

impl Document {
    /// Parse a description from a string with default limits
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse a description from a string
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.trim_text(true);

        let mut namespaces = NamespaceMap::new();
        let mut stack: Vec<PendingElement> = Vec::new();
        let mut scopes: Vec<Scope> = Vec::new();
        let mut root: Option<Node> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_xml_depth(stack.len() + 1)?;
                    let pending = open_element(&e, limits, &mut namespaces, &mut scopes)?;
                    stack.push(pending);
                }
                Ok(Event::End(_)) => {
                    scopes.pop();
                    if let Some(done) = stack.pop() {
                        let node = done.into_node();
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => {
                                if root.is_none() {
                                    root = Some(node);
                                }
                            }
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_xml_depth(stack.len() + 1)?;
                    let pending = open_element(&e, limits, &mut namespaces, &mut scopes)?;
                    scopes.pop();
                    let node = pending.into_node();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => {
                            if root.is_none() {
                                root = Some(node);
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                // Text, comments, processing instructions carry nothing the
                // typed model uses.
                _ => {}
            }
            buf.clear();
        }

        let root = root.ok_or_else(|| Error::Xml("document has no root element".to_string()))?;
        Ok(Self { root, namespaces })
    }
}

impl PendingElement {
    fn into_node(self) -> Node {
        Node::new(self.tag, self.namespace, self.attributes, self.children)
    }
}

/// Read one start tag: collect its namespace declarations into a new scope,
/// resolve the element's owning namespace, and gather its plain attributes
/// keyed by local name.
fn open_element(
    start: &BytesStart,
    limits: &Limits,
    namespaces: &mut NamespaceMap,
    scopes: &mut Vec<Scope>,
) -> Result<PendingElement> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())
        .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
        .to_string();

    let mut scope = Scope {
        prefixes: HashMap::new(),
        default_namespace: None,
    };
    let mut attributes = IndexMap::new();

    for attr_result in start.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;

        let attr_name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?;
        let attr_value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
            .to_string();

        if attr_name == "xmlns" {
            namespaces.declare_default(&attr_value);
            scope.default_namespace = Some(attr_value);
        } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
            namespaces.declare_prefix(prefix, &attr_value);
            scope.prefixes.insert(prefix.to_string(), attr_value);
        } else {
            // Plain attribute, keyed by local name
            let local = attr_name
                .split_once(':')
                .map(|(_, local)| local)
                .unwrap_or(attr_name);
            attributes.insert(local.to_string(), attr_value);
        }
    }
    limits.check_attributes(attributes.len())?;

    scopes.push(scope);

    let (tag, namespace) = match name.find(':') {
        Some(pos) => {
            let prefix = &name[..pos];
            let uri = lookup_prefix(scopes, prefix).ok_or_else(|| {
                Error::Xml(format!("undeclared namespace prefix '{}'", prefix))
            })?;
            (name[pos + 1..].to_string(), Some(uri))
        }
        None => {
            let default = lookup_default(scopes);
            (name, default)
        }
    };

    Ok(PendingElement {
        tag,
        namespace,
        attributes,
        children: Vec::new(),
    })
}

fn lookup_prefix(scopes: &[Scope], prefix: &str) -> Option<String> {
    scopes
        .iter()
        .rev()
        .find_map(|scope| scope.prefixes.get(prefix).cloned())
}

fn lookup_default(scopes: &[Scope]) -> Option<String> {
    scopes
        .iter()
        .rev()
        .find_map(|scope| scope.default_namespace.clone())
}
