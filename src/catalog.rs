//! Type catalog
//!
//! One walk over the `grammars` section of a loaded description indexes,
//! per target namespace, the schema block's import declarations, top-level
//! named elements, complex-type declarations and simple-type declarations,
//! each stored in reduced form. Nothing is validated here: unresolved
//! references are detected lazily by the schema resolver.
//!
//! The catalog is built once at load time and never mutated afterwards, so
//! it can be read concurrently without synchronization.

use indexmap::IndexMap;
use tracing::debug;

use crate::node::{Node, Reduction};

/// All type declarations registered under one target namespace
#[derive(Debug, Clone, Default)]
pub struct SchemaBlock {
    /// Import declarations, in document order (imports carry no name)
    pub imports: Vec<IndexMap<String, String>>,
    /// Top-level named elements, reduced
    pub root_elements: IndexMap<String, Reduction>,
    /// Complex-type declarations, reduced
    pub complex_types: IndexMap<String, Reduction>,
    /// Simple-type declarations, reduced
    pub simple_types: IndexMap<String, Reduction>,
}

impl SchemaBlock {
    /// Find a declaration by name
    ///
    /// Buckets are searched in root-element, complex-type, simple-type
    /// order; the first match wins. Imports are never searched, since they
    /// carry no declarations of their own.
    pub fn declaration(&self, name: &str) -> Option<&Reduction> {
        self.root_elements
            .get(name)
            .or_else(|| self.complex_types.get(name))
            .or_else(|| self.simple_types.get(name))
    }
}

/// Per-namespace table of declared types
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    blocks: IndexMap<String, SchemaBlock>,
}

impl TypeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog from the description's `grammars` node
    ///
    /// Two schema blocks declaring the same target namespace merge into one
    /// record, later declarations winning per bucket key.
    pub fn from_grammars(grammars: &Node) -> Self {
        let mut catalog = Self::new();
        for schema in grammars.children_by_tag("schema") {
            let namespace = schema.attribute("targetNamespace").unwrap_or_default();
            let block = catalog.blocks.entry(namespace.to_string()).or_default();

            for import in schema.children_by_tag("import") {
                let attrs = import
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                block.imports.push(attrs);
            }
            fill_bucket(&mut block.root_elements, schema, "element");
            fill_bucket(&mut block.complex_types, schema, "complexType");
            fill_bucket(&mut block.simple_types, schema, "simpleType");

            debug!(
                namespace,
                root_elements = block.root_elements.len(),
                complex_types = block.complex_types.len(),
                simple_types = block.simple_types.len(),
                "registered schema block"
            );
        }
        catalog
    }

    /// The schema block registered under a namespace
    pub fn block(&self, namespace: &str) -> Option<&SchemaBlock> {
        self.blocks.get(namespace)
    }

    /// Number of registered namespaces
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no namespaces are registered
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Index one declaration tag into a bucket: keyed by the `name` attribute
/// when present, else appended under the next positional key.
fn fill_bucket(bucket: &mut IndexMap<String, Reduction>, schema: &Node, tag: &str) {
    for decl in schema.children_by_tag(tag) {
        let key = match decl.attribute("name") {
            Some(name) => name.to_string(),
            None => bucket.len().to_string(),
        };
        bucket.insert(key, decl.reduce());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::node::Reduction;

    const GRAMMARS: &str = r#"
        <application xmlns="http://wadl.dev.java.net/2009/02"
                     xmlns:xs="http://www.w3.org/2001/XMLSchema"
                     xmlns:tns="http://types.example.com">
            <grammars>
                <xs:schema targetNamespace="http://types.example.com">
                    <xs:import namespace="http://other.example.com" schemaLocation="other.xsd"/>
                    <xs:element name="Order" type="tns:OrderType"/>
                    <xs:complexType name="OrderType">
                        <xs:sequence>
                            <xs:element name="id" type="xs:string"/>
                        </xs:sequence>
                    </xs:complexType>
                    <xs:simpleType name="Code">
                        <xs:union memberTypes="xs:int xs:string"/>
                    </xs:simpleType>
                </xs:schema>
                <xs:schema targetNamespace="http://types.example.com">
                    <xs:complexType name="ExtraType">
                        <xs:sequence/>
                    </xs:complexType>
                </xs:schema>
            </grammars>
            <resources base="http://api.example.com"/>
        </application>"#;

    fn build() -> TypeCatalog {
        let doc = Document::parse(GRAMMARS).unwrap();
        let grammars = doc.root.child("grammars").unwrap();
        TypeCatalog::from_grammars(grammars)
    }

    #[test]
    fn test_blocks_indexed_by_target_namespace() {
        let catalog = build();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.block("http://types.example.com").is_some());
        assert!(catalog.block("http://unknown.example.com").is_none());
    }

    #[test]
    fn test_buckets_filled() {
        let catalog = build();
        let block = catalog.block("http://types.example.com").unwrap();
        assert_eq!(block.imports.len(), 1);
        assert_eq!(
            block.imports[0].get("schemaLocation").map(|s| s.as_str()),
            Some("other.xsd")
        );
        assert!(block.root_elements.contains_key("Order"));
        assert!(block.complex_types.contains_key("OrderType"));
        assert!(block.simple_types.contains_key("Code"));
    }

    #[test]
    fn test_same_namespace_blocks_merge() {
        let catalog = build();
        let block = catalog.block("http://types.example.com").unwrap();
        assert!(block.complex_types.contains_key("OrderType"));
        assert!(block.complex_types.contains_key("ExtraType"));
    }

    #[test]
    fn test_declaration_search_order() {
        let catalog = build();
        let block = catalog.block("http://types.example.com").unwrap();

        let order = block.declaration("Order").unwrap();
        assert_eq!(
            order.get("type").and_then(Reduction::as_text),
            Some("tns:OrderType")
        );

        let order_type = block.declaration("OrderType").unwrap();
        assert!(order_type.get("sequence").is_some());

        // Union member types are intentionally not expanded
        assert_eq!(block.declaration("Code").unwrap(), &Reduction::empty());
        assert!(block.declaration("Missing").is_none());
    }
}
