//! Schema resolution
//!
//! Expands a namespace-prefixed type reference (`prefix:localName`) into a
//! fully resolved field schema by following nested type references,
//! extension (inheritance) relationships and sequence member lists across
//! the type catalog. Resolution bottoms out at the XSD namespace, whose
//! local names become scalar markers and are never expanded further.
//!
//! Resolution is a pure function over the immutable catalog. A
//! visited-reference set turns cyclic type graphs into
//! [`Error::CyclicTypeReference`] instead of unbounded recursion.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::catalog::TypeCatalog;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceMap, QName};
use crate::node::Reduction;
use crate::XSD_NAMESPACE;

/// Fully resolved field structure of one representation
///
/// Either a scalar marker (the local name of an XSD built-in type) or a
/// mapping from field name to that field's spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSchema {
    /// Leaf: name of a built-in scalar type (`string`, `dateTime`, …)
    Scalar(String),
    /// Structured content: field name → spec, in declaration order
    Fields(IndexMap<String, FieldSpec>),
}

impl FieldSchema {
    /// Empty field mapping
    pub fn empty() -> Self {
        FieldSchema::Fields(IndexMap::new())
    }

    /// View as a field mapping
    pub fn as_fields(&self) -> Option<&IndexMap<String, FieldSpec>> {
        match self {
            FieldSchema::Fields(fields) => Some(fields),
            FieldSchema::Scalar(_) => None,
        }
    }

    /// Whether this schema is a scalar marker
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldSchema::Scalar(_))
    }
}

/// One declared field inside a resolved schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field's nested schema
    pub content: FieldSchema,
    /// Declared attributes other than `name` and `type`
    /// (minOccurs/maxOccurs/default/…), omitted entirely when empty
    pub properties: Option<IndexMap<String, String>>,
}

impl FieldSpec {
    fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.get(name))
            .map(|s| s.as_str())
    }

    /// A field is repeatable when it carries a `minOccurs` and/or
    /// `maxOccurs` whose value is not the `"0"` sentinel
    pub fn is_repeatable(&self) -> bool {
        self.property("maxOccurs").is_some_and(|v| v != "0")
            || self.property("minOccurs").is_some_and(|v| v != "0")
    }

    /// Declared minimum occurrence count, when numeric
    pub fn min_occurs(&self) -> Option<u64> {
        self.property("minOccurs").and_then(|v| v.parse().ok())
    }

    /// Declared maximum occurrence count, when numeric
    /// (`"unbounded"` yields `None`)
    pub fn max_occurs(&self) -> Option<u64> {
        self.property("maxOccurs").and_then(|v| v.parse().ok())
    }

    /// A non-repeatable field is optional when it declares `minOccurs="0"`
    pub fn is_optional(&self) -> bool {
        self.property("minOccurs") == Some("0")
    }

    /// Declared default value, if any
    pub fn default_value(&self) -> Option<&str> {
        self.property("default")
    }
}

/// Recursive type-reference resolver over the immutable catalog
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    namespaces: &'a NamespaceMap,
    catalog: &'a TypeCatalog,
    limits: &'a Limits,
}

impl<'a> SchemaResolver<'a> {
    /// Create a resolver over a document's namespace table and catalog
    pub fn new(namespaces: &'a NamespaceMap, catalog: &'a TypeCatalog, limits: &'a Limits) -> Self {
        Self {
            namespaces,
            catalog,
            limits,
        }
    }

    /// Resolve a `prefix:localName` reference into a field schema
    pub fn resolve(&self, reference: &str) -> Result<FieldSchema> {
        let mut path = HashSet::new();
        self.resolve_inner(reference, &mut path)
    }

    fn resolve_inner(&self, reference: &str, path: &mut HashSet<String>) -> Result<FieldSchema> {
        let qname = self.namespaces.resolve_ref(reference)?;
        let namespace = qname.namespace.as_deref().unwrap_or_default();

        if namespace == XSD_NAMESPACE {
            trace!(reference, "resolved to built-in scalar");
            return Ok(FieldSchema::Scalar(qname.local_name));
        }

        let key = qname.to_string();
        if !path.insert(key.clone()) {
            return Err(Error::CyclicTypeReference {
                reference: reference.to_string(),
            });
        }
        self.limits.check_resolution_depth(path.len())?;

        let result = self.resolve_declaration(&qname, path);
        path.remove(&key);
        result
    }

    fn resolve_declaration(&self, qname: &QName, path: &mut HashSet<String>) -> Result<FieldSchema> {
        let namespace = qname.namespace.as_deref().unwrap_or_default();
        let Some(declaration) = self
            .catalog
            .block(namespace)
            .and_then(|block| block.declaration(&qname.local_name))
        else {
            // Reference behavior: an undeclared type resolves to an empty
            // field mapping rather than an error.
            debug!(%qname, "no declaration found, resolving to empty schema");
            return Ok(FieldSchema::empty());
        };

        let mut fields = IndexMap::new();

        // Nested type reference: a transparent element wrapping a named
        // type, or the base of an extension surfaced by the container merge.
        if let Some(type_ref) = declaration.get("type").and_then(Reduction::as_text) {
            match self.resolve_inner(type_ref, path)? {
                FieldSchema::Scalar(marker) => {
                    if declaration.get("sequence").is_none()
                        && declaration.get("extensions").is_none()
                    {
                        return Ok(FieldSchema::Scalar(marker));
                    }
                }
                FieldSchema::Fields(base) => fields.extend(base),
            }
        }

        // Inheritance: the extension's own sequence members land before the
        // subtype's direct members (field-set union, base first).
        if let Some(members) = declaration
            .get("extensions")
            .and_then(|e| e.get("sequence"))
            .and_then(Reduction::as_map)
        {
            self.resolve_members(members, path, &mut fields)?;
        }

        if let Some(members) = declaration.get("sequence").and_then(Reduction::as_map) {
            self.resolve_members(members, path, &mut fields)?;
        }

        Ok(FieldSchema::Fields(fields))
    }

    fn resolve_members(
        &self,
        members: &IndexMap<String, Reduction>,
        path: &mut HashSet<String>,
        fields: &mut IndexMap<String, FieldSpec>,
    ) -> Result<()> {
        for (name, attrs) in members {
            let type_ref = attrs
                .get("type")
                .and_then(Reduction::as_text)
                .unwrap_or_default();
            let content = self.resolve_inner(type_ref, path)?;

            let properties: IndexMap<String, String> = attrs
                .as_map()
                .map(|map| {
                    map.iter()
                        .filter(|(key, _)| key.as_str() != "name" && key.as_str() != "type")
                        .filter_map(|(key, value)| {
                            value.as_text().map(|text| (key.clone(), text.to_string()))
                        })
                        .collect()
                })
                .unwrap_or_default();

            fields.insert(
                name.clone(),
                FieldSpec {
                    content,
                    properties: if properties.is_empty() {
                        None
                    } else {
                        Some(properties)
                    },
                },
            );
        }
        Ok(())
    }
}
