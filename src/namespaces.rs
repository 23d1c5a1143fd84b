//! XML namespace handling
//!
//! This module provides qualified names (QNames) and the document-level
//! namespace-prefix table captured when a description is loaded. Type
//! references in a description (`prefix:localName`) are resolved against
//! that table; a reference without a prefix is always an error.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Qualified name: combination of namespace URI and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace-prefix table of a loaded description
///
/// Collects every `xmlns`/`xmlns:p` declaration found in the document. The
/// first declaration of a prefix wins; descriptions that rebind a prefix
/// mid-document are outside the supported profile.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<String, String>,
    /// Default namespace (no prefix)
    default_namespace: Option<String>,
}

impl NamespaceMap {
    /// Create a new empty namespace table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prefix declaration, keeping the first binding
    pub fn declare_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.entry(prefix.into()).or_insert_with(|| namespace.into());
    }

    /// Record the default namespace, keeping the first binding
    pub fn declare_default(&mut self, namespace: impl Into<String>) {
        if self.default_namespace.is_none() {
            self.default_namespace = Some(namespace.into());
        }
    }

    /// Get the namespace for a prefix
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Number of declared prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no prefixes are declared
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Resolve a `prefix:localName` type reference to a QName
    ///
    /// Unlike attribute or element names, type references never fall back
    /// to the default namespace: a missing prefix is an error.
    pub fn resolve_ref(&self, reference: &str) -> Result<QName> {
        let (prefix, local) = split_ref(reference)?;
        let namespace = self.namespace(prefix).ok_or_else(|| Error::UnknownPrefix {
            prefix: prefix.to_string(),
        })?;
        Ok(QName::namespaced(namespace, local))
    }
}

/// Split a type reference into prefix and local name
///
/// A reference with no colon (or an empty prefix) is rejected.
pub fn split_ref(reference: &str) -> Result<(&str, &str)> {
    match reference.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => Ok((prefix, local)),
        _ => Err(Error::UnprefixedTypeReference {
            reference: reference.to_string(),
        }),
    }
}
