//! Error types for wadl-client
//!
//! This module defines all error types used throughout the library.
//! Validation and resolution errors are detected as early as possible and
//! carry enough context (field, enclosing field, declared bounds, actual
//! counts) to diagnose a failed call without re-running it. None of them
//! are retried internally. HTTP-level error responses are not errors: they
//! are returned to the caller as data.

use thiserror::Error;

/// Result type alias using the wadl-client [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wadl-client operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The description document failed its meta-schema conformance check;
    /// loading aborts before any resolution happens
    #[error("description does not conform to the WADL meta-schema: {0}")]
    Conformance(String),

    /// The description is structurally unusable (e.g. no resources section)
    #[error("malformed description: {0}")]
    Description(String),

    /// A type reference lacks a namespace prefix
    #[error("all type references must be prefixed; '{reference}' is not")]
    UnprefixedTypeReference {
        /// The offending reference string
        reference: String,
    },

    /// A type reference uses a prefix the document never declares
    #[error("unknown namespace prefix '{prefix}' in type reference")]
    UnknownPrefix {
        /// The undeclared prefix
        prefix: String,
    },

    /// Type resolution revisited a reference already on the resolution path
    #[error("cyclic type reference detected at '{reference}'")]
    CyclicTypeReference {
        /// The reference that closed the cycle
        reference: String,
    },

    /// The method is not declared for the resource
    #[error("method '{method}' not allowed for this resource (allowed: {})", .allowed.join(", "))]
    UnknownMethod {
        /// The requested method
        method: String,
        /// Methods the resource does declare
        allowed: Vec<String>,
    },

    /// The media type is not declared for the method's requests
    #[error("media type '{media_type}' not allowed for method '{method}' (allowed: {})", .allowed.join(", "))]
    UnsupportedMediaType {
        /// The requested media type
        media_type: String,
        /// The method being called
        method: String,
        /// Request media types the method does declare
        allowed: Vec<String>,
    },

    /// The method/media-type pair declares no request schema
    #[error("no request schema declared for method '{method}' with media type '{media_type}'")]
    MissingSchema {
        /// The method being called
        method: String,
        /// The media type being called
        media_type: String,
    },

    /// A required field is absent from the caller's argument tree
    #[error("missing key '{field}' in '{parent}'{}", provided_keys(.provided))]
    MissingField {
        /// The absent field
        field: String,
        /// The enclosing field
        parent: String,
        /// Keys the caller did supply at that level
        provided: Vec<String>,
    },

    /// A repeatable field's item count falls outside its declared bounds
    #[error("'{field}' in '{parent}' must occur {}; {actual} provided", occurs_bounds(.min, .max))]
    OccursRange {
        /// The repeatable field
        field: String,
        /// The enclosing field
        parent: String,
        /// Declared minimum, when numeric
        min: Option<u64>,
        /// Declared maximum, when numeric
        max: Option<u64>,
        /// Number of items the caller supplied
        actual: usize,
    },

    /// The caller's value has the wrong shape for its position in the schema
    #[error("key '{field}' must be of type {expected}; {actual} provided")]
    ArgumentType {
        /// The field whose value has the wrong shape
        field: String,
        /// Shape the schema requires
        expected: String,
        /// Shape the caller supplied
        actual: String,
    },

    /// A scalar leaf failed its built-in lexical check (strict mode only)
    #[error("value of '{field}' is not a valid xsd:{type_name}: '{value}'")]
    ScalarFormat {
        /// The scalar field
        field: String,
        /// The built-in type the schema names
        type_name: String,
        /// The rejected value
        value: String,
    },

    /// The transport could not obtain any response at all
    #[error("transport error: {0}")]
    Transport(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

fn provided_keys(provided: &[String]) -> String {
    if provided.is_empty() {
        " (empty mapping provided)".to_string()
    } else {
        format!(" (keys provided: {})", provided.join(", "))
    }
}

fn occurs_bounds(min: &Option<u64>, max: &Option<u64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("between {} and {} times", lo, hi),
        (Some(lo), None) => format!("at least {} time(s)", lo),
        (None, Some(hi)) => format!("at most {} time(s)", hi),
        (None, None) => "within its declared bounds".to_string(),
    }
}
