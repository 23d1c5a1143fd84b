//! # wadl-client
//!
//! A runtime engine for WADL resource descriptions with embedded XSD
//! grammars.
//!
//! Loading a description builds a typed model of every declared resource,
//! method and message type. Each call then runs a small schema pipeline:
//! the caller's argument tree is validated and normalized against the
//! resolved message schema for the chosen method and content type, and
//! serialized into a namespace-correct XML document ready to send.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wadl_client::WadlClient;
//!
//! let client = WadlClient::from_str(&wadl_source)?;
//! let resource = client.resource("orders").unwrap();
//!
//! let body = resource.build_request_body(
//!     "POST",
//!     "application/xml",
//!     serde_json::json!({ "id": "42", "items": ["a", "b"] }),
//! )?;
//! ```
//!
//! The conformance check of the description against its meta-schema and the
//! HTTP transport are external collaborators, reached through the
//! [`transport::ConformanceChecker`] and [`transport::Transport`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;

pub mod namespaces;
pub mod documents;
pub mod node;

pub mod catalog;
pub mod resolver;
pub mod resources;

pub mod builtins;
pub mod validator;
pub mod serializer;

pub mod transport;
pub mod client;

// Re-exports for convenience
pub use client::WadlClient;
pub use error::{Error, Result};
pub use resolver::{FieldSchema, FieldSpec};
pub use resources::{MessageSchema, ResourceDefinition};
pub use transport::{Transport, TransportFailure, TransportReply, WireRequest};

/// Version of the wadl-client library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WADL namespace
pub const WADL_NAMESPACE: &str = "http://wadl.dev.java.net/2009/02";

/// XSD namespace; type references resolving here are built-in scalars
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
