//! WADL client
//!
//! Ties the load pipeline together: parse the description, index its
//! grammars into the type catalog, resolve every declared representation
//! and build the resource repository. The loaded client is immutable
//! (calls only read it), so one client can serve any number of threads.

use tracing::debug;

use crate::catalog::TypeCatalog;
use crate::documents::Document;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::resolver::SchemaResolver;
use crate::resources::{ResourceDefinition, ResourceRepository};
use crate::serializer::XmlSerializer;
use crate::transport::{ConformanceChecker, Transport, TransportFailure, TransportReply, WireRequest};
use crate::validator::Validator;

/// A loaded WADL description, ready to build and send requests
#[derive(Debug, Clone)]
pub struct WadlClient {
    catalog: TypeCatalog,
    repository: ResourceRepository,
    validator: Validator,
    serializer: XmlSerializer,
}

impl WadlClient {
    /// Load a description from its XML source with default limits
    ///
    /// The caller vouches that the description conforms to the WADL
    /// meta-schema; see [`from_checked_str`] to run the check here.
    ///
    /// [`from_checked_str`]: Self::from_checked_str
    pub fn from_str(wadl: &str) -> Result<Self> {
        Self::load(wadl, &Limits::default())
    }

    /// Load a description, running the one-shot conformance check first
    pub fn from_checked_str(wadl: &str, checker: &dyn ConformanceChecker) -> Result<Self> {
        checker.check(wadl).map_err(Error::Conformance)?;
        Self::from_str(wadl)
    }

    /// Load a description from its XML source with explicit limits
    pub fn load(wadl: &str, limits: &Limits) -> Result<Self> {
        let document = Document::parse_with_limits(wadl, limits)?;
        Self::from_document(&document, limits)
    }

    /// Build a client from an already parsed description
    pub fn from_document(document: &Document, limits: &Limits) -> Result<Self> {
        let root = &document.root;
        if root.tag != "application" {
            return Err(Error::Description(format!(
                "expected an application root element, got '{}'",
                root.tag
            )));
        }

        let catalog = match root.child("grammars") {
            Some(grammars) => TypeCatalog::from_grammars(grammars),
            None => TypeCatalog::new(),
        };

        let resources_node = root
            .child("resources")
            .ok_or_else(|| Error::Description("description has no resources section".to_string()))?;

        let resolver = SchemaResolver::new(&document.namespaces, &catalog, limits);
        let repository =
            ResourceRepository::from_resources(resources_node, &resolver, &document.namespaces)?;
        debug!(
            namespaces = catalog.len(),
            resources = repository.len(),
            "description loaded"
        );

        Ok(Self {
            catalog,
            repository,
            validator: Validator::new(),
            serializer: XmlSerializer::default(),
        })
    }

    /// Use a configured validator (e.g. strict scalar checks) for all calls
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Use a configured serializer (XML version/encoding) for all calls
    pub fn with_serializer(mut self, serializer: XmlSerializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Look up a resource by its path (leading separator stripped)
    pub fn resource(&self, name: &str) -> Option<&ResourceDefinition> {
        self.repository.get(name)
    }

    /// The loaded resource repository
    pub fn resources(&self) -> &ResourceRepository {
        &self.repository
    }

    /// The loaded type catalog
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Validate the argument tree and serialize the request body for one
    /// call, without sending it
    pub fn build_request_body(
        &self,
        resource: &ResourceDefinition,
        method: &str,
        media_type: &str,
        arguments: serde_json::Value,
    ) -> Result<String> {
        resource.build_request_body_with(
            &self.validator,
            &self.serializer,
            method,
            media_type,
            arguments,
        )
    }

    /// Build the request body and send it through the transport
    ///
    /// A transport failure that carries a captured response (an HTTP-level
    /// error) is a normal outcome and is returned as a reply; a failure
    /// with no response at all is fatal.
    pub fn send(
        &self,
        transport: &dyn Transport,
        resource: &ResourceDefinition,
        method: &str,
        media_type: &str,
        arguments: serde_json::Value,
    ) -> Result<TransportReply> {
        let body = self.build_request_body(resource, method, media_type, arguments)?;
        let request = WireRequest {
            method: method.to_string(),
            url: resource.url().to_string(),
            content_type: media_type.to_string(),
            body,
        };
        match transport.send(request) {
            Ok(reply) | Err(TransportFailure::WithResponse(reply)) => Ok(reply),
            Err(TransportFailure::NoResponse(reason)) => Err(Error::Transport(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    const DESCRIPTION: &str = r#"
        <application xmlns="http://wadl.dev.java.net/2009/02"
                     xmlns:xs="http://www.w3.org/2001/XMLSchema"
                     xmlns:tns="http://types.example.com">
            <grammars>
                <xs:schema targetNamespace="http://types.example.com">
                    <xs:element name="Order" type="tns:OrderType"/>
                    <xs:complexType name="OrderType">
                        <xs:sequence>
                            <xs:element name="id" type="xs:string"/>
                        </xs:sequence>
                    </xs:complexType>
                </xs:schema>
            </grammars>
            <resources base="http://api.example.com/v1">
                <resource path="/orders">
                    <method name="POST">
                        <request>
                            <representation mediaType="application/xml" element="tns:Order"/>
                        </request>
                    </method>
                </resource>
            </resources>
        </application>"#;

    struct RecordingTransport {
        reply: std::result::Result<TransportReply, TransportFailure>,
        seen: RefCell<Vec<WireRequest>>,
    }

    impl RecordingTransport {
        fn new(reply: std::result::Result<TransportReply, TransportFailure>) -> Self {
            Self {
                reply,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: WireRequest) -> std::result::Result<TransportReply, TransportFailure> {
            self.seen.borrow_mut().push(request);
            self.reply.clone()
        }
    }

    struct RejectEverything;

    impl ConformanceChecker for RejectEverything {
        fn check(&self, _description: &str) -> std::result::Result<(), String> {
            Err("meta-schema check failed".to_string())
        }
    }

    struct AcceptEverything;

    impl ConformanceChecker for AcceptEverything {
        fn check(&self, _description: &str) -> std::result::Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_load_and_lookup() {
        let client = WadlClient::from_str(DESCRIPTION).unwrap();
        assert!(client.resource("orders").is_some());
        assert!(client.resource("unknown").is_none());
        assert_eq!(client.resources().len(), 1);
        assert_eq!(client.catalog().len(), 1);
    }

    #[test]
    fn test_conformance_gate() {
        assert!(matches!(
            WadlClient::from_checked_str(DESCRIPTION, &RejectEverything),
            Err(Error::Conformance(_))
        ));
        assert!(WadlClient::from_checked_str(DESCRIPTION, &AcceptEverything).is_ok());
    }

    #[test]
    fn test_rejects_non_application_root() {
        assert!(matches!(
            WadlClient::from_str("<resources xmlns=\"http://wadl.dev.java.net/2009/02\"/>"),
            Err(Error::Description(_))
        ));
    }

    #[test]
    fn test_send_builds_wire_request() {
        let client = WadlClient::from_str(DESCRIPTION).unwrap();
        let resource = client.resource("orders").unwrap();
        let transport = RecordingTransport::new(Ok(TransportReply {
            status_code: 201,
            content: "created".to_string(),
        }));

        let reply = client
            .send(
                &transport,
                resource,
                "POST",
                "application/xml",
                json!({ "id": "42" }),
            )
            .unwrap();
        assert_eq!(reply.status_code, 201);

        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].url, "http://api.example.com/v1/orders");
        assert_eq!(seen[0].content_type, "application/xml");
        assert!(seen[0].body.contains("<id>42</id>"));
    }

    #[test]
    fn test_http_error_response_is_a_normal_outcome() {
        let client = WadlClient::from_str(DESCRIPTION).unwrap();
        let resource = client.resource("orders").unwrap();
        let transport = RecordingTransport::new(Err(TransportFailure::WithResponse(
            TransportReply {
                status_code: 404,
                content: "not found".to_string(),
            },
        )));

        let reply = client
            .send(
                &transport,
                resource,
                "POST",
                "application/xml",
                json!({ "id": "42" }),
            )
            .unwrap();
        assert_eq!(reply.status_code, 404);
        assert_eq!(reply.content, "not found");
    }

    #[test]
    fn test_connection_failure_is_fatal() {
        let client = WadlClient::from_str(DESCRIPTION).unwrap();
        let resource = client.resource("orders").unwrap();
        let transport =
            RecordingTransport::new(Err(TransportFailure::NoResponse("refused".to_string())));

        assert!(matches!(
            client.send(
                &transport,
                resource,
                "POST",
                "application/xml",
                json!({ "id": "42" }),
            ),
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn test_no_body_is_built_for_invalid_arguments() {
        let client = WadlClient::from_str(DESCRIPTION).unwrap();
        let resource = client.resource("orders").unwrap();
        let transport = RecordingTransport::new(Ok(TransportReply {
            status_code: 200,
            content: String::new(),
        }));

        let outcome = client.send(&transport, resource, "POST", "application/xml", json!({}));
        assert!(matches!(outcome, Err(Error::MissingField { .. })));
        // Fail fast: nothing reached the transport
        assert!(transport.seen.borrow().is_empty());
    }
}
