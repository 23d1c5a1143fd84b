//! End-to-end tests over a realistic description
//!
//! Exercises the whole pipeline (parse, catalog, resolve, validate,
//! serialize, send) through the public client surface.

use pretty_assertions::assert_eq;
use serde_json::json;
use wadl_client::documents::Document;
use wadl_client::serializer::XmlSerializer;
use wadl_client::validator::Validator;
use wadl_client::{Error, Transport, TransportFailure, TransportReply, WadlClient, WireRequest};

const STORE_WADL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<application xmlns="http://wadl.dev.java.net/2009/02"
             xmlns:xs="http://www.w3.org/2001/XMLSchema"
             xmlns:tns="http://store.example.com/types">
    <grammars>
        <xs:schema targetNamespace="http://store.example.com/types">
            <xs:element name="Order" type="tns:OrderType"/>
            <xs:element name="Refund" type="tns:RefundType"/>
            <xs:element name="Receipt" type="tns:ReceiptType"/>
            <xs:complexType name="OrderType">
                <xs:sequence>
                    <xs:element name="id" type="xs:string"/>
                    <xs:element name="items" type="xs:string" minOccurs="2" maxOccurs="3"/>
                    <xs:element name="currency" type="xs:string" default="EUR"/>
                    <xs:element name="note" type="xs:string" minOccurs="0"/>
                    <xs:element name="customer" type="tns:CustomerType"/>
                </xs:sequence>
            </xs:complexType>
            <xs:complexType name="CustomerType">
                <xs:sequence>
                    <xs:element name="name" type="xs:string"/>
                </xs:sequence>
            </xs:complexType>
            <xs:complexType name="RefundType">
                <xs:complexContent>
                    <xs:extension base="tns:OrderType">
                        <xs:sequence>
                            <xs:element name="reason" type="xs:string"/>
                        </xs:sequence>
                    </xs:extension>
                </xs:complexContent>
            </xs:complexType>
            <xs:complexType name="ReceiptType">
                <xs:sequence>
                    <xs:element name="total" type="xs:decimal"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>
    </grammars>
    <resources base="http://store.example.com/api">
        <resource path="/orders">
            <method name="GET">
                <response>
                    <representation mediaType="application/xml" element="tns:Receipt"/>
                </response>
            </method>
            <method name="POST">
                <request>
                    <representation mediaType="application/xml" element="tns:Order"/>
                </request>
                <response>
                    <representation mediaType="application/xml" element="tns:Receipt"/>
                </response>
            </method>
        </resource>
        <resource path="/refunds">
            <method name="POST">
                <request>
                    <representation mediaType="application/xml" element="tns:Refund"/>
                </request>
            </method>
        </resource>
    </resources>
</application>"#;

fn order_arguments() -> serde_json::Value {
    json!({
        "id": "42",
        "items": ["a", "b"],
        "customer": { "name": "Ada" }
    })
}

fn load() -> WadlClient {
    WadlClient::from_str(STORE_WADL).unwrap()
}

#[test]
fn builds_a_namespaced_order_document() {
    let client = load();
    let resource = client.resource("orders").unwrap();
    let body = resource
        .build_request_body("POST", "application/xml", order_arguments())
        .unwrap();

    assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(body.contains("<Order xmlns=\"http://store.example.com/types\">"));
    // Two sibling items, after the id, in caller order
    assert!(body.contains("<id>42</id><items>a</items><items>b</items>"));
    assert!(body.contains("<customer><name>Ada</name></customer>"));
    assert!(body.ends_with("</Order>"));
}

#[test]
fn serialized_shape_survives_reparsing() {
    let client = load();
    let resource = client.resource("orders").unwrap();
    let body = resource
        .build_request_body("POST", "application/xml", order_arguments())
        .unwrap();

    let document = Document::parse(&body).unwrap();
    assert_eq!(document.root.tag, "Order");
    assert_eq!(
        document.root.namespace.as_deref(),
        Some("http://store.example.com/types")
    );
    // Caller-supplied keys keep their order; the injected default lands last
    let tags: Vec<&str> = document.root.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, vec!["id", "items", "items", "customer", "currency"]);
}

#[test]
fn occurs_bounds_are_enforced() {
    let client = load();
    let resource = client.resource("orders").unwrap();

    let one_item = json!({
        "id": "42",
        "items": ["a"],
        "customer": { "name": "Ada" }
    });
    let err = resource
        .build_request_body("POST", "application/xml", one_item)
        .unwrap_err();
    assert_eq!(
        err,
        Error::OccursRange {
            field: "items".to_string(),
            parent: "root".to_string(),
            min: Some(2),
            max: Some(3),
            actual: 1,
        }
    );

    let four_items = json!({
        "id": "42",
        "items": ["a", "b", "c", "d"],
        "customer": { "name": "Ada" }
    });
    let err = resource
        .build_request_body("POST", "application/xml", four_items)
        .unwrap_err();
    assert!(matches!(err, Error::OccursRange { max: Some(3), actual: 4, .. }));

    let three_items = json!({
        "id": "42",
        "items": ["a", "b", "c"],
        "customer": { "name": "Ada" }
    });
    assert!(resource
        .build_request_body("POST", "application/xml", three_items)
        .is_ok());
}

#[test]
fn missing_required_field_is_named() {
    let client = load();
    let resource = client.resource("orders").unwrap();
    let err = resource
        .build_request_body(
            "POST",
            "application/xml",
            json!({ "items": ["a", "b"], "customer": { "name": "Ada" } }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingField { ref field, ref parent, .. } if field == "id" && parent == "root"
    ));
}

#[test]
fn declared_default_is_injected() {
    let client = load();
    let resource = client.resource("orders").unwrap();
    let body = resource
        .build_request_body("POST", "application/xml", order_arguments())
        .unwrap();
    assert!(body.contains("<currency>EUR</currency>"));

    let mut arguments = order_arguments();
    arguments["currency"] = json!("USD");
    let body = resource
        .build_request_body("POST", "application/xml", arguments)
        .unwrap();
    assert!(body.contains("<currency>USD</currency>"));
    assert!(!body.contains("EUR"));
}

#[test]
fn optional_field_may_be_omitted() {
    let client = load();
    let resource = client.resource("orders").unwrap();
    let body = resource
        .build_request_body("POST", "application/xml", order_arguments())
        .unwrap();
    assert!(!body.contains("<note>"));
}

#[test]
fn extension_type_carries_base_fields() {
    let client = load();
    let resource = client.resource("refunds").unwrap();

    // Base fields (from OrderType) validate before the subtype's own
    let err = resource
        .build_request_body(
            "POST",
            "application/xml",
            json!({ "reason": "damaged" }),
        )
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { ref field, .. } if field == "id"));

    let mut arguments = order_arguments();
    arguments["reason"] = json!("damaged");
    let body = resource
        .build_request_body("POST", "application/xml", arguments)
        .unwrap();
    assert!(body.contains("<Refund xmlns=\"http://store.example.com/types\">"));
    assert!(body.contains("<reason>damaged</reason>"));
}

#[test]
fn unknown_method_and_media_type_are_rejected() {
    let client = load();
    let resource = client.resource("orders").unwrap();

    let err = resource
        .build_request_body("DELETE", "application/xml", order_arguments())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownMethod { ref method, ref allowed }
            if method == "DELETE" && allowed.contains(&"POST".to_string())
    ));

    let err = resource
        .build_request_body("POST", "application/json", order_arguments())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedMediaType { .. }));

    // GET declares no request body at all
    let err = resource
        .build_request_body("GET", "application/xml", json!({}))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedMediaType { .. }));
}

#[test]
fn unprefixed_element_reference_fails_at_load() {
    let wadl = STORE_WADL.replace("element=\"tns:Order\"", "element=\"Order\"");
    assert!(matches!(
        WadlClient::from_str(&wadl),
        Err(Error::UnprefixedTypeReference { .. })
    ));
}

#[test]
fn cyclic_type_reference_fails_at_load() {
    let wadl = r#"
        <application xmlns="http://wadl.dev.java.net/2009/02"
                     xmlns:xs="http://www.w3.org/2001/XMLSchema"
                     xmlns:tns="http://store.example.com/types">
            <grammars>
                <xs:schema targetNamespace="http://store.example.com/types">
                    <xs:element name="Node" type="tns:NodeType"/>
                    <xs:complexType name="NodeType">
                        <xs:sequence>
                            <xs:element name="child" type="tns:NodeType"/>
                        </xs:sequence>
                    </xs:complexType>
                </xs:schema>
            </grammars>
            <resources base="http://store.example.com/api">
                <resource path="/nodes">
                    <method name="POST">
                        <request>
                            <representation mediaType="application/xml" element="tns:Node"/>
                        </request>
                    </method>
                </resource>
            </resources>
        </application>"#;
    assert!(matches!(
        WadlClient::from_str(wadl),
        Err(Error::CyclicTypeReference { .. })
    ));
}

#[test]
fn strict_scalar_mode_checks_leaves() {
    let wadl = STORE_WADL.replace(
        "<xs:element name=\"id\" type=\"xs:string\"/>",
        "<xs:element name=\"id\" type=\"xs:int\"/>",
    );
    let client = WadlClient::from_str(&wadl)
        .unwrap()
        .with_validator(Validator::new().with_scalar_checks(true));
    let resource = client.resource("orders").unwrap();

    let mut arguments = order_arguments();
    arguments["id"] = json!("not-a-number");
    let err = client
        .build_request_body(resource, "POST", "application/xml", arguments)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ScalarFormat { ref field, ref type_name, .. }
            if field == "id" && type_name == "int"
    ));

    let mut arguments = order_arguments();
    arguments["id"] = json!("42");
    assert!(client
        .build_request_body(resource, "POST", "application/xml", arguments)
        .is_ok());
}

#[test]
fn configured_serializer_controls_the_declaration() {
    let client = load().with_serializer(XmlSerializer::new("1.0", "ISO-8859-1"));
    let resource = client.resource("orders").unwrap();
    let body = client
        .build_request_body(resource, "POST", "application/xml", order_arguments())
        .unwrap();
    assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"));
}

struct StaticTransport(Result<TransportReply, TransportFailure>);

impl Transport for StaticTransport {
    fn send(&self, _request: WireRequest) -> Result<TransportReply, TransportFailure> {
        self.0.clone()
    }
}

#[test]
fn transport_outcomes_map_to_call_outcomes() {
    let client = load();
    let resource = client.resource("orders").unwrap();

    let ok = StaticTransport(Ok(TransportReply {
        status_code: 201,
        content: "<Receipt/>".to_string(),
    }));
    let reply = client
        .send(&ok, resource, "POST", "application/xml", order_arguments())
        .unwrap();
    assert_eq!(reply.status_code, 201);

    let http_error = StaticTransport(Err(TransportFailure::WithResponse(TransportReply {
        status_code: 500,
        content: "boom".to_string(),
    })));
    let reply = client
        .send(&http_error, resource, "POST", "application/xml", order_arguments())
        .unwrap();
    assert_eq!(reply.status_code, 500);
    assert_eq!(reply.content, "boom");

    let down = StaticTransport(Err(TransportFailure::NoResponse("refused".to_string())));
    assert!(matches!(
        client.send(&down, resource, "POST", "application/xml", order_arguments()),
        Err(Error::Transport(_))
    ));
}
