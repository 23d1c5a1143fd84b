//! Resource repository
//!
//! One entry per declared resource path, built once at load time: the
//! resource's absolute address, its declared methods, the request/response
//! media types per method, and the fully resolved message schema per
//! (method, direction, media type). After construction the repository is
//! immutable and may be read concurrently by any number of calls.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::namespaces::NamespaceMap;
use crate::node::{Node, Reduction};
use crate::resolver::{FieldSchema, SchemaResolver};
use crate::serializer::XmlSerializer;
use crate::validator::Validator;

/// Resolved message description of one representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSchema {
    /// Target namespace of the message's root element
    pub namespace: String,
    /// Local name of the message's root element
    pub root_element: String,
    /// Fully resolved field structure
    pub content: FieldSchema,
}

/// Declared media types of one method, per direction
#[derive(Debug, Clone, Default)]
pub struct MethodMediaTypes {
    /// Media types accepted for request bodies
    pub request: IndexSet<String>,
    /// Media types declared for response bodies
    pub response: IndexSet<String>,
}

/// Resolved message schemas of one method, per direction and media type
#[derive(Debug, Clone, Default)]
pub struct MethodSchema {
    /// Request schemas by media type
    pub request: IndexMap<String, MessageSchema>,
    /// Response schemas by media type
    pub response: IndexMap<String, MessageSchema>,
}

#[derive(Debug, Clone, Default)]
struct Direction {
    media_types: IndexSet<String>,
    schemas: IndexMap<String, MessageSchema>,
}

/// One declared resource: address, methods, media types and schemas
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    url: String,
    methods: IndexMap<String, MethodMediaTypes>,
    schema: IndexMap<String, MethodSchema>,
}

impl ResourceDefinition {
    /// The resource's absolute address
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Declared method names, in declaration order
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(|s| s.as_str())
    }

    /// Declared media types for a method, if the method exists
    pub fn media_types(&self, method: &str) -> Option<&MethodMediaTypes> {
        self.methods.get(method)
    }

    /// Look up the resolved request schema for a call
    ///
    /// Step 0 of every call: the method must be declared, the media type
    /// must be among the method's request media types, and the pair must
    /// have produced a schema at load time.
    pub fn request_schema(&self, method: &str, media_type: &str) -> Result<&MessageSchema> {
        let media_types = self.methods.get(method).ok_or_else(|| Error::UnknownMethod {
            method: method.to_string(),
            allowed: self.methods.keys().cloned().collect(),
        })?;
        if !media_types.request.contains(media_type) {
            return Err(Error::UnsupportedMediaType {
                media_type: media_type.to_string(),
                method: method.to_string(),
                allowed: media_types.request.iter().cloned().collect(),
            });
        }
        self.schema
            .get(method)
            .and_then(|m| m.request.get(media_type))
            .ok_or_else(|| Error::MissingSchema {
                method: method.to_string(),
                media_type: media_type.to_string(),
            })
    }

    /// Validate the argument tree and serialize the request body
    pub fn build_request_body(
        &self,
        method: &str,
        media_type: &str,
        arguments: serde_json::Value,
    ) -> Result<String> {
        self.build_request_body_with(
            &Validator::new(),
            &XmlSerializer::default(),
            method,
            media_type,
            arguments,
        )
    }

    /// [`build_request_body`] with a configured validator and serializer
    ///
    /// [`build_request_body`]: Self::build_request_body
    pub fn build_request_body_with(
        &self,
        validator: &Validator,
        serializer: &XmlSerializer,
        method: &str,
        media_type: &str,
        arguments: serde_json::Value,
    ) -> Result<String> {
        let message = self.request_schema(method, media_type)?;
        let normalized = validator.validate(&message.content, arguments)?;
        serializer.serialize(&message.root_element, &message.namespace, &normalized)
    }

    fn from_reduction(
        url: String,
        reduction: &Reduction,
        resolver: &SchemaResolver<'_>,
        namespaces: &NamespaceMap,
    ) -> Result<Self> {
        let mut methods = IndexMap::new();
        let mut schema = IndexMap::new();

        if let Some(declared) = reduction.get("method").and_then(Reduction::as_map) {
            for (name, method) in declared {
                let request = build_direction(method.get("request"), resolver, namespaces)?;
                let response = build_direction(method.get("response"), resolver, namespaces)?;
                methods.insert(
                    name.clone(),
                    MethodMediaTypes {
                        request: request.media_types,
                        response: response.media_types,
                    },
                );
                schema.insert(
                    name.clone(),
                    MethodSchema {
                        request: request.schemas,
                        response: response.schemas,
                    },
                );
            }
        }

        Ok(Self {
            url,
            methods,
            schema,
        })
    }
}

/// Resolve one direction (request or response) of a method: collect its
/// representations' media types, and a message schema for every
/// representation that names a root element.
fn build_direction(
    direction: Option<&Reduction>,
    resolver: &SchemaResolver<'_>,
    namespaces: &NamespaceMap,
) -> Result<Direction> {
    let mut resolved = Direction::default();
    let Some(representations) = direction
        .and_then(|d| d.get("representation"))
        .and_then(Reduction::as_map)
    else {
        return Ok(resolved);
    };

    for (media_type, element) in representations {
        resolved.media_types.insert(media_type.clone());

        let element_ref = element.as_text().unwrap_or_default();
        if element_ref.is_empty() {
            continue;
        }
        let qname = namespaces.resolve_ref(element_ref)?;
        let content = resolver.resolve(element_ref)?;
        resolved.schemas.insert(
            media_type.clone(),
            MessageSchema {
                namespace: qname.namespace.unwrap_or_default(),
                root_element: qname.local_name,
                content,
            },
        );
    }
    Ok(resolved)
}

/// All declared resources, keyed by path with the leading separator
/// stripped
#[derive(Debug, Clone, Default)]
pub struct ResourceRepository {
    resources: IndexMap<String, ResourceDefinition>,
}

impl ResourceRepository {
    /// Build the repository from the description's `resources` node
    pub fn from_resources(
        resources_node: &Node,
        resolver: &SchemaResolver<'_>,
        namespaces: &NamespaceMap,
    ) -> Result<Self> {
        let base = resources_node
            .attribute("base")
            .ok_or_else(|| Error::Description("resources section declares no base address".to_string()))?;

        let mut resources = IndexMap::new();
        for resource_node in resources_node.children_by_tag("resource") {
            let Some(path) = resource_node.attribute("path") else {
                continue;
            };
            let address = format!("{}{}", base, path);
            let url = Url::parse(&address)
                .map_err(|e| {
                    Error::Description(format!("invalid resource address '{}': {}", address, e))
                })?
                .to_string();

            let reduction = resource_node.reduce();
            let definition =
                ResourceDefinition::from_reduction(url, &reduction, resolver, namespaces)?;
            debug!(
                path,
                methods = definition.methods.len(),
                "registered resource"
            );

            let key = path.strip_prefix('/').unwrap_or(path).to_string();
            resources.insert(key, definition);
        }

        Ok(Self { resources })
    }

    /// Look up a resource by its stripped path
    pub fn get(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.get(name)
    }

    /// Registered resource names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(|s| s.as_str())
    }

    /// Number of registered resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the repository holds no resources
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
