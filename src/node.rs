//! Typed description node tree
//!
//! Each element of a parsed description becomes a [`Node`] tagged with a
//! [`NodeKind`] chosen from its (owning namespace, tag) pair. A node knows
//! how to reduce itself to a plain [`Reduction`] value; reductions are pure
//! and depend only on the node's own attributes and its children's
//! reductions. The catalog and resolver operate entirely on these reduced
//! values, never on raw XML.

use indexmap::IndexMap;

use crate::{WADL_NAMESPACE, XSD_NAMESPACE};

/// Plain value a node reduces to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduction {
    /// A text value (attribute content)
    Text(String),
    /// An ordered sequence of values
    List(Vec<Reduction>),
    /// An ordered keyed mapping
    Map(IndexMap<String, Reduction>),
}

impl Reduction {
    /// Empty mapping, the reduction of structural and untyped nodes
    pub fn empty() -> Self {
        Reduction::Map(IndexMap::new())
    }

    /// View this reduction as a mapping
    pub fn as_map(&self) -> Option<&IndexMap<String, Reduction>> {
        match self {
            Reduction::Map(map) => Some(map),
            _ => None,
        }
    }

    /// View this reduction as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reduction::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Look up a key, when this reduction is a mapping
    pub fn get(&self, key: &str) -> Option<&Reduction> {
        self.as_map().and_then(|map| map.get(key))
    }
}

/// Closed set of node behaviors
///
/// The variant is chosen once, at parse time, from the (owning namespace,
/// tag) pair. Pairs without a registered variant fall back to [`Container`]
/// inside the XSD namespace and [`Other`] everywhere else.
///
/// [`Container`]: NodeKind::Container
/// [`Other`]: NodeKind::Other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// WADL `method`
    Method,
    /// WADL `representation`
    Representation,
    /// WADL `request` and `response` (both collect representations)
    Request,
    /// WADL `resource`
    Resource,
    /// XSD `element`, transparent to its nested type definition
    Element,
    /// XSD `extension` (type inheritance)
    Extension,
    /// XSD `import`
    Import,
    /// XSD `sequence` (ordered member list)
    Sequence,
    /// XSD `union` (member alternation, not expanded)
    Union,
    /// XSD structural container (complexType, simpleType, complexContent, …)
    Container,
    /// Untyped fallback for any other namespace/tag pair
    Other,
}

impl NodeKind {
    /// Dispatch rule: (owning namespace URI, tag name) → variant
    pub fn classify(namespace: Option<&str>, tag: &str) -> Self {
        match namespace {
            Some(ns) if ns == WADL_NAMESPACE => match tag {
                "method" => NodeKind::Method,
                "representation" => NodeKind::Representation,
                "request" | "response" => NodeKind::Request,
                "resource" => NodeKind::Resource,
                _ => NodeKind::Other,
            },
            Some(ns) if ns == XSD_NAMESPACE => match tag {
                "element" => NodeKind::Element,
                "extension" => NodeKind::Extension,
                "import" => NodeKind::Import,
                "sequence" => NodeKind::Sequence,
                "union" => NodeKind::Union,
                _ => NodeKind::Container,
            },
            _ => NodeKind::Other,
        }
    }
}

/// One element of the description tree
///
/// The tree is acyclic by construction: children are owned exclusively by
/// their parent.
#[derive(Debug, Clone)]
pub struct Node {
    /// Tag name (local part)
    pub tag: String,
    /// Owning namespace URI
    pub namespace: Option<String>,
    /// Attribute name → string value, in document order
    pub attributes: IndexMap<String, String>,
    /// Child nodes, in document order
    pub children: Vec<Node>,
    /// Reduction behavior, fixed at construction
    pub kind: NodeKind,
}

impl Node {
    /// Create a node, classifying its kind from namespace and tag
    pub fn new(
        tag: impl Into<String>,
        namespace: Option<String>,
        attributes: IndexMap<String, String>,
        children: Vec<Node>,
    ) -> Self {
        let tag = tag.into();
        let kind = NodeKind::classify(namespace.as_deref(), &tag);
        Self {
            tag,
            namespace,
            attributes,
            children,
            kind,
        }
    }

    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Iterate children with the given tag name
    pub fn children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First child with the given tag name
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Reduce this node to a plain value, per its kind
    pub fn reduce(&self) -> Reduction {
        match self.kind {
            NodeKind::Method => self.reduce_by_tag(),
            NodeKind::Representation => self.reduce_representation(),
            NodeKind::Request => self.reduce_request(),
            NodeKind::Resource => self.reduce_resource(),
            NodeKind::Element => self.reduce_element(),
            NodeKind::Extension => self.reduce_extension(),
            NodeKind::Import => self.reduce_import(),
            NodeKind::Sequence => self.reduce_sequence(),
            NodeKind::Union | NodeKind::Other => Reduction::empty(),
            NodeKind::Container => self.reduce_container(),
        }
    }

    /// Mapping from each child's tag to that child's reduction
    fn reduce_by_tag(&self) -> Reduction {
        let mut map = IndexMap::new();
        for child in &self.children {
            map.insert(child.tag.clone(), child.reduce());
        }
        Reduction::Map(map)
    }

    /// `element` / `mediaType` attribute pair, each omitted when absent
    fn reduce_representation(&self) -> Reduction {
        let mut map = IndexMap::new();
        if let Some(element) = self.attribute("element") {
            map.insert("element".to_string(), Reduction::Text(element.to_string()));
        }
        if let Some(media_type) = self.attribute("mediaType") {
            map.insert(
                "mediaType".to_string(),
                Reduction::Text(media_type.to_string()),
            );
        }
        Reduction::Map(map)
    }

    /// `"representation" → (mediaType → element ref)`, from representation
    /// children only; other child kinds are discarded
    fn reduce_request(&self) -> Reduction {
        let mut representations = IndexMap::new();
        for child in &self.children {
            if child.kind != NodeKind::Representation {
                continue;
            }
            let reduced = child.reduce();
            let Some(media_type) = reduced.get("mediaType").and_then(Reduction::as_text) else {
                continue;
            };
            let element = reduced
                .get("element")
                .and_then(Reduction::as_text)
                .unwrap_or_default();
            representations.insert(
                media_type.to_string(),
                Reduction::Text(element.to_string()),
            );
        }
        let mut map = IndexMap::new();
        map.insert("representation".to_string(), Reduction::Map(representations));
        Reduction::Map(map)
    }

    /// Merge children by tag; method children nest one level deeper under
    /// their `name` attribute, other children accumulate into ordered lists
    fn reduce_resource(&self) -> Reduction {
        let mut map: IndexMap<String, Reduction> = IndexMap::new();
        for child in &self.children {
            if child.kind == NodeKind::Method {
                let Some(name) = child.attribute("name") else {
                    continue;
                };
                let entry = map
                    .entry(child.tag.clone())
                    .or_insert_with(Reduction::empty);
                if let Reduction::Map(methods) = entry {
                    methods.insert(name.to_string(), child.reduce());
                }
            } else {
                let entry = map
                    .entry(child.tag.clone())
                    .or_insert_with(|| Reduction::List(Vec::new()));
                if let Reduction::List(items) = entry {
                    items.push(child.reduce());
                }
            }
        }
        Reduction::Map(map)
    }

    /// Transparent to the nested type definition: the sole child's
    /// reduction, or the `{"type": …}` reference form for childless
    /// elements declared with a `type` attribute
    fn reduce_element(&self) -> Reduction {
        if let Some(first) = self.children.first() {
            return first.reduce();
        }
        if let Some(type_ref) = self.attribute("type") {
            let mut map = IndexMap::new();
            map.insert("type".to_string(), Reduction::Text(type_ref.to_string()));
            return Reduction::Map(map);
        }
        Reduction::empty()
    }

    /// `{ "type": base, "extensions": first child's reduction }`
    fn reduce_extension(&self) -> Reduction {
        let mut map = IndexMap::new();
        if let Some(base) = self.attribute("base") {
            map.insert("type".to_string(), Reduction::Text(base.to_string()));
        }
        if let Some(first) = self.children.first() {
            map.insert("extensions".to_string(), first.reduce());
        }
        Reduction::Map(map)
    }

    /// Attribute mapping verbatim (namespace + location reference)
    fn reduce_import(&self) -> Reduction {
        let map = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), Reduction::Text(v.clone())))
            .collect();
        Reduction::Map(map)
    }

    /// `{ "sequence": (member name → member's full attribute map) }`
    fn reduce_sequence(&self) -> Reduction {
        let mut members = IndexMap::new();
        for child in &self.children {
            let Some(name) = child.attribute("name") else {
                continue;
            };
            let attrs = child
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Reduction::Text(v.clone())))
                .collect();
            members.insert(name.to_string(), Reduction::Map(attrs));
        }
        let mut map = IndexMap::new();
        map.insert("sequence".to_string(), Reduction::Map(members));
        Reduction::Map(map)
    }

    /// Union-merge of the children's map reductions, later keys winning.
    /// The merge surfaces `type`/`sequence`/`extensions` entries of nested
    /// structural nodes to the resolver
    fn reduce_container(&self) -> Reduction {
        let mut map = IndexMap::new();
        for child in &self.children {
            if let Reduction::Map(child_map) = child.reduce() {
                map.extend(child_map);
            }
        }
        Reduction::Map(map)
    }
}
