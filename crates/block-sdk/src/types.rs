//! Content tree types.
//!
//! A [`ContentNode`] is one block of CMS-authored content after
//! normalization. Field access is always optional: a block type implies which
//! fields are meaningful, but nothing guarantees they are present or well
//! formed, so every accessor returns `Option` (or an empty slice).

use std::collections::BTreeMap;

use serde::Serialize;

/// Field name under which the CMS stores its visual-editor marker.
pub const EDITOR_META_FIELD: &str = "_editable";

/// One block of CMS content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentNode {
    /// Opaque identifier, stable across edits to sibling blocks.
    pub id: String,

    /// Block type tag (e.g. "page", "container"). Open-ended: the CMS can
    /// introduce new tags at any time.
    #[serde(rename = "type")]
    pub block_type: String,

    /// Field values keyed by field name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl ContentNode {
    /// Create a node with no fields.
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a field value, replacing any previous value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Raw access to a field.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// A text field. Only `FieldValue::Text` qualifies.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// A numeric field.
    ///
    /// The CMS delivers number fields as strings, so numeric text is accepted
    /// as well.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A boolean field.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.fields.get(name)? {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// A single nested block.
    pub fn node(&self, name: &str) -> Option<&ContentNode> {
        match self.fields.get(name)? {
            FieldValue::Node(node) => Some(node),
            _ => None,
        }
    }

    /// A child slot, in declared order.
    ///
    /// Absent fields and fields of any other kind yield an empty slice. A
    /// single nested block is treated as a one-element slot.
    pub fn children(&self, name: &str) -> &[ContentNode] {
        match self.fields.get(name) {
            Some(FieldValue::Nodes(nodes)) => nodes,
            Some(FieldValue::Node(node)) => std::slice::from_ref(node.as_ref()),
            _ => &[],
        }
    }

    /// Asset references held by a field (one or many).
    pub fn assets(&self, name: &str) -> Vec<&Asset> {
        match self.fields.get(name) {
            Some(FieldValue::Asset(asset)) => vec![asset],
            Some(FieldValue::Assets(assets)) => assets.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// The first asset held by a field.
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets(name).into_iter().next()
    }

    /// Structured value the normalizer could not classify (links, rich text).
    pub fn raw(&self, name: &str) -> Option<&serde_json::Value> {
        match self.fields.get(name)? {
            FieldValue::Raw(v) => Some(v),
            _ => None,
        }
    }

    /// Opaque visual-editor marker, present only in draft content.
    pub fn editor_meta(&self) -> Option<&str> {
        match self.fields.get(EDITOR_META_FIELD)? {
            FieldValue::EditorMeta(s) => Some(s),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, following every nested block field.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .fields
            .values()
            .map(|value| match value {
                FieldValue::Node(node) => node.subtree_len(),
                FieldValue::Nodes(nodes) => nodes.iter().map(ContentNode::subtree_len).sum(),
                _ => 0,
            })
            .sum::<usize>()
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Asset(Asset),
    Assets(Vec<Asset>),
    Node(Box<ContentNode>),
    /// An ordered child slot.
    Nodes(Vec<ContentNode>),
    EditorMeta(String),
    /// Structured data with no dedicated representation.
    Raw(serde_json::Value),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Asset> for FieldValue {
    fn from(asset: Asset) -> Self {
        FieldValue::Asset(asset)
    }
}

impl From<Vec<Asset>> for FieldValue {
    fn from(assets: Vec<Asset>) -> Self {
        FieldValue::Assets(assets)
    }
}

impl From<ContentNode> for FieldValue {
    fn from(node: ContentNode) -> Self {
        FieldValue::Node(Box::new(node))
    }
}

impl From<Vec<ContentNode>> for FieldValue {
    fn from(nodes: Vec<ContentNode>) -> Self {
        FieldValue::Nodes(nodes)
    }
}

/// An image or file reference.
///
/// Passed through to presentation untouched; the renderer never fetches or
/// transforms the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub url: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Asset {
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// An asset without a URL cannot be displayed.
    pub fn is_valid(&self) -> bool {
        !self.url.trim().is_empty()
    }
}
