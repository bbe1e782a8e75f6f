//! Storyblok content normalization.
//!
//! Converts the CMS's JSON into [`ContentNode`] trees. Accepted shapes:
//! - a story response: `{"story": {"content": <blok>}}`
//! - a bare blok: `{"_uid": "...", "component": "page", "body": [...]}`
//! - the normalized form: `{"id": "...", "type": "page", "fields": {...}}`
//!
//! Field values are classified structurally. Values that fit no dedicated
//! variant are kept as [`FieldValue::Raw`] so renderers can still read them.

use serde_json::{Map, Value};
use tracing::warn;
use vitrine_sdk::types::{Asset, ContentNode, EDITOR_META_FIELD, FieldValue};

use super::SourceError;

/// Normalize a story document (or bare blok) into its root node.
pub fn normalize_story(identifier: &str, value: &Value) -> Result<ContentNode, SourceError> {
    let content = value
        .get("story")
        .and_then(|story| story.get("content"))
        .unwrap_or(value);
    node_from_value(content).ok_or_else(|| SourceError::Malformed(identifier.to_string()))
}

/// Convert one blok object into a node.
///
/// Returns `None` for anything that is not a blok or lacks an id or type.
pub fn node_from_value(value: &Value) -> Option<ContentNode> {
    let obj = value.as_object()?;

    if let (Some(block_type), Some(fields)) = (
        obj.get("type").and_then(Value::as_str),
        obj.get("fields").and_then(Value::as_object),
    ) {
        let id = id_string(obj.get("id")?)?;
        return Some(build_node(id, block_type, fields.iter()));
    }

    let block_type = obj.get("component").and_then(Value::as_str)?;
    let id = id_string(obj.get("_uid")?)?;
    let fields = obj
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "_uid" | "component"));
    Some(build_node(id, block_type, fields))
}

fn build_node<'v>(
    id: String,
    block_type: &str,
    fields: impl Iterator<Item = (&'v String, &'v Value)>,
) -> ContentNode {
    let mut node = ContentNode::new(id, block_type.trim());
    for (key, value) in fields {
        if let Some(field) = field_from_value(key, value) {
            node.set_field(key.as_str(), field);
        }
    }
    node
}

/// Ids are usually strings; numeric ids are accepted as their decimal form.
fn id_string(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Classify one field value. `None` means the field is absent.
pub fn field_from_value(key: &str, value: &Value) -> Option<FieldValue> {
    if key == EDITOR_META_FIELD {
        return value
            .as_str()
            .map(|meta| FieldValue::EditorMeta(meta.to_string()));
    }

    match value {
        Value::Null => None,
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Object(obj) if is_blok(obj) => match node_from_value(value) {
            Some(node) => Some(FieldValue::Node(Box::new(node))),
            None => {
                warn!(field = key, "dropping nested block without id or type");
                None
            }
        },
        Value::Object(obj) if is_asset(obj) => Some(FieldValue::Asset(asset_from_object(obj))),
        Value::Object(_) => Some(FieldValue::Raw(value.clone())),
        Value::Array(items) => Some(classify_array(key, value, items)),
    }
}

fn classify_array(key: &str, value: &Value, items: &[Value]) -> FieldValue {
    if items.is_empty() {
        return FieldValue::Nodes(Vec::new());
    }

    if items
        .iter()
        .any(|item| item.as_object().is_some_and(is_blok))
    {
        let nodes: Vec<ContentNode> = items.iter().filter_map(node_from_value).collect();
        if nodes.len() != items.len() {
            warn!(
                field = key,
                dropped = items.len() - nodes.len(),
                "dropping malformed entries from child slot"
            );
        }
        return FieldValue::Nodes(nodes);
    }

    if items
        .iter()
        .any(|item| item.as_object().is_some_and(is_asset))
    {
        let assets: Vec<Asset> = items
            .iter()
            .filter_map(|item| item.as_object().filter(|obj| is_asset(obj)))
            .map(asset_from_object)
            .collect();
        if assets.len() != items.len() {
            warn!(
                field = key,
                dropped = items.len() - assets.len(),
                "dropping malformed entries from asset list"
            );
        }
        return FieldValue::Assets(assets);
    }

    FieldValue::Raw(value.clone())
}

fn is_blok(obj: &Map<String, Value>) -> bool {
    obj.get("component").is_some_and(Value::is_string)
        || (obj.get("type").is_some_and(Value::is_string)
            && obj.get("fields").is_some_and(Value::is_object))
}

/// Assets carry a `filename` (CMS asset field) or a bare `url`; link objects
/// also have a `url` but are told apart by their `linktype`.
fn is_asset(obj: &Map<String, Value>) -> bool {
    obj.contains_key("filename") || (obj.contains_key("url") && !obj.contains_key("linktype"))
}

fn asset_from_object(obj: &Map<String, Value>) -> Asset {
    let url = obj
        .get("filename")
        .or_else(|| obj.get("url"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    let alt = obj
        .get("alt")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let size = dimension(obj.get("width"))
        .zip(dimension(obj.get("height")))
        .or_else(|| dimensions_from_url(&url));

    let asset = Asset::new(url, alt);
    match size {
        Some((width, height)) => asset.with_dimensions(width, height),
        None => asset,
    }
}

fn dimension(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// CMS asset URLs embed the original size as a `/{width}x{height}/` segment,
/// e.g. `https://a.storyblok.com/f/1234/1200x800/abcd/photo.jpg`.
pub fn dimensions_from_url(url: &str) -> Option<(u32, u32)> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    path.split('/').find_map(|segment| {
        let (w, h) = segment.split_once('x')?;
        if w.is_empty() || h.is_empty() || !w.bytes().chain(h.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let width: u32 = w.parse().ok()?;
        let height: u32 = h.parse().ok()?;
        (width > 0 && height > 0).then_some((width, height))
    })
}
