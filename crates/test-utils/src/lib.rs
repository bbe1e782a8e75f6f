//! Vitrine test utilities.
//!
//! Helpers for integration testing: content tree builders, CMS JSON
//! fixtures, and assertion utilities for render tree testing.

use uuid::Uuid;
use vitrine_sdk::types::{Asset, ContentNode, FieldValue};

/// Create a test block with a fresh id.
pub fn test_block(block_type: &str) -> TestBlock {
    TestBlock {
        node: ContentNode::new(Uuid::now_v7().to_string(), block_type),
    }
}

/// A test block builder for creating content tree fixtures.
#[derive(Debug, Clone)]
pub struct TestBlock {
    node: ContentNode,
}

impl TestBlock {
    /// Set a custom ID.
    pub fn with_id(mut self, id: &str) -> Self {
        self.node.id = id.to_string();
        self
    }

    /// Add a single field.
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.node.set_field(name, value);
        self
    }

    /// Add a text field.
    pub fn with_text(self, name: &str, value: &str) -> Self {
        self.with_field(name, value)
    }

    /// Fill a child slot.
    pub fn with_children(self, slot: &str, children: Vec<ContentNode>) -> Self {
        self.with_field(slot, children)
    }

    /// Add an image asset field.
    pub fn with_asset(self, name: &str, url: &str, alt: &str) -> Self {
        self.with_field(name, Asset::new(url, alt))
    }

    /// Attach a visual-editor marker for the block.
    pub fn editable(self) -> Self {
        let marker = format!(
            "<!--#storyblok#{{\"name\":\"{}\",\"space\":\"1\",\"uid\":\"{}\",\"id\":\"1\"}}-->",
            self.node.block_type, self.node.id
        );
        self.with_field(
            vitrine_sdk::types::EDITOR_META_FIELD,
            FieldValue::EditorMeta(marker),
        )
    }

    /// Finish building.
    pub fn build(self) -> ContentNode {
        self.node
    }
}

/// A page with the given body.
pub fn page(id: &str, body: Vec<ContentNode>) -> ContentNode {
    test_block("page").with_id(id).with_children("body", body).build()
}

/// A container with the given content.
pub fn container(id: &str, content: Vec<ContentNode>) -> ContentNode {
    test_block("container")
        .with_id(id)
        .with_children("content", content)
        .build()
}

/// A headline with the given text.
pub fn headline(id: &str, text: &str) -> ContentNode {
    test_block("headline").with_id(id).with_text("text", text).build()
}

/// A slideshow over the given image URLs.
pub fn slideshow(id: &str, urls: &[&str]) -> ContentNode {
    let images: Vec<Asset> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| Asset::new(*url, format!("Slide {}", i + 1)))
        .collect();
    test_block("slideshow")
        .with_id(id)
        .with_field("images", images)
        .build()
}

/// Containers nested `depth` levels below the root (`depth + 1` nodes),
/// with ids `n0` (root) through `n{depth}`.
pub fn nested_containers(depth: usize) -> ContentNode {
    let mut node = container(&format!("n{depth}"), Vec::new());
    for i in (0..depth).rev() {
        node = container(&format!("n{i}"), vec![node]);
    }
    node
}

/// Every block id in a content tree, sorted.
pub fn node_ids(root: &ContentNode) -> Vec<String> {
    fn collect(node: &ContentNode, ids: &mut Vec<String>) {
        ids.push(node.id.clone());
        for value in node.fields.values() {
            match value {
                FieldValue::Node(child) => collect(child, ids),
                FieldValue::Nodes(children) => {
                    for child in children {
                        collect(child, ids);
                    }
                }
                _ => {}
            }
        }
    }

    let mut ids = Vec::new();
    collect(root, &mut ids);
    ids.sort();
    ids
}

/// CMS JSON fixtures.
pub mod stories {
    use serde_json::{Value, json};

    /// Wrap blok content in a story response.
    pub fn story(name: &str, content: Value) -> Value {
        json!({
            "story": {
                "name": name,
                "slug": name.to_lowercase().replace(' ', "-"),
                "content": content
            }
        })
    }

    /// A page holding a container with a two-image slideshow.
    pub fn page_with_slideshow() -> Value {
        json!({
            "id": "r1",
            "type": "page",
            "fields": {
                "body": [{
                    "id": "c1",
                    "type": "container",
                    "fields": {
                        "content": [{
                            "id": "s1",
                            "type": "slideshow",
                            "fields": {
                                "images": [
                                    { "url": "/a.png", "alt": "A" },
                                    { "url": "/b.png", "alt": "B" }
                                ]
                            }
                        }]
                    }
                }]
            }
        })
    }

    /// A page whose body holds a headline, an unregistered carousel, and a
    /// button.
    pub fn page_with_unknown_sibling() -> Value {
        json!({
            "_uid": "r1",
            "component": "page",
            "body": [
                { "_uid": "h1", "component": "headline", "text": "Welcome" },
                { "_uid": "x1", "component": "carousel", "items": [] },
                { "_uid": "b1", "component": "button", "label": "Start", "link": "/start" }
            ]
        })
    }
}

/// Assertion helpers for rendered output.
pub mod assert {
    use serde_json::Value;
    use vitrine_sdk::render::RenderElement;
    use vitrine_sdk::types::ContentNode;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that every block in the tree produced exactly one keyed element
    /// and nothing else is keyed.
    pub fn one_element_per_block(root: &ContentNode, rendered: &RenderElement) {
        let expected = super::node_ids(root);
        let mut actual: Vec<String> = rendered.keys().into_iter().map(String::from).collect();
        actual.sort();
        assert_eq!(
            actual, expected,
            "rendered keys do not match content tree ids"
        );
    }
}
