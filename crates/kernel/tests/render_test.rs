#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Tree renderer integration tests.

use std::sync::Arc;

use serde_json::json;
use vitrine_kernel::content::{
    BlockRegistry, EDITABLE_ATTR, EDITABLE_UID_ATTR, RenderContext, RenderOptions, TreeRenderer,
};
use vitrine_kernel::source::storyblok;
use vitrine_kernel::theme::ThemeEngine;
use vitrine_sdk::render::{self, RenderElement};
use vitrine_sdk::types::ContentNode;
use vitrine_test_utils::{assert, container, headline, nested_containers, page, stories, test_block};

fn render(root: &ContentNode) -> RenderElement {
    let registry = BlockRegistry::with_standard_types();
    TreeRenderer::new(&registry, RenderOptions::default()).render(root)
}

fn html(element: &RenderElement) -> String {
    ThemeEngine::empty().render_element(element)
}

/// Remove the visual-editor attributes from every element.
fn strip_editable(element: &mut RenderElement) {
    element.attributes.remove(EDITABLE_ATTR);
    element.attributes.remove(EDITABLE_UID_ATTR);
    for child in &mut element.children {
        strip_editable(child);
    }
}

#[test]
fn test_page_container_slideshow_scenario() {
    let root = storyblok::node_from_value(&stories::page_with_slideshow()).unwrap();
    let out = render(&root);

    assert_eq!(out.keys(), vec!["r1", "c1", "s1"]);
    assert::one_element_per_block(&root, &out);

    let slideshow = out.find_by_key("s1").unwrap();
    let sources: Vec<_> = slideshow
        .walk()
        .filter_map(|el| el.attr("src"))
        .collect();
    assert_eq!(sources, vec!["/a.png", "/b.png"]);

    assert_eq!(
        html(&out),
        "<main class=\"page\">\
         <section class=\"container container--default\">\
         <div class=\"slideshow\">\
         <figure class=\"slideshow__slide\"><img alt=\"A\" loading=\"lazy\" src=\"/a.png\" /></figure>\
         <figure class=\"slideshow__slide\"><img alt=\"B\" loading=\"lazy\" src=\"/b.png\" /></figure>\
         </div></section></main>"
    );
}

#[test]
fn test_full_width_container_scenario() {
    let root = storyblok::node_from_value(&json!({
        "id": "r1",
        "type": "page",
        "fields": {
            "body": [{
                "id": "c1",
                "type": "container",
                "fields": {
                    "width": "full",
                    "content": [{
                        "id": "s1",
                        "type": "slideshow",
                        "fields": { "images": [{ "url": "/a.png", "alt": "A" }] }
                    }]
                }
            }]
        }
    }))
    .unwrap();
    let out = render(&root);

    assert_eq!(out.keys(), vec!["r1", "c1", "s1"]);
    assert_eq!(out.class(), Some("page"));
    assert_eq!(out.children.len(), 1);

    let container = out.find_by_key("c1").unwrap();
    assert_eq!(container.class(), Some("container container--full"));
    assert_eq!(container.children.len(), 1);

    let slideshow = out.find_by_key("s1").unwrap();
    let sources: Vec<_> = slideshow.walk().filter_map(|el| el.attr("src")).collect();
    assert_eq!(sources, vec!["/a.png"]);

    assert_eq!(
        html(&out),
        "<main class=\"page\">\
         <section class=\"container container--full\">\
         <div class=\"slideshow\">\
         <figure class=\"slideshow__slide\"><img alt=\"A\" loading=\"lazy\" src=\"/a.png\" /></figure>\
         </div></section></main>"
    );
}

#[test]
fn test_slideshow_skips_malformed_entries_individually() {
    let root = storyblok::node_from_value(&json!({
        "_uid": "s1",
        "component": "slideshow",
        "images": [{ "filename": "/a.png" }, null, { "filename": "/b.png" }]
    }))
    .unwrap();
    let out = render(&root);

    let sources: Vec<_> = out.walk().filter_map(|el| el.attr("src")).collect();
    assert_eq!(sources, vec!["/a.png", "/b.png"]);
}

#[test]
fn test_unregistered_sibling_scenario() {
    let root = storyblok::node_from_value(&stories::page_with_unknown_sibling()).unwrap();
    let out = render(&root);

    assert_eq!(out.keys(), vec!["r1", "h1", "x1", "b1"]);
    assert::one_element_per_block(&root, &out);

    let placeholder = out.find_by_key("x1").unwrap();
    assert_eq!(placeholder.attr("data-block-type"), Some("carousel"));
    assert_eq!(placeholder.attr("data-block-id"), Some("x1"));
    assert_eq!(placeholder.attr("data-block-reason"), Some("unknown"));

    let headline = out.find_by_key("h1").unwrap();
    assert_eq!(headline.value.as_deref(), Some("Welcome"));
    let button = out.find_by_key("b1").unwrap();
    assert_eq!(button.attr("href"), Some("/start"));

    let output = html(&out);
    assert::contains(&output, "<h2 class=\"headline\">Welcome</h2>");
    assert::contains(&output, "data-block-type=\"carousel\"");
    assert::contains(&output, "<a class=\"button button--primary\" href=\"/start\">Start</a>");
}

#[test]
fn test_unknown_root_does_not_fail() {
    let out = render(&ContentNode::new("z9", "hero-banner-v2"));
    assert_eq!(out.key.as_deref(), Some("z9"));
    let output = html(&out);
    assert::contains(&output, "hero-banner-v2");
    assert::contains(&output, "z9");
}

#[test]
fn test_one_element_per_block_in_mixed_tree() {
    let root = page(
        "r1",
        vec![
            headline("h1", "Title"),
            container(
                "c1",
                vec![
                    test_block("text").with_id("t1").with_text("text", "<p>x</p>").build(),
                    test_block("grid")
                        .with_id("g1")
                        .with_children(
                            "columns",
                            vec![container("c2", vec![]), container("c3", vec![headline("h2", "")])],
                        )
                        .build(),
                ],
            ),
            test_block("image").with_id("i1").with_asset("image", "", "").build(),
            test_block("mystery").with_id("m1").build(),
        ],
    );
    let out = render(&root);
    assert::one_element_per_block(&root, &out);
    assert_eq!(out.count_keyed(), root.subtree_len());
}

#[test]
fn test_empty_and_absent_slots_render_nothing() {
    for root in [page("r1", vec![]), test_block("page").with_id("r1").build()] {
        let out = render(&root);
        assert!(out.children.is_empty());
        assert_eq!(html(&out), "<main class=\"page\"></main>");
    }
}

#[test]
fn test_render_is_idempotent() {
    let root = storyblok::node_from_value(&stories::page_with_unknown_sibling()).unwrap();
    let registry = BlockRegistry::with_standard_types();
    let renderer = TreeRenderer::new(&registry, RenderOptions::default().preview(true));

    let first = renderer.render(&root);
    let second = renderer.render(&root);
    assert_eq!(first, second);
    assert_eq!(html(&first), html(&second));
}

#[test]
fn test_preview_only_adds_editable_attributes() {
    let root = page(
        "r1",
        vec![
            test_block("headline").with_id("h1").with_text("text", "Hi").editable().build(),
            container("c1", vec![test_block("carousel").with_id("x1").build()]),
        ],
    );
    let registry = BlockRegistry::with_standard_types();
    let published = TreeRenderer::new(&registry, RenderOptions::default()).render(&root);
    let mut preview =
        TreeRenderer::new(&registry, RenderOptions::default().preview(true)).render(&root);

    for id in ["r1", "h1", "c1", "x1"] {
        let element = preview.find_by_key(id).unwrap();
        assert!(element.attr(EDITABLE_ATTR).is_some(), "{id} missing payload");
        assert!(element.attr(EDITABLE_UID_ATTR).is_some(), "{id} missing uid");
    }
    assert!(published.walk().all(|el| el.attr(EDITABLE_ATTR).is_none()));

    let h1 = preview.find_by_key("h1").unwrap();
    assert_eq!(h1.attr(EDITABLE_UID_ATTR), Some("h1-headline"));
    let payload: serde_json::Value =
        serde_json::from_str(h1.attr(EDITABLE_ATTR).unwrap()).unwrap();
    assert_eq!(payload["uid"], "h1");
    assert_eq!(payload["space"], "1");

    strip_editable(&mut preview);
    assert_eq!(preview, published);
}

#[test]
fn test_depth_guard_on_deep_tree() {
    let root = nested_containers(500);
    let out = render(&root);

    assert_eq!(out.count_keyed(), 33);
    let last = out.find_by_key("n32").unwrap();
    assert_eq!(last.attr("data-block-reason"), Some("depth"));
    assert!(out.find_by_key("n33").is_none());
}

#[test]
fn test_depth_guard_configurable() {
    let root = nested_containers(10);
    let registry = BlockRegistry::with_standard_types();
    let out = TreeRenderer::new(&registry, RenderOptions::default().max_depth(3)).render(&root);
    assert_eq!(out.keys(), vec!["n0", "n1", "n2", "n3"]);
    assert_eq!(
        out.find_by_key("n3").unwrap().attr("data-block-reason"),
        Some("depth")
    );
}

#[test]
fn test_malformed_field_degrades_locally() {
    let value = json!({
        "_uid": "r1",
        "component": "page",
        "body": [
            { "_uid": "i1", "component": "image", "image": { "filename": "", "alt": null } },
            { "_uid": "h1", "component": "headline", "text": "Still here", "level": "banana" },
            { "_uid": "s1", "component": "slideshow", "images": "not-a-list" }
        ]
    });
    let root = storyblok::node_from_value(&value).unwrap();
    let out = render(&root);

    assert_eq!(out.keys(), vec!["r1", "i1", "h1", "s1"]);
    assert!(out.find_by_key("i1").unwrap().children.is_empty());
    let h1 = out.find_by_key("h1").unwrap();
    assert_eq!(h1.tag.as_deref(), Some("h2"));
    assert_eq!(h1.value.as_deref(), Some("Still here"));
    assert!(out.find_by_key("s1").unwrap().children.is_empty());
}

#[test]
fn test_custom_renderer_registration() {
    let mut registry = BlockRegistry::with_standard_types();
    registry.register_fn("carousel", |node: &ContentNode, cx: &RenderContext<'_>| {
        render::container("div")
            .class("carousel")
            .children(cx.render_slot(node, "items"))
            .build()
    });

    let root = page(
        "r1",
        vec![
            test_block("carousel")
                .with_id("x1")
                .with_children("items", vec![headline("h1", "One")])
                .build(),
        ],
    );
    let out = TreeRenderer::new(&registry, RenderOptions::default()).render(&root);
    assert_eq!(out.keys(), vec!["r1", "x1", "h1"]);
    assert_eq!(out.find_by_key("x1").unwrap().class(), Some("carousel"));
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(BlockRegistry::with_standard_types());
    let root = Arc::new(storyblok::node_from_value(&stories::page_with_slideshow()).unwrap());
    let expected = TreeRenderer::new(&registry, RenderOptions::default()).render(&root);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let root = Arc::clone(&root);
            std::thread::spawn(move || {
                let options = RenderOptions::default().preview(i % 2 == 0);
                let mut out = TreeRenderer::new(&registry, options).render(&root);
                strip_editable(&mut out);
                out
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_render_tree_json_shape() {
    let out = render(&headline("h1", "Hi"));
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["#key"], "h1");
    assert_eq!(value["#tag"], "h2");
    assert_eq!(value["#value"], "Hi");
}
