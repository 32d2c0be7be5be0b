//! Document tests for graft-dom
//!
//! Tree shape, selectors, shadow roots and mutation records together.

use graft_dom::{
    Document, DomError, ListenerOptions, MutationObserverInit, MutationType, NodeId, NodeType,
    SelectorList, ShadowRootInit, ShadowRootMode,
};

fn list_document() -> (Document, NodeId, NodeId, NodeId) {
    let mut doc = Document::new();
    let ul = doc.create_element("ul");
    let li = doc.create_element("LI");
    let a = doc.create_element("a");
    doc.append_child(doc.root(), ul).unwrap();
    doc.append_child(ul, li).unwrap();
    doc.append_child(li, a).unwrap();
    doc.set_attribute(li, "class", "item active").unwrap();
    doc.set_attribute(a, "href", "/docs/intro").unwrap();
    (doc, ul, li, a)
}

// ============================================================================
// Tree
// ============================================================================

#[test]
fn test_node_types() {
    let mut doc = Document::new();
    let el = doc.create_element("div");
    let text = doc.create_text("hi");
    let comment = doc.create_comment("note");

    assert_eq!(doc.node_type(doc.root()), Some(NodeType::Document));
    assert_eq!(doc.node_type(el).map(NodeType::to_u32), Some(1));
    assert_eq!(doc.node_type(text), Some(NodeType::Text));
    assert_eq!(doc.node_type(comment), Some(NodeType::Comment));
    assert!(doc.is_element(el));
    assert!(!doc.is_element(text));
}

#[test]
fn test_tag_names_are_lowercased() {
    let (doc, _, li, _) = list_document();
    assert_eq!(doc.local_name(li), Some("li"));
}

#[test]
fn test_insert_before_and_order() {
    let mut doc = Document::new();
    let parent = doc.create_element("div");
    let a = doc.create_element("a");
    let b = doc.create_element("b");
    let c = doc.create_element("c");
    doc.append_child(parent, a).unwrap();
    doc.append_child(parent, c).unwrap();
    doc.insert_before(parent, b, c).unwrap();

    assert_eq!(doc.child_nodes(parent), vec![a, b, c]);

    // Moving a node detaches it first
    doc.append_child(parent, a).unwrap();
    assert_eq!(doc.child_nodes(parent), vec![b, c, a]);
}

#[test]
fn test_hierarchy_errors() {
    let (mut doc, ul, li, a) = list_document();

    assert_eq!(
        doc.append_child(a, ul),
        Err(DomError::HierarchyRequest { parent: a, child: ul })
    );
    assert!(doc.append_child(li, li).is_err());
    assert_eq!(doc.remove_child(ul, a), Err(DomError::NotFound(a)));

    let text = doc.create_text("x");
    assert_eq!(doc.set_attribute(text, "x", "1"), Err(DomError::NotAnElement(text)));
}

#[test]
fn test_connected() {
    let (mut doc, ul, li, a) = list_document();
    assert!(doc.is_connected(a));

    doc.remove_child(ul, li).unwrap();
    assert!(!doc.is_connected(a));
    assert!(doc.tree().contains(li, a));
    assert_eq!(doc.propagation_path(a), vec![a, li]);
}

// ============================================================================
// Selectors
// ============================================================================

#[test]
fn test_selector_matching_in_document() {
    let (doc, ul, li, a) = list_document();

    let item = SelectorList::parse("ul > .item").unwrap();
    assert!(doc.matches(li, &item));
    assert!(!doc.matches(ul, &item));

    assert_eq!(doc.matches_selector(a, "li.active a[href^='/docs']"), Ok(true));
    assert_eq!(doc.matches_selector(a, "ol a"), Ok(false));
    assert!(doc.matches_selector(a, "a[").is_err());

    let links = SelectorList::parse("a, li").unwrap();
    assert_eq!(doc.query_selector_all(doc.root(), &links), vec![li, a]);
}

// ============================================================================
// Shadow roots
// ============================================================================

#[test]
fn test_shadow_root_is_reused() {
    let mut doc = Document::new();
    let host = doc.create_element("x-view");
    let root = doc.attach_shadow(host, ShadowRootInit::default()).unwrap();
    assert_eq!(doc.attach_shadow(host, ShadowRootInit::default()).unwrap(), root);
    assert_eq!(doc.shadow_root(host), Some(root));
    assert_eq!(doc.shadow_host(root), Ok(host));

    let closed_host = doc.create_element("x-secret");
    let init = ShadowRootInit { mode: ShadowRootMode::Closed };
    let closed = doc.attach_shadow(closed_host, init).unwrap();
    assert_eq!(doc.shadow_root(closed_host), None);
    assert_eq!(doc.shadow_host(closed), Ok(closed_host));
}

// ============================================================================
// Mutation observers
// ============================================================================

#[test]
fn test_subtree_observation() {
    let (mut doc, ul, li, a) = list_document();
    let observer = doc.create_observer();
    doc.observe(
        observer,
        ul,
        MutationObserverInit::new().attributes().child_list().subtree(),
    )
    .unwrap();

    doc.set_attribute(a, "href", "/").unwrap();
    let span = doc.create_element("span");
    doc.append_child(li, span).unwrap();

    let records = doc.take_records(observer).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].mutation_type, MutationType::Attributes);
    assert_eq!(records[0].target, a);
    assert_eq!(records[0].old_value, None, "old values only when requested");
    assert_eq!(records[1].mutation_type, MutationType::ChildList);
    assert_eq!(records[1].added_nodes, vec![span]);
    assert_eq!(records[1].previous_sibling, Some(a));
}

#[test]
fn test_attribute_filter_and_disconnect() {
    let (mut doc, _, li, _) = list_document();
    let observer = doc.create_observer();
    doc.observe(observer, li, MutationObserverInit::new().attribute_filter(vec!["class".into()]))
        .unwrap();

    doc.set_attribute(li, "title", "t").unwrap();
    doc.set_attribute(li, "class", "item").unwrap();
    assert_eq!(doc.pending_observers(), vec![observer]);
    assert_eq!(doc.take_records(observer).unwrap().len(), 1);

    doc.disconnect(observer).unwrap();
    doc.set_attribute(li, "class", "other").unwrap();
    assert!(doc.pending_observers().is_empty());
    assert!(!doc.is_observing(observer, li));
}

#[test]
fn test_removed_observer_is_forgotten() {
    let (mut doc, ul, li, _) = list_document();
    let kept = doc.create_observer();
    let dropped = doc.create_observer();
    doc.observe(kept, ul, MutationObserverInit::new().attributes().subtree()).unwrap();
    doc.observe(dropped, li, MutationObserverInit::new().attributes()).unwrap();

    doc.remove_observer(dropped).unwrap();
    doc.set_attribute(li, "class", "item").unwrap();

    assert_eq!(doc.pending_observers(), vec![kept]);
    assert_eq!(doc.take_records(dropped), Err(DomError::UnknownObserver(dropped)));
    assert_eq!(doc.remove_observer(dropped), Err(DomError::UnknownObserver(dropped)));
}

#[test]
fn test_clear_event_listeners() {
    let (mut doc, ul, li, _) = list_document();
    let click = doc.add_event_listener(li, "click", ListenerOptions::bubble()).unwrap();
    let focus = doc.add_event_listener(li, "focus", ListenerOptions { capture: true }).unwrap();
    let other = doc.add_event_listener(ul, "click", ListenerOptions::bubble()).unwrap();

    assert_eq!(doc.clear_event_listeners(li), vec![click, focus]);
    assert!(doc.listeners(li, "click", false).is_empty());
    assert_eq!(doc.listeners(ul, "click", false), vec![other]);
    assert!(doc.clear_event_listeners(li).is_empty());
}

#[test]
fn test_invalid_observer_options() {
    let mut doc = Document::new();
    let el = doc.create_element("div");
    let observer = doc.create_observer();
    assert!(matches!(
        doc.observe(observer, el, MutationObserverInit::new()),
        Err(DomError::InvalidObserverOptions(_))
    ));
}
