//! Document - High-level document API
//!
//! Every mutation that observers can see goes through `Document`, so the
//! observer queue stays in sync with the tree.

use crate::events::ListenerEntry;
use crate::observer::ObserverRegistry;
use crate::selector::{SelectorError, SelectorList};
use crate::{
    Attribute, DomError, DomTree, ElementData, ListenerId, ListenerOptions, MutationObserverInit,
    MutationRecord, Node, NodeId, NodeType, ObserverId, Property, PropertyValue, Result,
};

/// Host document
#[derive(Debug, Default)]
pub struct Document {
    /// The DOM tree
    pub(crate) tree: DomTree,
    observers: ObserverRegistry,
    next_listener: u64,
}

impl Document {
    /// Create an empty document (document node only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.tree.create_element(local_name)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.tree.create_comment(content)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.tree.get(id).map(Node::node_type)
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tree.get(id).is_some_and(Node::is_element)
    }

    /// Element data of `id`
    pub fn element(&self, id: NodeId) -> Result<&ElementData> {
        self.tree
            .get(id)
            .ok_or(DomError::NotFound(id))?
            .as_element()
            .ok_or(DomError::NotAnElement(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        self.tree
            .get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Lowercased tag name of an element
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.local_name.as_str())
    }

    // ------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    /// Ordered snapshot of child nodes
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.child_ids(id)
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.contains(NodeId::ROOT, id)
    }

    /// Append `child` to `parent`, moving it if it is already attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, NodeId::NONE)
    }

    /// Insert `child` before `reference` under `parent`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<()> {
        let removal = self
            .tree
            .parent(child)
            .and_then(|old_parent| Some((old_parent, self.removal_record(old_parent, child)?)));
        self.tree.insert_before(parent, child, reference)?;

        if let Some((old_parent, record)) = removal {
            let path = self.path(old_parent);
            self.observers.queue_child_list(&path, record);
        }

        let node = self.tree.get(child).ok_or(DomError::NotFound(child))?;
        let record = MutationRecord::child_list(parent, vec![child], Vec::new())
            .with_siblings(valid(node.prev_sibling), valid(node.next_sibling));
        let path = self.path(parent);
        self.observers.queue_child_list(&path, record);
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.tree.parent(child) != Some(parent) {
            return Err(DomError::NotFound(child));
        }
        let record = self.removal_record(parent, child);
        self.tree.remove_child(parent, child)?;

        if let Some(record) = record {
            let path = self.path(parent);
            self.observers.queue_child_list(&path, record);
        }
        Ok(())
    }

    fn removal_record(&self, parent: NodeId, child: NodeId) -> Option<MutationRecord> {
        let node = self.tree.get(child)?;
        Some(
            MutationRecord::child_list(parent, Vec::new(), vec![child])
                .with_siblings(valid(node.prev_sibling), valid(node.next_sibling)),
        )
    }

    fn path(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.ancestors(id).collect()
    }

    /// Target followed by its ancestors up to the top of its tree
    pub fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        self.path(target)
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_ok_and(|e| e.has_attr(name))
    }

    /// Snapshot of the element's attributes in order
    pub fn attributes(&self, id: NodeId) -> Vec<Attribute> {
        self.element(id).map(|e| e.attrs.clone()).unwrap_or_default()
    }

    pub fn attribute_names(&self, id: NodeId) -> Vec<String> {
        self.element(id)
            .map(|e| e.attrs.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Class tokens of the element
    pub fn class_list(&self, id: NodeId) -> Vec<String> {
        self.element(id)
            .map(|e| e.class_list().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Set an attribute and queue an attribute record
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let old = self.element_mut(id)?.set_attr(name, value);
        let path = self.path(id);
        self.observers.queue_attribute(&path, name, old.as_deref());
        Ok(())
    }

    /// Remove an attribute; returns whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool> {
        let Some(old) = self.element_mut(id)?.remove_attr(name) else {
            return Ok(false);
        };
        let path = self.path(id);
        self.observers.queue_attribute(&path, name, Some(&old));
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Own properties
    // ------------------------------------------------------------------

    pub fn has_own_property(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_ok_and(|e| e.props.contains_key(name))
    }

    pub fn own_property(&self, id: NodeId, name: &str) -> Option<&Property> {
        self.element(id).ok()?.props.get(name)
    }

    /// Define (or redefine) an own property slot
    pub fn define_property(&mut self, id: NodeId, name: &str, property: Property) -> Result<()> {
        self.element_mut(id)?.props.insert(name.to_string(), property);
        Ok(())
    }

    /// Read a property; attribute links read the live attribute
    pub fn property(&self, id: NodeId, name: &str) -> Option<PropertyValue> {
        match self.own_property(id, name)? {
            Property::Data(value) => Some(value.clone()),
            Property::Attribute(attr) => Some(self.get_attribute(id, attr).into()),
        }
    }

    /// Write a property; attribute links write through to the attribute
    ///
    /// Writing `Null` through a link removes the attribute.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: PropertyValue) -> Result<()> {
        match self.own_property(id, name) {
            Some(Property::Attribute(attr)) => {
                let attr = attr.clone();
                if value.is_null() {
                    self.remove_attribute(id, &attr)?;
                } else {
                    self.set_attribute(id, &attr, &value.to_string())?;
                }
                Ok(())
            }
            _ => self.define_property(id, name, Property::Data(value)),
        }
    }

    // ------------------------------------------------------------------
    // Event listeners
    // ------------------------------------------------------------------

    /// Register a listener slot; the caller owns the callable behind the ID
    pub fn add_event_listener(
        &mut self,
        id: NodeId,
        event_type: &str,
        options: ListenerOptions,
    ) -> Result<ListenerId> {
        let listener = ListenerId(self.next_listener);
        self.element_mut(id)?.listeners.push(ListenerEntry {
            id: listener,
            event_type: event_type.to_string(),
            capture: options.capture,
        });
        self.next_listener += 1;
        Ok(listener)
    }

    pub fn remove_event_listener(&mut self, id: NodeId, listener: ListenerId) -> bool {
        let Ok(elem) = self.element_mut(id) else { return false };
        let before = elem.listeners.len();
        elem.listeners.retain(|l| l.id != listener);
        elem.listeners.len() != before
    }

    /// Remove every listener slot of `id`, returning the removed IDs
    pub fn clear_event_listeners(&mut self, id: NodeId) -> Vec<ListenerId> {
        let Ok(elem) = self.element_mut(id) else { return Vec::new() };
        std::mem::take(&mut elem.listeners).into_iter().map(|l| l.id).collect()
    }

    /// Listeners for one event type and phase, in registration order
    pub fn listeners(&self, id: NodeId, event_type: &str, capture: bool) -> Vec<ListenerId> {
        self.element(id)
            .map(|e| {
                e.listeners
                    .iter()
                    .filter(|l| l.event_type == event_type && l.capture == capture)
                    .map(|l| l.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Mutation observers
    // ------------------------------------------------------------------

    pub fn create_observer(&mut self) -> ObserverId {
        self.observers.create()
    }

    pub fn observe(
        &mut self,
        observer: ObserverId,
        target: NodeId,
        options: MutationObserverInit,
    ) -> Result<()> {
        if self.tree.get(target).is_none() {
            return Err(DomError::NotFound(target));
        }
        self.observers.observe(observer, target, options)
    }

    pub fn disconnect(&mut self, observer: ObserverId) -> Result<()> {
        self.observers.disconnect(observer)
    }

    /// Disconnect `observer` and drop it; later calls with its id fail
    /// with [`DomError::UnknownObserver`]
    pub fn remove_observer(&mut self, observer: ObserverId) -> Result<()> {
        self.observers.remove(observer)
    }

    pub fn take_records(&mut self, observer: ObserverId) -> Result<Vec<MutationRecord>> {
        self.observers.take_records(observer)
    }

    pub fn is_observing(&self, observer: ObserverId, target: NodeId) -> bool {
        self.observers.is_observing(observer, target)
    }

    /// Observers with queued records, in creation order
    pub fn pending_observers(&self) -> Vec<ObserverId> {
        self.observers.pending()
    }

    // ------------------------------------------------------------------
    // Selectors
    // ------------------------------------------------------------------

    /// Whether `id` is an element matching `selector`
    pub fn matches(&self, id: NodeId, selector: &SelectorList) -> bool {
        selector.matches(&self.tree, id)
    }

    /// Parse and match in one step
    pub fn matches_selector(
        &self,
        id: NodeId,
        selector: &str,
    ) -> std::result::Result<bool, SelectorError> {
        Ok(SelectorList::parse(selector)?.matches(&self.tree, id))
    }

    /// Descendant elements of `root` matching `selector`, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_matches(root, selector, &mut found);
        found
    }

    fn collect_matches(&self, id: NodeId, selector: &SelectorList, found: &mut Vec<NodeId>) {
        for (child, node) in self.tree.children(id) {
            if node.is_element() && selector.matches(&self.tree, child) {
                found.push(child);
            }
            self.collect_matches(child, selector, found);
        }
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_element_with_id(self.tree.root(), id)
    }

    fn find_element_with_id(&self, start: NodeId, target_id: &str) -> Option<NodeId> {
        for (node_id, node) in self.tree.children(start) {
            if let Some(elem) = node.as_element() {
                if elem.get_attr("id") == Some(target_id) {
                    return Some(node_id);
                }
            }
            // Recurse into children
            if let Some(found) = self.find_element_with_id(node_id, target_id) {
                return Some(found);
            }
        }
        None
    }
}

fn valid(id: NodeId) -> Option<NodeId> {
    id.is_valid().then_some(id)
}
