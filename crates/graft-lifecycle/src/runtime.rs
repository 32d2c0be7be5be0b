//! Lifecycle runtime
//!
//! Owns the document, the registry and all per-element state. Listener and
//! observer callables live here, addressed by the ids the document hands
//! out, so callbacks can take `&mut Runtime` and mutate the tree freely.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use graft_dom::{
    Document, Event, EventPhase, ListenerId, ListenerOptions, MutationObserverInit, NodeId,
    ObserverId, PropertyValue,
};

use crate::definition::{ComponentDefinition, DefinitionId};
use crate::registry::Registry;
use crate::state::{LifecycleStates, PhaseFlags};
use crate::{LifecycleConfig, Result};

type ListenerCallback = Rc<dyn Fn(&mut Runtime, &mut Event) -> anyhow::Result<()>>;

/// What a runtime-owned observer delivers to
#[derive(Clone)]
pub(crate) enum ObserverTarget {
    /// Child-list changes anywhere in the document
    Document,
    /// Attribute changes of one element for one definition
    Attributes {
        element: NodeId,
        definition: Rc<ComponentDefinition>,
    },
}

/// Custom element lifecycle runtime
pub struct Runtime {
    pub(crate) document: Document,
    registry: Box<dyn Registry>,
    pub(crate) config: LifecycleConfig,
    pub(crate) states: LifecycleStates,
    observers: HashMap<ObserverId, ObserverTarget>,
    listeners: HashMap<ListenerId, ListenerCallback>,
    document_observer: Option<ObserverId>,
}

impl Runtime {
    pub fn new(
        document: Document,
        registry: impl Registry + 'static,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            document,
            registry: Box::new(registry),
            config,
            states: LifecycleStates::default(),
            observers: HashMap::new(),
            listeners: HashMap::new(),
            document_observer: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable document access; observed changes are delivered by
    /// [`Runtime::deliver_mutations`]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    /// Definitions matching `element`, in registry order
    pub fn definitions_for(&self, element: NodeId) -> Vec<Rc<ComponentDefinition>> {
        self.registry.get_for_element(&self.document, element)
    }

    pub fn lifecycle_flags(&self, element: NodeId, definition: DefinitionId) -> PhaseFlags {
        self.states.flags(element, definition)
    }

    /// Observe the whole document for insertions and removals, then
    /// initialize everything already in it
    pub fn start(&mut self) -> Result<()> {
        if self.document_observer.is_some() {
            tracing::trace!("Runtime already started");
            return Ok(());
        }

        let root = self.document.root();
        let observer = self.document.create_observer();
        self.document.observe(observer, root, MutationObserverInit::new().child_list().subtree())?;
        self.register_observer(observer, ObserverTarget::Document);
        self.document_observer = Some(observer);
        tracing::debug!("Runtime started, observing {}", root);

        let children = self.document.child_nodes(root);
        self.init_elements(&children)
    }

    pub(crate) fn register_observer(&mut self, observer: ObserverId, target: ObserverTarget) {
        if let ObserverTarget::Attributes { element, .. } = &target {
            self.states.track_observer(*element, observer);
        }
        self.observers.insert(observer, target);
    }

    /// Drop everything the runtime holds for `element` and its descendants
    ///
    /// Meant for elements that are discarded for good: attribute observers
    /// are removed from the document, listener callables are dropped and
    /// lifecycle flags and methods are forgotten. Detached elements that may
    /// be inserted again should not be released; a released element that
    /// is inserted again is created from scratch.
    pub fn release(&mut self, element: NodeId) -> Result<()> {
        for child in self.document.child_nodes(element) {
            self.release(child)?;
        }

        for observer in self.states.remove(element) {
            self.observers.remove(&observer);
            self.document.remove_observer(observer)?;
        }
        for listener in self.document.clear_event_listeners(element) {
            self.listeners.remove(&listener);
        }
        tracing::trace!("Released {}", element);
        Ok(())
    }

    /// Deliver queued mutation records
    ///
    /// Records queued by handlers during delivery go out in a later round
    /// of the same call. Observers created directly on the document keep
    /// their records.
    pub fn deliver_mutations(&mut self) -> Result<()> {
        loop {
            let pending: Vec<_> = self
                .document
                .pending_observers()
                .into_iter()
                .filter(|id| self.observers.contains_key(id))
                .collect();
            if pending.is_empty() {
                return Ok(());
            }

            for observer in pending {
                let records = self.document.take_records(observer)?;
                let Some(target) = self.observers.get(&observer).cloned() else { continue };
                match target {
                    ObserverTarget::Document => {
                        for record in records {
                            self.init_elements(&record.added_nodes)?;
                            self.remove_elements(&record.removed_nodes)?;
                        }
                    }
                    ObserverTarget::Attributes { element, definition } => {
                        self.dispatch_attribute_records(element, &definition, records)?;
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a listener on `node`
    pub fn add_listener<F>(
        &mut self,
        node: NodeId,
        event_type: &str,
        options: ListenerOptions,
        f: F,
    ) -> Result<ListenerId>
    where
        F: Fn(&mut Runtime, &mut Event) -> anyhow::Result<()> + 'static,
    {
        let id = self.document.add_event_listener(node, event_type, options)?;
        self.listeners.insert(id, Rc::new(f));
        Ok(id)
    }

    pub fn remove_listener(&mut self, node: NodeId, listener: ListenerId) -> bool {
        self.listeners.remove(&listener);
        self.document.remove_event_listener(node, listener)
    }

    /// Dispatch `event` at `target`: capture, target, then bubble
    ///
    /// Returns `false` when a listener prevented the default action.
    pub fn dispatch_event(&mut self, target: NodeId, event: &mut Event) -> Result<bool> {
        event.target = target;
        let path = self.document.propagation_path(target);

        event.phase = EventPhase::Capturing;
        for &node in path.iter().skip(1).rev() {
            self.invoke_listeners(node, event, true)?;
            if event.is_propagation_stopped() {
                return Ok(self.finish_dispatch(event));
            }
        }

        event.phase = EventPhase::AtTarget;
        self.invoke_listeners(target, event, true)?;
        self.invoke_listeners(target, event, false)?;

        if event.bubbles && !event.is_propagation_stopped() {
            event.phase = EventPhase::Bubbling;
            for &node in path.iter().skip(1) {
                self.invoke_listeners(node, event, false)?;
                if event.is_propagation_stopped() {
                    break;
                }
            }
        }

        Ok(self.finish_dispatch(event))
    }

    fn invoke_listeners(&mut self, node: NodeId, event: &mut Event, capture: bool) -> Result<()> {
        let ids = self.document.listeners(node, &event.event_type, capture);
        if ids.is_empty() {
            return Ok(());
        }
        event.current_target = node;
        for id in ids {
            let Some(listener) = self.listeners.get(&id).cloned() else { continue };
            listener(self, event)?;
        }
        Ok(())
    }

    fn finish_dispatch(&self, event: &mut Event) -> bool {
        event.phase = EventPhase::None;
        event.current_target = NodeId::NONE;
        !event.is_default_prevented()
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Read an own property; attribute links read the live attribute
    pub fn property(&self, element: NodeId, name: &str) -> Option<PropertyValue> {
        self.document.property(element, name)
    }

    /// Write an own property; attribute links write through to the attribute
    pub fn set_property(
        &mut self,
        element: NodeId,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        Ok(self.document.set_property(element, name, value.into())?)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("elements", &self.states.len())
            .field("observers", &self.observers.len())
            .field("listeners", &self.listeners.len())
            .field("started", &self.document_observer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentRegistry;
    use std::cell::RefCell;

    fn runtime() -> Runtime {
        Runtime::new(Document::new(), ComponentRegistry::new(), LifecycleConfig::default())
    }

    #[test]
    fn test_dispatch_order() {
        let mut rt = runtime();
        let outer = rt.document_mut().create_element("div");
        let inner = rt.document_mut().create_element("span");
        let root = rt.document().root();
        rt.document_mut().append_child(root, outer).unwrap();
        rt.document_mut().append_child(outer, inner).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        for (node, capture, label) in [
            (outer, true, "outer-capture"),
            (outer, false, "outer-bubble"),
            (inner, false, "inner-bubble"),
            (inner, true, "inner-capture"),
        ] {
            let log = Rc::clone(&log);
            let options = ListenerOptions { capture };
            rt.add_listener(node, "click", options, move |_, _| {
                log.borrow_mut().push(label);
                Ok(())
            })
            .unwrap();
        }

        let mut event = Event::new("click");
        assert!(rt.dispatch_event(inner, &mut event).unwrap());
        assert_eq!(
            *log.borrow(),
            vec!["outer-capture", "inner-capture", "inner-bubble", "outer-bubble"]
        );
        assert_eq!(event.phase, EventPhase::None);
    }

    #[test]
    fn test_stop_propagation_and_prevent_default() {
        let mut rt = runtime();
        let outer = rt.document_mut().create_element("div");
        let inner = rt.document_mut().create_element("span");
        rt.document_mut().append_child(outer, inner).unwrap();

        let reached = Rc::new(RefCell::new(false));
        rt.add_listener(inner, "click", ListenerOptions::bubble(), |_, event| {
            event.prevent_default();
            event.stop_propagation();
            Ok(())
        })
        .unwrap();
        let flag = Rc::clone(&reached);
        rt.add_listener(outer, "click", ListenerOptions::bubble(), move |_, _| {
            *flag.borrow_mut() = true;
            Ok(())
        })
        .unwrap();

        let mut event = Event::new("click");
        assert!(!rt.dispatch_event(inner, &mut event).unwrap());
        assert!(!*reached.borrow());
    }

    #[test]
    fn test_non_bubbling_event() {
        let mut rt = runtime();
        let outer = rt.document_mut().create_element("div");
        let inner = rt.document_mut().create_element("input");
        rt.document_mut().append_child(outer, inner).unwrap();

        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        rt.add_listener(outer, "focus", ListenerOptions::bubble(), move |_, _| {
            *c.borrow_mut() += 1;
            Ok(())
        })
        .unwrap();

        rt.dispatch_event(inner, &mut Event::new("focus")).unwrap();
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_foreign_observer_records_are_kept() {
        let mut rt = runtime();
        let el = rt.document_mut().create_element("div");
        let observer = rt.document_mut().create_observer();
        rt.document_mut()
            .observe(observer, el, MutationObserverInit::new().attributes())
            .unwrap();
        rt.document_mut().set_attribute(el, "x", "1").unwrap();

        rt.deliver_mutations().unwrap();
        assert_eq!(rt.document_mut().take_records(observer).unwrap().len(), 1);
    }

    #[test]
    fn test_listener_error_propagates() {
        let mut rt = runtime();
        let el = rt.document_mut().create_element("div");
        rt.add_listener(el, "click", ListenerOptions::bubble(), |_, _| Err(anyhow::anyhow!("boom")))
            .unwrap();

        let err = rt.dispatch_event(el, &mut Event::new("click")).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_release_drops_bound_resources() {
        use crate::{AttributeDecl, ComponentDefinition};

        let mut registry = ComponentRegistry::new();
        registry
            .define(
                ComponentDefinition::builder("x-row")
                    .attribute("label", AttributeDecl::new())
                    .on("click", |_, _, _, _| Ok(()))
                    .build(),
            )
            .unwrap();
        let mut rt = Runtime::new(Document::new(), registry, LifecycleConfig::default());
        let root = rt.document().root();
        let rows: Vec<_> = (0..3)
            .map(|_| {
                let row = rt.document_mut().create_element("x-row");
                rt.document_mut().append_child(root, row).unwrap();
                row
            })
            .collect();
        let cell = rt.document_mut().create_element("x-row");
        rt.document_mut().append_child(rows[0], cell).unwrap();
        rt.start().unwrap();

        // Document observer plus one attribute observer per element
        assert_eq!(rt.observers.len(), 5);
        assert_eq!(rt.listeners.len(), 4);

        rt.document_mut().remove_child(root, rows[0]).unwrap();
        rt.deliver_mutations().unwrap();
        rt.release(rows[0]).unwrap();

        assert_eq!(rt.observers.len(), 3);
        assert_eq!(rt.listeners.len(), 2);
        assert_eq!(rt.states.len(), 2);

        rt.document_mut().set_attribute(cell, "label", "gone").unwrap();
        assert!(rt.document().pending_observers().is_empty());
    }
}
