//! Component definitions
//!
//! A definition is immutable once built. The runtime only ever looks
//! definitions up through the registry and shares them as
//! `Rc<ComponentDefinition>`.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use graft_dom::{Event, NodeId};

use crate::attributes::{AttributeChange, AttributeDecl, Attributes};
use crate::behavior::ComponentBehavior;
use crate::events::{EventBinding, ParsedEvent};
use crate::render::Renderer;
use crate::Runtime;

/// Lifecycle hook: `created`, `attached`, `detached` and `template`
pub type LifecycleCallback = Rc<dyn Fn(&mut Runtime, NodeId) -> anyhow::Result<()>>;

/// Attribute handler, called with the element and the classified change
pub type AttributeCallback =
    Rc<dyn Fn(&mut Runtime, NodeId, &AttributeChange) -> anyhow::Result<()>>;

/// Event handler, called with the component element, the event and the
/// element the handler fired for (the element itself or the delegate match)
pub type EventCallback =
    Rc<dyn Fn(&mut Runtime, NodeId, &mut Event, NodeId) -> anyhow::Result<()>>;

/// Counter for generating unique definition ids
static NEXT_DEFINITION_ID: AtomicU32 = AtomicU32::new(1);

/// Definition identifier
///
/// Lifecycle flags are keyed by (element, id), so two definitions applied
/// to the same element must never share one. Every built definition gets a
/// fresh process-wide id unless [`DefinitionBuilder::id`] overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(pub u32);

impl DefinitionId {
    pub(crate) fn next() -> Self {
        DefinitionId(NEXT_DEFINITION_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def#{}", self.0)
    }
}

/// How a definition is matched against elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentKind {
    /// Tag name, or the `is` attribute
    #[default]
    Element,
    /// Presence of an attribute with the definition's name
    Attribute,
    /// Class list containing the definition's name
    ClassName,
}

/// Registered component definition
pub struct ComponentDefinition {
    pub(crate) id: DefinitionId,
    name: String,
    kind: ComponentKind,
    attributes: Attributes,
    events: Vec<EventBinding>,
    prototype: ComponentBehavior,
    template: Option<LifecycleCallback>,
    renderer: Option<Renderer>,
    created: Option<LifecycleCallback>,
    attached: Option<LifecycleCallback>,
    detached: Option<LifecycleCallback>,
    unresolved_attribute: String,
    resolved_attribute: String,
}

impl ComponentDefinition {
    /// Start building a definition
    pub fn builder(name: &str) -> DefinitionBuilder {
        DefinitionBuilder::new(name)
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn events(&self) -> &[EventBinding] {
        &self.events
    }

    pub fn prototype(&self) -> &ComponentBehavior {
        &self.prototype
    }

    pub fn template(&self) -> Option<&LifecycleCallback> {
        self.template.as_ref()
    }

    /// Shadow-root renderer installed with [`DefinitionBuilder::render`]
    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    pub fn created(&self) -> Option<&LifecycleCallback> {
        self.created.as_ref()
    }

    pub fn attached(&self) -> Option<&LifecycleCallback> {
        self.attached.as_ref()
    }

    pub fn detached(&self) -> Option<&LifecycleCallback> {
        self.detached.as_ref()
    }

    pub fn unresolved_attribute(&self) -> &str {
        &self.unresolved_attribute
    }

    pub fn resolved_attribute(&self) -> &str {
        &self.resolved_attribute
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("events", &self.events.len())
            .field("members", &self.prototype.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ComponentDefinition`]
pub struct DefinitionBuilder {
    def: ComponentDefinition,
}

impl DefinitionBuilder {
    fn new(name: &str) -> Self {
        Self {
            def: ComponentDefinition {
                id: DefinitionId::next(),
                name: name.to_string(),
                kind: ComponentKind::Element,
                attributes: Attributes::None,
                events: Vec::new(),
                prototype: ComponentBehavior::default(),
                template: None,
                renderer: None,
                created: None,
                attached: None,
                detached: None,
                unresolved_attribute: "unresolved".to_string(),
                resolved_attribute: "resolved".to_string(),
            },
        }
    }

    /// Override the generated identifier
    ///
    /// `ComponentRegistry::define` replaces an id that is already taken.
    pub fn id(mut self, id: DefinitionId) -> Self {
        self.def.id = id;
        self
    }

    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.def.kind = kind;
        self
    }

    /// Replace the whole attribute declaration
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.def.attributes = attributes;
        self
    }

    /// Declare one named attribute
    ///
    /// Switches a catch-all declaration to a named one.
    pub fn attribute(mut self, name: &str, decl: AttributeDecl) -> Self {
        match &mut self.def.attributes {
            Attributes::Named(decls) => {
                decls.retain(|(n, _)| n != name);
                decls.push((name.to_string(), decl));
            }
            other => *other = Attributes::Named(vec![(name.to_string(), decl)]),
        }
        self
    }

    /// Handle every attribute with one callback
    pub fn any_attribute<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &AttributeChange) -> anyhow::Result<()> + 'static,
    {
        self.def.attributes = Attributes::Any(Rc::new(handler));
        self
    }

    /// Bind an event handler; `key` is `"<event>"` or `"<event> <selector>"`
    pub fn on<F>(mut self, key: &str, handler: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &mut Event, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.def.events.push(EventBinding {
            key: key.to_string(),
            event: ParsedEvent::parse(key),
            handler: Rc::new(handler),
        });
        self
    }

    pub fn prototype(mut self, behavior: ComponentBehavior) -> Self {
        self.def.prototype = behavior;
        self
    }

    pub fn template<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.def.template = Some(Rc::new(hook));
        self.def.renderer = None;
        self
    }

    /// Use a shadow-root renderer as the template hook
    ///
    /// The renderer stays available to [`Runtime::render`] for re-renders.
    pub fn render(mut self, renderer: Renderer) -> Self {
        self.def.template = Some(renderer.clone().into_template());
        self.def.renderer = Some(renderer);
        self
    }

    pub fn created<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.def.created = Some(Rc::new(callback));
        self
    }

    pub fn attached<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.def.attached = Some(Rc::new(callback));
        self
    }

    pub fn detached<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.def.detached = Some(Rc::new(callback));
        self
    }

    pub fn unresolved_attribute(mut self, name: &str) -> Self {
        self.def.unresolved_attribute = name.to_string();
        self
    }

    pub fn resolved_attribute(mut self, name: &str) -> Self {
        self.def.resolved_attribute = name.to_string();
        self
    }

    pub fn build(self) -> ComponentDefinition {
        self.def
    }
}
