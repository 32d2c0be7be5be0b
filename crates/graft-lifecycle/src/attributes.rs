//! Attribute handling
//!
//! Declarations, classification of attribute mutations into
//! created/updated/removed, handler resolution, attribute-to-property links
//! and the per-element attribute listener binder.

use std::fmt;
use std::rc::Rc;

use graft_dom::{Document, MutationObserverInit, MutationRecord, NodeId, Property};

use crate::definition::{AttributeCallback, ComponentDefinition};
use crate::runtime::ObserverTarget;
use crate::{Result, Runtime};

/// Classified attribute change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeChangeKind {
    /// Attribute present now, no previous value
    Created,
    /// Attribute present now and had a previous value
    Updated,
    /// Attribute no longer present
    Removed,
}

impl AttributeChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeChangeKind::Created => "created",
            AttributeChangeKind::Updated => "updated",
            AttributeChangeKind::Removed => "removed",
        }
    }
}

impl fmt::Display for AttributeChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a change from the live value and the recorded old value
pub fn classify(current: Option<&str>, old_value: Option<&str>) -> AttributeChangeKind {
    match (current, old_value) {
        (Some(_), None) => AttributeChangeKind::Created,
        (Some(_), Some(_)) => AttributeChangeKind::Updated,
        (None, _) => AttributeChangeKind::Removed,
    }
}

/// Attribute change passed to handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub kind: AttributeChangeKind,
    pub name: String,
    pub new_value: Option<String>,
    pub old_value: Option<String>,
}

/// Default value of a declared attribute
#[derive(Clone)]
pub enum DefaultValue {
    Literal(String),
    /// Evaluated against the element when listeners are bound
    Computed(Rc<dyn Fn(&Document, NodeId) -> String>),
}

impl DefaultValue {
    pub fn evaluate(&self, document: &Document, element: NodeId) -> String {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Computed(compute) => compute(document, element),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Per-type handlers of one attribute
#[derive(Clone, Default)]
pub struct TypedAttributeHandlers {
    pub created: Option<AttributeCallback>,
    pub updated: Option<AttributeCallback>,
    pub removed: Option<AttributeCallback>,
    pub fallback: Option<AttributeCallback>,
}

impl TypedAttributeHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &AttributeChange) -> anyhow::Result<()> + 'static,
    {
        self.created = Some(Rc::new(f));
        self
    }

    pub fn updated<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &AttributeChange) -> anyhow::Result<()> + 'static,
    {
        self.updated = Some(Rc::new(f));
        self
    }

    pub fn removed<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &AttributeChange) -> anyhow::Result<()> + 'static,
    {
        self.removed = Some(Rc::new(f));
        self
    }

    pub fn fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &AttributeChange) -> anyhow::Result<()> + 'static,
    {
        self.fallback = Some(Rc::new(f));
        self
    }

    fn for_kind(&self, kind: AttributeChangeKind) -> Option<&AttributeCallback> {
        match kind {
            AttributeChangeKind::Created => self.created.as_ref(),
            AttributeChangeKind::Updated => self.updated.as_ref(),
            AttributeChangeKind::Removed => self.removed.as_ref(),
        }
    }
}

/// Handler of one declared attribute
#[derive(Clone)]
pub enum AttributeHandler {
    /// One callback for every change type
    Shorthand(AttributeCallback),
    Typed(TypedAttributeHandlers),
}

/// One named attribute declaration
#[derive(Clone, Default)]
pub struct AttributeDecl {
    pub handler: Option<AttributeHandler>,
    pub default: Option<DefaultValue>,
}

impl AttributeDecl {
    /// Declaration with neither handler nor default (property link only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Declaration with a shorthand handler
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &AttributeChange) -> anyhow::Result<()> + 'static,
    {
        Self {
            handler: Some(AttributeHandler::Shorthand(Rc::new(f))),
            default: None,
        }
    }

    /// Declaration with per-type handlers
    pub fn typed(handlers: TypedAttributeHandlers) -> Self {
        Self {
            handler: Some(AttributeHandler::Typed(handlers)),
            default: None,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(DefaultValue::Literal(value.to_string()));
        self
    }

    pub fn with_computed_default<F>(mut self, compute: F) -> Self
    where
        F: Fn(&Document, NodeId) -> String + 'static,
    {
        self.default = Some(DefaultValue::Computed(Rc::new(compute)));
        self
    }
}

/// Attribute declarations of a definition
#[derive(Clone, Default)]
pub enum Attributes {
    #[default]
    None,
    /// One handler covering every attribute
    Any(AttributeCallback),
    /// Declared attributes in declaration order
    Named(Vec<(String, AttributeDecl)>),
}

impl Attributes {
    /// Declared attributes (empty unless `Named`)
    pub fn declarations(&self) -> &[(String, AttributeDecl)] {
        match self {
            Attributes::Named(decls) => decls,
            _ => &[],
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDecl> {
        self.declarations()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, decl)| decl)
    }

    /// Resolve the handler for a classified change
    ///
    /// Order: typed handler for the kind, the attribute's fallback, the
    /// attribute's shorthand handler, then the catch-all handler.
    pub fn resolve(&self, name: &str, kind: AttributeChangeKind) -> Option<&AttributeCallback> {
        match self {
            Attributes::None => None,
            Attributes::Any(handler) => Some(handler),
            Attributes::Named(_) => match self.get(name)?.handler.as_ref()? {
                AttributeHandler::Typed(typed) => typed.for_kind(kind).or(typed.fallback.as_ref()),
                AttributeHandler::Shorthand(handler) => Some(handler),
            },
        }
    }
}

/// Property name for an attribute: `aria-label` → `ariaLabel`
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, part) in name.split('-').enumerate() {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if i > 0 => {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            _ => out.push_str(part),
        }
    }
    out
}

impl Runtime {
    /// Bind attribute behavior of `definition` to `element`
    ///
    /// Installs property links, applies defaults, subscribes an attribute
    /// observer and replays a `created` change for every attribute already
    /// present.
    pub(crate) fn add_attribute_listeners(
        &mut self,
        element: NodeId,
        definition: &Rc<ComponentDefinition>,
    ) -> Result<()> {
        if matches!(definition.attributes(), Attributes::None) {
            return Ok(());
        }

        self.add_attribute_to_property_links(element, definition)?;
        self.init_attributes(element, definition)?;

        let observer = self.document.create_observer();
        let options = MutationObserverInit::new().attribute_old_value();
        self.document.observe(observer, element, options)?;
        let target = ObserverTarget::Attributes {
            element,
            definition: Rc::clone(definition),
        };
        self.register_observer(observer, target);

        for attr in self.document.attributes(element) {
            let new_value = self
                .document
                .get_attribute(element, &attr.name)
                .map(str::to_string)
                .unwrap_or(attr.value);
            let change = AttributeChange {
                kind: AttributeChangeKind::Created,
                name: attr.name,
                new_value: Some(new_value),
                old_value: None,
            };
            self.trigger_attribute_callback(element, definition, &change)?;
        }

        Ok(())
    }

    /// Define a property linked to each declared attribute the element does
    /// not already own
    pub(crate) fn add_attribute_to_property_links(
        &mut self,
        element: NodeId,
        definition: &ComponentDefinition,
    ) -> Result<()> {
        for (name, _) in definition.attributes().declarations() {
            let property = camel_case(name);
            if self.has_own_member(element, &property) {
                tracing::trace!("{} already owns `{}`, no attribute link", element, property);
                continue;
            }
            let link = Property::Attribute(name.clone());
            self.document.define_property(element, &property, link)?;
        }
        Ok(())
    }

    /// Set declared default values for attributes absent on the element
    pub(crate) fn init_attributes(
        &mut self,
        element: NodeId,
        definition: &ComponentDefinition,
    ) -> Result<()> {
        for (name, decl) in definition.attributes().declarations() {
            let Some(default) = &decl.default else { continue };
            if self.document.has_attribute(element, name) {
                continue;
            }
            let value = default.evaluate(&self.document, element);
            self.document.set_attribute(element, name, &value)?;
        }
        Ok(())
    }

    /// Classify a delivered batch and dispatch each record
    pub(crate) fn dispatch_attribute_records(
        &mut self,
        element: NodeId,
        definition: &Rc<ComponentDefinition>,
        records: Vec<MutationRecord>,
    ) -> Result<()> {
        for record in records {
            let Some(name) = record.attribute_name else { continue };
            let current = self.document.get_attribute(element, &name).map(str::to_string);
            let change = AttributeChange {
                kind: classify(current.as_deref(), record.old_value.as_deref()),
                name,
                new_value: current,
                old_value: record.old_value,
            };
            self.trigger_attribute_callback(element, definition, &change)?;
        }
        Ok(())
    }

    fn trigger_attribute_callback(
        &mut self,
        element: NodeId,
        definition: &ComponentDefinition,
        change: &AttributeChange,
    ) -> Result<()> {
        let resolved = definition.attributes().resolve(&change.name, change.kind);
        let Some(handler) = resolved.cloned() else {
            tracing::trace!(
                "No {} handler for `{}` on {}",
                change.kind,
                change.name,
                definition.name()
            );
            return Ok(());
        };
        handler(self, element, change)?;
        Ok(())
    }
}
