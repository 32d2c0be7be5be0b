//! Component registry
//!
//! The runtime only needs [`Registry::get_for_element`]. [`ComponentRegistry`]
//! matches by tag name, `is` attribute, attribute presence and class name.

use std::collections::HashMap;
use std::rc::Rc;

use graft_dom::{Document, NodeId};

use crate::definition::{ComponentDefinition, ComponentKind, DefinitionId};
use crate::{LifecycleError, Result};

/// Source of the definitions matching an element
///
/// Definitions returned for one element must have distinct ids; the runtime
/// tracks lifecycle flags per (element, [`DefinitionId`]).
pub trait Registry {
    /// Definitions for `element`, in a stable order, without duplicates
    fn get_for_element(&self, document: &Document, element: NodeId)
    -> Vec<Rc<ComponentDefinition>>;
}

/// Registry keyed by component kind and name
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    definitions: HashMap<(ComponentKind, String), Rc<ComponentDefinition>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition
    ///
    /// The built id is kept unless another registered definition already
    /// uses it, in which case a fresh one is assigned.
    pub fn define(&mut self, mut definition: ComponentDefinition) -> Result<DefinitionId> {
        let name = definition.name().to_string();
        let valid = match definition.kind() {
            ComponentKind::Element => Self::is_valid_name(&name),
            ComponentKind::Attribute | ComponentKind::ClassName => {
                !name.is_empty() && !name.chars().any(char::is_whitespace)
            }
        };
        if !valid {
            return Err(LifecycleError::InvalidName(name));
        }

        let key = (definition.kind(), name);
        if self.definitions.contains_key(&key) {
            return Err(LifecycleError::AlreadyDefined(key.1));
        }

        if self.definitions.values().any(|d| d.id() == definition.id()) {
            definition.id = DefinitionId::next();
        }
        let id = definition.id();
        tracing::debug!("Defined {:?} component `{}` as {}", key.0, key.1, id);
        self.definitions.insert(key, Rc::new(definition));
        Ok(id)
    }

    pub fn get(&self, kind: ComponentKind, name: &str) -> Option<&Rc<ComponentDefinition>> {
        self.definitions.get(&(kind, name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Validate a custom element name
    fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }

        const RESERVED: &[&str] = &[
            "annotation-xml", "color-profile", "font-face",
            "font-face-src", "font-face-uri", "font-face-format",
            "font-face-name", "missing-glyph",
        ];
        if RESERVED.contains(&name) {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
    }
}

impl Registry for ComponentRegistry {
    fn get_for_element(
        &self,
        document: &Document,
        element: NodeId,
    ) -> Vec<Rc<ComponentDefinition>> {
        let Some(tag) = document.local_name(element) else {
            return Vec::new();
        };

        let mut found: Vec<Rc<ComponentDefinition>> = Vec::new();
        let mut push = |def: Option<&Rc<ComponentDefinition>>| {
            if let Some(def) = def {
                if !found.iter().any(|d| d.id() == def.id()) {
                    found.push(Rc::clone(def));
                }
            }
        };

        push(self.get(ComponentKind::Element, tag));
        if let Some(is) = document.get_attribute(element, "is") {
            push(self.get(ComponentKind::Element, is));
        }
        for attr in document.attributes(element) {
            push(self.get(ComponentKind::Attribute, &attr.name));
        }
        for class in document.class_list(element) {
            push(self.get(ComponentKind::ClassName, &class));
        }
        found
    }
}
