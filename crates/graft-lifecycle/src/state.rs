//! Per-element lifecycle state
//!
//! Flags are keyed by element and definition id. Nothing is keyed by
//! strings, so two definitions on one element never share a flag.

use std::collections::HashMap;

use graft_dom::{NodeId, ObserverId};

use crate::behavior::MethodCallback;
use crate::definition::DefinitionId;

/// Tracked lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Set once, never cleared
    Created,
    /// Cleared on detach
    Attached,
}

/// Phase flags of one (element, definition) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseFlags {
    pub created: bool,
    pub attached: bool,
}

impl PhaseFlags {
    pub fn get(&self, phase: Phase) -> bool {
        match phase {
            Phase::Created => self.created,
            Phase::Attached => self.attached,
        }
    }

    fn slot(&mut self, phase: Phase) -> &mut bool {
        match phase {
            Phase::Created => &mut self.created,
            Phase::Attached => &mut self.attached,
        }
    }
}

#[derive(Default)]
struct ElementState {
    phases: HashMap<DefinitionId, PhaseFlags>,
    methods: HashMap<String, MethodCallback>,
    /// Attribute observers bound for this element
    observers: Vec<ObserverId>,
}

/// Lifecycle state of every element the runtime has touched
#[derive(Default)]
pub(crate) struct LifecycleStates {
    elements: HashMap<NodeId, ElementState>,
}

impl LifecycleStates {
    pub fn flags(&self, element: NodeId, definition: DefinitionId) -> PhaseFlags {
        self.elements
            .get(&element)
            .and_then(|state| state.phases.get(&definition))
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, element: NodeId, definition: DefinitionId, phase: Phase, value: bool) {
        *self.phases_mut(element, definition).slot(phase) = value;
    }

    /// Set the flag; returns whether it was already set
    pub fn ensure(&mut self, element: NodeId, definition: DefinitionId, phase: Phase) -> bool {
        std::mem::replace(self.phases_mut(element, definition).slot(phase), true)
    }

    fn phases_mut(&mut self, element: NodeId, definition: DefinitionId) -> &mut PhaseFlags {
        let state = self.elements.entry(element).or_default();
        state.phases.entry(definition).or_default()
    }

    pub fn method(&self, element: NodeId, name: &str) -> Option<&MethodCallback> {
        self.elements.get(&element)?.methods.get(name)
    }

    pub fn define_method(&mut self, element: NodeId, name: &str, method: MethodCallback) {
        self.elements.entry(element).or_default().methods.insert(name.to_string(), method);
    }

    pub fn track_observer(&mut self, element: NodeId, observer: ObserverId) {
        self.elements.entry(element).or_default().observers.push(observer);
    }

    /// Forget `element`, returning the observers bound for it
    pub fn remove(&mut self, element: NodeId) -> Vec<ObserverId> {
        self.elements.remove(&element).map(|state| state.observers).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}
