//! DOM Events
//!
//! Event objects and listener registration. The document only records which
//! listener IDs are registered where; the callables behind the IDs belong to
//! whoever dispatches.

use crate::NodeId;

/// Event listener identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self { capture: true }
    }

    pub fn bubble() -> Self {
        Self { capture: false }
    }
}

/// Listener registered on an element
#[derive(Debug, Clone)]
pub(crate) struct ListenerEntry {
    pub id: ListenerId,
    pub event_type: String,
    pub capture: bool,
}

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// Check if an event type bubbles by default
pub fn event_bubbles(event_type: &str) -> bool {
    !matches!(
        event_type,
        "focus" | "blur" | "load" | "unload" | "mouseenter" | "mouseleave"
    )
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create an event; bubbling follows the event type's default
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: NodeId::NONE,
            current_target: NodeId::NONE,
            phase: EventPhase::None,
            bubbles: event_bubbles(event_type),
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Override the bubbling flag
    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation after the current node
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
