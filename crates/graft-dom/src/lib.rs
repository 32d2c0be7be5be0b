//! graft DOM - Host document
//!
//! Arena-allocated document tree used as the host environment of the
//! component lifecycle runtime: attributes, element own properties,
//! selector matching, event listener registration and mutation observation.

mod node;
mod tree;
mod document;
mod property;
mod shadow;
pub mod events;
pub mod observer;
pub mod selector;

pub use node::{Node, NodeData, NodeType, ElementData, FragmentData, Attribute};
pub use tree::DomTree;
pub use document::Document;
pub use property::{Property, PropertyValue};
pub use shadow::{ShadowRootMode, ShadowRootInit};
pub use events::{Event, EventPhase, ListenerId, ListenerOptions};
pub use observer::{MutationObserverInit, MutationRecord, MutationType, ObserverId};
pub use selector::{SelectorList, SelectorError};

use std::fmt;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node)
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}

/// DOM errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Cannot insert {child} into {parent}: hierarchy request")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Invalid observer options: {0}")]
    InvalidObserverOptions(&'static str),

    #[error("Unknown observer: {0:?}")]
    UnknownObserver(ObserverId),
}

/// Result alias for DOM operations
pub type Result<T> = std::result::Result<T, DomError>;
