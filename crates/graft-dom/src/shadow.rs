//! Shadow roots
//!
//! A shadow root is a fragment node hosted by an element. Its children are
//! not part of the host's child list.

use crate::{Document, DomError, NodeData, NodeId, Result};

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

/// Shadow root initialization options
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowRootInit {
    pub mode: ShadowRootMode,
}

impl Document {
    /// Attach a shadow root to `host`, or return the one already attached
    pub fn attach_shadow(&mut self, host: NodeId, init: ShadowRootInit) -> Result<NodeId> {
        let existing = self.element(host)?.shadow_root;
        if existing.is_valid() {
            return Ok(existing);
        }

        let root = self.tree.create_fragment(host, init.mode);
        if let Some(elem) = self.tree.get_mut(host).and_then(|n| n.as_element_mut()) {
            elem.shadow_root = root;
        }
        tracing::trace!("Attached {:?} shadow root {} to {}", init.mode, root, host);
        Ok(root)
    }

    /// Open shadow root of `host`; closed roots are not exposed
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.element(host).ok()?.shadow_root;
        match self.tree.get(root).map(|n| &n.data) {
            Some(NodeData::Fragment(f)) if f.mode == ShadowRootMode::Open => Some(root),
            _ => None,
        }
    }

    /// Host element of a shadow root
    pub fn shadow_host(&self, root: NodeId) -> Result<NodeId> {
        match self.tree.get(root).map(|n| &n.data) {
            Some(NodeData::Fragment(f)) if f.host.is_valid() => Ok(f.host),
            _ => Err(DomError::NotFound(root)),
        }
    }
}
