//! Tree walker
//!
//! Pre-order initialization and children-first removal over node lists.
//! Non-element nodes and ignored subtrees are skipped.

use graft_dom::NodeId;

use crate::{Result, Runtime};

impl Runtime {
    /// Run the lifecycle for every definition of every element in `nodes`
    /// and their descendants, parents before children
    pub fn init_elements(&mut self, nodes: &[NodeId]) -> Result<()> {
        for &node in nodes {
            if !self.should_visit(node) {
                continue;
            }

            for definition in self.definitions_for(node) {
                self.trigger_lifecycle(node, &definition)?;
            }

            // Taken after the lifecycle so template output is walked too
            let children = self.document.child_nodes(node);
            if !children.is_empty() {
                self.init_elements(&children)?;
            }
        }
        Ok(())
    }

    /// Detach every definition of every element in `nodes`, children first
    pub fn remove_elements(&mut self, nodes: &[NodeId]) -> Result<()> {
        for &node in nodes {
            if !self.should_visit(node) {
                continue;
            }

            let children = self.document.child_nodes(node);
            if !children.is_empty() {
                self.remove_elements(&children)?;
            }

            for definition in self.definitions_for(node) {
                self.trigger_detached(node, &definition)?;
            }
        }
        Ok(())
    }

    fn should_visit(&self, node: NodeId) -> bool {
        if !self.document.is_element(node) {
            return false;
        }
        if self.document.has_attribute(node, &self.config.ignore_attribute) {
            tracing::trace!("Skipping ignored subtree at {}", node);
            return false;
        }
        true
    }
}
