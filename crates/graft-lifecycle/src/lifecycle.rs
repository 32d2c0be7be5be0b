//! Lifecycle controller
//!
//! Each (element, definition) pair moves through created → attached →
//! detached. `created` runs once per pair. `attached` runs again only after
//! a detach cleared its flag.

use std::rc::Rc;

use graft_dom::NodeId;

use crate::definition::ComponentDefinition;
use crate::state::Phase;
use crate::{Result, Runtime};

impl Runtime {
    /// Run one-time setup of `definition` on `element`
    ///
    /// The created flag is committed before any callback runs, so a
    /// re-entrant call or a failing callback never repeats setup.
    pub fn trigger_created(
        &mut self,
        element: NodeId,
        definition: &Rc<ComponentDefinition>,
    ) -> Result<()> {
        if self.states.ensure(element, definition.id(), Phase::Created) {
            tracing::trace!("{} already created for {}", element, definition.name());
            return Ok(());
        }
        tracing::debug!("Creating {} as {}", element, definition.name());

        self.apply_behavior(element, definition.prototype())?;

        if let Some(template) = definition.template().cloned() {
            template(self, element)?;
        }

        self.add_event_listeners(element, definition)?;
        self.add_attribute_listeners(element, definition)?;

        if let Some(created) = definition.created().cloned() {
            created(self, element)?;
        }
        Ok(())
    }

    /// Mark `element` resolved and run the `attached` callback
    pub fn trigger_attached(
        &mut self,
        element: NodeId,
        definition: &Rc<ComponentDefinition>,
    ) -> Result<()> {
        if self.states.ensure(element, definition.id(), Phase::Attached) {
            tracing::trace!("{} already attached for {}", element, definition.name());
            return Ok(());
        }
        tracing::debug!("Attaching {} as {}", element, definition.name());

        self.document.remove_attribute(element, definition.unresolved_attribute())?;
        self.document.set_attribute(element, definition.resolved_attribute(), "")?;

        if let Some(attached) = definition.attached().cloned() {
            attached(self, element)?;
        }
        Ok(())
    }

    /// Run the `detached` callback and clear the attached flag
    ///
    /// Not guarded: every detach notification reaches the callback.
    pub fn trigger_detached(
        &mut self,
        element: NodeId,
        definition: &Rc<ComponentDefinition>,
    ) -> Result<()> {
        tracing::debug!("Detaching {} as {}", element, definition.name());

        if let Some(detached) = definition.detached().cloned() {
            detached(self, element)?;
        }
        self.states.set(element, definition.id(), Phase::Attached, false);
        Ok(())
    }

    /// `trigger_created` followed by `trigger_attached`
    pub fn trigger_lifecycle(
        &mut self,
        element: NodeId,
        definition: &Rc<ComponentDefinition>,
    ) -> Result<()> {
        self.trigger_created(element, definition)?;
        self.trigger_attached(element, definition)
    }
}
