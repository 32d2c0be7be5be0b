//! Shadow-root rendering hook
//!
//! A [`Renderer`] runs once as the template hook of a created element and
//! again whenever [`Runtime::render`] is called, typically after the
//! component's properties change. Each run reuses the element's shadow root.

use std::rc::Rc;

use graft_dom::{NodeId, ShadowRootInit, ShadowRootMode};

use crate::definition::LifecycleCallback;
use crate::{Result, Runtime};

/// Render callback: `(runtime, host, shadow root)`
pub type RenderCallback = Rc<dyn Fn(&mut Runtime, NodeId, NodeId) -> anyhow::Result<()>>;

/// Renders a component into its shadow root
#[derive(Clone)]
pub struct Renderer {
    render: RenderCallback,
    rendered: Option<LifecycleCallback>,
    mode: ShadowRootMode,
}

impl Renderer {
    /// Called after every render
    pub fn rendered<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.rendered = Some(Rc::new(f));
        self
    }

    /// Shadow root mode, open by default
    pub fn mode(mut self, mode: ShadowRootMode) -> Self {
        self.mode = mode;
        self
    }

    /// Attach (or reuse) the shadow root of `element` and render into it
    pub fn render_into(&self, runtime: &mut Runtime, element: NodeId) -> Result<NodeId> {
        let init = ShadowRootInit { mode: self.mode };
        let root = runtime.document.attach_shadow(element, init)?;
        (self.render)(runtime, element, root)?;
        if let Some(rendered) = &self.rendered {
            rendered(runtime, element)?;
        }
        Ok(root)
    }

    /// Template hook rendering on creation
    pub fn into_template(self) -> LifecycleCallback {
        Rc::new(move |runtime: &mut Runtime, element: NodeId| -> anyhow::Result<()> {
            self.render_into(runtime, element)?;
            Ok(())
        })
    }
}

/// Build a renderer from its render callback
///
/// The rendered callback and shadow root mode are set on the returned
/// [`Renderer`].
pub fn with_render<F>(render: F) -> Renderer
where
    F: Fn(&mut Runtime, NodeId, NodeId) -> anyhow::Result<()> + 'static,
{
    Renderer {
        render: Rc::new(render),
        rendered: None,
        mode: ShadowRootMode::Open,
    }
}

impl Runtime {
    /// Re-render `element` with every renderer of its created definitions
    ///
    /// Returns how many renderers ran. Definitions not yet created are
    /// skipped; their template hook renders on creation.
    pub fn render(&mut self, element: NodeId) -> Result<usize> {
        let mut count = 0;
        for definition in self.definitions_for(element) {
            let Some(renderer) = definition.renderer() else {
                continue;
            };
            if !self.states.flags(element, definition.id()).created {
                tracing::trace!("Skipping render of {} for uncreated {}", element, definition.id());
                continue;
            }
            renderer.render_into(self, element)?;
            count += 1;
        }
        if count > 0 {
            tracing::debug!("Rendered {} ({} renderers)", element, count);
        }
        Ok(count)
    }
}
