//! graft lifecycle - Custom element lifecycle runtime
//!
//! Drives every (element, component definition) pair through
//! created → attached → detached exactly once per phase, keeps declared
//! attributes in sync with element properties and routes delegated events
//! and attribute mutations to user handlers.
//!
//! # Example
//! ```rust,ignore
//! use graft_lifecycle::{ComponentDefinition, ComponentRegistry, LifecycleConfig, Runtime};
//! use graft_dom::Document;
//!
//! let mut registry = ComponentRegistry::new();
//! registry.define(
//!     ComponentDefinition::builder("x-button")
//!         .attached(|_, element| {
//!             tracing::info!("{} attached", element);
//!             Ok(())
//!         })
//!         .build(),
//! )?;
//!
//! let mut runtime = Runtime::new(Document::new(), registry, LifecycleConfig::default());
//! runtime.start()?;
//! ```

mod config;
mod error;
mod state;
mod lifecycle;
mod walker;
mod runtime;
pub mod attributes;
pub mod behavior;
pub mod definition;
pub mod events;
pub mod registry;
pub mod render;

pub use config::{LifecycleConfig, ATTR_IGNORE};
pub use error::{LifecycleError, Result};
pub use state::{Phase, PhaseFlags};
pub use runtime::Runtime;
pub use attributes::{
    AttributeChange, AttributeChangeKind, AttributeDecl, AttributeHandler, Attributes, DefaultValue,
    TypedAttributeHandlers,
};
pub use behavior::{ComponentBehavior, Member};
pub use definition::{ComponentDefinition, ComponentKind, DefinitionBuilder, DefinitionId};
pub use events::ParsedEvent;
pub use registry::{ComponentRegistry, Registry};
pub use render::{with_render, Renderer};
