//! Lifecycle errors

use graft_dom::{DomError, NodeId, SelectorError};

/// Errors raised by the lifecycle runtime
///
/// User callback failures pass through unchanged as `Callback`.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid component name: {0}")]
    InvalidName(String),

    #[error("Component already defined: {0}")]
    AlreadyDefined(String),

    #[error("Invalid event key `{0}`")]
    InvalidEventKey(String),

    #[error("Invalid delegate selector in `{key}`: {source}")]
    InvalidSelector {
        key: String,
        #[source]
        source: SelectorError,
    },

    #[error("No method `{name}` on {element}")]
    UnknownMethod { element: NodeId, name: String },

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

/// Result alias for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;
