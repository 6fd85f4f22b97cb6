//! Error types for the component runtime.
//!
//! User-supplied getters, methods, watchers, hooks and directive handlers
//! return [`Result`]. Their errors are never caught by the runtime: they
//! propagate to whichever read, write or lifecycle call triggered them.

use thiserror::Error;

use crate::dom::NodeId;
use crate::types::{InstanceId, LifecycleState};

/// Errors produced by the component runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// An accessor was used after the instance was destroyed.
    #[error("component instance {0} has been destroyed")]
    Destroyed(InstanceId),

    /// No data, computed or prop key with this name exists on the instance.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    /// No method with this name exists on the instance.
    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    /// A write targeted a computed property or prop.
    #[error("property '{0}' is read-only")]
    ReadOnly(String),

    /// The lifecycle state machine only moves forward.
    #[error("invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    /// A node handle does not belong to the document.
    #[error("node {0} does not exist in the document")]
    MissingNode(NodeId),

    /// The insert would place a node inside itself or its own descendant.
    #[error("cannot insert node {child} into {parent}: it is an ancestor of the target")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Configuration could not be parsed.
    #[error("failed to parse config: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by user-supplied code.
    #[error("{0}")]
    Handler(String),
}

impl RuntimeError {
    /// Error raised from a user-supplied getter, method, watcher or hook.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RuntimeError>;
