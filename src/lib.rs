//! # zenithic
//!
//! Component runtime with synchronous reactive properties.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! signal-backed props.
//!
//! ## Architecture
//!
//! A component is declared as a [`ComponentDefinition`]: a template plus
//! data, computed properties, methods, watchers, lifecycle hooks and mixins.
//! Mounting runs it through a fixed pipeline:
//!
//! ```text
//! ComponentDefinition → compose (mixins) → compile (instance) → render → mount point
//! ```
//!
//! Data properties are [`Observable`](reactive::Observable)s. Writing one
//! runs its watchers synchronously, before the new value is committed, with
//! `(new, old)`. Computed properties are recomputed on every read.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Value, lifecycle states and hooks, props)
//! - [`reactive`] - Observables, keyed reactive data, computed properties
//! - [`directive`] - Template directive extraction and directive handlers
//! - [`component`] - Definitions, mixin composition, compiler, instances
//! - [`dom`] - Arena document that components render into
//! - [`app`] - App container, registries, plugins, mount driver
//! - [`config`] - Catalog allow-lists
//! - [`error`] - Error type

pub mod app;
pub mod component;
pub mod config;
pub mod directive;
pub mod dom;
pub mod error;
pub mod reactive;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use app::{App, Catalog, CatalogEntry, Filter, Plugin};

pub use component::{
    ComponentDefinition, ComponentInstance, ComposedDefinition, MixinDefinition, compile,
    compile_composed, compose,
};

pub use config::{AppConfig, CatalogKind};

pub use directive::{Binding, Directive, DirectiveBinding, DirectiveHook, extract_directives};

pub use dom::{Document, NodeId, Selector};

pub use error::{Result, RuntimeError};

pub use reactive::{ComputedProperties, Observable, ReactiveData, Subscription};

/// Everything needed to declare and mount components.
pub mod prelude {
    pub use crate::app::{App, Catalog, Plugin};
    pub use crate::component::{ComponentDefinition, ComponentInstance, MixinDefinition, compile};
    pub use crate::config::AppConfig;
    pub use crate::directive::{Binding, Directive, DirectiveHook};
    pub use crate::dom::{Document, NodeId};
    pub use crate::error::{Result, RuntimeError};
    pub use crate::types::{DataMap, LifecycleHook, LifecycleState, PropValue, Props, Value};
}
