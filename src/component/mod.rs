//! Components - definitions, mixin composition, compilation and instances.
//!
//! # Lifecycle
//!
//! ```text
//! ComponentDefinition ──compose──▶ ComposedDefinition ──compile──▶ ComponentInstance
//!
//! instance: Defined → Composed (watchers attached) → Instantiated → Mounted → Destroyed
//! ```
//!
//! The pipeline is synchronous. Watchers run inside the write that
//! triggered them; nothing is queued or batched.

mod compiler;
mod definition;
mod instance;
mod mixin;

pub use compiler::{compile, compile_composed};
pub use definition::{
    ComponentDefinition, ComputedGetter, DataFactory, Hook, Method, MixinDefinition, RenderFn,
    WatchHandler,
};
pub use instance::ComponentInstance;
pub use mixin::{ComposedDefinition, compose};
