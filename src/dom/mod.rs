//! Host document model.
//!
//! A minimal arena document that components render into and mount points
//! are resolved against. Only what mounting needs is modelled: elements
//! with attributes, text, fragments, simple selectors, and child swaps.

mod document;
mod selector;

pub use document::{Document, NodeId, NodeKind};
pub use selector::Selector;
