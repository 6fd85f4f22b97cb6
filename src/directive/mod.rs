//! Directives - extraction from templates and the handler contract.
//!
//! - [`extract_directives`] - scan a template for `v-name:arg="value"`
//! - [`Directive`] - lifecycle handlers plus optional value parsing

mod definition;
mod extract;

pub use definition::{Binding, Directive, DirectiveHandler, DirectiveHook, ParseValue};
pub use extract::{DirectiveBinding, extract_directives};
