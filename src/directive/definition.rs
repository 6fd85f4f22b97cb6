//! Directive contract.
//!
//! A directive is a set of lifecycle handlers receiving `(document, element,
//! binding)`, plus an optional `parse_value` that turns the raw attribute
//! text into the value handlers see.
//!
//! # Example
//!
//! ```ignore
//! use zenithic::directive::{Directive, DirectiveHook};
//!
//! let once = Directive::new()
//!     .with_parse_value(|instance, raw| instance.get(raw))
//!     .on(DirectiveHook::BeforeMount, |doc, el, binding| {
//!         doc.set_text_content(el, &binding.value_string())
//!     });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::component::ComponentInstance;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::types::Value;

use super::extract::DirectiveBinding;

/// Directive lifecycle entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveHook {
    BeforeMount,
    Mounted,
    Updated,
    BeforeDestroy,
}

/// Resolved binding handed to directive handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub arg: String,
    pub value: Value,
}

impl Binding {
    /// The value as display text (strings unquoted).
    pub fn value_string(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Handler invoked for one directive lifecycle hook.
pub type DirectiveHandler = Rc<dyn Fn(&mut Document, NodeId, &Binding) -> Result<()>>;

/// Parses the raw attribute text in the context of the owning instance.
pub type ParseValue = Rc<dyn Fn(&ComponentInstance, &str) -> Result<Value>>;

/// A template-attribute-driven behavior.
#[derive(Clone, Default)]
pub struct Directive {
    parse_value: Option<ParseValue>,
    handlers: HashMap<DirectiveHook, DirectiveHandler>,
}

impl Directive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_value<F>(mut self, parse: F) -> Self
    where
        F: Fn(&ComponentInstance, &str) -> Result<Value> + 'static,
    {
        self.parse_value = Some(Rc::new(parse));
        self
    }

    /// Set the handler for `hook`, replacing any previous one.
    pub fn on<F>(mut self, hook: DirectiveHook, handler: F) -> Self
    where
        F: Fn(&mut Document, NodeId, &Binding) -> Result<()> + 'static,
    {
        self.handlers.insert(hook, Rc::new(handler));
        self
    }

    pub fn handler(&self, hook: DirectiveHook) -> Option<DirectiveHandler> {
        self.handlers.get(&hook).cloned()
    }

    /// Resolve an extracted binding against `instance`.
    ///
    /// Without a `parse_value`, the raw text is passed through as a string.
    pub fn resolve(&self, instance: &ComponentInstance, raw: &DirectiveBinding) -> Result<Binding> {
        let value = match &self.parse_value {
            Some(parse) => parse(instance, &raw.value)?,
            None => Value::String(raw.value.clone()),
        };
        Ok(Binding {
            arg: raw.arg.clone(),
            value,
        })
    }

    /// Run the handler for `hook` if there is one.
    pub fn invoke(
        &self,
        hook: DirectiveHook,
        doc: &mut Document,
        element: NodeId,
        binding: &Binding,
    ) -> Result<()> {
        match self.handlers.get(&hook) {
            Some(handler) => handler(doc, element, binding),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("parse_value", &self.parse_value.is_some())
            .field("hooks", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
