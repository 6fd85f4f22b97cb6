//! Computed properties - read-only values derived by a getter.
//!
//! Reads are never cached: every [`ComputedProperties::read`] calls the
//! getter again with the receiver it is bound to.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::types::Value;

/// Getter of a computed property, called with its receiver.
pub type Getter<R> = Rc<dyn Fn(&R) -> Result<Value>>;

/// Named getters for receivers of type `R`.
pub struct ComputedProperties<R> {
    getters: BTreeMap<String, Getter<R>>,
}

impl<R> Default for ComputedProperties<R> {
    fn default() -> Self {
        Self {
            getters: BTreeMap::new(),
        }
    }
}

impl<R> Clone for ComputedProperties<R> {
    fn clone(&self) -> Self {
        Self {
            getters: self.getters.clone(),
        }
    }
}

impl<R> ComputedProperties<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `getter` under `key`, replacing any previous getter.
    pub fn define(&mut self, key: impl Into<String>, getter: Getter<R>) {
        self.getters.insert(key.into(), getter);
    }

    /// Install `getter` only if `key` is free. Returns whether it was installed.
    pub fn define_absent(&mut self, key: &str, getter: Getter<R>) -> bool {
        if self.getters.contains_key(key) {
            return false;
        }
        self.getters.insert(key.to_string(), getter);
        true
    }

    pub fn getter(&self, key: &str) -> Option<Getter<R>> {
        self.getters.get(key).cloned()
    }

    /// Recompute `key` against `receiver`. `None` when the key is not defined.
    pub fn read(&self, key: &str, receiver: &R) -> Option<Result<Value>> {
        self.getters.get(key).map(|getter| getter(receiver))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.getters.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.getters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.getters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.getters.is_empty()
    }

    pub fn clear(&mut self) {
        self.getters.clear();
    }
}

impl<R> fmt::Debug for ComputedProperties<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.getters.keys()).finish()
    }
}
