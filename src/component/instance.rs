//! Component Instance - The live object produced by the compiler.
//!
//! An instance owns its reactive data, the computed getters and methods
//! bound to it, its watchers and its lifecycle hooks. It is a cheap `Rc`
//! handle: clones refer to the same instance.
//!
//! # Validity
//!
//! [`ComponentInstance::destroy`] is terminal. It releases every watcher,
//! drops data, computed properties and methods, and flips the instance to
//! [`LifecycleState::Destroyed`]. From then on every accessor fails with
//! [`RuntimeError::Destroyed`]; a second `destroy` is a checked no-op.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::definition::{Hook, Method, RenderFn, WatchHandler};
use super::mixin::ComposedDefinition;
use crate::dom::{Document, NodeId};
use crate::error::{Result, RuntimeError};
use crate::reactive::{ComputedProperties, ReactiveData, Subscription};
use crate::types::{DataMap, InstanceId, LifecycleHook, LifecycleState, Value};

thread_local! {
    /// Counter for generating instance IDs.
    static ID_COUNTER: Cell<u64> = const { Cell::new(0) };
}

fn next_instance_id() -> InstanceId {
    ID_COUNTER.with(|counter| {
        let id = counter.get();
        counter.set(id + 1);
        InstanceId(id)
    })
}

// =============================================================================
// Instance State
// =============================================================================

struct InstanceInner {
    id: InstanceId,
    name: Option<String>,
    template: String,
    state: Cell<LifecycleState>,
    data: ReactiveData,
    computed: RefCell<ComputedProperties<ComponentInstance>>,
    methods: RefCell<BTreeMap<String, Method>>,
    props: RefCell<BTreeSet<String>>,
    hooks: RefCell<Vec<(LifecycleHook, Hook)>>,
    render: RefCell<Option<RenderFn>>,
}

/// Handle to a live component instance.
#[derive(Clone)]
pub struct ComponentInstance {
    inner: Rc<InstanceInner>,
}

impl ComponentInstance {
    /// Build an instance from a composed definition. It starts `Defined`;
    /// the compiler attaches watchers and moves it on.
    pub(crate) fn from_composed(composed: &ComposedDefinition) -> Self {
        Self {
            inner: Rc::new(InstanceInner {
                id: next_instance_id(),
                name: composed.name.clone(),
                template: composed.template.clone(),
                state: Cell::new(LifecycleState::Defined),
                data: ReactiveData::from_map(composed.data.clone()),
                computed: RefCell::new(composed.computed.clone()),
                methods: RefCell::new(composed.methods.clone()),
                props: RefCell::new(composed.props.keys().cloned().collect()),
                hooks: RefCell::new(composed.hooks.clone()),
                render: RefCell::new(composed.render.clone()),
            }),
        }
    }

    // =========================================================================
    // Identity & State
    // =========================================================================

    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn template(&self) -> &str {
        &self.inner.template
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.get()
    }

    pub fn is_alive(&self) -> bool {
        self.state() != LifecycleState::Destroyed
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &ComponentInstance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(RuntimeError::Destroyed(self.id()))
        }
    }

    pub(crate) fn transition(&self, next: LifecycleState) -> Result<()> {
        let from = self.state();
        if !from.can_transition_to(next) {
            return Err(RuntimeError::InvalidTransition { from, to: next });
        }
        self.inner.state.set(next);
        debug!(instance = %self.id(), ?from, to = ?next, "lifecycle transition");
        Ok(())
    }

    // =========================================================================
    // Property Access
    // =========================================================================

    /// Read a computed property or prop, falling back to data.
    ///
    /// Computed keys shadow data keys of the same name, matching `set`,
    /// which rejects writes to them.
    pub fn get(&self, key: &str) -> Result<Value> {
        self.ensure_alive()?;
        if self.inner.computed.borrow().contains(key) {
            return self.computed(key);
        }
        self.data(key)
    }

    /// Read a data key only.
    pub fn data(&self, key: &str) -> Result<Value> {
        self.ensure_alive()?;
        self.inner
            .data
            .get(key)
            .ok_or_else(|| RuntimeError::UnknownProperty(key.to_string()))
    }

    /// Write a data key. Watchers run synchronously before the write commits.
    ///
    /// Unknown keys are created as plain data. Computed keys are read-only.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.ensure_alive()?;
        if self.inner.computed.borrow().contains(key) {
            return Err(RuntimeError::ReadOnly(key.to_string()));
        }
        self.inner.data.set(key, value)
    }

    /// Recompute a computed property (props included).
    pub fn computed(&self, key: &str) -> Result<Value> {
        self.ensure_alive()?;
        // Clone the getter out so it may read other computed keys
        let getter = self
            .inner
            .computed
            .borrow()
            .getter(key)
            .ok_or_else(|| RuntimeError::UnknownProperty(key.to_string()))?;
        getter(self)
    }

    /// Read a prop supplied at mount time.
    pub fn prop(&self, key: &str) -> Result<Value> {
        self.ensure_alive()?;
        if !self.inner.props.borrow().contains(key) {
            return Err(RuntimeError::UnknownProperty(key.to_string()));
        }
        self.computed(key)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.is_alive() && self.inner.methods.borrow().contains_key(name)
    }

    /// Invoke a method with this instance as its receiver.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.ensure_alive()?;
        let method = self
            .inner
            .methods
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownMethod(name.to_string()))?;
        method(self, args)
    }

    /// Plain copy of the current data.
    pub fn data_snapshot(&self) -> Result<DataMap> {
        self.ensure_alive()?;
        Ok(self.inner.data.snapshot())
    }

    // =========================================================================
    // Watchers
    // =========================================================================

    /// Watch a data key with a handler receiving this instance.
    ///
    /// The watcher is released by [`destroy`](Self::destroy) or through the
    /// returned subscription.
    pub fn watch<F>(&self, key: &str, handler: F) -> Result<Subscription>
    where
        F: Fn(&ComponentInstance, &Value, &Value) -> Result<()> + 'static,
    {
        self.ensure_alive()?;
        Ok(self.attach_watcher(key, Rc::new(handler)))
    }

    pub(crate) fn attach_watcher(&self, key: &str, handler: WatchHandler) -> Subscription {
        // Weak so data → handler → instance → data does not form a cycle
        let weak: Weak<InstanceInner> = Rc::downgrade(&self.inner);
        self.inner.data.watch(key, move |new, old| match weak.upgrade() {
            Some(inner) => handler(&ComponentInstance { inner }, new, old),
            None => Ok(()),
        })
    }

    pub fn watcher_count(&self, key: &str) -> usize {
        self.inner.data.watcher_count(key)
    }

    // =========================================================================
    // Hooks & Rendering
    // =========================================================================

    /// Run every hook registered for `hook`, in composition order.
    pub(crate) fn run_hooks(&self, hook: LifecycleHook) -> Result<()> {
        let hooks: Vec<Hook> = self
            .inner
            .hooks
            .borrow()
            .iter()
            .filter(|(h, _)| *h == hook)
            .map(|(_, f)| f.clone())
            .collect();
        for f in hooks {
            f(self)?;
        }
        Ok(())
    }

    /// Move to `Mounted` and run the mounted hooks.
    pub(crate) fn mark_mounted(&self) -> Result<()> {
        self.transition(LifecycleState::Mounted)?;
        self.run_hooks(LifecycleHook::Mounted)
    }

    /// Produce the rendered root node.
    ///
    /// Without a render function this is a placeholder `<div>` holding the
    /// raw template text.
    pub fn render(&self, doc: &mut Document) -> Result<NodeId> {
        self.ensure_alive()?;
        let render = self.inner.render.borrow().clone();
        match render {
            Some(render) => render(self, doc),
            None => {
                let root = doc.create_element("div");
                if let Some(name) = self.name() {
                    doc.set_attribute(root, "data-component", name)?;
                }
                let text = doc.create_text(self.template());
                doc.append_child(root, text)?;
                Ok(root)
            }
        }
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Destroy the instance. Terminal; calling it again does nothing.
    ///
    /// Order: `BeforeDestroy` hooks, release every watcher, drop data,
    /// computed properties, methods and render, mark destroyed, then
    /// `Destroyed` hooks. An error from a `BeforeDestroy` hook aborts the
    /// teardown and leaves the instance alive.
    pub fn destroy(&self) -> Result<()> {
        if !self.is_alive() {
            debug!(instance = %self.id(), "destroy called on destroyed instance");
            return Ok(());
        }

        self.run_hooks(LifecycleHook::BeforeDestroy)?;

        let released = self.inner.data.release();
        self.inner.data.clear();
        self.inner.computed.borrow_mut().clear();
        self.inner.methods.borrow_mut().clear();
        self.inner.props.borrow_mut().clear();
        self.inner.render.borrow_mut().take();
        self.transition(LifecycleState::Destroyed)?;

        debug!(instance = %self.id(), released, "instance destroyed");

        let hooks = std::mem::take(&mut *self.inner.hooks.borrow_mut());
        for (hook, f) in hooks {
            if hook == LifecycleHook::Destroyed {
                f(self)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
