//! Core types shared across the runtime.
//!
//! - [`Value`] / [`DataMap`] - dynamic values held by component data
//! - [`PropValue`] - external input supplied at mount time
//! - [`LifecycleHook`] / [`LifecycleState`] - instance lifecycle

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use spark_signals::Signal;

/// Dynamic value stored in component data and returned by computed reads.
pub use serde_json::Value;

/// Key → value mapping produced by a data factory.
pub type DataMap = BTreeMap<String, Value>;

// =============================================================================
// Instance Identity
// =============================================================================

/// Identifier of a compiled component instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Named lifecycle entry points a definition or mixin can hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    /// End of compilation, before anything is rendered.
    Created,
    /// Rendered output exists but has not been swapped into the document.
    BeforeMount,
    /// Rendered output is attached to the mount point.
    Mounted,
    /// The host signalled that the mounted instance changed.
    Updated,
    /// Teardown is about to start; the instance is still fully usable.
    BeforeDestroy,
    /// Teardown finished; accessors now fail.
    Destroyed,
}

/// Instance lifecycle. Transitions only move forward.
///
/// ```text
/// Defined → Composed → Instantiated → (Mounted) → Destroyed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Defined,
    Composed,
    Instantiated,
    Mounted,
    Destroyed,
}

impl LifecycleState {
    /// Whether moving from `self` to `next` is allowed.
    ///
    /// Mounting is optional, so `Instantiated → Destroyed` is valid.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Defined, Composed)
                | (Composed, Instantiated)
                | (Instantiated, Mounted)
                | (Instantiated, Destroyed)
                | (Mounted, Destroyed)
        )
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A prop supplied at mount time: static, a signal, or a getter.
///
/// Props are exposed on the instance as computed-like reads, so a signal or
/// getter prop is re-read on every access.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value.
    Static(T),
    /// Reactive signal owned by the host.
    Signal(Signal<T>),
    /// Getter function (called each time the prop is read).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value.
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for PropValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Static(v) => f.debug_tuple("Static").field(v).finish(),
            PropValue::Signal(_) => f.write_str("Signal(..)"),
            PropValue::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}

/// Props mapping passed to `App::mount`.
pub type Props = BTreeMap<String, PropValue<Value>>;
