//! Component and mixin definitions.
//!
//! Definitions are declarative and immutable once handed to the compiler:
//! composition works on a copy and never touches the caller's definition.
//! Every function slot is an `Rc`, so cloning a definition is cheap.
//!
//! # Example
//!
//! ```ignore
//! use zenithic::component::{ComponentDefinition, MixinDefinition};
//! use serde_json::json;
//!
//! let counter = MixinDefinition::new()
//!     .with_data(|| [("count".into(), json!(0))].into_iter().collect())
//!     .method("increment", |this, _args| {
//!         let next = this.get("count")?.as_i64().unwrap_or(0) + 1;
//!         this.set("count", json!(next))?;
//!         Ok(json!(next))
//!     });
//!
//! let def = ComponentDefinition::new(r#"<button v-on:click="increment">+</button>"#)
//!     .named("Counter")
//!     .mixin(counter)
//!     .computed("label", |this| Ok(json!(format!("clicked {}", this.get("count")?))));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::instance::ComponentInstance;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::reactive::Getter;
use crate::types::{DataMap, LifecycleHook, PropValue, Props, Value};

// =============================================================================
// Function Slots
// =============================================================================

/// Zero-argument factory producing a fresh data mapping.
pub type DataFactory = Rc<dyn Fn() -> DataMap>;

/// Getter of a computed property, receiving the live instance.
pub type ComputedGetter = Getter<ComponentInstance>;

/// Method bound to the live instance.
pub type Method = Rc<dyn Fn(&ComponentInstance, &[Value]) -> Result<Value>>;

/// Watch handler receiving `(instance, new, old)`.
pub type WatchHandler = Rc<dyn Fn(&ComponentInstance, &Value, &Value) -> Result<()>>;

/// Lifecycle hook.
pub type Hook = Rc<dyn Fn(&ComponentInstance) -> Result<()>>;

/// Produces the rendered root node of an instance.
pub type RenderFn = Rc<dyn Fn(&ComponentInstance, &mut Document) -> Result<NodeId>>;

// =============================================================================
// Behavior
// =============================================================================

/// The parts shared by components and mixins.
#[derive(Clone, Default)]
pub(crate) struct Behavior {
    pub(crate) data: Option<DataFactory>,
    pub(crate) computed: BTreeMap<String, ComputedGetter>,
    pub(crate) methods: BTreeMap<String, Method>,
    pub(crate) watch: BTreeMap<String, WatchHandler>,
    pub(crate) hooks: Vec<(LifecycleHook, Hook)>,
}

impl Behavior {
    pub(crate) fn data(&self) -> DataMap {
        self.data.as_ref().map(|factory| factory()).unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.data.is_none()
            && self.computed.is_empty()
            && self.methods.is_empty()
            && self.watch.is_empty()
            && self.hooks.is_empty()
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("data", &self.data.is_some())
            .field("computed", &self.computed.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("watch", &self.watch.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks.iter().map(|(h, _)| h).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder methods shared by [`ComponentDefinition`] and [`MixinDefinition`].
macro_rules! behavior_builders {
    ($ty:ty) => {
        impl $ty {
            /// Set the data factory.
            pub fn with_data<F>(mut self, factory: F) -> Self
            where
                F: Fn() -> DataMap + 'static,
            {
                self.behavior.data = Some(Rc::new(factory));
                self
            }

            /// Add a computed property.
            pub fn computed<F>(mut self, key: &str, getter: F) -> Self
            where
                F: Fn(&ComponentInstance) -> Result<Value> + 'static,
            {
                self.behavior.computed.insert(key.to_string(), Rc::new(getter));
                self
            }

            /// Add a method.
            pub fn method<F>(mut self, key: &str, method: F) -> Self
            where
                F: Fn(&ComponentInstance, &[Value]) -> Result<Value> + 'static,
            {
                self.behavior.methods.insert(key.to_string(), Rc::new(method));
                self
            }

            /// Watch a data key.
            pub fn watch<F>(mut self, key: &str, handler: F) -> Self
            where
                F: Fn(&ComponentInstance, &Value, &Value) -> Result<()> + 'static,
            {
                self.behavior.watch.insert(key.to_string(), Rc::new(handler));
                self
            }

            /// Add a lifecycle hook. Several hooks may share the same entry point.
            pub fn on<F>(mut self, hook: LifecycleHook, f: F) -> Self
            where
                F: Fn(&ComponentInstance) -> Result<()> + 'static,
            {
                self.behavior.hooks.push((hook, Rc::new(f)));
                self
            }
        }
    };
}

// =============================================================================
// Mixin Definition
// =============================================================================

/// Reusable partial behavior merged into components at composition time.
///
/// Shared read-only between every component that references it.
#[derive(Clone, Debug, Default)]
pub struct MixinDefinition {
    pub(crate) name: Option<String>,
    pub(crate) behavior: Behavior,
}

impl MixinDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// A mixin without data, computed, methods, watchers or hooks.
    pub fn is_empty(&self) -> bool {
        self.behavior.is_empty()
    }
}

behavior_builders!(MixinDefinition);

// =============================================================================
// Component Definition
// =============================================================================

/// Declarative description of a component.
#[derive(Clone, Default)]
pub struct ComponentDefinition {
    pub(crate) name: Option<String>,
    pub(crate) template: String,
    pub(crate) behavior: Behavior,
    pub(crate) mixins: Vec<Rc<MixinDefinition>>,
    pub(crate) props: Props,
    pub(crate) render: Option<RenderFn>,
}

impl ComponentDefinition {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Append a mixin. Mixins apply in the order they are added.
    pub fn mixin(mut self, mixin: impl Into<Rc<MixinDefinition>>) -> Self {
        self.mixins.push(mixin.into());
        self
    }

    /// Set one prop.
    pub fn prop(mut self, key: &str, value: impl Into<PropValue<Value>>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// Merge `props` over the existing ones (later wins).
    pub fn with_props(mut self, props: Props) -> Self {
        self.props.extend(props);
        self
    }

    /// Replace the placeholder render with `render`.
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&ComponentInstance, &mut Document) -> Result<NodeId> + 'static,
    {
        self.render = Some(Rc::new(render));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn mixins(&self) -> &[Rc<MixinDefinition>] {
        &self.mixins
    }

    pub fn props(&self) -> &Props {
        &self.props
    }
}

behavior_builders!(ComponentDefinition);

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("behavior", &self.behavior)
            .field("mixins", &self.mixins.len())
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .field("render", &self.render.is_some())
            .finish()
    }
}
