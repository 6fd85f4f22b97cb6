//! Mixin composition.
//!
//! Folds a definition's mixins into a single [`ComposedDefinition`] with a
//! fixed precedence:
//!
//! - **data**: the host's keys always win; among mixins, later wins for
//!   keys the host does not define
//! - **computed / methods**: host first, then props, then each mixin fills
//!   only keys that are still free (first wins)
//! - **watch**: nothing is overridden; mixin watchers (in mixin order) run
//!   before the host's watcher on the same key
//! - **hooks**: mixin hooks (in mixin order) run before host hooks
//!
//! A mixin that contributes nothing is a no-op.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use super::definition::{ComponentDefinition, Hook, Method, RenderFn, WatchHandler};
use super::instance::ComponentInstance;
use crate::reactive::ComputedProperties;
use crate::types::{DataMap, LifecycleHook, Props};

/// A definition with every mixin folded in. Input to the compiler.
#[derive(Clone)]
pub struct ComposedDefinition {
    pub(crate) name: Option<String>,
    pub(crate) template: String,
    pub(crate) data: DataMap,
    pub(crate) computed: ComputedProperties<ComponentInstance>,
    pub(crate) methods: BTreeMap<String, Method>,
    pub(crate) watch: Vec<(String, WatchHandler)>,
    pub(crate) hooks: Vec<(LifecycleHook, Hook)>,
    pub(crate) props: Props,
    pub(crate) render: Option<RenderFn>,
}

impl ComposedDefinition {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn data(&self) -> &DataMap {
        &self.data
    }

    pub fn computed_keys(&self) -> Vec<&str> {
        self.computed.keys().collect()
    }

    pub fn method_keys(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Watched keys in attachment order (repeats when several watchers share a key).
    pub fn watch_keys(&self) -> Vec<&str> {
        self.watch.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn hook_count(&self, hook: LifecycleHook) -> usize {
        self.hooks.iter().filter(|(h, _)| *h == hook).count()
    }
}

impl fmt::Debug for ComposedDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedDefinition")
            .field("name", &self.name)
            .field("data", &self.data)
            .field("computed", &self.computed)
            .field("methods", &self.method_keys())
            .field("watch", &self.watch_keys())
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Fold every mixin of `definition` into a composed copy.
///
/// The caller's definition, and the mixins it shares, are left untouched.
pub fn compose(definition: &ComponentDefinition) -> ComposedDefinition {
    let host = &definition.behavior;
    let mixins = &definition.mixins;

    // Step 1: Seed data from the host. These keys are authoritative.
    let host_data = host.data();
    let mut data = host_data.clone();

    // Step 2: Mixin data fills keys the host does not own (later mixin wins)
    for mixin in mixins {
        for (key, value) in mixin.behavior.data() {
            if !host_data.contains_key(&key) {
                data.insert(key, value);
            }
        }
    }

    // Step 3: Computed - host, then props (replacing), then mixins (first wins)
    let mut computed = ComputedProperties::new();
    for (key, getter) in &host.computed {
        computed.define(key.clone(), getter.clone());
    }
    for (key, prop) in &definition.props {
        let prop = prop.clone();
        computed.define(key.clone(), Rc::new(move |_: &ComponentInstance| Ok(prop.get())));
    }
    for mixin in mixins {
        for (key, getter) in &mixin.behavior.computed {
            computed.define_absent(key, getter.clone());
        }
    }

    // Step 4: Methods - host, then mixins (first wins)
    let mut methods = host.methods.clone();
    for mixin in mixins {
        for (key, method) in &mixin.behavior.methods {
            methods
                .entry(key.clone())
                .or_insert_with(|| method.clone());
        }
    }

    // Step 5: Watchers - all attach; mixins first so the host handler runs last
    let watch: Vec<(String, WatchHandler)> = mixins
        .iter()
        .flat_map(|mixin| mixin.behavior.watch.iter())
        .chain(host.watch.iter())
        .map(|(key, handler)| (key.clone(), handler.clone()))
        .collect();

    // Step 6: Hooks - mixins first, then host
    let hooks: Vec<(LifecycleHook, Hook)> = mixins
        .iter()
        .flat_map(|mixin| mixin.behavior.hooks.iter())
        .chain(host.hooks.iter())
        .cloned()
        .collect();

    for key in computed.keys().filter(|key| data.contains_key(*key)) {
        warn!(
            component = definition.name().unwrap_or("<anonymous>"),
            key,
            "computed property or prop shadows a data key"
        );
    }

    debug!(
        component = definition.name().unwrap_or("<anonymous>"),
        mixins = mixins.len(),
        data = data.len(),
        computed = computed.len(),
        methods = methods.len(),
        watchers = watch.len(),
        "composed definition"
    );

    ComposedDefinition {
        name: definition.name.clone(),
        template: definition.template.clone(),
        data,
        computed,
        methods,
        watch,
        hooks,
        props: definition.props.clone(),
        render: definition.render.clone(),
    }
}
