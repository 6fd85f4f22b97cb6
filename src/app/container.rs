//! App container - registries, plugins and the mount driver.
//!
//! # Example
//!
//! ```ignore
//! use zenithic::prelude::*;
//!
//! let mut doc = Document::new();
//! let root = doc.create_element("div");
//! doc.set_attribute(root, "id", "app")?;
//! doc.append_child(doc.body(), root)?;
//!
//! let mut app = App::new();
//! app.register_directive("focus", focus_directive());
//!
//! // Replaces everything under #app with the rendered component
//! app.mount(&mut doc, "#app", &definition, Props::new())?;
//!
//! // Destroys the instance and detaches its root
//! app.unmount(&mut doc)?;
//! ```
//!
//! One app drives at most one mounted component. Mounting again unmounts
//! the previous component first.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::plugin::Plugin;
use crate::component::{ComponentDefinition, ComponentInstance, MixinDefinition, compile};
use crate::config::AppConfig;
use crate::directive::{Binding, Directive, DirectiveBinding, DirectiveHook, extract_directives};
use crate::dom::{Document, NodeId};
use crate::error::{Result, RuntimeError};
use crate::types::{LifecycleHook, Props, Value};

/// A named value transform, e.g. `uppercase` or `currency`.
pub type Filter = Rc<dyn Fn(&Value, &[Value]) -> Result<Value>>;

// =============================================================================
// Mount State
// =============================================================================

/// A directive found in the mounted template with a registered handler.
struct BoundDirective {
    name: String,
    directive: Directive,
    raw: DirectiveBinding,
    binding: Binding,
}

/// Everything the app owns while a component is mounted.
struct MountState {
    point: NodeId,
    root: NodeId,
    instance: ComponentInstance,
    directives: Vec<BoundDirective>,
}

impl MountState {
    fn run_directives(&self, hook: DirectiveHook, doc: &mut Document) -> Result<()> {
        run_directives(&self.directives, hook, doc, self.root)
    }
}

fn run_directives(
    directives: &[BoundDirective],
    hook: DirectiveHook,
    doc: &mut Document,
    element: NodeId,
) -> Result<()> {
    for bound in directives {
        trace!(directive = %bound.name, ?hook, "directive hook");
        bound.directive.invoke(hook, doc, element, &bound.binding)?;
    }
    Ok(())
}

/// Undo a mount that failed before the swap and hand back its error.
///
/// The staged nodes are dropped from the fragment and the instance is
/// destroyed so its watchers and teardown hooks do not leak.
fn abort_mount(
    doc: &mut Document,
    fragment: NodeId,
    instance: &ComponentInstance,
    err: RuntimeError,
) -> RuntimeError {
    for staged in doc.children(fragment).to_vec() {
        if let Err(detach_err) = doc.detach(staged) {
            debug!(node = %staged, error = %detach_err, "failed to drop staged node");
        }
    }
    if let Err(destroy_err) = instance.destroy() {
        debug!(instance = %instance.id(), error = %destroy_err, "destroy after failed mount");
    }
    debug!(instance = %instance.id(), error = %err, "mount aborted");
    err
}

// =============================================================================
// App
// =============================================================================

/// Application container.
#[derive(Default)]
pub struct App {
    config: AppConfig,
    mounted: Option<MountState>,
    components: HashMap<String, ComponentDefinition>,
    directives: HashMap<String, Directive>,
    filters: HashMap<String, Filter>,
    mixins: HashMap<String, Rc<MixinDefinition>>,
    router: Option<Rc<dyn Any>>,
    store: Option<Rc<dyn Any>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Install a plugin. The plugin is consumed.
    pub fn use_plugin(&mut self, plugin: impl Plugin) -> &mut Self {
        plugin.install(self);
        self
    }

    // =========================================================================
    // Registries
    // =========================================================================

    pub fn register_component(&mut self, name: &str, definition: ComponentDefinition) {
        trace!(name, "register component");
        self.components.insert(name.to_string(), definition);
    }

    pub fn component(&self, name: &str) -> Option<&ComponentDefinition> {
        self.components.get(name)
    }

    pub fn register_directive(&mut self, name: &str, directive: Directive) {
        trace!(name, "register directive");
        self.directives.insert(name.to_string(), directive);
    }

    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    pub fn register_filter<F>(&mut self, name: &str, filter: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        self.insert_filter(name, Rc::new(filter));
    }

    pub(crate) fn insert_filter(&mut self, name: &str, filter: Filter) {
        trace!(name, "register filter");
        self.filters.insert(name.to_string(), filter);
    }

    pub fn filter(&self, name: &str) -> Option<Filter> {
        self.filters.get(name).cloned()
    }

    pub fn register_mixin(&mut self, name: &str, mixin: impl Into<Rc<MixinDefinition>>) {
        trace!(name, "register mixin");
        self.mixins.insert(name.to_string(), mixin.into());
    }

    pub fn mixin(&self, name: &str) -> Option<Rc<MixinDefinition>> {
        self.mixins.get(name).cloned()
    }

    // =========================================================================
    // Router / Store
    // =========================================================================

    pub fn set_router<T: 'static>(&mut self, router: T) {
        self.router = Some(Rc::new(router));
    }

    /// The router, if one of type `T` was set.
    pub fn router<T: 'static>(&self) -> Option<Rc<T>> {
        self.router.clone()?.downcast::<T>().ok()
    }

    pub fn set_store<T: 'static>(&mut self, store: T) {
        self.store = Some(Rc::new(store));
    }

    /// The store, if one of type `T` was set.
    pub fn store<T: 'static>(&self) -> Option<Rc<T>> {
        self.store.clone()?.downcast::<T>().ok()
    }

    // =========================================================================
    // Mount State Accessors
    // =========================================================================

    /// The mounted component's root node.
    pub fn el(&self) -> Option<NodeId> {
        self.mounted.as_ref().map(|m| m.root)
    }

    /// The node the component was mounted into.
    pub fn mount_point(&self) -> Option<NodeId> {
        self.mounted.as_ref().map(|m| m.point)
    }

    pub fn instance(&self) -> Option<&ComponentInstance> {
        self.mounted.as_ref().map(|m| &m.instance)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    // =========================================================================
    // Mount / Unmount
    // =========================================================================

    /// Mount `definition` into the first node matching `selector`.
    ///
    /// `props` are merged over the definition's own props. If nothing
    /// matches the selector, nothing happens and `Ok(None)` is returned.
    ///
    /// 1. Unmount whatever is currently mounted
    /// 2. Compile the definition (runs `Created` hooks)
    /// 3. Resolve the template's directives that have a registered handler
    /// 4. Run `BeforeMount` hooks, then render into a fragment
    /// 5. Run directive `BeforeMount` handlers on the detached root
    /// 6. Swap the mount point's children for the fragment in one step
    /// 7. Run `Mounted` hooks, then directive `Mounted` handlers
    pub fn mount(
        &mut self,
        doc: &mut Document,
        selector: &str,
        definition: &ComponentDefinition,
        props: Props,
    ) -> Result<Option<ComponentInstance>> {
        let Some(point) = doc.query_selector(selector) else {
            debug!(selector, "mount point not found");
            return Ok(None);
        };

        self.unmount(doc)?;

        let definition = definition.clone().with_props(props);
        let instance = compile(&definition)?;

        let fragment = doc.create_fragment();
        let (root, directives) = match self.stage_mount(doc, point, fragment, &instance) {
            Ok(staged) => staged,
            Err(err) => return Err(abort_mount(doc, fragment, &instance, err)),
        };

        let state = MountState {
            point,
            root,
            instance: instance.clone(),
            directives,
        };
        debug!(
            instance = %instance.id(),
            %point,
            %root,
            directives = state.directives.len(),
            "component mounted"
        );
        // Recorded before the mounted hooks so a failing hook still leaves
        // something to unmount
        self.mounted = Some(state);

        instance.mark_mounted()?;
        if let Some(state) = &self.mounted {
            state.run_directives(DirectiveHook::Mounted, doc)?;
        }
        Ok(Some(instance))
    }

    /// Mount a registered component by name.
    ///
    /// Returns `Ok(None)` when no component of that name is registered.
    pub fn mount_component(
        &mut self,
        doc: &mut Document,
        selector: &str,
        name: &str,
        props: Props,
    ) -> Result<Option<ComponentInstance>> {
        let Some(definition) = self.components.get(name).cloned() else {
            debug!(name, "component not registered");
            return Ok(None);
        };
        self.mount(doc, selector, &definition, props)
    }

    /// Tear down the mounted component. Does nothing when nothing is mounted.
    ///
    /// Directive `BeforeDestroy` handlers run first, then the instance is
    /// destroyed and its root detached from the document.
    pub fn unmount(&mut self, doc: &mut Document) -> Result<()> {
        let Some(state) = &self.mounted else {
            trace!("unmount with nothing mounted");
            return Ok(());
        };

        state.run_directives(DirectiveHook::BeforeDestroy, doc)?;
        state.instance.destroy()?;
        doc.detach(state.root)?;

        debug!(instance = %state.instance.id(), root = %state.root, "component unmounted");
        self.mounted = None;
        Ok(())
    }

    /// Signal that the mounted component changed.
    ///
    /// Runs `Updated` hooks, then re-resolves every directive value and runs
    /// the directive `Updated` handlers.
    pub fn notify_updated(&mut self, doc: &mut Document) -> Result<()> {
        let Some(state) = &mut self.mounted else {
            return Ok(());
        };

        state.instance.run_hooks(LifecycleHook::Updated)?;
        for bound in &mut state.directives {
            bound.binding = bound.directive.resolve(&state.instance, &bound.raw)?;
        }
        state.run_directives(DirectiveHook::Updated, doc)
    }

    /// Everything between compile and the swap. Nothing is visible in the
    /// document until the final `replace_children` succeeds.
    fn stage_mount(
        &self,
        doc: &mut Document,
        point: NodeId,
        fragment: NodeId,
        instance: &ComponentInstance,
    ) -> Result<(NodeId, Vec<BoundDirective>)> {
        let directives = self.resolve_directives(instance)?;

        instance.run_hooks(LifecycleHook::BeforeMount)?;
        let root = instance.render(doc)?;
        doc.append_child(fragment, root)?;
        run_directives(&directives, DirectiveHook::BeforeMount, doc, root)?;

        doc.replace_children(point, fragment)?;
        Ok((root, directives))
    }

    fn resolve_directives(&self, instance: &ComponentInstance) -> Result<Vec<BoundDirective>> {
        let mut bound = Vec::new();
        for (name, raw) in extract_directives(instance.template()) {
            let Some(directive) = self.directives.get(&name) else {
                trace!(directive = %name, "no handler registered");
                continue;
            };
            let binding = directive.resolve(instance, &raw)?;
            bound.push(BoundDirective {
                name,
                directive: directive.clone(),
                raw,
                binding,
            });
        }
        Ok(bound)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("mounted", &self.mounted.as_ref().map(|m| m.instance.id()))
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("mixins", &self.mixins.keys().collect::<Vec<_>>())
            .finish()
    }
}
