//! Plugins and catalogs.
//!
//! A plugin is anything that can install itself into an [`App`]. Passing it
//! to [`App::use_plugin`] consumes it, so `install` runs exactly once.
//!
//! ```ignore
//! app.use_plugin(|app: &mut App| app.set_store(MyStore::default()));
//!
//! app.use_plugin(
//!     Catalog::new()
//!         .component("Button", button())
//!         .directive("show", show()),
//! );
//! ```

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::container::{App, Filter};
use crate::component::{ComponentDefinition, MixinDefinition};
use crate::config::CatalogKind;
use crate::directive::Directive;
use crate::error::Result;
use crate::types::Value;

/// Something that installs itself into an app.
pub trait Plugin {
    fn install(self, app: &mut App);
}

impl<F> Plugin for F
where
    F: FnOnce(&mut App),
{
    fn install(self, app: &mut App) {
        self(app)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// One named entry of a [`Catalog`].
#[derive(Clone)]
pub enum CatalogEntry {
    Component(ComponentDefinition),
    Directive(Directive),
    Filter(Filter),
    Mixin(Rc<MixinDefinition>),
}

impl CatalogEntry {
    pub fn kind(&self) -> CatalogKind {
        match self {
            CatalogEntry::Component(_) => CatalogKind::Components,
            CatalogEntry::Directive(_) => CatalogKind::Directives,
            CatalogEntry::Filter(_) => CatalogKind::Filters,
            CatalogEntry::Mixin(_) => CatalogKind::Mixins,
        }
    }
}

/// A bundle of named components, directives, filters and mixins.
///
/// Installing it registers only the entries the app's
/// [`AppConfig`](crate::config::AppConfig) enables.
#[derive(Clone, Default)]
pub struct Catalog {
    entries: Vec<(String, CatalogEntry)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(mut self, name: &str, definition: ComponentDefinition) -> Self {
        self.entries
            .push((name.to_string(), CatalogEntry::Component(definition)));
        self
    }

    pub fn directive(mut self, name: &str, directive: Directive) -> Self {
        self.entries
            .push((name.to_string(), CatalogEntry::Directive(directive)));
        self
    }

    pub fn filter<F>(mut self, name: &str, filter: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        self.entries
            .push((name.to_string(), CatalogEntry::Filter(Rc::new(filter))));
        self
    }

    pub fn mixin(mut self, name: &str, mixin: impl Into<Rc<MixinDefinition>>) -> Self {
        self.entries
            .push((name.to_string(), CatalogEntry::Mixin(mixin.into())));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Plugin for Catalog {
    fn install(self, app: &mut App) {
        for (name, entry) in self.entries {
            let kind = entry.kind();
            if !app.config().is_enabled(kind, &name) {
                debug!(?kind, name = %name, "catalog entry disabled by config");
                continue;
            }
            match entry {
                CatalogEntry::Component(definition) => app.register_component(&name, definition),
                CatalogEntry::Directive(directive) => app.register_directive(&name, directive),
                CatalogEntry::Filter(filter) => app.insert_filter(&name, filter),
                CatalogEntry::Mixin(mixin) => app.register_mixin(&name, mixin),
            }
        }
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, entry)| (name, entry.kind())))
            .finish()
    }
}
