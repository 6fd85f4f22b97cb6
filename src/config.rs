//! App configuration.
//!
//! Selects which catalog entries a [`Catalog`](crate::app::Catalog) plugin
//! installs. Every list is optional; a missing list enables everything.
//!
//! ```json
//! {
//!   "directives": ["show", "bind"],
//!   "components": ["Button"]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The four extensible registries held by the app container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Components,
    Directives,
    Filters,
    Mixins,
}

/// Allow-lists for catalog installation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub components: Option<Vec<String>>,
    pub directives: Option<Vec<String>>,
    pub filters: Option<Vec<String>>,
    pub mixins: Option<Vec<String>>,
}

impl AppConfig {
    /// Parse a JSON document.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Whether `name` may be installed into the `kind` registry.
    pub fn is_enabled(&self, kind: CatalogKind, name: &str) -> bool {
        let list = match kind {
            CatalogKind::Components => &self.components,
            CatalogKind::Directives => &self.directives,
            CatalogKind::Filters => &self.filters,
            CatalogKind::Mixins => &self.mixins,
        };
        list.as_ref()
            .is_none_or(|names| names.iter().any(|n| n == name))
    }
}
