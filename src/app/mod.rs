//! App container and plugins.
//!
//! - [`App`] - component, directive, filter and mixin registries plus the
//!   mount driver
//! - [`Plugin`] - one-shot installers, including closures
//! - [`Catalog`] - a plugin bundling named entries, filtered by
//!   [`AppConfig`](crate::config::AppConfig)

mod container;
mod plugin;

pub use container::{App, Filter};
pub use plugin::{Catalog, CatalogEntry, Plugin};
