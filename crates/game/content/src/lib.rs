//! Data-driven content for the timeline engine.
//!
//! This crate provides the class catalog and loaders for the RON/TOML data files:
//! - Timeline tunables (`timeline.toml`, TOML)
//! - Class templates (`classes.ron`, RON)
//!
//! Built-in defaults ship with the crate, so a session can start without any
//! data directory. Loaded content is consumed when a session is built and never
//! appears in saved state.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{CatalogError, ClassCatalog};

#[cfg(feature = "loaders")]
pub use loaders::{ClassLoader, ConfigLoader, ContentFactory, LoadedContent};
