//! Static site generator for atoll documentation.
//!
//! Builds a static site from MDX files whose embedded components are compiled
//! into hydrated islands.

pub mod assets;
pub mod builder;
pub mod hydrate;
pub mod resolve;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, IslandConfig, StaticBuilder};
pub use resolve::{resolve_forest, ResolveError};
