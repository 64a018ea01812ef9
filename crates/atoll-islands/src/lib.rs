//! Component-island compiler.
//!
//! Turns the component markup embedded in a content document into independently
//! bundled, hydratable islands. Each island is classified by UI framework, nested
//! component groups are compiled as a single synthesized unit, and heavyweight
//! framework runtimes are externalized into one shared bundle per build session,
//! wired up in the browser through an import map.

pub mod analyzer;
pub mod bundler;
pub mod compiler;
pub mod error;
pub mod framework;
pub mod layout;
pub mod manifest;
pub mod reference;
pub mod registry;
pub mod runtime;
pub mod wrapper;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use analyzer::{analyze, CompositionPolicy, Island, IslandIds};
pub use bundler::{
    BuildOptions, BundleOutput, BundledIsland, BundlerError, EsbuildBundler, IslandBundler,
    ModuleBundler, OutputFormat,
};
pub use compiler::{BuildSession, CompileContext, PageCompileResult, PageCompiler, SessionConfig};
pub use error::{FrameworkConflict, IslandError};
pub use framework::{
    classify, classify_reference, Framework, FrameworkSpec, ParseFrameworkError, WrapperDialect,
};
pub use layout::OutputLayout;
pub use manifest::generate_manifest;
pub use reference::{Child, ComponentReference, PropValue};
pub use registry::{ComponentRegistry, RegisteredComponent, RegistryError};
pub use runtime::{RuntimeBundle, RuntimeCache};
pub use wrapper::{synthesize, write_wrapper, WrapperModule};
