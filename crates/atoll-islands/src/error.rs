//! Errors raised while compiling a page's islands.

use std::path::PathBuf;

use crate::bundler::BundlerError;
use crate::framework::Framework;

/// One component found in a subtree that spans several frameworks.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkConflict {
    pub component: String,
    pub path: PathBuf,
    pub framework: Framework,
}

/// Errors that abort the compile of a single page.
///
/// These are authoring mistakes in content far more often than internal
/// faults, so every message names the offending component and source path.
#[derive(Debug, thiserror::Error)]
pub enum IslandError {
    #[error(
        "Cannot determine the framework of <{component}> ({}): unrecognized source naming convention",
        path.display()
    )]
    UnknownFramework { component: String, path: PathBuf },

    #[error(
        "<{root}> ({}) nests components from different frameworks: {}",
        root_path.display(),
        describe_conflicts(conflicts)
    )]
    MixedFramework {
        root: String,
        root_path: PathBuf,
        conflicts: Vec<FrameworkConflict>,
    },

    #[error("Failed to bundle island {island_id} for <{component}> ({}): {source}", path.display())]
    IslandBundle {
        island_id: String,
        component: String,
        path: PathBuf,
        #[source]
        source: BundlerError,
    },

    #[error("Failed to build the shared {framework} runtime: {source}")]
    RuntimeBundle {
        framework: Framework,
        #[source]
        source: BundlerError,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IslandError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IslandError::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_conflicts(conflicts: &[FrameworkConflict]) -> String {
    conflicts
        .iter()
        .map(|c| format!("<{}> is {} ({})", c.component, c.framework, c.path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
