//! Shared framework runtimes.
//!
//! Externalized frameworks get exactly one runtime bundle per build session.
//! The bundle re-exports the framework's public surface and is written to a
//! path keyed only by framework name; every island and page that needs the
//! framework resolves to it through the import map.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::OnceCell;

use crate::bundler::{BuildOptions, ModuleBundler, OutputFormat};
use crate::error::IslandError;
use crate::framework::Framework;
use crate::layout::OutputLayout;

/// One shared runtime artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeBundle {
    pub framework: Framework,
    pub output_path: PathBuf,
    pub url: String,
    pub size_bytes: usize,
}

/// Session-scoped store of shared runtimes.
///
/// Concurrent first requests for a framework wait on the same in-flight build.
/// A failed build leaves the slot empty so a later caller can retry.
#[derive(Debug, Default)]
pub struct RuntimeCache {
    slots: Mutex<HashMap<Framework, Arc<OnceCell<RuntimeBundle>>>>,
}

impl RuntimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, framework: Framework) -> Arc<OnceCell<RuntimeBundle>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(framework).or_default())
    }

    /// Return the framework's runtime, building it on first use.
    ///
    /// Frameworks that are not externalized return `None` without touching
    /// the bundler.
    pub async fn get_or_create<B: ModuleBundler>(
        &self,
        framework: Framework,
        bundler: &B,
        layout: &OutputLayout,
        minify: bool,
    ) -> Result<Option<RuntimeBundle>, IslandError> {
        if !framework.externalize() {
            return Ok(None);
        }

        let slot = self.slot(framework);
        let bundle = slot
            .get_or_try_init(|| build_runtime(framework, bundler, layout, minify))
            .await?;

        Ok(Some(bundle.clone()))
    }

    /// A runtime that has already been built, if any.
    pub fn get(&self, framework: Framework) -> Option<RuntimeBundle> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(&framework).and_then(|slot| slot.get().cloned())
    }

    /// Every runtime built so far, in framework order.
    pub fn built(&self) -> Vec<RuntimeBundle> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut bundles: Vec<RuntimeBundle> =
            slots.values().filter_map(|slot| slot.get().cloned()).collect();
        bundles.sort_by_key(|b| b.framework);
        bundles
    }
}

/// Source of the synthetic entry that re-exports a framework's public surface.
pub fn runtime_entry_source(framework: Framework) -> String {
    let mut source = format!("// Shared {framework} runtime\n");
    for export in framework.spec().runtime_exports {
        source.push_str(&export.statement());
        source.push('\n');
    }
    source
}

async fn build_runtime<B: ModuleBundler>(
    framework: Framework,
    bundler: &B,
    layout: &OutputLayout,
    minify: bool,
) -> Result<RuntimeBundle, IslandError> {
    let entry = layout.runtime_entry_path(framework);
    if let Some(parent) = entry.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| IslandError::io(parent, e))?;
    }
    tokio::fs::write(&entry, runtime_entry_source(framework))
        .await
        .map_err(|e| IslandError::io(&entry, e))?;

    let options = BuildOptions {
        external: Vec::new(),
        format: OutputFormat::Esm,
        jsx_import_source: None,
        minify,
    };

    let output = bundler
        .build(&entry, &options)
        .await
        .map_err(|source| IslandError::RuntimeBundle { framework, source })?;

    let output_path = layout.runtime_path(framework);
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| IslandError::io(parent, e))?;
    }
    tokio::fs::write(&output_path, &output.code)
        .await
        .map_err(|e| IslandError::io(&output_path, e))?;

    tracing::info!(
        framework = %framework,
        size = output.size_bytes,
        path = %output_path.display(),
        "Built shared runtime"
    );

    Ok(RuntimeBundle {
        framework,
        url: layout.runtime_url(framework),
        output_path,
        size_bytes: output.size_bytes,
    })
}
