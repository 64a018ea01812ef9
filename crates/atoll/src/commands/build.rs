//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atoll_static::{BuildConfig, IslandConfig, StaticBuilder};

use crate::config::load_config;

/// Run the build command.
///
/// Relative paths in the config resolve against the directory holding it.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let file_config = load_config(config_path)?;
    let root = project_root(config_path)?;

    let config = BuildConfig {
        docs_dir: root.join(&file_config.docs.dir),
        output_dir: output.unwrap_or_else(|| root.join(&file_config.docs.output)),
        components_dir: file_config.components.dir.as_ref().map(|d| root.join(d)),
        minify: minify.unwrap_or(file_config.build.minify),
        base_url: file_config.docs.base_url.clone(),
        title: file_config.docs.title.clone(),
        styles: file_config
            .docs
            .styles
            .iter()
            .map(|s| root.join(s).to_string_lossy().into_owned())
            .collect(),
        islands: IslandConfig {
            work_dir: root.join(&file_config.islands.work_dir),
            policy: file_config.islands.mixed_frameworks,
        },
    };

    let bundler = file_config.islands.bundler(&root);
    tracing::debug!("Bundling with {}", bundler.command().display());

    let result = StaticBuilder::with_bundler(config, bundler).build().await?;

    tracing::info!(
        "Built {} pages with {} islands in {}ms",
        result.pages,
        result.islands,
        result.duration_ms
    );
    for runtime in &result.runtimes {
        tracing::info!(
            "Shared {} runtime: {} ({} bytes)",
            runtime.framework,
            runtime.url,
            runtime.size_bytes
        );
    }
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

fn project_root(config_path: &Path) -> Result<PathBuf> {
    let dir = match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    dir.canonicalize()
        .with_context(|| format!("Failed to resolve project directory {}", dir.display()))
}
