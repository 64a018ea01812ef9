//! docs.toml configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use atoll_islands::{CompositionPolicy, EsbuildBundler};
use serde::Deserialize;

/// Configuration file structure (docs.toml).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub docs: DocsConfig,
    pub components: ComponentsConfig,
    pub build: BuildSettings,
    pub islands: IslandsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub dir: String,
    pub output: String,
    pub title: String,
    pub base_url: String,
    /// Paths to CSS stylesheets to include
    pub styles: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: "docs".to_string(),
            output: "dist".to_string(),
            title: "Documentation".to_string(),
            base_url: "/".to_string(),
            styles: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ComponentsConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self { minify: true }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IslandsConfig {
    /// esbuild executable
    pub esbuild: String,

    /// Arguments placed before the generated ones, e.g. a plugin wrapper script
    pub esbuild_args: Vec<String>,

    /// Per-invocation bundler timeout
    pub timeout_secs: u64,

    /// Project-local scratch directory
    pub work_dir: String,

    /// "error" (default) or "split"
    pub mixed_frameworks: CompositionPolicy,
}

impl Default for IslandsConfig {
    fn default() -> Self {
        Self {
            esbuild: LOCAL_ESBUILD.to_string(),
            esbuild_args: Vec::new(),
            timeout_secs: EsbuildBundler::DEFAULT_TIMEOUT.as_secs(),
            work_dir: ".atoll".to_string(),
            mixed_frameworks: CompositionPolicy::default(),
        }
    }
}

const LOCAL_ESBUILD: &str = "node_modules/.bin/esbuild";

impl IslandsConfig {
    /// Bundler for this project. A missing project-local esbuild falls back
    /// to the one on `PATH`.
    pub fn bundler(&self, project_root: &Path) -> EsbuildBundler {
        let configured = PathBuf::from(&self.esbuild);
        let command = if self.esbuild == LOCAL_ESBUILD && !project_root.join(&configured).exists() {
            tracing::debug!("{} not found, using esbuild from PATH", LOCAL_ESBUILD);
            PathBuf::from("esbuild")
        } else if configured.is_relative() && configured.components().count() > 1 {
            project_root.join(configured)
        } else {
            configured
        };

        EsbuildBundler::new(command)
            .with_args(self.esbuild_args.iter().cloned())
            .with_working_dir(project_root)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
