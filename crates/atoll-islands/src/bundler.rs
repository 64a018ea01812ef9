//! Island bundling.
//!
//! The module bundler itself is an external collaborator behind
//! [`ModuleBundler`]; [`EsbuildBundler`] drives an esbuild executable.
//! [`IslandBundler`] applies the per-framework externalization policy and
//! writes each island's bundle to its own path.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;

use crate::analyzer::Island;
use crate::error::IslandError;
use crate::layout::OutputLayout;

/// Module format of bundler output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Browser-loadable ES module
    #[default]
    Esm,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Esm => "esm",
        }
    }
}

/// Options for a single bundler invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
    /// Bare specifiers left as imports instead of inlined
    pub external: Vec<String>,

    pub format: OutputFormat,

    /// Automatic JSX runtime import source, if the entry uses JSX
    pub jsx_import_source: Option<String>,

    pub minify: bool,
}

/// Code produced by the bundler.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleOutput {
    pub code: String,
    pub size_bytes: usize,
}

impl BundleOutput {
    pub fn new(code: String) -> Self {
        Self {
            size_bytes: code.len(),
            code,
        }
    }
}

/// Errors reported by a bundler invocation.
#[derive(Debug, thiserror::Error)]
pub enum BundlerError {
    #[error("Failed to start bundler '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Bundler exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Bundler timed out after {0:?}")]
    Timeout(Duration),

    #[error("Bundler produced output that is not valid UTF-8")]
    InvalidOutput,
}

/// An external module bundler.
///
/// Must honor `external` (leave those specifiers as imports) and deduplicate
/// dependencies reached through several import paths of one entry.
pub trait ModuleBundler: Send + Sync {
    /// Bundle `entry` into a single module.
    fn build(
        &self,
        entry: &Path,
        options: &BuildOptions,
    ) -> impl Future<Output = Result<BundleOutput, BundlerError>> + Send;
}

impl<B: ModuleBundler> ModuleBundler for Arc<B> {
    fn build(
        &self,
        entry: &Path,
        options: &BuildOptions,
    ) -> impl Future<Output = Result<BundleOutput, BundlerError>> + Send {
        (**self).build(entry, options)
    }
}

/// Bundler backed by the esbuild command line.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    command: PathBuf,
    leading_args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl EsbuildBundler {
    /// Default per-invocation timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            leading_args: Vec::new(),
            working_dir: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Arguments placed before the generated ones (e.g. plugin wrapper scripts).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Directory the bundler runs in (where `node_modules` lives).
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Full argument list for one invocation.
    pub fn arguments(&self, entry: &Path, options: &BuildOptions) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push(entry.to_string_lossy().into_owned());
        args.push("--bundle".to_string());
        args.push(format!("--format={}", options.format.as_str()));
        args.push("--platform=browser".to_string());
        args.push("--log-level=error".to_string());

        for specifier in &options.external {
            args.push(format!("--external:{specifier}"));
        }

        if let Some(source) = &options.jsx_import_source {
            args.push("--jsx=automatic".to_string());
            args.push(format!("--jsx-import-source={source}"));
        }

        if options.minify {
            args.push("--minify".to_string());
        }

        args
    }
}

impl Default for EsbuildBundler {
    fn default() -> Self {
        Self::new("esbuild")
    }
}

impl ModuleBundler for EsbuildBundler {
    async fn build(
        &self,
        entry: &Path,
        options: &BuildOptions,
    ) -> Result<BundleOutput, BundlerError> {
        let mut command = Command::new(&self.command);
        command
            .args(self.arguments(entry, options))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::trace!(entry = %entry.display(), "Invoking esbuild");

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| BundlerError::Timeout(self.timeout))?
            .map_err(|source| BundlerError::Spawn {
                command: self.command.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(BundlerError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let code = String::from_utf8(output.stdout).map_err(|_| BundlerError::InvalidOutput)?;
        Ok(BundleOutput::new(code))
    }
}

/// A bundled island on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct BundledIsland {
    pub path: PathBuf,
    pub url: String,
    pub size_bytes: usize,
}

/// Bundles islands under the framework externalization policy.
pub struct IslandBundler<'a, B> {
    bundler: &'a B,
    layout: &'a OutputLayout,
    minify: bool,
}

impl<'a, B: ModuleBundler> IslandBundler<'a, B> {
    pub fn new(bundler: &'a B, layout: &'a OutputLayout, minify: bool) -> Self {
        Self {
            bundler,
            layout,
            minify,
        }
    }

    /// Options for an island: externalized frameworks keep their runtime out.
    pub fn options_for(&self, island: &Island) -> BuildOptions {
        let spec = island.framework.spec();

        BuildOptions {
            external: island.framework.externals(),
            format: OutputFormat::Esm,
            jsx_import_source: spec.jsx_import_source.map(str::to_string),
            minify: self.minify,
        }
    }

    /// Bundle one island from its entry path and write the result.
    pub async fn bundle(&self, island: &Island) -> Result<BundledIsland, IslandError> {
        let options = self.options_for(island);

        let output = self
            .bundler
            .build(&island.entry_path, &options)
            .await
            .map_err(|source| IslandError::IslandBundle {
                island_id: island.id.clone(),
                component: island.root.name.clone(),
                path: island.root.source_path.clone(),
                source,
            })?;

        let path = self.layout.island_path(&island.id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| IslandError::io(parent, e))?;
        }
        tokio::fs::write(&path, &output.code)
            .await
            .map_err(|e| IslandError::io(&path, e))?;

        tracing::debug!(
            island = %island.id,
            framework = %island.framework,
            composite = island.is_composition,
            size = output.size_bytes,
            "Bundled island"
        );

        Ok(BundledIsland {
            url: self.layout.island_url(&island.id),
            path,
            size_bytes: output.size_bytes,
        })
    }
}
