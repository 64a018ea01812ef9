//! Page compiler facade and build session.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tracing::Instrument;

use crate::analyzer::{analyze, CompositionPolicy, Island, IslandIds};
use crate::bundler::{IslandBundler, ModuleBundler};
use crate::error::IslandError;
use crate::framework::Framework;
use crate::layout::OutputLayout;
use crate::manifest::generate_manifest;
use crate::reference::ComponentReference;
use crate::runtime::{RuntimeBundle, RuntimeCache};
use crate::wrapper::{synthesize, write_wrapper};

/// Settings for a build session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Asset output directory
    pub assets_dir: PathBuf,

    /// Public URL of the asset directory
    pub assets_url: String,

    /// Project-local directory that holds the session scratch space
    pub work_dir: PathBuf,

    pub policy: CompositionPolicy,

    pub minify: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("dist/assets"),
            assets_url: "/assets/".to_string(),
            work_dir: PathBuf::from(".atoll"),
            policy: CompositionPolicy::default(),
            minify: true,
        }
    }
}

/// State shared by every page compiled in one build.
///
/// Owns the shared runtime cache and the island id sequence. Dropping the
/// session removes its scratch directory.
#[derive(Debug)]
pub struct BuildSession<B> {
    bundler: B,
    layout: OutputLayout,
    policy: CompositionPolicy,
    minify: bool,
    ids: IslandIds,
    runtimes: RuntimeCache,
    _scratch: TempDir,
}

impl<B: ModuleBundler> BuildSession<B> {
    /// Start a session. The scratch directory lives inside `work_dir` so bare
    /// imports in synthesized modules resolve against the project's packages.
    pub fn new(bundler: B, config: SessionConfig) -> Result<Self, IslandError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| IslandError::io(&config.work_dir, e))?;

        let scratch = tempfile::Builder::new()
            .prefix("session-")
            .tempdir_in(&config.work_dir)
            .map_err(|e| IslandError::io(&config.work_dir, e))?;

        let layout = OutputLayout::new(config.assets_dir, config.assets_url, scratch.path());

        tracing::debug!(scratch = %scratch.path().display(), "Opened build session");

        Ok(Self {
            bundler,
            layout,
            policy: config.policy,
            minify: config.minify,
            ids: IslandIds::new(),
            runtimes: RuntimeCache::new(),
            _scratch: scratch,
        })
    }

    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn policy(&self) -> CompositionPolicy {
        self.policy
    }

    pub fn runtimes(&self) -> &RuntimeCache {
        &self.runtimes
    }

    /// Shared runtime for a framework, built on first use.
    pub async fn runtime(&self, framework: Framework) -> Result<Option<RuntimeBundle>, IslandError> {
        self.runtimes
            .get_or_create(framework, &self.bundler, &self.layout, self.minify)
            .await
    }
}

/// Per-document information for logging and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    /// Source document being compiled
    pub document: PathBuf,
}

impl CompileContext {
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

/// Compiled islands of one document.
#[derive(Debug, Clone)]
pub struct PageCompileResult {
    pub islands: Vec<Island>,

    /// Import map markup; `None` iff no island uses an externalized framework
    pub manifest_markup: Option<String>,

    /// Shared runtimes the page depends on
    pub runtimes: Vec<RuntimeBundle>,
}

/// Compiles the component forest of one document.
pub struct PageCompiler<B> {
    session: Arc<BuildSession<B>>,
}

impl<B> Clone for PageCompiler<B> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<B: ModuleBundler> PageCompiler<B> {
    pub fn new(session: Arc<BuildSession<B>>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &BuildSession<B> {
        &self.session
    }

    /// Analyze, synthesize, bundle, then wire up shared runtimes.
    ///
    /// The first failing stage aborts the page; bundles already written for
    /// it stay on disk.
    pub async fn compile(
        &self,
        forest: &[ComponentReference],
        ctx: &CompileContext,
    ) -> Result<PageCompileResult, IslandError> {
        let span = tracing::info_span!("compile_page", page = %ctx.document.display());
        self.compile_inner(forest).instrument(span).await
    }

    async fn compile_inner(
        &self,
        forest: &[ComponentReference],
    ) -> Result<PageCompileResult, IslandError> {
        let session = &self.session;
        let mut islands = analyze(forest, session.policy, &session.ids)?;

        let bundler = IslandBundler::new(&session.bundler, &session.layout, session.minify);

        for island in &mut islands {
            if island.is_composition {
                let module = synthesize(island, session.layout.scratch_dir());
                write_wrapper(&module).await?;
                island.entry_path = module.path.clone();
                island.wrapper = Some(module);
            }

            let bundled = bundler.bundle(island).await?;
            island.bundle_path = Some(bundled.path);
            island.bundle_url = Some(bundled.url);
            island.size_bytes = bundled.size_bytes;
        }

        let frameworks: BTreeSet<Framework> = islands
            .iter()
            .map(|i| i.framework)
            .filter(|f| f.externalize())
            .collect();

        let mut runtimes = Vec::with_capacity(frameworks.len());
        for framework in frameworks {
            if let Some(runtime) = session.runtime(framework).await? {
                runtimes.push(runtime);
            }
        }

        let manifest_markup = generate_manifest(&runtimes);

        tracing::debug!(
            islands = islands.len(),
            runtimes = runtimes.len(),
            "Compiled page islands"
        );

        Ok(PageCompileResult {
            islands,
            manifest_markup,
            runtimes,
        })
    }
}
