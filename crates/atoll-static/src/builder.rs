//! Static site builder.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use rayon::prelude::*;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use atoll_islands::{
    BuildSession, CompileContext, ComponentRegistry, CompositionPolicy, EsbuildBundler, Island,
    IslandError, ModuleBundler, PageCompileResult, PageCompiler, RuntimeBundle, SessionConfig,
};
use atoll_mdx::{parse_mdx, slugify, Frontmatter, ParseError, ParsedDoc};

use crate::assets::{AssetError, AssetPipeline};
use crate::hydrate::{mount_script, placeholder};
use crate::resolve::{import_map, resolve_forest, ResolveError};
use crate::templates::{Context, NavItem, TemplateEngine, TocEntry};

/// Island compilation settings.
#[derive(Debug, Clone)]
pub struct IslandConfig {
    /// Project-local directory that holds per-build scratch space
    pub work_dir: PathBuf,

    /// What to do with composite subtrees spanning several frameworks
    pub policy: CompositionPolicy,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(".atoll"),
            policy: CompositionPolicy::default(),
        }
    }
}

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source docs directory
    pub docs_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Components directory used to resolve tags the page does not import
    pub components_dir: Option<PathBuf>,

    /// Minify CSS and island bundles
    pub minify: bool,

    /// Base URL for the site
    pub base_url: String,

    /// Site title
    pub title: String,

    /// Paths to CSS stylesheets to include
    pub styles: Vec<String>,

    pub islands: IslandConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            components_dir: None,
            minify: true,
            base_url: "/".to_string(),
            title: "Documentation".to_string(),
            styles: vec![],
            islands: IslandConfig::default(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of islands compiled across all pages
    pub islands: usize,

    /// Shared framework runtimes written during the build
    pub runtimes: Vec<RuntimeBundle>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Docs directory not found: {}", .0.display())]
    DocsNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: ResolveError,
    },

    #[error("Failed to compile islands for {}: {source}", path.display())]
    Island {
        path: PathBuf,
        #[source]
        source: IslandError,
    },

    #[error("Failed to open build session: {0}")]
    Session(#[source] IslandError),

    #[error("Failed to render template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Failed to process assets: {0}")]
    Asset(#[from] AssetError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Page compilation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A page to be built.
#[derive(Debug)]
struct PageInfo {
    /// Source file path
    source_path: PathBuf,

    /// Relative path from docs dir
    relative_path: PathBuf,

    output_path: PathBuf,

    doc: ParsedDoc,
}

impl PageInfo {
    fn frontmatter(&self) -> Option<&Frontmatter> {
        self.doc.frontmatter.as_ref()
    }

    fn order(&self) -> i32 {
        self.frontmatter().and_then(|f| f.order).unwrap_or(999)
    }
}

/// Static site builder.
pub struct StaticBuilder<B = EsbuildBundler> {
    config: BuildConfig,
    bundler: Arc<B>,
    registry: Arc<ComponentRegistry>,
    templates: TemplateEngine,
}

impl StaticBuilder<EsbuildBundler> {
    /// Create a builder that bundles with the `esbuild` found on `PATH`.
    pub fn new(config: BuildConfig) -> Self {
        Self::with_bundler(config, EsbuildBundler::new("esbuild"))
    }
}

impl<B: ModuleBundler + 'static> StaticBuilder<B> {
    pub fn with_bundler(config: BuildConfig, bundler: B) -> Self {
        let mut registry = ComponentRegistry::new();

        if let Some(ref components_dir) = config.components_dir {
            if components_dir.exists() {
                match registry.scan(components_dir) {
                    Ok(count) => {
                        tracing::info!(
                            "Loaded {} components from {}",
                            count,
                            components_dir.display()
                        );
                    }
                    Err(e) => {
                        tracing::warn!("Failed to scan components directory: {}", e);
                    }
                }
            }
        }

        Self {
            config,
            bundler: Arc::new(bundler),
            registry: Arc::new(registry),
            templates: TemplateEngine::new(),
        }
    }

    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Build the static site.
    ///
    /// Pages are parsed in parallel, their islands compiled concurrently in
    /// one build session, then rendered. The first failing page aborts the
    /// build.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        create_dir(&self.config.output_dir)?;

        // Island ids restart every build; stale bundles would never be referenced.
        let islands_dir = self.config.output_dir.join("assets").join("islands");
        if islands_dir.exists() {
            fs::remove_dir_all(&islands_dir).map_err(|source| BuildError::Write {
                path: islands_dir.clone(),
                source,
            })?;
        }

        let pages: Vec<Arc<PageInfo>> = self
            .discover_pages()?
            .into_iter()
            .map(Arc::new)
            .collect();

        let nav = self.build_navigation(&pages);

        let (compiled, runtimes) = self.compile_islands(&pages).await?;

        let results: Vec<Result<usize, BuildError>> = pages
            .par_iter()
            .zip(compiled.par_iter())
            .map(|(page, islands)| self.render_page(page, islands, &nav))
            .collect();

        let mut total_islands = 0;
        for result in results {
            total_islands += result?;
        }

        self.generate_assets()?;
        self.generate_search_index(&pages)?;
        self.generate_sitemap(&pages)?;

        Ok(BuildResult {
            pages: pages.len(),
            islands: total_islands,
            runtimes,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Discover and parse all MDX pages in the docs directory.
    fn discover_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        if !self.config.docs_dir.exists() {
            return Err(BuildError::DocsNotFound(self.config.docs_dir.clone()));
        }

        let paths: Vec<PathBuf> = WalkDir::new(&self.config.docs_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file())
            .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("md" | "mdx")))
            .collect();

        let mut pages = paths
            .par_iter()
            .map(|path| self.load_page(path))
            .collect::<Result<Vec<_>, _>>()?;

        pages.sort_by(|a, b| {
            a.order()
                .cmp(&b.order())
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });

        Ok(pages)
    }

    fn load_page(&self, path: &Path) -> Result<PageInfo, BuildError> {
        let content = fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let doc = parse_mdx(&content).map_err(|source| BuildError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let relative_path = path
            .strip_prefix(&self.config.docs_dir)
            .unwrap_or(path)
            .to_path_buf();
        let output_path = self.calculate_output_path(&relative_path, doc.frontmatter.as_ref());

        Ok(PageInfo {
            source_path: path.to_path_buf(),
            relative_path,
            output_path,
            doc,
        })
    }

    /// Calculate output path for a page.
    fn calculate_output_path(&self, relative: &Path, frontmatter: Option<&Frontmatter>) -> PathBuf {
        if let Some(slug) = frontmatter.and_then(|f| f.slug.as_ref()) {
            return self.config.output_dir.join(slug).join("index.html");
        }

        let stem = relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let parent = relative.parent().unwrap_or(Path::new(""));

        if stem == "index" {
            // docs/index.mdx -> dist/index.html
            self.config.output_dir.join(parent).join("index.html")
        } else {
            // docs/charts.mdx -> dist/charts/index.html
            self.config
                .output_dir
                .join(parent)
                .join(stem)
                .join("index.html")
        }
    }

    /// Build navigation structure from pages.
    fn build_navigation(&self, pages: &[Arc<PageInfo>]) -> Vec<NavItem> {
        let mut dirs: BTreeMap<PathBuf, Vec<NavItem>> = BTreeMap::new();

        for page in pages {
            let fm = page.frontmatter();
            if fm.is_some_and(|f| !f.nav) {
                continue;
            }

            let title = fm.map(|f| f.title.clone()).unwrap_or_else(|| {
                page.relative_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string()
            });

            let parent = page.relative_path.parent().unwrap_or(Path::new(""));
            dirs.entry(parent.to_path_buf()).or_default().push(NavItem {
                title,
                path: self.path_to_url(&page.output_path),
                children: Vec::new(),
                active: false,
            });
        }

        let mut nav = dirs.remove(&PathBuf::new()).unwrap_or_default();

        for (dir, items) in dirs {
            let dir_name = dir
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("Section");

            nav.push(NavItem {
                title: capitalize(dir_name),
                path: format!("{}{}/", self.config.base_url, dir.display()),
                children: items,
                active: false,
            });
        }

        nav
    }

    /// Convert output path to URL.
    fn path_to_url(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.config.output_dir).unwrap_or(path);

        let url = relative
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        if url.is_empty() {
            self.config.base_url.clone()
        } else {
            format!("{}{}/", self.config.base_url, url)
        }
    }

    /// Compile every page's islands in one session, pages running concurrently.
    async fn compile_islands(
        &self,
        pages: &[Arc<PageInfo>],
    ) -> Result<(Vec<PageCompileResult>, Vec<RuntimeBundle>), BuildError> {
        let session = BuildSession::new(
            Arc::clone(&self.bundler),
            SessionConfig {
                assets_dir: self.config.output_dir.join("assets"),
                assets_url: format!("{}assets/", self.config.base_url),
                work_dir: self.config.islands.work_dir.clone(),
                policy: self.config.islands.policy,
                minify: self.config.minify,
            },
        )
        .map_err(BuildError::Session)?;
        let compiler = PageCompiler::new(Arc::new(session));

        let mut tasks = JoinSet::new();
        for (index, page) in pages.iter().enumerate() {
            let compiler = compiler.clone();
            let registry = Arc::clone(&self.registry);
            let page = Arc::clone(page);
            tasks.spawn(async move { (index, compile_page(&compiler, &registry, &page).await) });
        }

        let mut compiled: Vec<Option<PageCompileResult>> = (0..pages.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined?;
            compiled[index] = Some(result?);
        }

        let runtimes = compiler.session().runtimes().built();
        Ok((compiled.into_iter().flatten().collect(), runtimes))
    }

    /// Render a single page. Returns the number of islands on it.
    fn render_page(
        &self,
        page: &PageInfo,
        compiled: &PageCompileResult,
        nav: &[NavItem],
    ) -> Result<usize, BuildError> {
        let spans: Vec<Range<usize>> = page.doc.components.iter().map(|c| c.span.clone()).collect();
        let content = place_islands(&page.doc.content, &spans, &compiled.islands);
        let content_html = render_markdown(&content);

        let toc = page
            .doc
            .toc
            .iter()
            .map(|e| TocEntry {
                title: e.title.clone(),
                id: e.id.clone(),
                level: e.level,
            })
            .collect();

        let title = page
            .frontmatter()
            .map(|f| f.title.clone())
            .unwrap_or_else(|| "Untitled".to_string());

        let context = Context {
            title,
            site_title: self.config.title.clone(),
            content: content_html,
            nav: nav.to_vec(),
            toc,
            base_url: self.config.base_url.clone(),
            import_map: compiled.manifest_markup.clone(),
            island_scripts: compiled.islands.iter().filter_map(mount_script).collect(),
            styles: self
                .config
                .styles
                .iter()
                .map(|s| {
                    let filename = Path::new(s)
                        .file_name()
                        .and_then(|f| f.to_str())
                        .unwrap_or("style.css");
                    format!("{}assets/{}", self.config.base_url, filename)
                })
                .collect(),
        };

        let html = self.templates.render_page("doc.html", &context)?;
        write_file(&page.output_path, html)?;

        tracing::debug!(
            page = %page.relative_path.display(),
            islands = compiled.islands.len(),
            "Rendered page"
        );

        Ok(compiled.islands.len())
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css)?
        } else {
            css
        };
        write_file(&assets_dir.join("main.css"), css)?;
        write_file(&assets_dir.join("main.js"), AssetPipeline::generate_js())?;

        for style_path in &self.config.styles {
            let source_path = PathBuf::from(style_path);
            if !source_path.exists() {
                tracing::warn!("Stylesheet not found: {}", style_path);
                continue;
            }

            let filename = source_path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("style.css");
            let css = fs::read_to_string(&source_path).map_err(|source| BuildError::Read {
                path: source_path.clone(),
                source,
            })?;
            let css = if self.config.minify {
                AssetPipeline::minify_css(&css)?
            } else {
                css
            };
            write_file(&assets_dir.join(filename), css)?;
            tracing::info!("Copied stylesheet from {}", style_path);
        }

        Ok(())
    }

    /// Generate search index.
    fn generate_search_index(&self, pages: &[Arc<PageInfo>]) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = pages
            .iter()
            .map(|page| {
                let fm = page.frontmatter();
                let content = page
                    .doc
                    .content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .filter(|l| !l.starts_with('#') && !l.starts_with("```") && !l.starts_with('<'))
                    .take(10)
                    .collect::<Vec<_>>()
                    .join(" ");

                serde_json::json!({
                    "title": fm.map(|f| f.title.as_str()).unwrap_or_default(),
                    "description": fm.and_then(|f| f.description.as_deref()).unwrap_or_default(),
                    "url": self.path_to_url(&page.output_path),
                    "content": content,
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&index).unwrap_or_else(|_| "[]".to_string());
        write_file(&self.config.output_dir.join("search-index.json"), json)
    }

    /// Generate sitemap and robots.txt.
    fn generate_sitemap(&self, pages: &[Arc<PageInfo>]) -> Result<(), BuildError> {
        let urls: Vec<String> = pages
            .iter()
            .map(|page| {
                format!(
                    "  <url>\n    <loc>{}</loc>\n  </url>",
                    self.path_to_url(&page.output_path)
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );
        write_file(&self.config.output_dir.join("sitemap.xml"), sitemap)?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}sitemap.xml",
            self.config.base_url
        );
        write_file(&self.config.output_dir.join("robots.txt"), robots)
    }
}

async fn compile_page<B: ModuleBundler>(
    compiler: &PageCompiler<B>,
    registry: &ComponentRegistry,
    page: &PageInfo,
) -> Result<PageCompileResult, BuildError> {
    let doc_dir = page.source_path.parent().unwrap_or(Path::new("."));
    let imports: HashMap<String, PathBuf> = import_map(&page.doc.imports, doc_dir);
    let no_declarations = BTreeMap::new();
    let declared = page
        .frontmatter()
        .map(|f| &f.frameworks)
        .unwrap_or(&no_declarations);

    let forest = resolve_forest(&page.doc.components, &imports, declared, registry).map_err(
        |source| BuildError::Resolve {
            path: page.source_path.clone(),
            source,
        },
    )?;

    compiler
        .compile(&forest, &CompileContext::new(&page.source_path))
        .await
        .map_err(|source| BuildError::Island {
            path: page.source_path.clone(),
            source,
        })
}

/// Replace each top-level component span with the placeholders of the
/// islands rooted there. A split subtree yields several islands for one span.
fn place_islands(content: &str, spans: &[Range<usize>], islands: &[Island]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for (index, span) in spans.iter().enumerate() {
        out.push_str(&content[last..span.start]);

        let slots: String = islands
            .iter()
            .filter(|i| i.root_index == index)
            .map(|i| placeholder(&i.id))
            .collect();
        // A block-level div keeps the placeholders out of paragraph wrapping.
        out.push_str(&format!("\n\n<div class=\"island-slot\">{slots}</div>\n\n"));

        last = span.end;
    }

    out.push_str(&content[last..]);
    out
}

/// Render markdown to HTML, giving headings the same ids as the TOC.
fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut events: Vec<Event> = Parser::new_ext(content, options).collect();

    for i in 0..events.len() {
        if !matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let text: String = events[i + 1..]
            .iter()
            .take_while(|e| !matches!(e, Event::End(TagEnd::Heading(_))))
            .filter_map(|e| match e {
                Event::Text(t) | Event::Code(t) => Some(&**t),
                _ => None,
            })
            .collect();

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(slugify(&text).into());
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atoll_islands::testing::RecordingBundler;
    use atoll_islands::{analyze, ComponentReference, Framework, IslandIds};
    use tempfile::tempdir;

    fn config(root: &Path) -> BuildConfig {
        BuildConfig {
            docs_dir: root.join("docs"),
            output_dir: root.join("dist"),
            components_dir: Some(root.join("components")),
            minify: false,
            islands: IslandConfig {
                work_dir: root.join(".atoll"),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn components(root: &Path) {
        write(
            &root.join("components/Counter.tsx"),
            "import { useState } from \"react\";\nexport default function Counter(props) { return null; }\n",
        );
        write(
            &root.join("components/Toggle.vue"),
            "<template><button /></template>\n",
        );
        write(
            &root.join("components/Slider.svelte"),
            "<script>export let value = 0;</script>\n",
        );
    }

    #[tokio::test]
    async fn builds_simple_site() {
        let temp = tempdir().unwrap();
        write(
            &temp.path().join("docs/index.mdx"),
            "---\ntitle: Home\n---\n# Welcome\n",
        );

        let builder = StaticBuilder::with_bundler(config(temp.path()), RecordingBundler::new());
        let result = builder.build().await.unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.islands, 0);
        assert!(result.runtimes.is_empty());
        assert_eq!(builder.bundler().invocations(), 0);

        let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert!(html.contains(r#"<h1 id="welcome">Welcome</h1>"#));
        assert!(!html.contains("importmap"));
        assert!(temp.path().join("dist/assets/main.css").exists());
        assert!(temp.path().join("dist/robots.txt").exists());
    }

    #[tokio::test]
    async fn pages_share_one_runtime_per_framework() {
        let temp = tempdir().unwrap();
        components(temp.path());
        write(
            &temp.path().join("docs/index.mdx"),
            "---\ntitle: Counters\n---\n# Counters\n\n<Counter start={1} />\n\nBetween.\n\n<Counter start={2}>Clicks</Counter>\n",
        );
        write(
            &temp.path().join("docs/more.mdx"),
            "---\ntitle: More\n---\n<Counter />\n",
        );

        let builder = StaticBuilder::with_bundler(config(temp.path()), RecordingBundler::new());
        let result = builder.build().await.unwrap();

        assert_eq!(result.islands, 3);
        assert_eq!(result.runtimes.len(), 1);
        assert_eq!(result.runtimes[0].framework, Framework::React);
        assert_eq!(builder.bundler().runtime_invocations(), 1);
        assert!(temp.path().join("dist/assets/react-runtime.js").exists());

        let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert_eq!(html.matches("<atoll-island data-island=").count(), 2);
        assert!(html.contains("Between."));

        let map = html.find(r#"<script type="importmap">"#).unwrap();
        let module = html.find(r#"<script type="module">"#).unwrap();
        assert!(map < html.find("</head>").unwrap());
        assert!(map < module);
        assert!(html.contains(r#""react-dom/client": "/assets/react-runtime.js""#));
        assert!(html.contains(r#"createElement(Island, { "start": (2) }, "Clicks")"#));

        let islands = fs::read_dir(temp.path().join("dist/assets/islands"))
            .unwrap()
            .count();
        assert_eq!(islands, 3);
    }

    #[tokio::test]
    async fn self_contained_pages_have_no_import_map() {
        let temp = tempdir().unwrap();
        components(temp.path());
        write(
            &temp.path().join("docs/index.mdx"),
            "---\ntitle: Sliders\n---\n<Slider value={3} />\n",
        );

        let builder = StaticBuilder::with_bundler(config(temp.path()), RecordingBundler::new());
        let result = builder.build().await.unwrap();

        assert_eq!(result.islands, 1);
        assert!(result.runtimes.is_empty());
        assert_eq!(builder.bundler().runtime_invocations(), 0);

        let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert!(!html.contains("importmap"));
        assert!(html.contains("new Island({ target, props: { \"value\": (3) } });"));
    }

    #[tokio::test]
    async fn mixed_framework_page_fails_with_its_path() {
        let temp = tempdir().unwrap();
        components(temp.path());
        write(
            &temp.path().join("docs/mixed.mdx"),
            "---\ntitle: Mixed\n---\n<Counter>\n  <Toggle />\n</Counter>\n",
        );

        let builder = StaticBuilder::with_bundler(config(temp.path()), RecordingBundler::new());
        let err = builder.build().await.unwrap_err();

        match err {
            BuildError::Island { path, source } => {
                assert!(path.ends_with("mixed.mdx"));
                assert!(matches!(source, IslandError::MixedFramework { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(builder.bundler().invocations(), 0);
    }

    #[tokio::test]
    async fn split_policy_places_every_island() {
        let temp = tempdir().unwrap();
        components(temp.path());
        write(
            &temp.path().join("docs/index.mdx"),
            "---\ntitle: Split\n---\n<Counter>\n  <Toggle />\n</Counter>\n",
        );

        let mut config = config(temp.path());
        config.islands.policy = CompositionPolicy::Split;
        let builder = StaticBuilder::with_bundler(config, RecordingBundler::new());
        let result = builder.build().await.unwrap();

        assert_eq!(result.islands, 2);
        assert_eq!(result.runtimes.len(), 2);

        let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert!(html.contains(r#"<atoll-island data-island="counter-0">"#));
        assert!(html.contains(r#"<atoll-island data-island="toggle-1">"#));
    }

    #[tokio::test]
    async fn unknown_component_fails() {
        let temp = tempdir().unwrap();
        write(
            &temp.path().join("docs/index.mdx"),
            "---\ntitle: Missing\n---\n<Nowhere />\n",
        );

        let builder = StaticBuilder::with_bundler(config(temp.path()), RecordingBundler::new());
        let err = builder.build().await.unwrap_err();

        assert!(matches!(err, BuildError::Resolve { .. }));
        assert!(err.to_string().contains("Nowhere"));
    }

    #[tokio::test]
    async fn generates_search_index_and_sitemap() {
        let temp = tempdir().unwrap();
        write(
            &temp.path().join("docs/guides/charts.mdx"),
            "---\ntitle: Charts\ndescription: Plotting data\n---\n# Charts\n\nSearchable body text.\n",
        );

        let builder = StaticBuilder::with_bundler(config(temp.path()), RecordingBundler::new());
        builder.build().await.unwrap();

        let index = fs::read_to_string(temp.path().join("dist/search-index.json")).unwrap();
        assert!(index.contains("Plotting data"));
        assert!(index.contains("Searchable body text."));
        assert!(index.contains("/guides/charts/"));

        let sitemap = fs::read_to_string(temp.path().join("dist/sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>/guides/charts/</loc>"));
        assert!(temp.path().join("dist/guides/charts/index.html").exists());
    }

    #[test]
    fn placeholders_replace_component_spans() {
        let content = "before\n\n<Counter />\n\nafter";
        let start = content.find('<').unwrap();
        let span = start..start + "<Counter />".len();
        let islands = analyze(
            &[ComponentReference::new("Counter", "/src/Counter.tsx")],
            CompositionPolicy::Strict,
            &IslandIds::new(),
        )
        .unwrap();

        let placed = place_islands(content, &[span], &islands);

        assert!(!placed.contains("<Counter"));
        assert!(placed.contains(
            r#"<div class="island-slot"><atoll-island data-island="counter-0"></atoll-island></div>"#
        ));
        assert!(placed.starts_with("before"));
        assert!(placed.ends_with("after"));
    }
}
