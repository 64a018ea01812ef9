//! Framework classification.
//!
//! Every supported UI framework is a variant of [`Framework`]; its bundling
//! policy lives in one static table of [`FrameworkSpec`] rows so adding a
//! framework means adding a row, not touching call sites.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::IslandError;
use crate::reference::ComponentReference;

/// A UI framework that owns a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Vue,
    Svelte,
    Element,
}

/// How composite islands of a framework are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperDialect {
    /// A JSX function component (React, Vue).
    Jsx,
    /// A Svelte component with a `<script>` block.
    Svelte,
    /// A vanilla custom element class.
    Element,
}

/// One group of exports re-exported by a shared runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeExport {
    /// `export * from "<module>"`, for ES module packages.
    All(&'static str),

    /// Selected names, for CommonJS packages whose exports the bundler
    /// cannot enumerate.
    Named {
        module: &'static str,
        names: &'static [&'static str],
    },

    /// The module's default export.
    Default(&'static str),
}

impl RuntimeExport {
    /// Whether an island importing `name` links against this group.
    pub fn provides(&self, name: &str) -> bool {
        match *self {
            RuntimeExport::All(_) => name != "default",
            RuntimeExport::Named { names, .. } => names.contains(&name),
            RuntimeExport::Default(_) => name == "default",
        }
    }

    /// The re-export statement for the runtime entry.
    pub fn statement(&self) -> String {
        match *self {
            RuntimeExport::All(module) => format!("export * from \"{module}\";"),
            RuntimeExport::Named { module, names } => {
                format!("export {{ {} }} from \"{module}\";", names.join(", "))
            }
            RuntimeExport::Default(module) => format!("export {{ default }} from \"{module}\";"),
        }
    }
}

/// Fixed policy for one framework.
#[derive(Debug)]
pub struct FrameworkSpec {
    pub framework: Framework,

    /// Identifier used in file names and declarations
    pub name: &'static str,

    /// Source file suffixes owned by this framework
    pub suffixes: &'static [&'static str],

    /// Whether the runtime is shared through an import map instead of inlined
    pub externalize: bool,

    /// Bare specifiers that resolve to the shared runtime
    pub specifiers: &'static [&'static str],

    /// Public surface exposed by the shared runtime
    pub runtime_exports: &'static [RuntimeExport],

    /// JSX import source handed to the bundler
    pub jsx_import_source: Option<&'static str>,

    pub dialect: WrapperDialect,

    /// Extension of synthesized wrapper modules
    pub wrapper_extension: &'static str,
}

static FRAMEWORKS: [FrameworkSpec; 4] = [
    FrameworkSpec {
        framework: Framework::React,
        name: "react",
        suffixes: &[".jsx", ".tsx"],
        externalize: true,
        specifiers: &["react", "react-dom", "react-dom/client", "react/jsx-runtime"],
        runtime_exports: &[
            RuntimeExport::Default("react"),
            RuntimeExport::Named {
                module: "react",
                names: &[
                    "Children",
                    "Component",
                    "Fragment",
                    "Profiler",
                    "PureComponent",
                    "StrictMode",
                    "Suspense",
                    "cloneElement",
                    "createContext",
                    "createElement",
                    "createRef",
                    "forwardRef",
                    "isValidElement",
                    "lazy",
                    "memo",
                    "startTransition",
                    "useCallback",
                    "useContext",
                    "useDebugValue",
                    "useDeferredValue",
                    "useEffect",
                    "useId",
                    "useImperativeHandle",
                    "useInsertionEffect",
                    "useLayoutEffect",
                    "useMemo",
                    "useReducer",
                    "useRef",
                    "useState",
                    "useSyncExternalStore",
                    "useTransition",
                    "version",
                ],
            },
            RuntimeExport::Named {
                module: "react-dom",
                names: &["createPortal", "flushSync"],
            },
            RuntimeExport::Named {
                module: "react-dom/client",
                names: &["createRoot", "hydrateRoot"],
            },
            RuntimeExport::Named {
                module: "react/jsx-runtime",
                names: &["jsx", "jsxs"],
            },
        ],
        jsx_import_source: Some("react"),
        dialect: WrapperDialect::Jsx,
        wrapper_extension: "jsx",
    },
    FrameworkSpec {
        framework: Framework::Vue,
        name: "vue",
        suffixes: &[".vue"],
        externalize: true,
        specifiers: &["vue", "vue/jsx-runtime"],
        runtime_exports: &[
            RuntimeExport::All("vue"),
            RuntimeExport::Named {
                module: "vue/jsx-runtime",
                names: &["jsx", "jsxs"],
            },
        ],
        jsx_import_source: Some("vue"),
        dialect: WrapperDialect::Jsx,
        wrapper_extension: "jsx",
    },
    FrameworkSpec {
        framework: Framework::Svelte,
        name: "svelte",
        suffixes: &[".svelte"],
        externalize: false,
        specifiers: &["svelte", "svelte/internal"],
        runtime_exports: &[],
        jsx_import_source: None,
        dialect: WrapperDialect::Svelte,
        wrapper_extension: "svelte",
    },
    FrameworkSpec {
        framework: Framework::Element,
        name: "element",
        suffixes: &[".element.js", ".element.ts"],
        externalize: false,
        specifiers: &[],
        runtime_exports: &[],
        jsx_import_source: None,
        dialect: WrapperDialect::Element,
        wrapper_extension: "js",
    },
];

impl Framework {
    /// All supported frameworks, in table order.
    pub const ALL: [Framework; 4] = [
        Framework::React,
        Framework::Vue,
        Framework::Svelte,
        Framework::Element,
    ];

    /// Policy row for this framework.
    pub fn spec(self) -> &'static FrameworkSpec {
        let index = match self {
            Framework::React => 0,
            Framework::Vue => 1,
            Framework::Svelte => 2,
            Framework::Element => 3,
        };
        &FRAMEWORKS[index]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn externalize(self) -> bool {
        self.spec().externalize
    }

    pub fn specifiers(self) -> &'static [&'static str] {
        self.spec().specifiers
    }

    /// Whether the shared runtime exposes `name` to islands importing it.
    pub fn runtime_provides(self, name: &str) -> bool {
        self.spec().runtime_exports.iter().any(|e| e.provides(name))
    }

    /// Specifiers to mark external when bundling an island of this framework.
    pub fn externals(self) -> Vec<String> {
        if self.externalize() {
            self.specifiers().iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a framework declaration names nothing we support.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown framework '{0}' (expected one of: react, vue, svelte, element)")]
pub struct ParseFrameworkError(pub String);

impl FromStr for Framework {
    type Err = ParseFrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Framework::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| ParseFrameworkError(s.to_string()))
    }
}

/// Match a path against the naming conventions, preferring the longest suffix.
fn match_convention(path: &Path) -> Option<Framework> {
    let file_name = path.file_name()?.to_str()?.to_ascii_lowercase();

    FRAMEWORKS
        .iter()
        .flat_map(|spec| spec.suffixes.iter().map(move |suffix| (spec.framework, *suffix)))
        .filter(|(_, suffix)| file_name.ends_with(suffix))
        .max_by_key(|(_, suffix)| suffix.len())
        .map(|(framework, _)| framework)
}

/// Classify a component source path by its naming convention.
pub fn classify(path: &Path) -> Result<Framework, IslandError> {
    match_convention(path).ok_or_else(|| IslandError::UnknownFramework {
        component: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string(),
        path: path.to_path_buf(),
    })
}

/// Classify a component reference; an explicit declaration wins over the path.
pub fn classify_reference(reference: &ComponentReference) -> Result<Framework, IslandError> {
    if let Some(framework) = reference.declared_framework {
        return Ok(framework);
    }

    match_convention(&reference.source_path).ok_or_else(|| IslandError::UnknownFramework {
        component: reference.name.clone(),
        path: reference.source_path.clone(),
    })
}

/// Whether any framework claims this path.
pub fn is_component_source(path: &Path) -> bool {
    match_convention(path).is_some()
}
