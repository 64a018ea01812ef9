//! Composition analysis.
//!
//! Partitions a document's component forest into islands. Each top-level
//! reference becomes its own island; a reference whose subtree names two or
//! more distinct components is compiled as a single composite island.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use crate::error::{FrameworkConflict, IslandError};
use crate::framework::{classify_reference, Framework};
use crate::reference::{Child, ComponentReference};
use crate::wrapper::WrapperModule;

/// What to do with a composite subtree that spans several frameworks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionPolicy {
    /// Fail the page with a mixed-framework error.
    #[default]
    #[serde(alias = "error")]
    Strict,
    /// Cut foreign-framework subtrees out into independent islands.
    Split,
}

/// Occurrence-scoped island id source, shared by every page of a build session.
#[derive(Debug, Default)]
pub struct IslandIds {
    next: AtomicU64,
}

impl IslandIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id for an island rooted at `component`.
    pub fn next(&self, component: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", to_kebab_case(component), n)
    }
}

/// The unit of bundling.
#[derive(Debug, Clone)]
pub struct Island {
    /// Unique per occurrence, not per component kind
    pub id: String,

    pub framework: Framework,

    /// Distinct component names in the subtree, in first-seen order
    pub includes: Vec<String>,

    pub is_composition: bool,

    /// Reference subtree this island renders
    pub root: ComponentReference,

    /// Index of the top-level reference in the document forest
    pub root_index: usize,

    /// Synthesized module (composite islands only)
    pub wrapper: Option<WrapperModule>,

    /// File handed to the bundler
    pub entry_path: PathBuf,

    /// Bundled output on disk, once built
    pub bundle_path: Option<PathBuf>,

    /// Public URL of the bundle, once built
    pub bundle_url: Option<String>,

    pub size_bytes: usize,
}

impl Island {
    fn new(root: ComponentReference, framework: Framework, root_index: usize, id: String) -> Self {
        let mut seen = HashSet::new();
        let includes: Vec<String> = root
            .walk()
            .into_iter()
            .filter(|r| seen.insert(r.name.as_str()))
            .map(|r| r.name.clone())
            .collect();

        Self {
            id,
            framework,
            is_composition: includes.len() >= 2,
            includes,
            entry_path: root.source_path.clone(),
            root,
            root_index,
            wrapper: None,
            bundle_path: None,
            bundle_url: None,
            size_bytes: 0,
        }
    }

    /// Source path of an included component.
    pub fn source_of(&self, name: &str) -> Option<&PathBuf> {
        self.root
            .walk()
            .into_iter()
            .find(|r| r.name == name)
            .map(|r| &r.source_path)
    }
}

/// Partition a document forest into islands.
pub fn analyze(
    forest: &[ComponentReference],
    policy: CompositionPolicy,
    ids: &IslandIds,
) -> Result<Vec<Island>, IslandError> {
    let mut islands = Vec::with_capacity(forest.len());

    for (root_index, reference) in forest.iter().enumerate() {
        analyze_root(reference, root_index, policy, ids, &mut islands)?;
    }

    Ok(islands)
}

fn analyze_root(
    reference: &ComponentReference,
    root_index: usize,
    policy: CompositionPolicy,
    ids: &IslandIds,
    out: &mut Vec<Island>,
) -> Result<(), IslandError> {
    let classified = reference
        .walk()
        .into_iter()
        .map(|r| classify_reference(r).map(|f| (r, f)))
        .collect::<Result<Vec<_>, _>>()?;

    let root_framework = classified[0].1;
    let mixed = classified.iter().any(|(_, f)| *f != root_framework);

    if !mixed {
        let id = ids.next(&reference.name);
        out.push(Island::new(reference.clone(), root_framework, root_index, id));
        return Ok(());
    }

    match policy {
        CompositionPolicy::Strict => {
            let mut seen = HashSet::new();
            let conflicts = classified
                .iter()
                .filter(|(r, f)| seen.insert((r.name.as_str(), *f)))
                .map(|(r, f)| FrameworkConflict {
                    component: r.name.clone(),
                    path: r.source_path.clone(),
                    framework: *f,
                })
                .collect();

            Err(IslandError::MixedFramework {
                root: reference.name.clone(),
                root_path: reference.source_path.clone(),
                conflicts,
            })
        }
        CompositionPolicy::Split => {
            let mut foreign = Vec::new();
            let host = prune(reference, root_framework, &mut foreign)?;

            tracing::debug!(
                component = %reference.name,
                split = foreign.len(),
                "Splitting mixed-framework subtree at framework boundaries"
            );

            let id = ids.next(&host.name);
            out.push(Island::new(host, root_framework, root_index, id));

            for subtree in foreign {
                analyze_root(subtree, root_index, policy, ids, out)?;
            }
            Ok(())
        }
    }
}

/// Copy `reference`, dropping every descendant that belongs to another framework.
fn prune<'a>(
    reference: &'a ComponentReference,
    framework: Framework,
    foreign: &mut Vec<&'a ComponentReference>,
) -> Result<ComponentReference, IslandError> {
    let mut children = Vec::with_capacity(reference.children.len());

    for child in &reference.children {
        match child {
            Child::Component(c) => {
                if classify_reference(c)? == framework {
                    children.push(Child::Component(prune(c, framework, foreign)?));
                } else {
                    foreign.push(c);
                }
            }
            Child::Markup(m) => children.push(Child::Markup(m.clone())),
        }
    }

    Ok(ComponentReference {
        children,
        ..reference.clone()
    })
}

/// Convert PascalCase to kebab-case.
pub(crate) fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('-');
        }
    }
    out
}
