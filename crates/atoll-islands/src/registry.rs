//! Component registry for resolving component names to source files.
//!
//! Names are resolved first against the document's own imports, then against
//! a scanned components directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::framework::{classify, Framework};

/// A registry of component source files.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    /// Components by normalized name
    components: HashMap<String, RegisteredComponent>,
}

/// A component discovered in the components directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredComponent {
    /// Name derived from the file name
    pub name: String,

    /// Source file path
    pub source_path: PathBuf,

    /// Framework implied by the file's naming convention
    pub framework: Framework,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a directory for component files and populate the registry.
    pub fn scan(&mut self, components_dir: &Path) -> Result<usize, RegistryError> {
        if !components_dir.exists() {
            return Err(RegistryError::DirectoryNotFound(
                components_dir.display().to_string(),
            ));
        }

        let mut count = 0;

        for entry in WalkDir::new(components_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // Skip test files, stories, and index files
            let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if filename.contains(".test.")
                || filename.contains(".spec.")
                || filename.contains(".stories.")
                || filename.starts_with("index.")
            {
                continue;
            }

            let framework = match classify(path) {
                Ok(f) => f,
                Err(_) => {
                    tracing::trace!("Skipping non-component file {}", path.display());
                    continue;
                }
            };

            let name = component_name(path);
            let source_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

            if let Some(existing) = self.components.get(&normalize(&name)) {
                tracing::warn!(
                    "Component '{}' defined twice: {} and {}; keeping the first",
                    name,
                    existing.source_path.display(),
                    source_path.display()
                );
                continue;
            }

            self.components.insert(
                normalize(&name),
                RegisteredComponent {
                    name,
                    source_path,
                    framework,
                },
            );
            count += 1;
        }

        Ok(count)
    }

    /// Look up a component by name (case- and dash-insensitive).
    pub fn get(&self, name: &str) -> Option<&RegisteredComponent> {
        self.components.get(&normalize(name))
    }

    /// Check if a component exists.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(&normalize(name))
    }

    /// Get all registered component names.
    pub fn names(&self) -> Vec<&str> {
        self.components.values().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Resolve a tag name, preferring the document's own imports.
    pub fn resolve(
        &self,
        name: &str,
        document_imports: &HashMap<String, PathBuf>,
    ) -> Result<PathBuf, RegistryError> {
        if let Some(path) = document_imports.get(name) {
            return Ok(path.clone());
        }

        self.get(name)
            .map(|c| c.source_path.clone())
            .ok_or_else(|| RegistryError::ComponentNotFound(name.to_string()))
    }
}

/// File name up to the first dot: "rating.element.ts" -> "rating".
fn component_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or("unknown")
        .to_string()
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Errors that can occur with the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Components directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Component <{0}> is neither imported by the document nor found in the components directory")]
    ComponentNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scans_components_directory() {
        let temp = tempdir().unwrap();
        let comp_dir = temp.path().join("components");
        fs::create_dir_all(comp_dir.join("forms")).unwrap();

        fs::write(comp_dir.join("Card.tsx"), "export default function Card() {}").unwrap();
        fs::write(comp_dir.join("forms/Toggle.vue"), "<template />").unwrap();
        fs::write(comp_dir.join("rating-group.element.js"), "export default class {}").unwrap();
        fs::write(comp_dir.join("helpers.js"), "export const x = 1;").unwrap();

        let mut registry = ComponentRegistry::new();
        let count = registry.scan(&comp_dir).unwrap();

        assert_eq!(count, 3);
        assert!(registry.contains("Card"));
        assert_eq!(registry.get("toggle").unwrap().framework, Framework::Vue);
        assert_eq!(
            registry.get("RatingGroup").unwrap().framework,
            Framework::Element
        );
        assert!(!registry.contains("helpers"));
    }

    #[test]
    fn skips_test_and_story_files() {
        let temp = tempdir().unwrap();
        let comp_dir = temp.path().join("components");
        fs::create_dir_all(&comp_dir).unwrap();

        fs::write(comp_dir.join("button.test.tsx"), "test").unwrap();
        fs::write(comp_dir.join("button.stories.tsx"), "story").unwrap();
        fs::write(comp_dir.join("index.tsx"), "export * from './x';").unwrap();

        let mut registry = ComponentRegistry::new();
        let count = registry.scan(&comp_dir).unwrap();

        assert_eq!(count, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let mut registry = ComponentRegistry::new();
        let err = registry.scan(Path::new("/nonexistent/components")).unwrap_err();

        assert!(matches!(err, RegistryError::DirectoryNotFound(_)));
    }

    #[test]
    fn document_imports_take_precedence() {
        let temp = tempdir().unwrap();
        let comp_dir = temp.path().join("components");
        fs::create_dir_all(&comp_dir).unwrap();
        fs::write(comp_dir.join("Card.tsx"), "").unwrap();

        let mut registry = ComponentRegistry::new();
        registry.scan(&comp_dir).unwrap();

        let mut imports = HashMap::new();
        imports.insert("Card".to_string(), PathBuf::from("/docs/local/Card.vue"));

        assert_eq!(
            registry.resolve("Card", &imports).unwrap(),
            PathBuf::from("/docs/local/Card.vue")
        );
        assert!(registry
            .resolve("Card", &HashMap::new())
            .unwrap()
            .ends_with("Card.tsx"));
        assert!(matches!(
            registry.resolve("Missing", &imports),
            Err(RegistryError::ComponentNotFound(name)) if name == "Missing"
        ));
    }
}
