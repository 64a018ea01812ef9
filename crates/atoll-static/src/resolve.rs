//! Turning parsed component tags into resolved references.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use atoll_islands::{
    Child, ComponentReference, ComponentRegistry, Framework, ParseFrameworkError, PropValue,
    RegistryError,
};
use atoll_mdx::{AttrValue, ComponentNode, Import, MarkupChild};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid framework declaration for <{component}>: {source}")]
    Declaration {
        component: String,
        #[source]
        source: ParseFrameworkError,
    },
}

/// Names a document can use, with their source files.
///
/// Relative import specifiers resolve against the document's directory; bare
/// package specifiers are left to the registry.
pub fn import_map(imports: &[Import], doc_dir: &Path) -> HashMap<String, PathBuf> {
    imports
        .iter()
        .filter(|i| i.specifier.starts_with('.') || i.specifier.starts_with('/'))
        .map(|i| {
            let path = doc_dir.join(&i.specifier);
            let path = path.canonicalize().unwrap_or(path);
            (i.name.clone(), path)
        })
        .collect()
}

/// Resolve a parsed component forest against imports and the registry.
///
/// `declared` holds the document's explicit framework per component name.
pub fn resolve_forest(
    nodes: &[ComponentNode],
    imports: &HashMap<String, PathBuf>,
    declared: &BTreeMap<String, String>,
    registry: &ComponentRegistry,
) -> Result<Vec<ComponentReference>, ResolveError> {
    let declared = declared
        .iter()
        .map(|(name, value)| {
            value
                .parse::<Framework>()
                .map(|f| (name.as_str(), f))
                .map_err(|source| ResolveError::Declaration {
                    component: name.clone(),
                    source,
                })
        })
        .collect::<Result<HashMap<&str, Framework>, _>>()?;

    nodes
        .iter()
        .map(|node| resolve_node(node, imports, &declared, registry))
        .collect()
}

fn resolve_node(
    node: &ComponentNode,
    imports: &HashMap<String, PathBuf>,
    declared: &HashMap<&str, Framework>,
    registry: &ComponentRegistry,
) -> Result<ComponentReference, ResolveError> {
    let source_path = registry.resolve(&node.name, imports)?;

    let props = node
        .props
        .iter()
        .map(|(key, value)| {
            let value = match value {
                AttrValue::String(s) => PropValue::String(s.clone()),
                AttrValue::Boolean(b) => PropValue::Boolean(*b),
                AttrValue::Expression(e) => PropValue::Expression(e.clone()),
            };
            (key.clone(), value)
        })
        .collect();

    let children = node
        .children
        .iter()
        .map(|child| match child {
            MarkupChild::Component(c) => {
                resolve_node(c, imports, declared, registry).map(Child::Component)
            }
            MarkupChild::Markup(m) => Ok(Child::Markup(m.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ComponentReference {
        name: node.name.clone(),
        source_path,
        declared_framework: declared.get(node.name.as_str()).copied(),
        props,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atoll_mdx::parse_mdx;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_imports_registry_and_declarations() {
        let temp = tempdir().unwrap();
        let components = temp.path().join("components");
        fs::create_dir_all(&components).unwrap();
        fs::write(components.join("Toggle.vue"), "<template />").unwrap();
        fs::write(temp.path().join("Chart.js"), "export default {}").unwrap();

        let mut registry = ComponentRegistry::new();
        registry.scan(&components).unwrap();

        let doc = parse_mdx(
            "---\ntitle: T\nframeworks:\n  Chart: react\n---\nimport Chart from \"./Chart.js\";\n\n<Chart kind=\"bar\" stacked>\n  <Toggle />\n  legend\n</Chart>\n",
        )
        .unwrap();
        let imports = import_map(&doc.imports, temp.path());
        let declared = doc.frontmatter.unwrap().frameworks;

        let forest = resolve_forest(&doc.components, &imports, &declared, &registry).unwrap();

        assert_eq!(forest.len(), 1);
        let chart = &forest[0];
        assert!(chart.source_path.ends_with("Chart.js"));
        assert_eq!(chart.declared_framework, Some(Framework::React));
        assert_eq!(
            chart.props,
            vec![
                ("kind".to_string(), PropValue::String("bar".into())),
                ("stacked".to_string(), PropValue::Boolean(true)),
            ]
        );

        let toggle = chart.component_children().next().unwrap();
        assert!(toggle.source_path.ends_with("Toggle.vue"));
        assert_eq!(toggle.declared_framework, None);
        assert_eq!(chart.children[1], Child::Markup("legend".into()));
    }

    #[test]
    fn unknown_component_fails() {
        let doc = parse_mdx("<Missing />").unwrap();

        let err = resolve_forest(
            &doc.components,
            &HashMap::new(),
            &BTreeMap::new(),
            &ComponentRegistry::new(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Registry(RegistryError::ComponentNotFound(name)) if name == "Missing"
        ));
    }

    #[test]
    fn invalid_declaration_fails() {
        let mut declared = BTreeMap::new();
        declared.insert("Chart".to_string(), "angular".to_string());

        let err = resolve_forest(&[], &HashMap::new(), &declared, &ComponentRegistry::new())
            .unwrap_err();

        assert!(matches!(err, ResolveError::Declaration { component, .. } if component == "Chart"));
    }

    #[test]
    fn bare_imports_are_left_to_the_registry() {
        let imports = import_map(
            &[Import {
                name: "Button".into(),
                specifier: "@acme/ui".into(),
                line: 1,
            }],
            Path::new("/docs"),
        );

        assert!(imports.is_empty());
    }
}
