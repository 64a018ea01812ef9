//! Wrapper module synthesis for composite islands.
//!
//! A composite island is compiled from a generated module that imports every
//! component in the subtree and renders the original markup. The module
//! imports nothing else, so the bundler deduplicates shared framework imports
//! into a single copy.

use std::path::{Path, PathBuf};

use crate::analyzer::{to_kebab_case, Island};
use crate::error::IslandError;
use crate::framework::WrapperDialect;
use crate::reference::{js_string, Child, ComponentReference, PropValue};

/// A synthesized entry module.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperModule {
    /// Where the module is written
    pub path: PathBuf,
    /// Module source text
    pub source: String,
}

/// Generate the wrapper module for an island. Pure: nothing touches disk.
pub fn synthesize(island: &Island, dir: &Path) -> WrapperModule {
    let spec = island.framework.spec();
    let path = dir.join(format!("{}.{}", island.id, spec.wrapper_extension));
    let imports = import_lines(island);
    let class_name = format!("{}Island", to_pascal_case(&island.id));

    let source = match spec.dialect {
        WrapperDialect::Jsx => {
            let markup = render_markup(&island.root, spec.dialect);
            format!(
                r#"// Composite island {id}
{imports}

export default function {class_name}() {{
  return (
    {markup}
  );
}}
"#,
                id = island.id,
            )
        }
        WrapperDialect::Svelte => {
            let markup = render_markup(&island.root, spec.dialect);
            let imports = indent(&imports, "  ");
            format!(
                r#"<!-- Composite island {id} -->
<script>
{imports}
</script>

{markup}
"#,
                id = island.id,
            )
        }
        WrapperDialect::Element => {
            let mut body = String::new();
            let mut counter = 0;
            let root_var = render_dom(&island.root, &mut body, &mut counter);
            let body = indent(&body, "    ");
            format!(
                r#"// Composite island {id}
{imports}

function tagFor(ctor, fallback) {{
  const existing = customElements.getName ? customElements.getName(ctor) : null;
  if (existing) return existing;
  if (!customElements.get(fallback)) customElements.define(fallback, ctor);
  return fallback;
}}

export default class {class_name} extends HTMLElement {{
  #rendered = false;

  connectedCallback() {{
    if (this.#rendered) return;
    this.#rendered = true;

{body}
    this.replaceChildren({root_var});
  }}
}}
"#,
                id = island.id,
            )
        }
    };

    WrapperModule { path, source }
}

/// Write a synthesized module to its path.
pub async fn write_wrapper(module: &WrapperModule) -> Result<(), IslandError> {
    if let Some(parent) = module.path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| IslandError::io(parent, e))?;
    }

    tokio::fs::write(&module.path, &module.source)
        .await
        .map_err(|e| IslandError::io(&module.path, e))
}

fn import_lines(island: &Island) -> String {
    island
        .includes
        .iter()
        .filter_map(|name| {
            island
                .source_of(name)
                .map(|path| format!("import {} from {};", name, js_string(&module_specifier(path))))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Path as an import specifier, always with forward slashes.
fn module_specifier(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Serialize a reference subtree back to tag markup (JSX and Svelte agree on this subset).
///
/// Svelte interpolates braces inside quoted attributes, so there a string
/// holding one is written as a `{"..."}` expression.
fn render_markup(reference: &ComponentReference, dialect: WrapperDialect) -> String {
    let mut out = format!("<{}", reference.name);

    for (key, value) in &reference.props {
        let quotable = |s: &str| {
            !s.contains('"') && !(dialect == WrapperDialect::Svelte && s.contains(['{', '}']))
        };
        match value {
            PropValue::String(s) if quotable(s) => out.push_str(&format!(r#" {key}="{s}""#)),
            PropValue::String(s) => out.push_str(&format!(" {key}={{{}}}", js_string(s))),
            PropValue::Boolean(true) => out.push_str(&format!(" {key}")),
            PropValue::Boolean(false) => out.push_str(&format!(" {key}={{false}}")),
            PropValue::Expression(expr) => out.push_str(&format!(" {key}={{{expr}}}")),
        }
    }

    if reference.children.is_empty() {
        out.push_str(" />");
        return out;
    }

    out.push('>');
    for child in &reference.children {
        match child {
            Child::Component(c) => out.push_str(&render_markup(c, dialect)),
            Child::Markup(m) => out.push_str(m),
        }
    }
    out.push_str(&format!("</{}>", reference.name));
    out
}

/// Emit DOM-building statements for a subtree; returns the root variable name.
fn render_dom(reference: &ComponentReference, out: &mut String, counter: &mut usize) -> String {
    let var = format!("n{counter}");
    *counter += 1;

    let fallback = format!("atoll-{}", to_kebab_case(&reference.name));
    out.push_str(&format!(
        "const {var} = document.createElement(tagFor({}, {}));\n",
        reference.name,
        js_string(&fallback)
    ));

    for (key, value) in &reference.props {
        match value {
            PropValue::String(s) => out.push_str(&format!(
                "{var}.setAttribute({}, {});\n",
                js_string(key),
                js_string(s)
            )),
            PropValue::Boolean(true) => {
                out.push_str(&format!("{var}.setAttribute({}, \"\");\n", js_string(key)))
            }
            PropValue::Boolean(false) => {}
            PropValue::Expression(_) => {
                out.push_str(&format!("{var}[{}] = {};\n", js_string(key), value.to_js()))
            }
        }
    }

    for child in &reference.children {
        match child {
            Child::Component(c) => {
                let child_var = render_dom(c, out, counter);
                out.push_str(&format!("{var}.append({child_var});\n"));
            }
            Child::Markup(m) if m.trim().is_empty() => {}
            Child::Markup(m) => out.push_str(&format!(
                "{var}.insertAdjacentHTML(\"beforeend\", {});\n",
                js_string(m)
            )),
        }
    }

    var
}

/// Convert kebab-case to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze, CompositionPolicy, IslandIds};
    use pretty_assertions::assert_eq;

    fn composite(root: ComponentReference) -> Island {
        analyze(&[root], CompositionPolicy::Strict, &IslandIds::new())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn to_pascal_case_works() {
        assert_eq!(to_pascal_case("card-0"), "Card0");
        assert_eq!(to_pascal_case("my-card-12"), "MyCard12");
    }

    #[test]
    fn jsx_wrapper_imports_only_includes() {
        let island = composite(
            ComponentReference::new("Card", "/src/Card.tsx")
                .with_prop("title", PropValue::String("Hello".to_string()))
                .with_child(
                    ComponentReference::new("Button", "/src/Button.tsx")
                        .with_prop("disabled", PropValue::Boolean(true))
                        .with_prop("count", PropValue::Expression("2".to_string()))
                        .with_markup("Go"),
                ),
        );

        let module = synthesize(&island, Path::new("/tmp/session"));

        assert_eq!(module.path, PathBuf::from("/tmp/session/card-0.jsx"));
        assert_eq!(
            module.source,
            r#"// Composite island card-0
import Card from "/src/Card.tsx";
import Button from "/src/Button.tsx";

export default function Card0Island() {
  return (
    <Card title="Hello"><Button disabled count={2}>Go</Button></Card>
  );
}
"#
        );
        assert_eq!(module.source.matches("import ").count(), 2);
    }

    #[test]
    fn jsx_wrapper_keeps_markup_verbatim() {
        let island = composite(
            ComponentReference::new("Tabs", "/src/Tabs.tsx")
                .with_markup("\n  <h3>Title</h3>\n  ")
                .with_child(ComponentReference::new("Tab", "/src/Tab.tsx"))
                .with_markup("\n"),
        );

        let module = synthesize(&island, Path::new("/tmp"));

        assert!(module
            .source
            .contains("<Tabs>\n  <h3>Title</h3>\n  <Tab />\n</Tabs>"));
    }

    #[test]
    fn quotes_string_props_with_quotes() {
        let island = composite(
            ComponentReference::new("Card", "/src/Card.tsx")
                .with_prop("title", PropValue::String(r#"Say "hi""#.to_string()))
                .with_child(ComponentReference::new("Button", "/src/Button.tsx")),
        );

        let module = synthesize(&island, Path::new("/tmp"));

        assert!(module.source.contains(r#"<Card title={"Say \"hi\""}>"#));
    }

    #[test]
    fn svelte_wrapper_uses_script_block() {
        let island = composite(
            ComponentReference::new("Panel", "/src/Panel.svelte")
                .with_child(ComponentReference::new("Counter", "/src/Counter.svelte")),
        );

        let module = synthesize(&island, Path::new("/tmp"));

        assert_eq!(module.path, PathBuf::from("/tmp/panel-0.svelte"));
        assert!(module.source.contains("<script>\n  import Panel from \"/src/Panel.svelte\";"));
        assert!(module.source.contains("<Panel><Counter /></Panel>"));
        assert!(!module.source.contains("from \"svelte\""));
    }

    #[test]
    fn svelte_wrapper_keeps_braces_literal() {
        let island = composite(
            ComponentReference::new("Panel", "/src/Panel.svelte")
                .with_prop("title", PropValue::String("Use {x} here".to_string()))
                .with_child(
                    ComponentReference::new("Counter", "/src/Counter.svelte")
                        .with_prop("label", PropValue::String("plain".to_string())),
                ),
        );

        let module = synthesize(&island, Path::new("/tmp"));

        assert!(module
            .source
            .contains(r#"<Panel title={"Use {x} here"}><Counter label="plain" /></Panel>"#));
    }

    #[test]
    fn jsx_wrapper_quotes_braces_directly() {
        let island = composite(
            ComponentReference::new("Card", "/src/Card.tsx")
                .with_prop("title", PropValue::String("Use {x} here".to_string()))
                .with_child(ComponentReference::new("Button", "/src/Button.tsx")),
        );

        let module = synthesize(&island, Path::new("/tmp"));

        assert!(module.source.contains(r#"<Card title="Use {x} here">"#));
    }

    #[test]
    fn element_wrapper_builds_dom() {
        let island = composite(
            ComponentReference::new("RatingGroup", "/src/rating-group.element.js")
                .with_prop("label", PropValue::String("Stars".to_string()))
                .with_child(
                    ComponentReference::new("Star", "/src/star.element.js")
                        .with_prop("value", PropValue::Expression("5".to_string())),
                )
                .with_markup("<em>rate</em>"),
        );

        let module = synthesize(&island, Path::new("/tmp"));

        assert_eq!(module.path, PathBuf::from("/tmp/rating-group-0.js"));
        assert!(module
            .source
            .contains("export default class RatingGroup0Island extends HTMLElement"));
        assert!(module.source.contains(
            r#"const n0 = document.createElement(tagFor(RatingGroup, "atoll-rating-group"));"#
        ));
        assert!(module.source.contains(r#"n0.setAttribute("label", "Stars");"#));
        assert!(module.source.contains(r#"n1["value"] = (5);"#));
        assert!(module.source.contains("n0.append(n1);"));
        assert!(module
            .source
            .contains(r#"n0.insertAdjacentHTML("beforeend", "<em>rate</em>");"#));
        assert!(module.source.contains("this.replaceChildren(n0);"));
    }

    #[tokio::test]
    async fn writes_wrapper_to_disk() {
        let temp = tempfile::tempdir().unwrap();
        let module = WrapperModule {
            path: temp.path().join("nested").join("card-1.jsx"),
            source: "export default 1;".to_string(),
        };

        write_wrapper(&module).await.unwrap();

        let written = std::fs::read_to_string(&module.path).unwrap();
        assert_eq!(written, "export default 1;");
    }
}
