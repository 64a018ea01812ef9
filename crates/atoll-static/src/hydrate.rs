//! Client-side mounting of compiled islands.
//!
//! Each island gets a placeholder element in the page body and one module
//! script that imports the island bundle and mounts it into that placeholder
//! with the framework's own API.

use atoll_islands::{Child, ComponentReference, Framework, Island};

/// Tag name of island placeholders.
pub const PLACEHOLDER_TAG: &str = "atoll-island";

/// Placeholder markup for one island.
pub fn placeholder(island_id: &str) -> String {
    format!(r#"<{PLACEHOLDER_TAG} data-island="{island_id}"></{PLACEHOLDER_TAG}>"#)
}

/// Tag that carries inline HTML children into a framework tree; styled
/// `display: contents` so it leaves no box of its own.
pub const CHILDREN_TAG: &str = "atoll-children";

/// Module script body that mounts `island`.
///
/// Simple islands receive their props, and their children are rebuilt with
/// the framework's own element factory: text as text, inline HTML inside a
/// [`CHILDREN_TAG`] element, nested same-name components as further
/// instances. Composite islands render their whole subtree themselves and
/// mount without props. Returns `None` for islands that were never bundled.
pub fn mount_script(island: &Island) -> Option<String> {
    let bundle_url = island.bundle_url.as_deref()?;
    let bundle = json(bundle_url);
    let selector = json(&format!(
        r#"{PLACEHOLDER_TAG}[data-island="{}"]"#,
        island.id
    ));

    let mount = match island.framework {
        Framework::React => {
            let node = if island.is_composition {
                "createElement(Island)".to_string()
            } else {
                react_node(&island.root)
            };
            format!(
                r#"import {{ createElement }} from "react";
import {{ createRoot }} from "react-dom/client";
import Island from {bundle};

const target = document.querySelector({selector});
createRoot(target).render({node});"#
            )
        }
        Framework::Vue => {
            let node = if island.is_composition {
                "h(Island)".to_string()
            } else {
                vue_node(&island.root)
            };
            format!(
                r#"import {{ createApp, h }} from "vue";
import Island from {bundle};

const target = document.querySelector({selector});
createApp({{ render: () => {node} }}).mount(target);"#
            )
        }
        Framework::Svelte => {
            let props = if island.is_composition {
                "{}".to_string()
            } else {
                if island.root.has_structured_children() {
                    tracing::warn!(
                        island = %island.id,
                        "Svelte islands take props only; nested content of <{}> is not mounted",
                        island.root.name
                    );
                }
                island.root.props_object()
            };
            format!(
                r#"import Island from {bundle};

const target = document.querySelector({selector});
new Island({{ target, props: {props} }});"#
            )
        }
        Framework::Element => {
            let fallback = json(&format!("atoll-{}", island.id));
            let mut body = String::new();
            let root = if island.is_composition {
                body.push_str("const n0 = document.createElement(tag);\n");
                "n0".to_string()
            } else {
                element_node(&island.root, &mut body, &mut 0)
            };
            format!(
                r#"import Island from {bundle};

const target = document.querySelector({selector});
const tag = (customElements.getName && customElements.getName(Island)) || {fallback};
if (!customElements.get(tag)) customElements.define(tag, Island);
{body}target.replaceChildren({root});"#
            )
        }
    };

    Some(mount)
}

/// A child as it enters a framework tree.
enum Content<'a> {
    Text(&'a str),
    Html(&'a str),
    Component(&'a ComponentReference),
}

fn contents(reference: &ComponentReference) -> Vec<Content<'_>> {
    reference
        .children
        .iter()
        .filter_map(|child| match child {
            Child::Component(c) => Some(Content::Component(c)),
            Child::Markup(m) if m.trim().is_empty() => None,
            Child::Markup(m) if m.contains('<') => Some(Content::Html(m.trim())),
            Child::Markup(m) => Some(Content::Text(m.trim())),
        })
        .collect()
}

/// `createElement(Island, props, ...children)`. Component children of a
/// simple island share its name, so they are the island itself.
fn react_node(reference: &ComponentReference) -> String {
    let mut args = vec!["Island".to_string(), reference.own_props_object()];

    for content in contents(reference) {
        args.push(match content {
            Content::Text(text) => json(text),
            Content::Html(html) => format!(
                "createElement({}, {{ dangerouslySetInnerHTML: {{ __html: {} }} }})",
                json(CHILDREN_TAG),
                json(html)
            ),
            Content::Component(c) => react_node(c),
        });
    }

    format!("createElement({})", args.join(", "))
}

/// `h(Island, props, { default: () => [...] })`.
fn vue_node(reference: &ComponentReference) -> String {
    let props = reference.own_props_object();
    let children: Vec<String> = contents(reference)
        .into_iter()
        .map(|content| match content {
            Content::Text(text) => json(text),
            Content::Html(html) => {
                format!("h({}, {{ innerHTML: {} }})", json(CHILDREN_TAG), json(html))
            }
            Content::Component(c) => vue_node(c),
        })
        .collect();

    if children.is_empty() {
        format!("h(Island, {props})")
    } else {
        format!(
            "h(Island, {props}, {{ default: () => [{}] }})",
            children.join(", ")
        )
    }
}

/// DOM statements building one element per reference; returns the variable
/// holding the root. Props are assigned as properties, never `children`.
fn element_node(reference: &ComponentReference, out: &mut String, counter: &mut usize) -> String {
    let var = format!("n{counter}");
    *counter += 1;

    out.push_str(&format!("const {var} = document.createElement(tag);\n"));
    if !reference.props.is_empty() {
        out.push_str(&format!(
            "Object.assign({var}, {});\n",
            reference.own_props_object()
        ));
    }

    for content in contents(reference) {
        match content {
            Content::Text(text) => out.push_str(&format!("{var}.append({});\n", json(text))),
            Content::Html(html) => out.push_str(&format!(
                "{var}.insertAdjacentHTML(\"beforeend\", {});\n",
                json(html)
            )),
            Content::Component(c) => {
                let child = element_node(c, out, counter);
                out.push_str(&format!("{var}.append({child});\n"));
            }
        }
    }

    var
}

fn json(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}
