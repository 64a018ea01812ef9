//! Component usage sites inside a document.

use std::path::PathBuf;

use crate::framework::Framework;

/// A prop value from component markup.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// String literal: variant="default"
    String(String),
    /// Boolean (presence): disabled
    Boolean(bool),
    /// Expression: count={3}
    Expression(String),
}

impl PropValue {
    /// Get as string if it's a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as a JavaScript expression.
    pub fn to_js(&self) -> String {
        match self {
            PropValue::String(s) => js_string(s),
            PropValue::Boolean(b) => b.to_string(),
            PropValue::Expression(expr) => format!("({})", expr.trim()),
        }
    }
}

/// A child of a component reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Component(ComponentReference),
    /// Text or plain HTML, kept verbatim
    Markup(String),
}

/// One usage of a component tag, resolved to its source module.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReference {
    /// Tag name as written (e.g. "Card")
    pub name: String,

    /// Resolved component source file
    pub source_path: PathBuf,

    /// Framework declared explicitly by the document, if any
    pub declared_framework: Option<Framework>,

    /// Props in source order
    pub props: Vec<(String, PropValue)>,

    pub children: Vec<Child>,
}

impl ComponentReference {
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            declared_framework: None,
            props: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: PropValue) -> Self {
        self.props.push((key.into(), value));
        self
    }

    pub fn with_child(mut self, child: ComponentReference) -> Self {
        self.children.push(Child::Component(child));
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.children.push(Child::Markup(markup.into()));
        self
    }

    /// Component-typed children, skipping markup.
    pub fn component_children(&self) -> impl Iterator<Item = &ComponentReference> {
        self.children.iter().filter_map(|c| match c {
            Child::Component(r) => Some(r),
            Child::Markup(_) => None,
        })
    }

    /// Every reference in this subtree, pre-order, including `self`.
    pub fn walk(&self) -> Vec<&ComponentReference> {
        let mut out = vec![self];
        for child in self.component_children() {
            out.extend(child.walk());
        }
        out
    }

    /// Whether the children hold components or HTML elements, which a plain
    /// text `children` prop cannot carry.
    pub fn has_structured_children(&self) -> bool {
        self.children.iter().any(|c| match c {
            Child::Component(_) => true,
            Child::Markup(m) => m.contains('<'),
        })
    }

    /// Concatenated markup children, when they are plain text.
    pub fn text_children(&self) -> Option<String> {
        if self.has_structured_children() {
            return None;
        }
        let text: String = self
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Markup(m) => Some(m.as_str()),
                Child::Component(_) => None,
            })
            .collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Props as a JavaScript object literal.
    pub fn own_props_object(&self) -> String {
        object_literal(self.prop_entries())
    }

    /// Props and plain text children as a JavaScript object literal.
    pub fn props_object(&self) -> String {
        let mut entries = self.prop_entries();
        if let Some(text) = self.text_children() {
            entries.push(format!("\"children\": {}", js_string(&text)));
        }
        object_literal(entries)
    }

    fn prop_entries(&self) -> Vec<String> {
        self.props
            .iter()
            .map(|(key, value)| format!("{}: {}", js_string(key), value.to_js()))
            .collect()
    }
}

fn object_literal(entries: Vec<String>) -> String {
    if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    }
}

/// Quote a string as a JavaScript literal.
pub(crate) fn js_string(s: &str) -> String {
    // JSON strings are valid JavaScript; `</` is broken up so the literal can sit in a <script>.
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ComponentReference {
        ComponentReference::new("Card", "/src/Card.tsx")
            .with_prop("title", PropValue::String("Hello".to_string()))
            .with_markup("\n  ")
            .with_child(
                ComponentReference::new("Button", "/src/Button.tsx")
                    .with_markup("Click")
                    .with_child(ComponentReference::new("Icon", "/src/Icon.tsx")),
            )
    }

    #[test]
    fn walks_in_pre_order() {
        let tree = card();
        let names: Vec<&str> = tree.walk().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Card", "Button", "Icon"]);
    }

    #[test]
    fn builds_props_object() {
        let button = ComponentReference::new("Button", "/src/Button.tsx")
            .with_prop("variant", PropValue::String("primary".to_string()))
            .with_prop("disabled", PropValue::Boolean(true))
            .with_prop("count", PropValue::Expression("1 + 2".to_string()))
            .with_markup("Click me");

        assert_eq!(
            button.props_object(),
            r#"{ "variant": "primary", "disabled": true, "count": (1 + 2), "children": "Click me" }"#
        );
    }

    #[test]
    fn empty_props_object() {
        let icon = ComponentReference::new("Icon", "/src/Icon.tsx");
        assert_eq!(icon.props_object(), "{}");
        assert_eq!(icon.text_children(), None);
    }

    #[test]
    fn html_children_are_not_text() {
        let button = ComponentReference::new("Button", "/src/Button.tsx")
            .with_prop("size", PropValue::String("sm".to_string()))
            .with_markup("<strong>Go</strong>");

        assert!(button.has_structured_children());
        assert_eq!(button.text_children(), None);
        assert_eq!(button.props_object(), r#"{ "size": "sm" }"#);
        assert_eq!(button.own_props_object(), r#"{ "size": "sm" }"#);
    }

    #[test]
    fn escapes_script_terminators() {
        assert_eq!(js_string("</script>"), r#""<\/script>""#);
    }
}
