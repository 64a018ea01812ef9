//! Template engine for rendering documentation pages.

use minijinja::{context, Environment};

/// A navigation item.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NavItem {
    pub title: String,
    /// URL path
    pub path: String,
    pub children: Vec<NavItem>,
    /// Whether this is the active page
    pub active: bool,
}

/// A table of contents entry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TocEntry {
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Rendered content HTML, island placeholders included
    pub content: String,
    pub nav: Vec<NavItem>,
    pub toc: Vec<TocEntry>,
    /// Base URL
    pub base_url: String,
    /// `<script type="importmap">` block, when the page uses shared runtimes
    pub import_map: Option<String>,
    /// Module scripts that mount the page's islands
    pub island_scripts: Vec<String>,
    /// Paths to CSS stylesheets to include
    pub styles: Vec<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("base.html".to_string(), BASE_TEMPLATE.to_string())
            .expect("Failed to add base template");
        env.add_template_owned("doc.html".to_string(), DOC_TEMPLATE.to_string())
            .expect("Failed to add doc template");
        env.add_template_owned("nav.html".to_string(), NAV_TEMPLATE.to_string())
            .expect("Failed to add nav template");

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        context: &Context,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            title => &context.title,
            site_title => &context.site_title,
            content => &context.content,
            nav => &context.nav,
            toc => &context.toc,
            base_url => &context.base_url,
            import_map => &context.import_map,
            island_scripts => &context.island_scripts,
            styles => &context.styles,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// The import map must precede every module script on the page.
const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site_title }}</title>
  {% if import_map %}{{ import_map | safe }}
  {% endif %}{% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}<link rel="stylesheet" href="{{ base_url }}assets/main.css">
</head>
<body>
  <button class="menu-btn" type="button" aria-label="Menu">&#9776;</button>
  <div class="layout">
    <nav class="sidebar">
      {% include "nav.html" %}
    </nav>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  <script src="{{ base_url }}assets/main.js"></script>
  {% for script in island_scripts %}
  <script type="module">
{{ script | safe }}
  </script>
  {% endfor %}
</body>
</html>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc">
  <div class="content">
    {{ content | safe }}
  </div>
</article>

{% if toc %}
<aside class="toc">
  <h2>On this page</h2>
  <ul>
  {% for entry in toc %}
    <li class="toc-level-{{ entry.level }}">
      <a href="#{{ entry.id }}">{{ entry.title }}</a>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const NAV_TEMPLATE: &str = r##"<div class="nav-header">
  <a href="{{ base_url }}" class="nav-logo">{{ site_title }}</a>
</div>
<ul class="nav-list">
{% for item in nav %}
  <li class="nav-item{% if item.active %} active{% endif %}">
    <a href="{{ item.path }}">{{ item.title }}</a>
    {% if item.children %}
    <ul class="nav-children">
      {% for child in item.children %}
      <li class="nav-item{% if child.active %} active{% endif %}">
        <a href="{{ child.path }}">{{ child.title }}</a>
      </li>
      {% endfor %}
    </ul>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn context(title: &str) -> Context {
        Context {
            title: title.to_string(),
            site_title: "Docs".to_string(),
            base_url: "/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_basic_page() {
        let mut ctx = context("Widgets");
        ctx.content = "<p>Hello world</p>".to_string();

        let html = TemplateEngine::new().render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("<title>Widgets - Docs</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(!html.contains("importmap"));
        assert!(!html.contains(r#"<script type="module">"#));
    }

    #[test]
    fn renders_navigation() {
        let mut ctx = context("Home");
        ctx.nav = vec![NavItem {
            title: "Guides".to_string(),
            path: "/guides/".to_string(),
            children: vec![NavItem {
                title: "Charts".to_string(),
                path: "/guides/charts/".to_string(),
                children: vec![],
                active: false,
            }],
            active: false,
        }];

        let html = TemplateEngine::new().render_page("doc.html", &ctx).unwrap();

        assert!(html.contains(r#"<a href="/guides/charts/">Charts</a>"#));
    }

    #[test]
    fn import_map_precedes_island_scripts() {
        let mut ctx = context("Islands");
        ctx.import_map = Some(
            "<script type=\"importmap\">\n{\"imports\": {\"vue\": \"/assets/vue-runtime.js\"}}\n</script>"
                .to_string(),
        );
        ctx.island_scripts = vec!["import Island from \"/assets/islands/toggle-0.js\";".to_string()];

        let html = TemplateEngine::new().render_page("doc.html", &ctx).unwrap();

        let map = html.find(r#"<script type="importmap">"#).unwrap();
        let head_end = html.find("</head>").unwrap();
        let module = html.find(r#"<script type="module">"#).unwrap();
        assert!(map < head_end);
        assert!(map < module);
        assert!(html.contains(r#""vue": "/assets/vue-runtime.js""#));
        assert!(html.contains("import Island from \"/assets/islands/toggle-0.js\";"));
    }
}
