//! Site-wide CSS and JavaScript.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("CSS parse error: {0}")]
    Parse(String),

    #[error("CSS print error: {0}")]
    Print(String),
}

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, AssetError> {
        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| AssetError::Parse(e.to_string()))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| AssetError::Print(e.to_string()))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* atoll default theme */

:root {
  --sidebar-width: 260px;
  --toc-width: 200px;
  --content-max-width: 780px;
  --background: #ffffff;
  --foreground: #1c1f24;
  --muted: #f4f5f7;
  --muted-foreground: #5b6270;
  --border: #e3e5e8;
  --primary: #0b6bcb;
  --primary-foreground: #ffffff;
  --radius: 0.375rem;
}

@media (prefers-color-scheme: dark) {
  :root {
    --background: #121417;
    --foreground: #e8eaed;
    --muted: #1b1e22;
    --muted-foreground: #9aa1ad;
    --border: #2a2e34;
    --primary: #4aa3ff;
  }
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: 100vh;
}

.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1.5rem;
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
}

.nav-logo {
  display: block;
  font-weight: 700;
  font-size: 1.2rem;
  color: var(--foreground);
  text-decoration: none;
  margin-bottom: 1.5rem;
}

.nav-list,
.nav-children {
  list-style: none;
}

.nav-children {
  margin-left: 1rem;
}

.nav-item a {
  display: block;
  padding: 0.4rem 0.75rem;
  color: var(--muted-foreground);
  text-decoration: none;
  border-radius: var(--radius);
}

.nav-item.active > a {
  background: var(--primary);
  color: var(--primary-foreground);
}

.main {
  display: grid;
  grid-template-columns: 1fr var(--toc-width);
  gap: 2rem;
  padding: 2rem;
}

.doc {
  max-width: var(--content-max-width);
}

.content h1 {
  font-size: 2.25rem;
  margin-bottom: 1.25rem;
}

.content h2 {
  font-size: 1.5rem;
  margin: 2rem 0 1rem;
  border-bottom: 1px solid var(--border);
}

.content p {
  margin-bottom: 1rem;
}

.content pre {
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  margin-bottom: 1rem;
}

.content code {
  font-family: ui-monospace, monospace;
  font-size: 0.875em;
}

/* Island mount points */
atoll-island {
  display: block;
  margin: 1rem 0;
  padding: 1.5rem;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  min-height: 2.5rem;
}

atoll-island:empty {
  background: var(--muted);
}

/* Inline HTML passed into island children */
atoll-children {
  display: contents;
}

.toc {
  position: sticky;
  top: 2rem;
  align-self: start;
}

.toc h2 {
  font-size: 0.75rem;
  text-transform: uppercase;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc a {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc-level-3 {
  padding-left: 1rem;
}

.menu-btn {
  display: none;
}

@media (max-width: 1024px) {
  .layout,
  .main {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: fixed;
    left: -100%;
    width: var(--sidebar-width);
    transition: left 0.3s;
  }

  .sidebar.open {
    left: 0;
  }

  .toc {
    display: none;
  }

  .menu-btn {
    display: block;
    position: fixed;
    top: 1rem;
    left: 1rem;
  }
}
"#;

const DEFAULT_JS: &str = r#"// atoll site script
(function() {
  'use strict';

  const menuBtn = document.querySelector('.menu-btn');
  const sidebar = document.querySelector('.sidebar');
  if (menuBtn && sidebar) {
    menuBtn.addEventListener('click', () => sidebar.classList.toggle('open'));
  }

  const currentPath = window.location.pathname;
  document.querySelectorAll('.nav-item a').forEach(link => {
    const href = link.getAttribute('href');
    if (href === currentPath || (href !== '/' && currentPath.startsWith(href))) {
      link.parentElement.classList.add('active');
    }
  });

  // Flag islands whose module failed to mount.
  window.addEventListener('load', () => {
    document.querySelectorAll('atoll-island:empty').forEach(island => {
      island.setAttribute('data-unmounted', '');
    });
  });
})();
"#;
