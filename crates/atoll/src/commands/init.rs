//! Initialize documentation in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Scaffold a config file, starter pages and example components.
///
/// Existing files are kept unless `yes` is set.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing atoll...");

    let root = match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let files: [(&Path, &str); 5] = [
        (config_path, DEFAULT_CONFIG),
        (&root.join("docs/index.mdx"), DEFAULT_INDEX),
        (&root.join("docs/guides/islands.mdx"), DEFAULT_ISLANDS_GUIDE),
        (&root.join("components/Counter.tsx"), EXAMPLE_COUNTER),
        (&root.join("components/star-rating.element.js"), EXAMPLE_RATING),
    ];

    for (path, contents) in files {
        scaffold(path, contents, yes)?;
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Install the bundler and React with 'npm install -D esbuild react react-dom',");
    tracing::info!("then run 'atoll build' and 'atoll serve'.");

    Ok(())
}

fn scaffold(path: &Path, contents: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# atoll configuration

[docs]
# Source directory for documentation
dir = "docs"

# Output directory for built site
output = "dist"

title = "My Documentation"

# Base URL (for deployment)
base_url = "/"

[components]
# Components used by pages without an explicit import
dir = "components"

[build]
minify = true

[islands]
# esbuild executable; a plugin wrapper script works too
esbuild = "node_modules/.bin/esbuild"
timeout_secs = 60

# Scratch space for generated modules
work_dir = ".atoll"

# Components nested across frameworks: "error" fails the page,
# "split" cuts the foreign parts out into their own islands
mixed_frameworks = "error"
"#;

const DEFAULT_INDEX: &str = r#"---
title: Welcome
order: 1
---

# Welcome

This site is built with **atoll**. Components in these pages ship as
independent islands; everything else is plain HTML.

<Counter start={3} label="Clicks" />

<StarRating value={4} />

Read the [islands guide](/guides/islands/) to learn how it works.
"#;

const DEFAULT_ISLANDS_GUIDE: &str = r#"---
title: Islands
order: 2
---

# Islands

Write a component tag anywhere in a page. atoll finds the component by the
page's own imports or in the components directory, and picks its framework
from the file name:

| File                  | Framework       |
|-----------------------|-----------------|
| `Card.jsx`, `Card.tsx`| React           |
| `Card.vue`            | Vue             |
| `Card.svelte`         | Svelte          |
| `card.element.js`     | Custom element  |

## Declaring a framework

When a file name does not say, declare it in the frontmatter:

```yaml
frameworks:
  Chart: react
```

## Nesting

Components nested inside each other become one island, as long as they
share a framework:

```mdx
<Card title="Totals">
  <Counter start={1} />
</Card>
```

## Shared runtimes

React and Vue are bundled once per build and shared by every island on every
page through an import map. Svelte and custom elements carry what they need
inside each island.
"#;

const EXAMPLE_COUNTER: &str = r#"import { useState } from "react";

export default function Counter({ start = 0, label = "Count" }) {
  const [count, setCount] = useState(start);
  return (
    <button type="button" onClick={() => setCount(count + 1)}>
      {label}: {count}
    </button>
  );
}
"#;

const EXAMPLE_RATING: &str = r#"export default class StarRating extends HTMLElement {
  connectedCallback() {
    this.render();
  }

  set value(v) {
    this._value = Number(v);
    this.render();
  }

  get value() {
    return this._value ?? 0;
  }

  render() {
    this.textContent = "★".repeat(this.value) + "☆".repeat(5 - this.value);
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn scaffolds_project() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("docs.toml");

        run(&config, false).await.unwrap();

        assert!(config.exists());
        assert!(temp.path().join("docs/index.mdx").exists());
        assert!(temp.path().join("components/Counter.tsx").exists());
        assert!(temp.path().join("components/star-rating.element.js").exists());

        let parsed = crate::config::load_config(&config).unwrap();
        assert_eq!(parsed.components.dir.as_deref(), Some("components"));
    }

    #[tokio::test]
    async fn keeps_existing_files_without_yes() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("docs.toml");
        fs::write(&config, "# mine").unwrap();

        run(&config, false).await.unwrap();
        assert_eq!(fs::read_to_string(&config).unwrap(), "# mine");

        run(&config, true).await.unwrap();
        assert!(fs::read_to_string(&config).unwrap().contains("[islands]"));
    }
}
