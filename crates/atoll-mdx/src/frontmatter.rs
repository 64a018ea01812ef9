//! Frontmatter extraction and parsing.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Parsed frontmatter from an MDX file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title (required)
    pub title: String,

    /// Page description for SEO
    #[serde(default)]
    pub description: Option<String>,

    /// Order in navigation (lower = first)
    #[serde(default)]
    pub order: Option<i32>,

    /// Whether to show in navigation
    #[serde(default = "default_true")]
    pub nav: bool,

    /// Custom slug override
    #[serde(default)]
    pub slug: Option<String>,

    /// Explicit framework per component name, overriding file conventions:
    ///
    /// ```yaml
    /// frameworks:
    ///   Chart: react
    /// ```
    #[serde(default)]
    pub frameworks: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            order: None,
            nav: true,
            slug: None,
            frameworks: BTreeMap::new(),
        }
    }
}

/// Extract frontmatter from MDX content.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    let frontmatter: Frontmatter =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok((Some(frontmatter), remaining.trim_start()))
}

#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block, missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Widgets
description: Interactive widgets
order: 1
---

# Widgets
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title, "Widgets");
        assert_eq!(fm.description.as_deref(), Some("Interactive widgets"));
        assert_eq!(fm.order, Some(1));
        assert!(fm.nav);
        assert!(fm.frameworks.is_empty());
        assert!(content.starts_with("# Widgets"));
    }

    #[test]
    fn reads_framework_declarations() {
        let source = "---\ntitle: Charts\nframeworks:\n  Chart: react\n  Legend: vue\n---\nbody";

        let (fm, _) = extract_frontmatter(source).unwrap();
        let frameworks = fm.unwrap().frameworks;

        assert_eq!(frameworks.get("Chart").map(String::as_str), Some("react"));
        assert_eq!(frameworks.get("Legend").map(String::as_str), Some("vue"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let result = extract_frontmatter("---\ntitle: Test\n# No closing");

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let result = extract_frontmatter("---\ntitle: [invalid yaml\n---\n");

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }
}
