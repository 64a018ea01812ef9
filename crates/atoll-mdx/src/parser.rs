//! MDX document parser.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::imports::{extract_imports, Import};
use crate::markup::{line_of, parse_components, ComponentNode};

/// A parsed MDX document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown body without frontmatter; import lines are blanked
    pub content: String,

    /// Default imports declared at the top level
    pub imports: Vec<Import>,

    /// Top-level component tags, with spans into `content`
    pub components: Vec<ComponentNode>,

    /// Table of contents entries
    pub toc: Vec<TocEntry>,
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Errors that can occur when parsing MDX.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Markup error at line {line}: {message}")]
    Markup { line: usize, message: String },
}

/// Parse an MDX document.
///
/// Extracts frontmatter, imports and component tags, and builds a table of
/// contents. Markup error lines are counted from the top of `source`.
pub fn parse_mdx(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;
    let line_offset = source[..source.len() - content.len()].lines().count();

    let (imports, content) = extract_imports(content);

    let components = parse_components(&content).map_err(|e| ParseError::Markup {
        line: line_offset + line_of(&content, e.offset),
        message: e.message,
    })?;

    let toc = table_of_contents(&content);

    Ok(ParsedDoc {
        frontmatter,
        content,
        imports,
        components,
        toc,
    })
}

fn table_of_contents(content: &str) -> Vec<TocEntry> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut toc = Vec::new();
    let mut heading: Option<(u8, String)> = None;

    for event in Parser::new_ext(content, options) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level as u8, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, title)) = heading.as_mut() {
                    title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = heading.take() {
                    let id = slugify(&title);
                    toc.push(TocEntry { title, id, level });
                }
            }
            _ => {}
        }
    }

    toc
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{AttrValue, MarkupChild};

    #[test]
    fn parses_complete_mdx() {
        let source = r#"---
title: Widgets
frameworks:
  Legend: vue
---

import Counter from "./components/Counter.tsx";

# Widgets

<Counter start={3} />

## Cards

<Card title="Info">
  Plain text
</Card>
"#;

        let doc = parse_mdx(source).unwrap();

        let fm = doc.frontmatter.unwrap();
        assert_eq!(fm.title, "Widgets");
        assert_eq!(fm.frameworks["Legend"], "vue");

        assert_eq!(doc.imports.len(), 1);
        assert_eq!(doc.imports[0].name, "Counter");
        assert!(!doc.content.contains("import Counter"));

        assert_eq!(doc.components.len(), 2);
        assert_eq!(doc.components[0].name, "Counter");
        assert_eq!(
            doc.components[0].props,
            vec![("start".to_string(), AttrValue::Expression("3".into()))]
        );
        assert_eq!(
            doc.components[1].children,
            vec![MarkupChild::Markup("Plain text".into())]
        );
        assert_eq!(
            &doc.content[doc.components[0].span.clone()],
            "<Counter start={3} />"
        );

        assert_eq!(doc.toc.len(), 2);
        assert_eq!(doc.toc[0].id, "widgets");
        assert_eq!(doc.toc[1].level, 2);
    }

    #[test]
    fn parses_without_frontmatter() {
        let doc = parse_mdx("# Just Markdown\n\nNo frontmatter.").unwrap();

        assert!(doc.frontmatter.is_none());
        assert!(doc.components.is_empty());
        assert_eq!(doc.toc[0].title, "Just Markdown");
    }

    #[test]
    fn markup_errors_report_source_lines() {
        let source = "---\ntitle: Broken\n---\n\n# Broken\n\n<Card>\nnever closed\n";

        let err = parse_mdx(source).unwrap_err();

        match err {
            ParseError::Markup { line, message } => {
                assert_eq!(line, 7);
                assert!(message.contains("unclosed <Card>"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }
}
