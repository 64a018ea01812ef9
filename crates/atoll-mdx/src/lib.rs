//! MDX parser with frontmatter, import and component markup extraction.
//!
//! This crate turns an MDX page into plain markdown plus the structured data
//! the island compiler needs: the document's component imports and the forest
//! of capitalized component tags used in its body.

pub mod frontmatter;
pub mod imports;
pub mod markup;
pub mod parser;

pub use frontmatter::Frontmatter;
pub use imports::Import;
pub use markup::{AttrValue, ComponentNode, MarkupChild};
pub use parser::{parse_mdx, slugify, ParseError, ParsedDoc, TocEntry};
