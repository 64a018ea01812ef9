//! Component tags embedded in markdown.
//!
//! Any tag whose name starts with an uppercase letter is a component usage.
//! Lowercase tags are ordinary HTML and are kept verbatim as markup. Tags
//! inside fenced code, indented code, or inline code spans are ignored.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag};

/// An attribute value as written in the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// `label="Save"` or `label='Save'`
    String(String),
    /// `disabled`
    Boolean(bool),
    /// `count={2 + 1}`, braces stripped
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupChild {
    Component(ComponentNode),
    /// Text or lowercase HTML between component tags, trimmed
    Markup(String),
}

/// One component tag and everything nested inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    pub name: String,
    /// Attributes in source order
    pub props: Vec<(String, AttrValue)>,
    pub children: Vec<MarkupChild>,
    /// Byte range of the whole element, opening tag through closing tag
    pub span: Range<usize>,
}

impl ComponentNode {
    /// Nested component nodes, skipping markup.
    pub fn component_children(&self) -> impl Iterator<Item = &ComponentNode> {
        self.children.iter().filter_map(|child| match child {
            MarkupChild::Component(node) => Some(node),
            MarkupChild::Markup(_) => None,
        })
    }
}

/// Malformed component markup at a byte offset.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct MarkupError {
    pub offset: usize,
    pub message: String,
}

/// Parse every top-level component tag in `content`.
pub fn parse_components(content: &str) -> Result<Vec<ComponentNode>, MarkupError> {
    let code = code_regions(content);
    let mut nodes = Vec::new();
    let mut pos = 0;

    while let Some(rel) = content[pos..].find('<') {
        let start = pos + rel;

        if let Some(region) = code.iter().find(|r| r.contains(&start)) {
            pos = region.end.max(start + 1);
            continue;
        }

        let rest = &content[start..];
        if starts_uppercase(&rest[1..]) {
            let mut cursor = Cursor::at(content, start);
            nodes.push(parse_element(&mut cursor)?);
            pos = cursor.pos;
        } else if rest.starts_with("</") && starts_uppercase(&rest[2..]) {
            let name: String = rest[2..]
                .chars()
                .take_while(|c| is_name_char(*c))
                .collect();
            return Err(MarkupError {
                offset: start,
                message: format!("unexpected </{name}> without a matching opening tag"),
            });
        } else {
            pos = start + 1;
        }
    }

    Ok(nodes)
}

/// 1-based line number of a byte offset.
pub fn line_of(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())].matches('\n').count() + 1
}

fn code_regions(content: &str) -> Vec<Range<usize>> {
    Parser::new_ext(content, Options::empty())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&f) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> MarkupError {
        MarkupError {
            offset,
            message: message.into(),
        }
    }
}

fn parse_element(cursor: &mut Cursor<'_>) -> Result<ComponentNode, MarkupError> {
    let start = cursor.pos;
    cursor.eat("<");
    let name = cursor.take_while(is_name_char).to_string();
    let mut props = Vec::new();

    loop {
        cursor.skip_whitespace();

        if cursor.eat("/>") {
            return Ok(ComponentNode {
                name,
                props,
                children: Vec::new(),
                span: start..cursor.pos,
            });
        }
        if cursor.eat(">") {
            break;
        }

        let key = cursor.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '$'));
        if key.is_empty() {
            return Err(match cursor.peek() {
                None => cursor.error(start, format!("unclosed <{name}> tag")),
                Some(c) => cursor.error(
                    cursor.pos,
                    format!("unexpected '{c}' in the attributes of <{name}>"),
                ),
            });
        }

        cursor.skip_whitespace();
        let value = if cursor.eat("=") {
            cursor.skip_whitespace();
            parse_value(cursor, key)?
        } else {
            AttrValue::Boolean(true)
        };
        props.push((key.to_string(), value));
    }

    let children = parse_children(cursor, &name, start)?;

    Ok(ComponentNode {
        name,
        props,
        children,
        span: start..cursor.pos,
    })
}

fn parse_value(cursor: &mut Cursor<'_>, key: &str) -> Result<AttrValue, MarkupError> {
    let start = cursor.pos;
    match cursor.peek() {
        Some(quote @ ('"' | '\'')) => {
            cursor.bump();
            let value = cursor.take_while(|c| c != quote);
            if cursor.bump() != Some(quote) {
                return Err(cursor.error(start, format!("unterminated string for '{key}'")));
            }
            Ok(AttrValue::String(value.to_string()))
        }
        Some('{') => {
            let inner = balanced_braces(cursor)?;
            Ok(AttrValue::Expression(inner.trim().to_string()))
        }
        _ => Err(cursor.error(
            start,
            format!("expected a quoted string or {{expression}} for '{key}'"),
        )),
    }
}

/// Consume a `{...}` group and return its inside. String literals may
/// contain braces.
fn balanced_braces<'a>(cursor: &mut Cursor<'a>) -> Result<&'a str, MarkupError> {
    let start = cursor.pos;
    let mut depth = 0usize;

    while let Some(c) = cursor.bump() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&cursor.src[start + 1..cursor.pos - 1]);
                }
            }
            '"' | '\'' | '`' => {
                while let Some(inner) = cursor.bump() {
                    if inner == '\\' {
                        cursor.bump();
                    } else if inner == c {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    Err(cursor.error(start, "unclosed { expression"))
}

fn parse_children(
    cursor: &mut Cursor<'_>,
    name: &str,
    open_start: usize,
) -> Result<Vec<MarkupChild>, MarkupError> {
    let mut children = Vec::new();
    let mut text_start = cursor.pos;

    let flush = |children: &mut Vec<MarkupChild>, text: &str| {
        let text = text.trim();
        if !text.is_empty() {
            children.push(MarkupChild::Markup(text.to_string()));
        }
    };

    loop {
        match cursor.peek() {
            None => return Err(cursor.error(open_start, format!("unclosed <{name}>"))),
            Some('<') => {
                let rest = cursor.rest();
                if rest.starts_with("</") && starts_uppercase(&rest[2..]) {
                    flush(&mut children, &cursor.src[text_start..cursor.pos]);
                    let close_start = cursor.pos;
                    cursor.eat("</");
                    let closing = cursor.take_while(is_name_char);
                    cursor.skip_whitespace();
                    if !cursor.eat(">") {
                        return Err(cursor.error(close_start, format!("malformed </{closing}")));
                    }
                    if closing != name {
                        return Err(cursor.error(
                            close_start,
                            format!("expected </{name}> but found </{closing}>"),
                        ));
                    }
                    return Ok(children);
                }
                if starts_uppercase(&rest[1..]) {
                    flush(&mut children, &cursor.src[text_start..cursor.pos]);
                    let child = parse_element(cursor)?;
                    children.push(MarkupChild::Component(child));
                    text_start = cursor.pos;
                } else {
                    cursor.bump();
                }
            }
            Some('{') => {
                balanced_braces(cursor)?;
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}
