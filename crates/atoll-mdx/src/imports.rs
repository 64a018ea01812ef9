//! Top-level ESM import lines.

use std::sync::LazyLock;

use regex::Regex;

static DEFAULT_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s+([A-Za-z_$][\w$]*)\s+from\s+["']([^"']+)["']\s*;?\s*$"#)
        .expect("Invalid import regex")
});

/// A default import declared by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Local binding, e.g. `Card`
    pub name: String,
    /// Module specifier as written, e.g. `./components/Card.tsx`
    pub specifier: String,
    /// 1-based line within the content
    pub line: usize,
}

/// Pull `import` lines out of the markdown body.
///
/// Default imports are returned; every import line, named or not, is replaced
/// by an empty line so the markdown renderer never sees it and line numbers
/// stay stable. Lines inside fenced code are left alone.
pub fn extract_imports(content: &str) -> (Vec<Import>, String) {
    let mut imports = Vec::new();
    let mut body = String::with_capacity(content.len());
    let mut fence: Option<&str> = None;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        let trimmed = line.trim();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            body.push_str(line);
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
        } else if trimmed.starts_with("~~~") {
            fence = Some("~~~");
        }

        if fence.is_none() && line.starts_with("import ") {
            if let Some(cap) = DEFAULT_IMPORT_RE.captures(trimmed) {
                imports.push(Import {
                    name: cap[1].to_string(),
                    specifier: cap[2].to_string(),
                    line: index + 1,
                });
            }
            if line.ends_with('\n') {
                body.push('\n');
            }
            continue;
        }

        body.push_str(line);
    }

    (imports, body)
}
