//! Browser module-resolution manifest.

use std::collections::BTreeMap;

use crate::framework::Framework;
use crate::runtime::RuntimeBundle;

/// Build the import map for the runtimes a page uses.
///
/// Every bare specifier of every externalized framework points at that
/// framework's runtime bundle. Returns `None` when nothing is externalized.
pub fn generate_manifest(runtimes: &[RuntimeBundle]) -> Option<String> {
    let by_framework: BTreeMap<Framework, &RuntimeBundle> = runtimes
        .iter()
        .filter(|r| r.framework.externalize())
        .map(|r| (r.framework, r))
        .collect();

    if by_framework.is_empty() {
        return None;
    }

    let mut imports = serde_json::Map::new();
    for (framework, runtime) in &by_framework {
        for specifier in framework.specifiers() {
            imports.insert(
                specifier.to_string(),
                serde_json::Value::String(runtime.url.clone()),
            );
        }
    }

    let map = serde_json::json!({ "imports": imports });
    let json = serde_json::to_string_pretty(&map).ok()?.replace("</", "<\\/");

    Some(format!("<script type=\"importmap\">\n{json}\n</script>"))
}
