//! Where compiled artifacts land on disk and how the browser reaches them.

use std::path::{Path, PathBuf};

use crate::framework::Framework;

/// Output locations for one build session.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    /// Asset output directory (e.g. "dist/assets")
    pub assets_dir: PathBuf,

    /// Public URL of `assets_dir`, always ending in '/'
    pub assets_url: String,

    /// Session-scoped directory for synthesized sources
    pub scratch_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(
        assets_dir: impl Into<PathBuf>,
        assets_url: impl Into<String>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        let mut assets_url = assets_url.into();
        if !assets_url.ends_with('/') {
            assets_url.push('/');
        }

        Self {
            assets_dir: assets_dir.into(),
            assets_url,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Per-island bundle path; unique because island ids are.
    pub fn island_path(&self, island_id: &str) -> PathBuf {
        self.assets_dir.join("islands").join(format!("{island_id}.js"))
    }

    pub fn island_url(&self, island_id: &str) -> String {
        format!("{}islands/{island_id}.js", self.assets_url)
    }

    /// Shared runtime path, keyed only by framework.
    pub fn runtime_path(&self, framework: Framework) -> PathBuf {
        self.assets_dir.join(runtime_file_name(framework))
    }

    pub fn runtime_url(&self, framework: Framework) -> String {
        format!("{}{}", self.assets_url, runtime_file_name(framework))
    }

    /// Synthetic entry that re-exports a framework's public surface.
    pub fn runtime_entry_path(&self, framework: Framework) -> PathBuf {
        self.scratch_dir
            .join(format!("{}-runtime-entry.js", framework.name()))
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }
}

fn runtime_file_name(framework: Framework) -> String {
    format!("{}-runtime.js", framework.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_keyed_by_id_and_framework() {
        let layout = OutputLayout::new("dist/assets", "/docs/assets", "/tmp/s");

        assert_eq!(layout.assets_url, "/docs/assets/");
        assert_eq!(
            layout.island_path("card-3"),
            PathBuf::from("dist/assets/islands/card-3.js")
        );
        assert_eq!(layout.island_url("card-3"), "/docs/assets/islands/card-3.js");
        assert_eq!(
            layout.runtime_path(Framework::React),
            PathBuf::from("dist/assets/react-runtime.js")
        );
        assert_eq!(
            layout.runtime_url(Framework::Vue),
            "/docs/assets/vue-runtime.js"
        );
        assert_eq!(
            layout.runtime_entry_path(Framework::React),
            PathBuf::from("/tmp/s/react-runtime-entry.js")
        );
    }
}
