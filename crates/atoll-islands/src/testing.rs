//! A recording [`ModuleBundler`] for tests.
//!
//! Produces deterministic fake bundles: externals stay as import statements,
//! every other bare import found in the entry is "inlined" as a fixed-size
//! blob so runtime bundles are much larger than island bundles.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;

use regex::Regex;

use crate::bundler::{BuildOptions, BundleOutput, BundlerError, ModuleBundler};

/// Bytes emitted for each inlined bare dependency.
pub const INLINED_DEPENDENCY_BYTES: usize = 40_000;

static IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"from\s+["']([^"']+)["']"#).expect("Invalid import regex")
});

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBuild {
    pub entry: PathBuf,
    pub options: BuildOptions,
}

/// Bundler double that records every call.
#[derive(Debug, Default)]
pub struct RecordingBundler {
    calls: Mutex<Vec<RecordedBuild>>,
    pending_failures: AtomicUsize,
    delay: Option<Duration>,
}

impl RecordingBundler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every build, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next `n` invocations fail.
    pub fn fail_next(&self, n: usize) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    pub fn invocations(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Invocations whose entry was a synthetic runtime entry.
    pub fn runtime_invocations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.entry.to_string_lossy().ends_with("-runtime-entry.js"))
            .count()
    }

    pub fn calls(&self) -> Vec<RecordedBuild> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ModuleBundler for RecordingBundler {
    async fn build(
        &self,
        entry: &Path,
        options: &BuildOptions,
    ) -> Result<BundleOutput, BundlerError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedBuild {
                entry: entry.to_path_buf(),
                options: options.clone(),
            });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(BundlerError::Failed {
                status: "exit status: 1".to_string(),
                stderr: format!("{}: simulated failure", entry.display()),
            });
        }

        let source = tokio::fs::read_to_string(entry).await.unwrap_or_default();
        Ok(BundleOutput::new(fake_bundle(entry, &source, options)))
    }
}

fn fake_bundle(entry: &Path, source: &str, options: &BuildOptions) -> String {
    let mut code = format!(
        "// bundle of {}\n",
        entry.file_name().and_then(|n| n.to_str()).unwrap_or("entry")
    );

    for specifier in &options.external {
        code.push_str(&format!("import \"{specifier}\";\n"));
    }

    for cap in IMPORT_FROM_RE.captures_iter(source) {
        let specifier = &cap[1];
        let is_bare = !specifier.starts_with('.') && !specifier.starts_with('/');
        if is_bare && !options.external.iter().any(|e| e == specifier) {
            code.push_str(&format!("/* inlined {specifier} */\n"));
            code.push_str(&"0".repeat(INLINED_DEPENDENCY_BYTES));
            code.push('\n');
        }
    }

    for line in source.lines().filter(|l| !l.trim_start().starts_with("import ")) {
        code.push_str(line);
        code.push('\n');
    }

    code
}
