// src/rc/document.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::errors::{Result, SwellError};
use crate::fs::FileSystem;

/// `KEY: value` or `KEY = value`. Keys may contain dots and dashes
/// (`DYCORE`, `RECORD_FREQUENCY`, `MAPL.ENABLE_TIMERS`).
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*[:=]\s*(.*?)\s*$")
        .unwrap_or_else(|e| panic!("invalid run-control entry regex: {e}"))
});

/// Parsed run-control file.
///
/// Values are kept verbatim (including any surrounding quotes); callers that
/// need numbers strip quotes themselves, see [`super::ProcessGrid`].
#[derive(Debug, Clone, Default)]
pub struct RunControlDocument {
    source: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl RunControlDocument {
    /// Parse run-control text.
    ///
    /// Blank lines and lines starting with `#` are skipped, as is anything
    /// that does not look like an entry. A key that appears twice keeps its
    /// last value.
    pub fn parse(contents: &str) -> Self {
        let mut entries = BTreeMap::new();

        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match ENTRY_RE.captures(trimmed) {
                Some(caps) => {
                    entries.insert(caps[1].to_string(), caps[2].to_string());
                }
                None => debug!(line = %trimmed, "skipping unrecognised run-control line"),
            }
        }

        Self {
            source: None,
            entries,
        }
    }

    /// Read and parse the run-control document at `path`.
    ///
    /// A missing or unreadable file is a configuration error: the run cannot
    /// be sized without it.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let contents = fs.read_to_string(path).map_err(|e| {
            SwellError::ConfigError(format!(
                "cannot read run-control document {:?}: {e:#}",
                path
            ))
        })?;

        let mut doc = Self::parse(&contents);
        doc.source = Some(path.to_path_buf());
        debug!(path = ?path, entries = doc.entries.len(), "parsed run-control document");
        Ok(doc)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but a missing key is a configuration error
    /// naming the key and the file it was expected in.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            SwellError::ConfigError(format!(
                "run-control document {} has no '{key}' entry",
                self.describe_source()
            ))
        })
    }

    /// Path this document was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn describe_source(&self) -> String {
        match &self.source {
            Some(p) => format!("{:?}", p),
            None => "<inline>".to_string(),
        }
    }
}
