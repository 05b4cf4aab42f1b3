//! Content collection.
//!
//! Walks the content root once and expands a category's patterns against the
//! sorted list of candidate documents.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use llmsdoc_core::{CategoryConfig, category::MATCH_OPTIONS};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The content root is missing, not a directory, or cannot be listed.
    #[error("content root {path} is unavailable: {reason}")]
    RootUnavailable { path: PathBuf, reason: String },
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// A document selected by a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    /// `/`-separated path relative to the content root.
    pub relative: String,

    /// Path on disk.
    pub path: PathBuf,
}

/// Enumerates content files below a root directory.
#[derive(Debug, Clone)]
pub struct ContentCollector {
    root: PathBuf,
    extensions: Vec<String>,
}

impl ContentCollector {
    /// Create a collector for `.md` and `.mdx` files below `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["md".to_string(), "mdx".to_string()],
        }
    }

    /// Restrict candidates to the given extensions (without the dot).
    #[must_use]
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// The content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured document extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// All candidate documents, as sorted relative paths.
    pub fn candidates(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(CollectorError::RootUnavailable {
                path: self.root.clone(),
                reason: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(CollectorError::RootUnavailable {
                        path: self.root.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    warn!(error = %err, "skipping unreadable content entry");
                    continue;
                }
            };

            if entry.file_type().is_file()
                && self.has_content_extension(entry.path())
                && let Some(relative) = self.relative_path(entry.path())
            {
                files.push(relative);
            }
        }

        files.sort();
        debug!(root = %self.root.display(), count = files.len(), "collected candidates");
        Ok(files)
    }

    /// Expand a category's patterns over `candidates` into an ordered,
    /// de-duplicated file list.
    ///
    /// Patterns are applied in listed order; matches of one pattern follow
    /// path order. A file matched by several patterns appears at its first
    /// match. Excluded paths are dropped.
    pub fn expand(&self, candidates: &[String], config: &CategoryConfig) -> Vec<ContentFile> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for pattern in &config.patterns {
            for relative in candidates {
                if !pattern.matches_with(relative, MATCH_OPTIONS)
                    || config.is_excluded(relative)
                    || !seen.insert(relative.as_str())
                {
                    continue;
                }
                files.push(ContentFile {
                    relative: relative.clone(),
                    path: self.root.join(relative),
                });
            }
        }

        files
    }

    fn has_content_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
