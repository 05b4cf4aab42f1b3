//! Category aggregation.
//!
//! Concatenates every document selected by a category into one markdown
//! artifact. A document that cannot be read or whose frontmatter does not
//! parse still gets a section, flagged with a warning; only an unusable
//! content root fails the whole aggregation.

use std::{fmt, fs, path::PathBuf};

use llmsdoc_core::{CategoryConfig, Frontmatter, frontmatter::parse_frontmatter};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collector::{CollectorError, ContentCollector, ContentFile};

/// Aggregation errors.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The content root cannot be read at all.
    #[error("content root {path} is unavailable: {reason}")]
    ContentRootUnavailable { path: PathBuf, reason: String },
}

impl From<CollectorError> for AggregateError {
    fn from(err: CollectorError) -> Self {
        match err {
            CollectorError::RootUnavailable { path, reason } => {
                Self::ContentRootUnavailable { path, reason }
            }
        }
    }
}

/// Result type for aggregation.
pub type Result<T> = std::result::Result<T, AggregateError>;

/// Why a single document degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Frontmatter present but not parseable; the full text is used as body.
    FrontMatter(String),
    /// The file could not be read.
    Unreadable(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontMatter(reason) => write!(f, "front matter could not be parsed ({reason})"),
            Self::Unreadable(reason) => write!(f, "file could not be read ({reason})"),
        }
    }
}

/// A degraded document, by relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub path: String,
    pub kind: FailureKind,
}

/// A loaded document.
#[derive(Debug, Clone)]
pub struct Document {
    /// `/`-separated path relative to the content root.
    pub relative: String,

    /// Parsed metadata, empty when absent or unparseable.
    pub frontmatter: Frontmatter,

    /// Body text without the frontmatter block.
    pub body: String,

    /// Set when the document degraded.
    pub failure: Option<FailureKind>,
}

impl Document {
    /// Load and parse a document. Never fails; problems land in `failure`.
    pub fn load(file: &ContentFile) -> Self {
        let raw = match fs::read_to_string(&file.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %file.relative, error = %e, "failed to read document");
                return Self {
                    relative: file.relative.clone(),
                    frontmatter: Frontmatter::default(),
                    body: String::new(),
                    failure: Some(FailureKind::Unreadable(e.to_string())),
                };
            }
        };

        match parse_frontmatter(&raw, &file.path) {
            Ok((frontmatter, body)) => Self {
                relative: file.relative.clone(),
                frontmatter,
                body,
                failure: None,
            },
            Err(e) => {
                warn!(path = %file.relative, error = %e, "failed to parse front matter");
                Self {
                    relative: file.relative.clone(),
                    frontmatter: Frontmatter::default(),
                    body: raw,
                    failure: Some(FailureKind::FrontMatter(e.to_string())),
                }
            }
        }
    }

    /// Frontmatter title, or the file name without its extension.
    pub fn title(&self) -> String {
        if let Some(title) = &self.frontmatter.title {
            return title.clone();
        }
        let file_name = self.relative.rsplit('/').next().unwrap_or(&self.relative);
        match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file_name.to_string(),
        }
    }
}

/// The flattened output for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedArtifact {
    /// Category title.
    pub title: String,

    /// Rendered markdown.
    pub content: String,

    /// Number of documents included.
    pub documents: usize,

    /// Documents that degraded while loading.
    pub failures: Vec<DocumentFailure>,
}

impl AggregatedArtifact {
    /// Whether no document matched the category.
    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}

/// Builds artifacts from a content tree.
#[derive(Debug, Clone)]
pub struct Aggregator {
    collector: ContentCollector,
}

impl Aggregator {
    /// Create an aggregator over the collector's content root.
    #[must_use]
    pub fn new(collector: ContentCollector) -> Self {
        Self { collector }
    }

    /// The underlying collector.
    pub fn collector(&self) -> &ContentCollector {
        &self.collector
    }

    /// Aggregate one category.
    pub fn aggregate(&self, config: &CategoryConfig) -> Result<AggregatedArtifact> {
        let candidates = self.collector.candidates()?;
        Ok(self.aggregate_from(&candidates, config))
    }

    /// Aggregate against an already collected candidate list.
    pub fn aggregate_from(&self, candidates: &[String], config: &CategoryConfig) -> AggregatedArtifact {
        let files = self.collector.expand(candidates, config);
        let documents = load_all(&files);

        let failures: Vec<_> = documents
            .iter()
            .filter_map(|doc| {
                doc.failure.clone().map(|kind| DocumentFailure {
                    path: doc.relative.clone(),
                    kind,
                })
            })
            .collect();

        let content = if documents.is_empty() {
            render_empty(config)
        } else {
            render(config, &documents)
        };

        info!(
            category = %config.title,
            documents = documents.len(),
            failures = failures.len(),
            "aggregated category"
        );

        AggregatedArtifact {
            title: config.title.clone(),
            content,
            documents: documents.len(),
            failures,
        }
    }
}

fn load_all(files: &[ContentFile]) -> Vec<Document> {
    // Indexed parallel iterators keep input order on collect.
    files.par_iter().map(Document::load).collect()
}

fn push_header(out: &mut String, config: &CategoryConfig) {
    out.push_str(&format!("# {}\n\n", config.title));
    if !config.description.trim().is_empty() {
        out.push_str(&format!("> {}\n\n", config.description.trim()));
    }
}

fn render(config: &CategoryConfig, documents: &[Document]) -> String {
    let mut out = String::new();
    push_header(&mut out, config);

    for doc in documents {
        debug!(path = %doc.relative, "rendering document");
        out.push_str(&format!("## {}\n\n", doc.title()));
        if let Some(description) = &doc.frontmatter.description {
            out.push_str(&format!("> {description}\n\n"));
        }
        if let Some(failure) = &doc.failure {
            out.push_str(&format!("> **Warning:** {failure}\n\n"));
        }
        out.push_str(&format!("Source: `{}`\n\n", doc.relative));

        let body = doc.body.trim_end();
        if !body.is_empty() {
            out.push_str(body);
            out.push_str("\n\n");
        }
        out.push_str("---\n\n");
    }

    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

fn render_empty(config: &CategoryConfig) -> String {
    let mut out = String::new();
    push_header(&mut out, config);

    out.push_str("No documents matched this category.\n\n");
    out.push_str("Searched patterns:\n\n");
    for pattern in &config.patterns {
        out.push_str(&format!("- `{pattern}`\n"));
    }
    if !config.exclude_patterns.is_empty() {
        out.push_str("\nExcluded patterns:\n\n");
        for pattern in &config.exclude_patterns {
            out.push_str(&format!("- `{pattern}`\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }

    fn api_config() -> CategoryConfig {
        CategoryConfig::new("API Docs", "HTTP reference", &["docs/api/**/*.md"]).expect("config")
    }

    #[test]
    fn test_document_title_fallbacks() {
        let doc = Document {
            relative: "docs/api/getting-started.mdx".to_string(),
            frontmatter: Frontmatter::default(),
            body: String::new(),
            failure: None,
        };
        assert_eq!(doc.title(), "getting-started");

        let dotfile = Document {
            relative: "docs/.md".to_string(),
            ..doc.clone()
        };
        assert_eq!(dotfile.title(), ".md");

        let titled = Document {
            frontmatter: Frontmatter {
                title: Some("Getting Started".to_string()),
                description: None,
            },
            ..doc
        };
        assert_eq!(titled.title(), "Getting Started");
    }

    #[test]
    fn test_sections_follow_path_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "docs/api/b.md", "Plain body of b.\n");
        write(
            root,
            "docs/api/a.md",
            "---\ntitle: A\ndescription: First doc\n---\nBody of a.\n",
        );

        let aggregator = Aggregator::new(ContentCollector::new(root));
        let artifact = aggregator.aggregate(&api_config()).expect("aggregate");

        let expected = "# API Docs\n\n\
> HTTP reference\n\n\
## A\n\n\
> First doc\n\n\
Source: `docs/api/a.md`\n\n\
Body of a.\n\n\
---\n\n\
## b\n\n\
Source: `docs/api/b.md`\n\n\
Plain body of b.\n\n\
---\n";
        assert_eq!(artifact.content, expected);
        assert_eq!(artifact.documents, 2);
        assert!(artifact.failures.is_empty());
    }

    #[test]
    fn test_bad_front_matter_is_isolated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "docs/api/a.md", "---\ntitle: [broken\n---\nStill here.\n");
        write(root, "docs/api/b.md", "---\ntitle: Fine\n---\nOk.\n");

        let aggregator = Aggregator::new(ContentCollector::new(root));
        let artifact = aggregator.aggregate(&api_config()).expect("aggregate");

        assert_eq!(artifact.documents, 2);
        assert_eq!(artifact.failures.len(), 1);
        assert_eq!(artifact.failures[0].path, "docs/api/a.md");
        assert!(matches!(artifact.failures[0].kind, FailureKind::FrontMatter(_)));

        assert!(artifact.content.contains("## a\n\n> **Warning:** front matter could not be parsed"));
        assert!(artifact.content.contains("title: [broken"));
        assert!(artifact.content.contains("## Fine"));
    }

    #[test]
    fn test_unreadable_document_is_isolated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("docs/api")).expect("mkdir");
        fs::write(root.join("docs/api/a.md"), [0xff, 0xfe, b'x']).expect("write");
        write(root, "docs/api/b.md", "Readable body.\n");

        let aggregator = Aggregator::new(ContentCollector::new(root));
        let artifact = aggregator.aggregate(&api_config()).expect("aggregate");

        assert_eq!(artifact.documents, 2);
        assert_eq!(artifact.failures.len(), 1);
        assert_eq!(artifact.failures[0].path, "docs/api/a.md");
        assert!(matches!(artifact.failures[0].kind, FailureKind::Unreadable(_)));

        let warning = artifact
            .content
            .find("## a\n\n> **Warning:** file could not be read")
            .expect("marked section for a.md");
        let next = artifact.content.find("## b").expect("section for b.md");
        assert!(warning < next);
        assert!(artifact.content.contains("Readable body."));
    }

    #[test]
    fn test_empty_category_is_self_describing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CategoryConfig::new("Nothing Here", "", &["missing/**/*.md"])
            .expect("config")
            .with_excludes(&["missing/old/**"])
            .expect("excludes");

        let aggregator = Aggregator::new(ContentCollector::new(dir.path()));
        let artifact = aggregator.aggregate(&config).expect("aggregate");

        assert!(artifact.is_empty());
        assert!(artifact.content.starts_with("# Nothing Here\n"));
        assert!(artifact.content.contains("No documents matched this category."));
        assert!(artifact.content.contains("- `missing/**/*.md`"));
        assert!(artifact.content.contains("- `missing/old/**`"));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for name in ["c", "a", "e", "b", "d"] {
            write(root, &format!("docs/api/{name}.md"), &format!("Body {name}\n"));
        }

        let aggregator = Aggregator::new(ContentCollector::new(root));
        let first = aggregator.aggregate(&api_config()).expect("aggregate");
        let second = aggregator.aggregate(&api_config()).expect("aggregate");
        assert_eq!(first, second);
    }

    #[test]
    fn test_overlapping_patterns_emit_each_document_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "docs/api/a.md", "unique-body-marker\n");

        let config = CategoryConfig::new("API", "", &["docs/api/*.md", "docs/**/*.md"])
            .expect("config");
        let aggregator = Aggregator::new(ContentCollector::new(root));
        let artifact = aggregator.aggregate(&config).expect("aggregate");

        assert_eq!(artifact.documents, 1);
        assert_eq!(artifact.content.matches("unique-body-marker").count(), 1);
    }

    #[test]
    fn test_missing_root_fails_whole_aggregation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let aggregator = Aggregator::new(ContentCollector::new(dir.path().join("gone")));
        let err = aggregator.aggregate(&api_config()).unwrap_err();
        assert!(matches!(err, AggregateError::ContentRootUnavailable { .. }));
    }
}
