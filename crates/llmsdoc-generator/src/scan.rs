//! Registry generation.
//!
//! Scans the content tree and proposes one category per directory that
//! contains documents, plus an umbrella `all` category. The result is written
//! to the registry file and loaded like a hand-written one.

use std::{collections::BTreeMap, fs, path::PathBuf};

use llmsdoc_core::{
    CategoryConfig, CategoryKey, CategoryRegistry, CoreError, IndexSection,
    frontmatter::parse_frontmatter,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collector::{CollectorError, ContentCollector};

/// Key of the umbrella category.
pub const ALL_KEY: &str = "all";

/// Registry scan errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Content tree could not be listed.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// The proposed registry is invalid.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for scans.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Builds a [`CategoryRegistry`] from the directory layout of the content root.
#[derive(Debug, Clone)]
pub struct RegistryScanner {
    collector: ContentCollector,
    max_depth: usize,
}

impl RegistryScanner {
    /// Create a scanner; directories up to three levels deep become categories.
    #[must_use]
    pub fn new(collector: ContentCollector) -> Self {
        Self {
            collector,
            max_depth: 3,
        }
    }

    /// Limit how deep directories become categories.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Scan the content root.
    pub fn scan(&self) -> Result<CategoryRegistry> {
        let candidates = self.collector.candidates()?;

        // Directory (as `/`-joined components) -> raw components.
        let mut directories: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for relative in &candidates {
            let components: Vec<&str> = relative.split('/').collect();
            let dir_components = &components[..components.len() - 1];
            for depth in 1..=dir_components.len().min(self.max_depth) {
                let dir = &dir_components[..depth];
                directories
                    .entry(dir.join("/"))
                    .or_insert_with(|| dir.iter().map(|c| c.to_string()).collect());
            }
        }

        let mut entries: BTreeMap<CategoryKey, (String, CategoryConfig)> = BTreeMap::new();
        for (dir, components) in &directories {
            let Some(key) = key_for(components) else {
                warn!(dir = %dir, "directory name yields no usable category key");
                continue;
            };
            if let Some((other, _)) = entries.get(&key) {
                return Err(CoreError::registry(format!(
                    "directories `{other}` and `{dir}` both map to category `{key}`"
                ))
                .into());
            }

            let config = self.directory_category(&key, dir, components)?;
            debug!(key = %key, dir = %dir, "proposed category");
            entries.insert(key, (dir.clone(), config));
        }

        let all_key = CategoryKey::parse(ALL_KEY)?;
        if entries.contains_key(&all_key) {
            warn!("a content directory already maps to `all`; skipping umbrella category");
        } else {
            let patterns = self.patterns_under(None);
            let config = CategoryConfig::new(
                "All Documentation",
                "Every document in the content tree.",
                &patterns,
            )?
            .with_section(IndexSection::General);
            entries.insert(all_key, (String::new(), config));
        }

        let registry =
            CategoryRegistry::from_entries(entries.into_iter().map(|(k, (_, c))| (k, c)))?;
        info!(
            root = %self.collector.root().display(),
            categories = registry.len(),
            "scanned content tree"
        );
        Ok(registry)
    }

    fn directory_category(
        &self,
        key: &CategoryKey,
        dir: &str,
        components: &[String],
    ) -> Result<CategoryConfig> {
        let escaped: Vec<_> = components
            .iter()
            .map(|c| glob::Pattern::escape(c))
            .collect();
        let patterns = self.patterns_under(Some(&escaped.join("/")));

        let landing = self.landing_frontmatter(dir);
        let title = landing
            .as_ref()
            .and_then(|(title, _)| title.clone())
            .unwrap_or_else(|| title_case(components.last().map(String::as_str).unwrap_or(dir)));
        let description = landing
            .and_then(|(_, description)| description)
            .unwrap_or_else(|| format!("Documentation under `{dir}/`."));

        Ok(CategoryConfig::new(title, description, &patterns)?.with_section(section_for(key)))
    }

    fn patterns_under(&self, dir: Option<&str>) -> Vec<String> {
        self.collector
            .extensions()
            .iter()
            .map(|ext| match dir {
                Some(dir) => format!("{dir}/**/*.{ext}"),
                None => format!("**/*.{ext}"),
            })
            .collect()
    }

    /// Title and description from the directory's `index` document, if any.
    fn landing_frontmatter(&self, dir: &str) -> Option<(Option<String>, Option<String>)> {
        self.collector.extensions().iter().find_map(|ext| {
            let path: PathBuf = self.collector.root().join(dir).join(format!("index.{ext}"));
            let raw = fs::read_to_string(&path).ok()?;
            match parse_frontmatter(&raw, &path) {
                Ok((fm, _)) => Some((fm.title, fm.description)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring landing page front matter");
                    None
                }
            }
        })
    }
}

/// Flatten directory components into a key: lowercase, non-alphanumerics become `-`.
fn key_for(components: &[String]) -> Option<CategoryKey> {
    let sanitized: Vec<String> = components
        .iter()
        .map(|component| {
            component
                .to_ascii_lowercase()
                .split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("-")
        })
        .filter(|s| !s.is_empty())
        .collect();
    CategoryKey::from_segments(&sanitized).ok()
}

fn section_for(key: &CategoryKey) -> IndexSection {
    let key = key.as_str();
    if key == ALL_KEY || key == "getting-started" || key == "introduction" {
        IndexSection::General
    } else if key == "api" || key.starts_with("api-") || key.starts_with("reference") {
        IndexSection::Reference
    } else if key.split('-').any(|segment| segment == "sdk" || segment == "sdks") {
        IndexSection::ClientLibraries
    } else {
        IndexSection::FeatureAreas
    }
}

fn title_case(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
