//! Category keys and per-category configuration records.

use std::{borrow::Borrow, fmt, str::FromStr};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Options used for every pattern match: `*` never crosses a `/`.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Canonical registry key: lowercase alphanumeric segments joined by `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryKey(String);

impl CategoryKey {
    /// Parse a key, folding it to lowercase first.
    pub fn parse(raw: &str) -> Result<Self> {
        let key = raw.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(CoreError::invalid_key(raw, "key is empty"));
        }
        for segment in key.split('-') {
            if segment.is_empty() {
                return Err(CoreError::invalid_key(raw, "empty segment"));
            }
            if let Some(c) = segment
                .chars()
                .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
            {
                return Err(CoreError::invalid_key(
                    raw,
                    format!("unexpected character {c:?}"),
                ));
            }
        }
        Ok(Self(key))
    }

    /// Build a key from URL path segments (`["typescript", "sdk"]` → `typescript-sdk`).
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self> {
        let joined = segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("-");
        Self::parse(&joined)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `-`-separated segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('-')
    }

    /// Hierarchical URL form of the key (`typescript-sdk` → `typescript/sdk`).
    pub fn to_url_path(&self) -> String {
        self.0.replace('-', "/")
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CategoryKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CategoryKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        key.0
    }
}

impl Borrow<str> for CategoryKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Logical grouping of categories in the generated index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexSection {
    General,
    Reference,
    ClientLibraries,
    FeatureAreas,
    /// Catch-all for categories without an assigned section.
    Other,
}

impl IndexSection {
    /// All sections in the order they appear in the index.
    pub const ALL: [IndexSection; 5] = [
        Self::General,
        Self::Reference,
        Self::ClientLibraries,
        Self::FeatureAreas,
        Self::Other,
    ];

    /// Heading used in the index document.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Reference => "Reference",
            Self::ClientLibraries => "Client Libraries",
            Self::FeatureAreas => "Feature Areas",
            Self::Other => "More",
        }
    }
}

/// Validated configuration for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Heading of the aggregated document.
    pub title: String,

    /// Summary shown under the heading.
    pub description: String,

    /// Member patterns, relative to the content root, expanded in order.
    pub patterns: Vec<Pattern>,

    /// Patterns removing paths matched by `patterns`.
    pub exclude_patterns: Vec<Pattern>,

    /// Index grouping; `None` lands in [`IndexSection::Other`].
    pub section: Option<IndexSection>,
}

impl CategoryConfig {
    /// Create a category, compiling and validating its patterns.
    pub fn new<S: AsRef<str>>(
        title: impl Into<String>,
        description: impl Into<String>,
        patterns: &[S],
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CoreError::registry("category title cannot be empty"));
        }
        if patterns.is_empty() {
            return Err(CoreError::registry(format!(
                "category {title:?} has no patterns"
            )));
        }

        Ok(Self {
            patterns: compile_patterns(patterns)?,
            title,
            description: description.into(),
            exclude_patterns: Vec::new(),
            section: None,
        })
    }

    /// Attach exclude patterns.
    pub fn with_excludes<S: AsRef<str>>(mut self, excludes: &[S]) -> Result<Self> {
        self.exclude_patterns = compile_patterns(excludes)?;
        Ok(self)
    }

    /// Assign an index section.
    #[must_use]
    pub fn with_section(mut self, section: IndexSection) -> Self {
        self.section = Some(section);
        self
    }

    /// Section this category is listed under.
    pub fn index_section(&self) -> IndexSection {
        self.section.unwrap_or(IndexSection::Other)
    }

    /// Whether a `/`-separated path relative to the content root is excluded.
    pub fn is_excluded(&self, relative: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|p| p.matches_with(relative, MATCH_OPTIONS))
    }

    /// Raw pattern strings, in order.
    pub fn pattern_strings(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::as_str).collect()
    }
}

fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                return Err(CoreError::registry("empty glob pattern"));
            }
            if raw.starts_with('/') {
                return Err(CoreError::registry(format!(
                    "pattern {raw:?} must be relative to the content root"
                )));
            }
            if raw.split('/').any(|segment| segment == "..") {
                return Err(CoreError::registry(format!(
                    "pattern {raw:?} escapes the content root"
                )));
            }
            Pattern::new(raw)
                .map_err(|e| CoreError::registry(format!("invalid glob pattern {raw:?}: {e}")))
        })
        .collect()
}

/// On-disk form of a category entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySpec {
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub patterns: Vec<String>,

    #[serde(default, alias = "excludePatterns", skip_serializing_if = "Vec::is_empty")]
    pub exclude_patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<IndexSection>,
}

impl TryFrom<CategorySpec> for CategoryConfig {
    type Error = CoreError;

    fn try_from(spec: CategorySpec) -> Result<Self> {
        let mut config = CategoryConfig::new(spec.title, spec.description, &spec.patterns)?
            .with_excludes(&spec.exclude_patterns)?;
        config.section = spec.section;
        Ok(config)
    }
}

impl From<&CategoryConfig> for CategorySpec {
    fn from(config: &CategoryConfig) -> Self {
        let strings = |patterns: &[Pattern]| {
            patterns
                .iter()
                .map(|p| p.as_str().to_string())
                .collect::<Vec<_>>()
        };
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            patterns: strings(&config.patterns),
            exclude_patterns: strings(&config.exclude_patterns),
            section: config.section,
        }
    }
}
