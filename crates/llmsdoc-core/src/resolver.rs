//! Maps request paths onto registry keys.

use crate::{
    category::{CategoryConfig, CategoryKey},
    registry::CategoryRegistry,
};

/// Result of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No category segments: serve the index.
    Index,
    /// A registered category.
    Found {
        key: CategoryKey,
        config: CategoryConfig,
    },
    /// Nothing registered under the attempted key.
    NotFound {
        attempted: String,
        available: Vec<CategoryKey>,
    },
}

/// Resolves hierarchical request paths (`/llms/typescript/sdk`) to flat keys
/// (`typescript-sdk`).
#[derive(Debug, Clone)]
pub struct Resolver {
    prefix: String,
}

impl Resolver {
    /// Create a resolver for paths mounted under `/{prefix}`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_ascii_lowercase();
        Self { prefix }
    }

    /// The routing prefix, without slashes.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Canonical, lowercased category segments of a raw request path.
    ///
    /// Query strings and fragments are dropped, repeated and trailing slashes
    /// collapse, the routing prefix is stripped when present and a trailing
    /// `.md` on the last segment is ignored.
    pub fn segments(&self, raw_path: &str) -> Vec<String> {
        let path = raw_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let mut segments: Vec<String> = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if segments.first().is_some_and(|first| *first == self.prefix) {
            segments.remove(0);
        }

        if let Some(last) = segments.last_mut()
            && let Some(stem) = last.strip_suffix(".md")
        {
            *last = stem.to_string();
        }
        segments.retain(|s| !s.is_empty());

        segments
    }

    /// Resolve a request path against a registry snapshot.
    pub fn resolve(&self, registry: &CategoryRegistry, raw_path: &str) -> Resolution {
        let segments = self.segments(raw_path);
        if segments.is_empty() {
            return Resolution::Index;
        }

        let attempted = segments.join("-");
        let found = CategoryKey::parse(&attempted)
            .ok()
            .and_then(|key| registry.get(&key).map(|config| (key, config.clone())));

        match found {
            Some((key, config)) => Resolution::Found { key, config },
            None => {
                tracing::debug!(attempted = %attempted, "unknown category");
                Resolution::NotFound {
                    attempted,
                    available: registry.keys().cloned().collect(),
                }
            }
        }
    }

    /// Canonical request path for a key (`/llms/typescript/sdk/common`).
    pub fn path_for(&self, key: &CategoryKey) -> String {
        format!("/{}/{}", self.prefix, key.to_url_path())
    }

    /// Request path of the index.
    pub fn index_path(&self) -> String {
        format!("/{}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::from_toml_str(
            r#"
[categories.api]
title = "API Docs"
patterns = ["docs/api/**/*.md"]

[categories.typescript-sdk-common]
title = "TypeScript SDK: Common"
patterns = ["sdk/typescript/common/**/*.mdx"]
"#,
        )
        .expect("registry")
    }

    #[test]
    fn test_every_key_resolves_through_its_path() {
        let registry = registry();
        let resolver = Resolver::new("llms");

        for (key, config) in registry.iter() {
            match resolver.resolve(&registry, &resolver.path_for(key)) {
                Resolution::Found {
                    key: found,
                    config: found_config,
                } => {
                    assert_eq!(&found, key);
                    assert_eq!(&found_config, config);
                }
                other => panic!("expected {key} to resolve, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_hierarchical_path_resolves() {
        let resolver = Resolver::new("llms");
        let resolution = resolver.resolve(&registry(), "/llms/typescript/sdk/common");
        assert!(matches!(
            resolution,
            Resolution::Found { ref key, .. } if key.as_str() == "typescript-sdk-common"
        ));
    }

    #[test]
    fn test_unknown_path_lists_available_keys() {
        let resolver = Resolver::new("llms");
        match resolver.resolve(&registry(), "/llms/nonexistent/thing") {
            Resolution::NotFound {
                attempted,
                available,
            } => {
                assert_eq!(attempted, "nonexistent-thing");
                let available: Vec<_> = available.iter().map(CategoryKey::as_str).collect();
                assert_eq!(available, vec!["api", "typescript-sdk-common"]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_index_paths() {
        let resolver = Resolver::new("llms");
        let registry = registry();
        for path in ["/llms", "/llms/", "llms", "//llms//", "/"] {
            assert_eq!(resolver.resolve(&registry, path), Resolution::Index, "{path}");
        }
    }

    #[test]
    fn test_non_canonical_forms_normalize_to_the_same_key() {
        let resolver = Resolver::new("llms");
        let canonical = resolver.segments("/llms/typescript/sdk/common");
        for path in [
            "/llms/typescript/sdk/common/",
            "/llms//typescript///sdk/common",
            "/LLMS/TypeScript/SDK/Common",
            "/llms/typescript-sdk/common",
            "/llms/typescript/sdk/common.md",
            "/llms/typescript/sdk/common?format=raw",
        ] {
            assert_eq!(resolver.segments(path).join("-"), canonical.join("-"), "{path}");
        }
    }

    #[test]
    fn test_invalid_characters_are_not_found() {
        let resolver = Resolver::new("llms");
        assert!(matches!(
            resolver.resolve(&registry(), "/llms/api_docs"),
            Resolution::NotFound { ref attempted, .. } if attempted == "api_docs"
        ));
    }

    #[test]
    fn test_paths_without_prefix() {
        let resolver = Resolver::new("/llms/");
        assert_eq!(resolver.prefix(), "llms");
        assert_eq!(resolver.index_path(), "/llms");
        assert!(matches!(
            resolver.resolve(&registry(), "api"),
            Resolution::Found { .. }
        ));
    }
}
