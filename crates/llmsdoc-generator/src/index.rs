//! Index generation.
//!
//! Produces the table of contents served at the bare routing prefix: every
//! registered category exactly once, grouped by [`IndexSection`].

use llmsdoc_core::{CategoryKey, CategoryRegistry, Config, IndexSection, Resolver};

/// One listed category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: CategoryKey,
    pub title: String,
    pub description: String,
    /// Absolute URL of the markdown document.
    pub url: String,
    /// Absolute URL of the plain-text variant.
    pub text_url: String,
}

/// Index generator.
#[derive(Debug, Clone)]
pub struct IndexGenerator {
    config: Config,
    resolver: Resolver,
}

impl IndexGenerator {
    /// Create a new index generator.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let resolver = Resolver::new(config.routes.prefix.clone());
        Self { config, resolver }
    }

    /// Entries grouped by section, sections in display order, empty sections omitted.
    pub fn sections(&self, registry: &CategoryRegistry) -> Vec<(IndexSection, Vec<IndexEntry>)> {
        IndexSection::ALL
            .iter()
            .map(|section| {
                let entries: Vec<_> = registry
                    .iter()
                    .filter(|(_, config)| config.index_section() == *section)
                    .map(|(key, config)| self.entry(key, &config.title, &config.description))
                    .collect();
                (*section, entries)
            })
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }

    fn entry(&self, key: &CategoryKey, title: &str, description: &str) -> IndexEntry {
        let url = self.config.url_for(&self.resolver.path_for(key));
        IndexEntry {
            key: key.clone(),
            title: title.to_string(),
            description: description.to_string(),
            text_url: format!("{url}{}", self.config.routes.text_suffix),
            url,
        }
    }

    /// Render the index document.
    pub fn generate(&self, registry: &CategoryRegistry) -> String {
        let mut out = format!("# {}\n\n", self.config.site.title);
        if let Some(description) = &self.config.site.description {
            out.push_str(&format!("> {description}\n\n"));
        }
        out.push_str(
            "Each category below is one markdown document concatenating every page \
             in that part of the documentation.\n\n",
        );

        let sections = self.sections(registry);
        if sections.is_empty() {
            out.push_str("No categories are registered.\n");
            return out;
        }

        for (section, entries) in &sections {
            out.push_str(&format!("## {}\n\n", section.heading()));
            for entry in entries {
                out.push_str(&format!("- [{}]({})", entry.title, entry.url));
                if !entry.description.is_empty() {
                    out.push_str(&format!(": {}", entry.description));
                }
                out.push_str(&format!(" ([plain text]({}))\n", entry.text_url));
            }
            out.push('\n');
        }

        self.push_usage(&mut out, registry);
        out
    }

    fn push_usage(&self, out: &mut String, registry: &CategoryRegistry) {
        let Some(first) = registry.keys().next() else {
            return;
        };
        let index_url = self.config.url_for(&self.resolver.index_path());
        let first_url = self.config.url_for(&self.resolver.path_for(first));

        out.push_str("## Usage\n\n");
        out.push_str("Fetch one category as markdown:\n\n");
        out.push_str(&format!("```sh\ncurl {first_url}\n```\n\n"));
        out.push_str(&format!(
            "Append `{}` for the plain-text variant, or fetch this index again at {index_url}.\n",
            self.config.routes.text_suffix
        ));

        if let Some(nested) = registry.keys().find(|key| key.segments().nth(1).is_some()) {
            out.push_str(&format!(
                "\nKeys with several segments map onto nested paths: `{nested}` is served at `{}`.\n",
                self.resolver.path_for(nested)
            ));
        }
    }
}
