//! The category registry: an immutable table from key to configuration.
//!
//! The registry is produced out-of-band (see the generator's scanner) and
//! loaded once. Live servers swap in a whole new table through
//! [`SharedRegistry`] rather than editing entries in place.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    category::{CategoryConfig, CategoryKey, CategorySpec},
    error::{CoreError, Result},
};

/// On-disk registry layout: `[categories.<key>]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    categories: BTreeMap<String, CategorySpec>,
}

/// Ordered, immutable mapping from category key to configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: BTreeMap<CategoryKey, CategoryConfig>,
}

impl CategoryRegistry {
    /// Build a registry from key/config pairs.
    ///
    /// Fails if two entries share a key.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (CategoryKey, CategoryConfig)>,
    {
        let mut categories = BTreeMap::new();
        for (key, config) in entries {
            if categories.contains_key(&key) {
                return Err(CoreError::registry(format!("duplicate category key `{key}`")));
            }
            categories.insert(key, config);
        }
        Ok(Self { categories })
    }

    /// Build a registry from raw, not yet validated entries.
    ///
    /// Keys are case-folded; two raw keys folding to the same key are a collision.
    pub fn from_specs(specs: BTreeMap<String, CategorySpec>) -> Result<Self> {
        let mut categories: BTreeMap<CategoryKey, CategoryConfig> = BTreeMap::new();
        let mut raw_keys: BTreeMap<CategoryKey, String> = BTreeMap::new();

        for (raw_key, spec) in specs {
            let key = CategoryKey::parse(&raw_key)
                .map_err(|e| CoreError::registry(e.to_string()))?;
            if let Some(previous) = raw_keys.get(&key) {
                return Err(CoreError::registry(format!(
                    "category keys `{previous}` and `{raw_key}` both normalize to `{key}`"
                )));
            }
            let config = CategoryConfig::try_from(spec)
                .map_err(|e| CoreError::registry(format!("category `{raw_key}`: {e}")))?;

            debug!(key = %key, patterns = config.patterns.len(), "registered category");
            raw_keys.insert(key.clone(), raw_key);
            categories.insert(key, config);
        }

        Ok(Self { categories })
    }

    /// Load a registry file. `.json` files are read as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Category registry not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let registry = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        info!(
            path = %path.display(),
            categories = registry.len(),
            "loaded category registry"
        );
        Ok(registry)
    }

    /// Parse a TOML registry document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content)?;
        Self::from_specs(file.categories)
    }

    /// Parse a JSON registry document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(content)?;
        Self::from_specs(file.categories)
    }

    /// Serialize to the TOML registry format.
    pub fn to_toml(&self) -> Result<String> {
        let file = RegistryFile {
            categories: self
                .categories
                .iter()
                .map(|(key, config)| (key.to_string(), CategorySpec::from(config)))
                .collect(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Look up a category by key.
    pub fn get(&self, key: &CategoryKey) -> Option<&CategoryConfig> {
        self.categories.get(key)
    }

    /// Look up a category by an unnormalized key string.
    pub fn lookup(&self, raw: &str) -> Option<(&CategoryKey, &CategoryConfig)> {
        let key = CategoryKey::parse(raw).ok()?;
        self.categories.get_key_value(key.as_str())
    }

    /// Whether the key is registered.
    pub fn contains(&self, key: &CategoryKey) -> bool {
        self.categories.contains_key(key)
    }

    /// All registered keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &CategoryKey> {
        self.categories.keys()
    }

    /// All entries, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &CategoryConfig)> {
        self.categories.iter()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no categories are registered.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A registry snapshot that can be replaced as a whole while readers hold
/// older snapshots.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    current: Arc<RwLock<Arc<CategoryRegistry>>>,
}

impl SharedRegistry {
    /// Wrap an initial registry.
    pub fn new(registry: CategoryRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// The registry in effect right now.
    pub fn snapshot(&self) -> Arc<CategoryRegistry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new registry, returning the one it replaced.
    pub fn replace(&self, registry: CategoryRegistry) -> Arc<CategoryRegistry> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(registry))
    }
}
