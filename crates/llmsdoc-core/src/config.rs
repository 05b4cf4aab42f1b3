//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    category::CategoryKey,
    error::{CoreError, Result},
};

/// Main configuration structure for llmsdoc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Content tree and registry locations.
    #[serde(default)]
    pub content: ContentConfig,

    /// URL layout of the machine-readable endpoints.
    #[serde(default)]
    pub routes: RoutesConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Static build settings.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title, used as the heading of the index document.
    pub title: String,

    /// Base URL for the site (e.g., "https://docs.example.com").
    pub base_url: String,

    /// Site description shown under the index heading.
    #[serde(default)]
    pub description: Option<String>,
}

/// Content configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Root directory every category pattern is relative to.
    #[serde(default = "default_content_root")]
    pub root: PathBuf,

    /// Path of the generated category registry file.
    #[serde(default = "default_registry_path")]
    pub registry: PathBuf,

    /// File extensions considered documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Route configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// URL segment under which the category documents live.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Suffix of the plain-text variant URLs.
    #[serde(default = "default_text_suffix")]
    pub text_suffix: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for prebuilt artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

// Default value functions
fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("categories.toml")
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "mdx".to_string()]
}

fn default_prefix() -> String {
    "llms".to_string()
}

fn default_text_suffix() -> String {
    ".txt".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
            registry: default_registry_path(),
            extensions: default_extensions(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            text_suffix: default_text_suffix(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load configuration, letting `LLMSDOC__SECTION__FIELD` variables override the file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("LLMSDOC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        // The prefix is both a URL segment and a directory under the build output,
        // so it follows the category key grammar exactly: lowercase, no dots.
        let prefix = &self.routes.prefix;
        if !CategoryKey::parse(prefix).is_ok_and(|key| key.as_str() == prefix) {
            return Err(CoreError::config(format!(
                "routes.prefix must be a lowercase segment like `llms` or `llm-docs`, got {prefix:?}"
            )));
        }

        if !self.routes.text_suffix.starts_with('.') || self.routes.text_suffix.len() < 2 {
            return Err(CoreError::config(format!(
                "routes.text_suffix must look like `.txt`, got {:?}",
                self.routes.text_suffix
            )));
        }

        if self.content.extensions.is_empty() {
            return Err(CoreError::config("content.extensions cannot be empty"));
        }

        Ok(())
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
title = "Example Docs"
base_url = "https://docs.example.com"
description = "Docs for machines"

[content]
root = "site/content"
registry = "site/categories.toml"
extensions = ["md"]

[routes]
prefix = "llm"
text_suffix = ".text"

[server]
host = "0.0.0.0"
port = 8080

[build]
output_dir = "dist"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("llmsdoc.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");

        assert_eq!(config.site.title, "Example Docs");
        assert_eq!(config.site.base_url, "https://docs.example.com");
        assert_eq!(config.site.description.as_deref(), Some("Docs for machines"));
        assert_eq!(config.content.root, PathBuf::from("site/content"));
        assert_eq!(config.content.registry, PathBuf::from("site/categories.toml"));
        assert_eq!(config.content.extensions, vec!["md"]);
        assert_eq!(config.routes.prefix, "llm");
        assert_eq!(config.routes.text_suffix, ".text");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.build.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_toml_str(
            r#"
[site]
title = "Minimal"
base_url = "https://example.com"
"#,
        )
        .expect("parse");

        assert_eq!(config.content.root, PathBuf::from("content"));
        assert_eq!(config.content.registry, PathBuf::from("categories.toml"));
        assert_eq!(config.content.extensions, vec!["md", "mdx"]);
        assert_eq!(config.routes.prefix, "llms");
        assert_eq!(config.routes.text_suffix, ".txt");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.build.output_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_url_for() {
        let config = Config::from_toml_str(
            r#"
[site]
title = "Test"
base_url = "https://example.com"
"#,
        )
        .expect("parse");

        assert_eq!(config.url_for("/llms/api"), "https://example.com/llms/api");
        assert_eq!(config.url_for("llms/api"), "https://example.com/llms/api");
    }

    #[test]
    fn test_config_validation_empty_title() {
        let result = Config::from_toml_str(
            r#"
[site]
title = ""
base_url = "https://example.com"
"#,
        );
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("title cannot be empty")
        );
    }

    #[test]
    fn test_config_validation_nested_prefix() {
        let result = Config::from_toml_str(
            r#"
[site]
title = "T"
base_url = "https://example.com"

[routes]
prefix = "docs/llms"
"#,
        );
        assert!(result.unwrap_err().to_string().contains("routes.prefix"));
    }

    #[test]
    fn test_config_validation_unsafe_prefixes() {
        for prefix in [".", "..", "LLMS", "llms.v2", "-llms", "llms--docs", ""] {
            let result = Config::from_toml_str(&format!(
                r#"
[site]
title = "T"
base_url = "https://example.com"

[routes]
prefix = "{prefix}"
"#
            ));
            let err = result.expect_err("prefix should be rejected");
            assert!(err.to_string().contains("routes.prefix"), "{prefix:?}: {err}");
        }

        let config = Config::from_toml_str(
            r#"
[site]
title = "T"
base_url = "https://example.com"

[routes]
prefix = "llm-docs2"
"#,
        )
        .expect("hyphenated prefix is accepted");
        assert_eq!(config.routes.prefix, "llm-docs2");
    }

    #[test]
    fn test_config_validation_text_suffix() {
        let result = Config::from_toml_str(
            r#"
[site]
title = "T"
base_url = "https://example.com"

[routes]
text_suffix = "txt"
"#,
        );
        assert!(result.unwrap_err().to_string().contains("text_suffix"));
    }

    #[test]
    fn test_load_with_env_reads_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("llmsdoc.toml");
        std::fs::write(&config_path, create_test_config()).expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");
        assert_eq!(config.site.title, "Example Docs");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load_with_env(Path::new("/nonexistent/llmsdoc.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
