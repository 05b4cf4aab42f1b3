//! Frontmatter parsing for content files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Frontmatter metadata for content files.
///
/// Only the fields the aggregator renders are kept; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Document title.
    #[serde(default)]
    pub title: Option<String>,

    /// One-line summary of the document.
    #[serde(default)]
    pub description: Option<String>,
}

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Outcome of looking for a frontmatter block.
#[derive(Debug, PartialEq, Eq)]
pub enum Split<'a> {
    /// The document does not open with a delimiter line.
    Absent,
    /// An opening delimiter without a matching closing line.
    Unterminated(FrontmatterFormat),
    /// A complete block: format, raw frontmatter text, body.
    Block(FrontmatterFormat, &'a str, &'a str),
}

/// Split content into frontmatter and body.
///
/// Delimiters must sit on their own line; a `---` inside a paragraph does not
/// close the block.
pub fn split_frontmatter(content: &str) -> Split<'_> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    let Some(first_line) = content.lines().next() else {
        return Split::Absent;
    };
    let format = match first_line.trim_end() {
        "---" => FrontmatterFormat::Yaml,
        "+++" => FrontmatterFormat::Toml,
        _ => return Split::Absent,
    };
    let delimiter = format.delimiter();

    let after_first = &content[first_line.len()..];
    let after_first = after_first.strip_prefix("\r\n").unwrap_or(after_first);
    let after_first = after_first.strip_prefix('\n').unwrap_or(after_first);

    let mut offset = 0;
    for line in after_first.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let frontmatter = after_first[..offset].trim();
            let body = after_first[offset + line.len()..].trim_start();
            return Split::Block(format, frontmatter, body);
        }
        offset += line.len();
    }

    Split::Unterminated(format)
}

/// Parse frontmatter from a string.
///
/// Content without a frontmatter block yields default metadata and the full text.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let (format, fm_str, body) = match split_frontmatter(content) {
        Split::Absent => return Ok((Frontmatter::default(), content.to_string())),
        Split::Unterminated(format) => {
            return Err(CoreError::frontmatter(
                path,
                format!("missing closing `{}` delimiter", format.delimiter()),
            ));
        }
        Split::Block(format, fm_str, body) => (format, fm_str, body),
    };

    if fm_str.is_empty() {
        return Ok((Frontmatter::default(), body.to_string()));
    }

    let frontmatter: Frontmatter = match format {
        FrontmatterFormat::Yaml => {
            serde_yaml::from_str(fm_str).map_err(|e| CoreError::frontmatter(path, e.to_string()))?
        }
        FrontmatterFormat::Toml => {
            toml::from_str(fm_str).map_err(|e| CoreError::frontmatter(path, e.to_string()))?
        }
    };

    Ok((frontmatter.normalized(), body.to_string()))
}

impl Frontmatter {
    /// Drop blank values so callers can rely on `Some` meaning "has text".
    fn normalized(self) -> Self {
        let keep = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            title: keep(self.title),
            description: keep(self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_yaml_frontmatter() {
        let content = r#"---
title: "Hello World"
---

This is the body content."#;

        let Split::Block(format, fm, body) = split_frontmatter(content) else {
            panic!("expected a frontmatter block");
        };
        assert_eq!(format, FrontmatterFormat::Yaml);
        assert!(fm.contains("title:"));
        assert!(body.starts_with("This is the body"));
    }

    #[test]
    fn test_split_toml_frontmatter() {
        let content = "+++\ntitle = \"Hello\"\n+++\nBody";

        let Split::Block(format, fm, body) = split_frontmatter(content) else {
            panic!("expected a frontmatter block");
        };
        assert_eq!(format, FrontmatterFormat::Toml);
        assert_eq!(fm, "title = \"Hello\"");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_crlf_frontmatter() {
        let content = "---\r\ntitle: A\r\n---\r\nBody\r\n";
        let Split::Block(_, fm, body) = split_frontmatter(content) else {
            panic!("expected a frontmatter block");
        };
        assert_eq!(fm, "title: A");
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_no_frontmatter() {
        assert_eq!(
            split_frontmatter("Just some content without frontmatter."),
            Split::Absent
        );
        assert_eq!(split_frontmatter(""), Split::Absent);
        assert_eq!(split_frontmatter("----\nnot a block"), Split::Absent);
    }

    #[test]
    fn test_inline_delimiter_does_not_close_block() {
        let content = "---\ntitle: a---b\n---\nBody";
        let Split::Block(_, fm, body) = split_frontmatter(content) else {
            panic!("expected a frontmatter block");
        };
        assert_eq!(fm, "title: a---b");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unterminated_block() {
        let content = "---\ntitle: never closed\n\nBody";
        assert_eq!(
            split_frontmatter(content),
            Split::Unterminated(FrontmatterFormat::Yaml)
        );

        let err = parse_frontmatter(content, Path::new("a.md")).unwrap_err();
        assert!(err.to_string().contains("missing closing `---`"));
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: "Test Post"
description: A short summary
sidebar_position: 3
tags:
  - rust
---

Content here."#;

        let (fm, body) = parse_frontmatter(content, Path::new("test.md")).expect("parse");

        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.description.as_deref(), Some("A short summary"));
        assert_eq!(body, "Content here.");
    }

    #[test]
    fn test_parse_toml_frontmatter() {
        let content = r#"+++
title = "Test Post"
weight = 4
+++

Content here."#;

        let (fm, body) = parse_frontmatter(content, Path::new("test.md")).expect("parse");

        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert!(fm.description.is_none());
        assert_eq!(body, "Content here.");
    }

    #[test]
    fn test_parse_without_frontmatter_keeps_full_text() {
        let content = "# Heading\n\nParagraph.\n";
        let (fm, body) = parse_frontmatter(content, Path::new("b.md")).expect("parse");
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block_and_blank_values() {
        let (fm, body) = parse_frontmatter("---\n---\nBody", Path::new("a.md")).expect("parse");
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "Body");

        let (fm, _) =
            parse_frontmatter("---\ntitle: \"  \"\n---\nBody", Path::new("a.md")).expect("parse");
        assert!(fm.title.is_none());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        let err = parse_frontmatter(content, Path::new("docs/bad.md")).unwrap_err();
        assert!(err.to_string().contains("docs/bad.md"));
    }
}
