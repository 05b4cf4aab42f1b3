//! Static path enumeration.
//!
//! The prebuilt output has one file per registered key plus the index; a key
//! missing here would be a category that only works with a live server.

use std::path::{Path, PathBuf};

use llmsdoc_core::CategoryRegistry;

/// Path segments for every static artifact: the index (`[]`) first, then
/// each key in key order.
pub fn enumerate(registry: &CategoryRegistry) -> Vec<Vec<String>> {
    std::iter::once(Vec::new())
        .chain(
            registry
                .keys()
                .map(|key| key.segments().map(str::to_string).collect()),
        )
        .collect()
}

/// Where the artifact for `segments` is written below `output_dir`.
pub fn output_path<S: AsRef<str>>(output_dir: &Path, prefix: &str, segments: &[S]) -> PathBuf {
    let mut path = output_dir.join(prefix);
    for segment in segments {
        path.push(segment.as_ref());
    }
    path.join("index.md")
}
