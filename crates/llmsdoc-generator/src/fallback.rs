//! Documents served when a category cannot be produced.

use llmsdoc_core::{CategoryKey, Resolver};

/// Markdown body for an unknown category, listing every valid one.
pub fn not_found(resolver: &Resolver, attempted: &str, available: &[CategoryKey]) -> String {
    let mut out = String::from("# Category not found\n\n");
    out.push_str(&format!(
        "No documentation category is registered under `{attempted}`.\n\n"
    ));

    if available.is_empty() {
        out.push_str("No categories are registered.\n");
        return out;
    }

    out.push_str("Available categories:\n\n");
    for key in available {
        out.push_str(&format!("- `{key}`: {}\n", resolver.path_for(key)));
    }
    out.push_str(&format!(
        "\nThe full index is served at {}.\n",
        resolver.index_path()
    ));
    out
}

/// Markdown body for a category that failed to aggregate as a whole.
pub fn aggregation_failed(resolver: &Resolver, key: &CategoryKey, reason: &str) -> String {
    format!(
        "# Documentation unavailable\n\n\
         The `{key}` category could not be generated: {reason}\n\n\
         Try again later, or start from the index at {}.\n",
        resolver.index_path()
    )
}
