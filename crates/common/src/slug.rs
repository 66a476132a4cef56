//! Slug derivation for post URLs.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[allow(clippy::unwrap_used)]
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w-]").unwrap());

#[allow(clippy::unwrap_used)]
static MULTIPLE_DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Derive a URL-safe slug from a title.
///
/// Example: "How to Prepare for IGCSE Physics!" becomes
/// `how-to-prepare-for-igcse-physics`. Blank input yields an empty string;
/// the caller decides how to disambiguate collisions.
#[must_use]
pub fn slugify(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let slug = WHITESPACE.replace_all(input.trim(), "-");
    let slug = NON_SLUG.replace_all(&slug, "");
    let slug = MULTIPLE_DASHES.replace_all(&slug, "-");
    slug.to_lowercase().trim_matches('-').to_string()
}
