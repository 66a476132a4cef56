//! HTML sanitizer for untrusted submission and comment bodies.
//!
//! Allowlist-based: tags outside the list are stripped (their text content
//! survives), and surviving tags lose every attribute except a small safe
//! set. Never fails; blank input sanitizes to an empty string.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::unwrap_used)]
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());

#[allow(clippy::unwrap_used)]
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());

#[allow(clippy::unwrap_used)]
static HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

#[allow(clippy::unwrap_used)]
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b([^>]*)>").unwrap());

#[allow(clippy::unwrap_used)]
static SAFE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(href|src|alt|title|style|class|width|height|target|rel)\s*=\s*("[^"]*"|'[^']*')"#,
    )
    .unwrap()
});

/// Tags allowed to survive sanitization.
const ALLOWED_TAGS: &[&str] = &[
    "p",
    "br",
    "hr",
    "b",
    "strong",
    "i",
    "em",
    "u",
    "s",
    "a",
    "ul",
    "ol",
    "li",
    "blockquote",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "pre",
    "code",
    "img",
    "figure",
    "figcaption",
];

/// Sanitize untrusted HTML to the documented allowlist.
#[must_use]
pub fn sanitize_html(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let without_blocks = SCRIPT_BLOCK.replace_all(trimmed, "");
    let without_blocks = STYLE_BLOCK.replace_all(&without_blocks, "");
    let without_comments = HTML_COMMENT.replace_all(&without_blocks, "");

    HTML_TAG
        .replace_all(&without_comments, |caps: &regex::Captures<'_>| {
            let closing = &caps[1];
            let name = caps[2].to_lowercase();
            if !ALLOWED_TAGS.contains(&name.as_str()) {
                return String::new();
            }
            if !closing.is_empty() {
                return format!("</{name}>");
            }
            let attrs = rebuild_safe_attrs(&caps[3]);
            format!("<{name}{attrs}>")
        })
        .into_owned()
}

/// Strip every tag, leaving plain text. Used for comment bodies and excerpts.
#[must_use]
pub fn strip_all(input: &str) -> String {
    let without_blocks = SCRIPT_BLOCK.replace_all(input, "");
    let without_blocks = STYLE_BLOCK.replace_all(&without_blocks, "");
    let without_comments = HTML_COMMENT.replace_all(&without_blocks, "");
    HTML_TAG
        .replace_all(&without_comments, "")
        .trim()
        .to_string()
}

fn rebuild_safe_attrs(raw: &str) -> String {
    let mut out = String::new();
    for caps in SAFE_ATTR.captures_iter(raw) {
        let name = caps[1].to_lowercase();
        let quoted = &caps[2];
        let value = &quoted[1..quoted.len() - 1];
        // Block script-bearing URL schemes on href/src
        if (name == "href" || name == "src") && is_unsafe_url(value) {
            continue;
        }
        if name == "style" && is_unsafe_style(value) {
            continue;
        }
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    out
}

fn is_unsafe_url(value: &str) -> bool {
    let lowered: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();
    lowered.starts_with("javascript:")
        || lowered.starts_with("data:")
        || lowered.starts_with("vbscript:")
}

/// Inline CSS must not reach out: no url() loads, no legacy expression().
fn is_unsafe_style(value: &str) -> bool {
    let lowered: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();
    lowered.contains("url(") || lowered.contains("expression(") || lowered.contains("javascript:")
}
