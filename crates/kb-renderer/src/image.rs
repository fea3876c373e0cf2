//! Relative image path resolution.

use std::borrow::Cow;

/// Default endpoint serving raw repository files.
pub const DEFAULT_RAW_PREFIX: &str = "/api/v1/raw/";

/// Rewrites relative asset references against a document's directory.
///
/// Built per render call from the document path; holds no shared state.
///
/// # Examples
///
/// ```
/// use kb_renderer::{DEFAULT_RAW_PREFIX, ImageResolver};
///
/// let resolver = ImageResolver::new(DEFAULT_RAW_PREFIX, "docs/guide.md");
/// assert_eq!(resolver.resolve("./images/x.png"), "/api/v1/raw/docs/images/x.png");
/// assert_eq!(resolver.resolve("https://example.com/a.png"), "https://example.com/a.png");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageResolver<'a> {
    raw_prefix: &'a str,
    /// Directory of the current document, with trailing `/` (or empty).
    dir: &'a str,
}

impl<'a> ImageResolver<'a> {
    /// Create a resolver for the document at `doc_path`.
    #[must_use]
    pub fn new(raw_prefix: &'a str, doc_path: &'a str) -> Self {
        Self {
            raw_prefix,
            dir: parent_dir(doc_path),
        }
    }

    /// Directory part of the document path (`"docs/"` for `"docs/guide.md"`).
    #[must_use]
    pub fn dir(&self) -> &str {
        self.dir
    }

    /// Resolve an asset URL.
    ///
    /// Scheme-prefixed (`https://`, `data:`) and root-relative (`/…`) URLs are
    /// returned unchanged. Anything else has a leading `./` stripped and is
    /// rooted under the raw prefix joined with the document directory.
    pub fn resolve<'u>(&self, url: &'u str) -> Cow<'u, str> {
        if url.is_empty() || url.starts_with('/') || has_scheme(url) {
            return Cow::Borrowed(url);
        }

        let clean = url.strip_prefix("./").unwrap_or(url);
        Cow::Owned(format!("{}{}{clean}", self.raw_prefix, self.dir))
    }
}

/// Everything up to and including the last `/`, or empty.
fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..=i])
}

/// RFC 3986 scheme check: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`.
fn has_scheme(url: &str) -> bool {
    let Some(colon) = url.find(':') else {
        return false;
    };
    let scheme = &url[..colon];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
