//! Outgoing document links, used to build the link graph.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::rules::with_md_suffix;

/// `[[target]]` or `[[target|label]]`; group 1 is the target.
static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").unwrap());

/// `[text](href)`; group 2 is the href.
static MD_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// Unique local document paths referenced by a markdown body.
///
/// Wiki link targets come first (with `.md` appended when missing), then
/// `[text](path.md)` hrefs. External (`http://`, `https://`), anchor-only
/// and non-`.md` links are skipped. Order of first appearance is kept.
///
/// # Examples
///
/// ```
/// use kb_renderer::extract_links;
///
/// let links = extract_links("See [[setup]] and [API](api/auth.md), not [site](https://x.io).");
/// assert_eq!(links, ["setup.md", "api/auth.md"]);
/// ```
#[must_use]
pub fn extract_links(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut add = |path: String| {
        if seen.insert(path.clone()) {
            links.push(path);
        }
    };

    for caps in WIKI_LINK_RE.captures_iter(body) {
        let target = caps[1].trim();
        if !target.is_empty() {
            add(with_md_suffix(target));
        }
    }

    for caps in MD_LINK_RE.captures_iter(body) {
        let href = caps[2].trim();
        if is_local_doc(href) {
            add(href.to_owned());
        }
    }

    links
}

#[allow(clippy::case_sensitive_file_extension_comparisons)]
fn is_local_doc(href: &str) -> bool {
    !href.is_empty()
        && !href.starts_with("http://")
        && !href.starts_with("https://")
        && !href.starts_with('#')
        && href.ends_with(".md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wiki_links() {
        assert_eq!(
            extract_links("[[guide]] and [[notes/todo.md]]"),
            vec!["guide.md", "notes/todo.md"]
        );
    }

    #[test]
    fn test_wiki_link_label_ignored() {
        assert_eq!(
            extract_links("[[guide/setup|Setup Guide]]"),
            vec!["guide/setup.md"]
        );
    }

    #[test]
    fn test_markdown_links() {
        assert_eq!(
            extract_links("[A](a.md) [B](./dir/b.md)"),
            vec!["a.md", "./dir/b.md"]
        );
    }

    #[test]
    fn test_excluded_links() {
        let body = "[x](https://example.com/a.md) [y](http://e.com/b.md) \
                    [z](#section) [img](logo.png) [frag](a.md#part)";
        assert!(extract_links(body).is_empty());
    }

    #[test]
    fn test_wiki_links_first_and_deduplicated() {
        assert_eq!(
            extract_links("[B](b.md) [[a]] [[b]] [A](a.md) [[a|again]]"),
            vec!["a.md", "b.md"]
        );
    }

    #[test]
    fn test_blank_targets_skipped() {
        assert!(extract_links("[[  ]] [empty]( )").is_empty());
    }

    #[test]
    fn test_no_links() {
        assert!(extract_links("").is_empty());
        assert!(extract_links("plain text").is_empty());
    }
}
