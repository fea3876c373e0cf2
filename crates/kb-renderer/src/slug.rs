//! Heading anchor ids.

/// Convert heading text to a URL-safe anchor id.
///
/// The text is lower-cased and stripped of `<...>` tags. Only ASCII word
/// characters, whitespace, hyphens and the CJK ranges U+3000–U+9FFF and
/// U+FF00–U+FFEF survive. Whitespace and hyphen runs collapse to a single
/// `-`, and leading or trailing hyphens are dropped.
///
/// No uniqueness is enforced: equal headings produce equal ids.
///
/// # Examples
///
/// ```
/// use kb_renderer::slugify;
///
/// assert_eq!(slugify("Section 1"), "section-1");
/// assert_eq!(slugify("API & Configuration (v2)"), "api-configuration-v2");
/// assert_eq!(slugify("日本語ガイド"), "日本語ガイド");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = strip_tags(&lowered);

    let mut slug = String::with_capacity(stripped.len());
    let mut pending_dash = false;

    for c in stripped.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if is_slug_char(c) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        }
    }

    slug
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || ('\u{3000}'..='\u{9fff}').contains(&c)
        || ('\u{ff00}'..='\u{ffef}').contains(&c)
}

/// Remove `<...>` tags. A `<` without a closing `>` is dropped on its own.
fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        rest = match after.find('>') {
            Some(close) => &after[close + 1..],
            None => after,
        };
    }
    result.push_str(rest);
    result
}
