//! Container directive preprocessing.
//!
//! Container directives wrap markdown in a named block:
//!
//! ```text
//! :::warning Optional title
//! Body **markdown**
//! :::
//! ```
//!
//! Matched blocks are rewritten into raw HTML wrappers with blank-line padding
//! so pulldown-cmark passes the wrapper through and still parses the body as
//! markdown. The `details` variant becomes a `<details>` disclosure whose
//! summary is the title; every other name becomes
//! `<div class="container-NAME">`.

use crate::fence::FenceTracker;
use crate::util::escape_html;

/// Marker assigned to a line after pairing openers with closers.
enum Marker<'a> {
    Open(Opener<'a>),
    Close { details: bool },
}

/// Parsed `:::name [title]` line.
#[derive(Debug, PartialEq, Eq)]
struct Opener<'a> {
    name: &'a str,
    title: Option<&'a str>,
}

impl Opener<'_> {
    fn is_details(&self) -> bool {
        self.name == "details"
    }
}

/// Rewrite `:::name` ... `:::` container blocks into passthrough HTML.
///
/// Containers may nest. Markers inside fenced code blocks are ignored, and
/// unmatched openers or stray closers are left as literal text.
///
/// # Examples
///
/// ```
/// use kb_renderer::preprocess_containers;
///
/// let out = preprocess_containers(":::tip\nUse **bold**.\n:::");
/// assert_eq!(out, "<div class=\"container-tip\">\n\nUse **bold**.\n\n</div>");
/// ```
#[must_use]
pub fn preprocess_containers(source: &str) -> String {
    if !source.contains(":::") {
        return source.to_owned();
    }

    let lines: Vec<&str> = source.split('\n').collect();
    let markers = pair_markers(&lines);

    let mut output = String::with_capacity(source.len() + 64);
    for (i, (line, marker)) in lines.iter().zip(markers).enumerate() {
        if i > 0 {
            output.push('\n');
        }
        match marker {
            None => output.push_str(line),
            Some(Marker::Open(opener)) => write_open(&opener, &mut output),
            Some(Marker::Close { details }) => {
                output.push_str(if details { "\n</details>" } else { "\n</div>" });
            }
        }
    }
    output
}

/// Pair openers with closers using a stack, skipping fenced code.
fn pair_markers<'a>(lines: &[&'a str]) -> Vec<Option<Marker<'a>>> {
    let mut markers: Vec<Option<Marker<'a>>> = lines.iter().map(|_| None).collect();
    let mut fence = FenceTracker::default();
    let mut open: Vec<(usize, Opener<'a>)> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if fence.in_fence() {
            fence.update(line);
            continue;
        }

        if let Some(opener) = parse_opener(line) {
            open.push((i, opener));
        } else if is_closer(line) {
            if let Some((start, opener)) = open.pop() {
                markers[i] = Some(Marker::Close {
                    details: opener.is_details(),
                });
                markers[start] = Some(Marker::Open(opener));
            }
        } else {
            fence.update(line);
        }
    }

    markers
}

fn write_open(opener: &Opener<'_>, out: &mut String) {
    if opener.is_details() {
        out.push_str(r#"<details class="container-details"><summary>"#);
        out.push_str(&escape_html(opener.title.unwrap_or("")));
        out.push_str("</summary>\n");
    } else {
        out.push_str(r#"<div class="container-"#);
        out.push_str(opener.name);
        out.push_str("\">\n");
    }
}

/// Parse a line-anchored `:::name` or `:::name title` opener.
fn parse_opener(line: &str) -> Option<Opener<'_>> {
    let rest = line.trim_end().strip_prefix(":::")?;
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }

    let (name, tail) = rest.split_at(name_len);
    if tail.is_empty() {
        return Some(Opener { name, title: None });
    }
    if !tail.starts_with([' ', '\t']) {
        return None;
    }

    let title = tail.trim();
    Some(Opener {
        name,
        title: (!title.is_empty()).then_some(title),
    })
}

fn is_closer(line: &str) -> bool {
    line.trim_end() == ":::"
}
