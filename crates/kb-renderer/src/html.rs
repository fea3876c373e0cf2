//! HTML fragments for elements that need more than a fixed tag.

use std::fmt::Write;

use crate::highlight::Highlighter;
use crate::util::escape_html;

/// Language tag from a fence info string (first whitespace-separated word).
pub(crate) fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next()
}

/// Write a code block, highlighted when a grammar exists for `lang`.
///
/// Tagged blocks carry `class="hljs language-LANG"` whether or not they were
/// highlighted; untagged blocks are plain `<pre><code>`.
pub(crate) fn code_block(
    lang: Option<&str>,
    content: &str,
    highlighter: Option<&Highlighter>,
    out: &mut String,
) {
    let Some(lang) = lang else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
        return;
    };

    let body = highlighter
        .and_then(|h| h.highlight(content, lang))
        .unwrap_or_else(|| escape_html(content));
    write!(
        out,
        r#"<pre><code class="hljs language-{}">{body}</code></pre>"#,
        escape_html(lang)
    )
    .unwrap();
}

pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    write!(
        out,
        r#"<img src="{}" alt="{}""#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
    if !title.is_empty() {
        write!(out, r#" title="{}""#, escape_html(title)).unwrap();
    }
    out.push('>');
}

pub(crate) fn task_list_marker(checked: bool, out: &mut String) {
    if checked {
        out.push_str(r#"<input type="checkbox" checked disabled> "#);
    } else {
        out.push_str(r#"<input type="checkbox" disabled> "#);
    }
}
