//! Wiki links: `[[target]]` and `[[target|label]]`.

use std::fmt::Write;

use super::{Level, Rule, RuleContext, Span, Token};
use crate::util::escape_html;

/// Inline rule for wiki links.
///
/// The target is trimmed and gets a `.md` suffix when it has none. Without an
/// explicit label the last path segment of the target is shown.
#[derive(Clone, Copy, Debug, Default)]
pub struct WikiLinkRule;

impl Rule for WikiLinkRule {
    fn name(&self) -> &'static str {
        "wiki-link"
    }

    fn level(&self) -> Level {
        Level::Inline
    }

    fn try_match<'a>(&self, input: &'a str, pos: usize) -> Option<Span<'a>> {
        let rest = input[pos..].strip_prefix("[[")?;

        let target_len = rest.find([']', '|'])?;
        let (raw_target, after) = rest.split_at(target_len);

        let (raw_label, tail) = match after.strip_prefix('|') {
            Some(labelled) => {
                let label_len = labelled.find(']')?;
                if label_len == 0 {
                    return None;
                }
                let (label, tail) = labelled.split_at(label_len);
                (Some(label), tail)
            }
            None => (None, after),
        };
        if !tail.starts_with("]]") {
            return None;
        }

        let target = raw_target.trim();
        if target.is_empty() {
            return None;
        }

        let label = raw_label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| last_segment(target));

        Some(Span {
            start: pos,
            end: input.len() - tail.len() + 2,
            token: Token::WikiLink {
                target: with_md_suffix(target),
                label: label.to_owned(),
            },
        })
    }

    fn emit(&self, span: &Span<'_>, ctx: &RuleContext<'_>, out: &mut String) {
        if let Token::WikiLink { target, label } = &span.token {
            let target = escape_html(target);
            write!(
                out,
                r#"<a href="{}{target}" class="wiki-link" title="{target}">{}</a>"#,
                ctx.docs_route,
                escape_html(label)
            )
            .unwrap();
        }
    }
}

/// Append `.md` unless the path already ends with it.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
pub(crate) fn with_md_suffix(path: &str) -> String {
    if path.ends_with(".md") {
        path.to_owned()
    } else {
        format!("{path}.md")
    }
}

fn last_segment(target: &str) -> &str {
    target
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(target)
}
