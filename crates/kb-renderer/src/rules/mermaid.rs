//! Mermaid diagram fences.
//!
//! ````text
//! ```mermaid
//! graph TD
//!   A --> B
//! ```
//! ````
//!
//! The diagram is not rendered here: the block becomes
//! `<pre class="mermaid">SOURCE</pre>` and a client-side renderer picks it up
//! after the HTML is inserted.
//!
//! An indented fence (inside a list item, say) keeps its indentation: body
//! lines lose up to that many leading spaces and every emitted line is
//! re-indented, so the block stays inside its container.

use std::borrow::Cow;

use super::{Level, Rule, RuleContext, Span, Token};
use crate::fence::closes_fence;
use crate::util::escape_text;

const OPENING: &str = "```mermaid";

/// Maximum indentation of the opening fence.
const MAX_INDENT: usize = 3;

/// Block rule for ```` ```mermaid ```` fences.
#[derive(Clone, Copy, Debug, Default)]
pub struct MermaidRule;

impl Rule for MermaidRule {
    fn name(&self) -> &'static str {
        "mermaid"
    }

    fn level(&self) -> Level {
        Level::Block
    }

    fn try_match<'a>(&self, input: &'a str, pos: usize) -> Option<Span<'a>> {
        let rest = &input[pos..];
        let unindented = rest.trim_start_matches(' ');
        let indent = rest.len() - unindented.len();
        if indent > MAX_INDENT {
            return None;
        }

        // The info string must be exactly `mermaid`.
        let after = unindented.strip_prefix(OPENING)?;
        let newline = after.find('\n')?;
        if !after[..newline].trim().is_empty() {
            return None;
        }

        let body_start = pos + indent + OPENING.len() + newline + 1;
        let mut line_start = body_start;
        loop {
            let line_end = input[line_start..]
                .find('\n')
                .map_or(input.len(), |i| line_start + i);
            let line = &input[line_start..line_end];

            if closes_fence(line.trim_start(), b'`', 3) {
                return Some(Span {
                    start: pos,
                    end: line_end,
                    token: Token::Mermaid {
                        source: dedent(&input[body_start..line_start], indent),
                        indent,
                    },
                });
            }
            if line_end == input.len() {
                return None;
            }
            line_start = line_end + 1;
        }
    }

    fn emit(&self, span: &Span<'_>, _ctx: &RuleContext<'_>, out: &mut String) {
        let Token::Mermaid { source, indent } = &span.token else {
            return;
        };
        let pad = " ".repeat(*indent);
        out.push_str(&pad);
        out.push_str(r#"<pre class="mermaid">"#);
        for (i, line) in escape_text(source).split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&pad);
                }
            }
            out.push_str(line);
        }
        out.push_str("</pre>");
    }
}

/// Strip up to `indent` leading spaces from every line, then trim.
fn dedent(body: &str, indent: usize) -> Cow<'_, str> {
    if indent == 0 {
        return Cow::Borrowed(body.trim());
    }
    let lines: Vec<_> = body
        .lines()
        .map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            &line[spaces.min(indent)..]
        })
        .collect();
    Cow::Owned(lines.join("\n").trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source_of(input: &str) -> Option<String> {
        MermaidRule.try_match(input, 0).map(|span| match span.token {
            Token::Mermaid { source, .. } => source.into_owned(),
            other => panic!("unexpected token {other:?}"),
        })
    }

    fn emitted(input: &str) -> String {
        let span = MermaidRule.try_match(input, 0).unwrap();
        let mut out = String::new();
        MermaidRule.emit(&span, &RuleContext::default(), &mut out);
        out
    }

    #[test]
    fn test_matches_fence() {
        let input = "```mermaid\ngraph TD\n  A --> B\n```\nafter";
        let span = MermaidRule.try_match(input, 0).unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(&input[span.end..], "\nafter");
        assert_eq!(source_of(input).as_deref(), Some("graph TD\n  A --> B"));
    }

    #[test]
    fn test_source_trimmed() {
        assert_eq!(source_of("```mermaid\n\n  pie\n\n```").as_deref(), Some("pie"));
    }

    #[test]
    fn test_empty_diagram() {
        assert_eq!(source_of("```mermaid\n```").as_deref(), Some(""));
    }

    #[test]
    fn test_unclosed_fence_not_matched() {
        assert_eq!(source_of("```mermaid\ngraph TD"), None);
    }

    #[test]
    fn test_other_language_not_matched() {
        assert_eq!(source_of("```mermaidjs\ngraph\n```"), None);
        assert_eq!(source_of("```rust\nfn main() {}\n```"), None);
        assert_eq!(source_of("````mermaid\ngraph\n````"), None);
    }

    #[test]
    fn test_indentation_limit() {
        assert_eq!(source_of("   ```mermaid\npie\n```").as_deref(), Some("pie"));
        assert_eq!(source_of("    ```mermaid\npie\n```"), None);
    }

    #[test]
    fn test_match_at_offset() {
        let input = "text\n```mermaid\npie\n```";
        let span = MermaidRule.try_match(input, 5).unwrap();
        assert_eq!(span.start, 5);
        assert_eq!(span.end, input.len());
    }

    #[test]
    fn test_emit_escapes_source() {
        assert_eq!(
            emitted("```mermaid\nA[\"<b>\"] --> B & C\n```"),
            r#"<pre class="mermaid">A["&lt;b&gt;"] --&gt; B &amp; C</pre>"#
        );
    }

    #[test]
    fn test_indented_fence_keeps_indentation() {
        let input = "  ```mermaid\n  graph TD\n\n      A --> B\n  ```";
        assert_eq!(source_of(input).as_deref(), Some("graph TD\n\n    A --> B"));
        assert_eq!(
            emitted(input),
            "  <pre class=\"mermaid\">graph TD\n\n      A --&gt; B</pre>"
        );
    }

    #[test]
    fn test_dedent_stops_at_content() {
        assert_eq!(source_of("   ```mermaid\n pie\n   ```").as_deref(), Some("pie"));
    }
}
