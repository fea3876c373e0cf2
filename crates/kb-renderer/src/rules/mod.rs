//! Custom syntax rules consulted before the generic markdown grammar.
//!
//! A rule claims a span of input at a scan position and emits HTML for it.
//! Rules live in an ordered [`RuleSet`]; at every position the rules of the
//! matching [`Level`] are tried in registration order and the first match
//! wins. When no rule matches, the input falls through to pulldown-cmark's
//! default handling.
//!
//! - [`Level::Block`] rules run over the (container-preprocessed) source at
//!   line starts outside code fences, before parsing.
//! - [`Level::Inline`] rules run over the source too, ahead of pulldown-cmark's
//!   inline grammar, so `[[guide]]` wins over a `[guide]: url` definition and
//!   `[[__init__]]` is not read as emphasis. Code spans, backslash escapes and
//!   fenced code are skipped.
//!
//! # Example
//!
//! ```
//! use kb_renderer::rules::{Level, Rule, RuleContext, RuleSet, Span, Token};
//!
//! /// Renders `@@name` as a mention.
//! struct MentionRule;
//!
//! impl Rule for MentionRule {
//!     fn name(&self) -> &'static str { "mention" }
//!
//!     fn level(&self) -> Level { Level::Inline }
//!
//!     fn try_match<'a>(&self, input: &'a str, pos: usize) -> Option<Span<'a>> {
//!         let rest = input[pos..].strip_prefix("@@")?;
//!         let len = rest.find(|c: char| !c.is_alphanumeric()).unwrap_or(rest.len());
//!         (len > 0).then(|| Span {
//!             start: pos,
//!             end: pos + 2 + len,
//!             token: Token::Custom { name: "mention", text: &rest[..len] },
//!         })
//!     }
//!
//!     fn emit(&self, span: &Span<'_>, _ctx: &RuleContext<'_>, out: &mut String) {
//!         if let Token::Custom { text, .. } = &span.token {
//!             out.push_str(&format!("<span class=\"mention\">{text}</span>"));
//!         }
//!     }
//! }
//!
//! let rules = RuleSet::new().with_rule(MentionRule);
//! let mut out = String::new();
//! rules.apply_inline("hi @@ana!", &RuleContext::default(), &mut out);
//! assert_eq!(out, r#"hi <span class="mention">ana</span>!"#);
//! ```

mod mermaid;
mod protect;
mod wiki_link;

use std::borrow::Cow;

pub use mermaid::MermaidRule;
pub(crate) use protect::ProtectedSource;
pub use wiki_link::WikiLinkRule;
pub(crate) use wiki_link::with_md_suffix;

use crate::fence::FenceTracker;

/// Where a rule is consulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Matched at line starts of the raw source, before parsing.
    Block,
    /// Matched at any position of the raw source, before inline parsing.
    Inline,
}

/// Rule-specific data captured by a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Fenced mermaid diagram; `source` is trimmed and de-indented.
    Mermaid {
        source: Cow<'a, str>,
        /// Indentation of the opening fence.
        indent: usize,
    },
    /// `[[target]]` or `[[target|label]]`; `target` carries the `.md` suffix.
    WikiLink {
        target: String,
        label: String,
    },
    /// Escape hatch for rules registered outside this crate.
    Custom {
        name: &'static str,
        text: &'a str,
    },
}

impl Token<'_> {
    /// Plain text of the token, as it reads in headings and alt text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Mermaid { source, .. } => source,
            Self::WikiLink { label, .. } => label,
            Self::Custom { text, .. } => text,
        }
    }
}

/// A byte range of the input claimed by a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span<'a> {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    pub token: Token<'a>,
}

/// Per-render settings visible to rules while emitting.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    /// Route prefix for document links (e.g. `/docs/`).
    pub docs_route: &'a str,
}

impl Default for RuleContext<'_> {
    fn default() -> Self {
        Self {
            docs_route: crate::renderer::DEFAULT_DOCS_ROUTE,
        }
    }
}

/// A custom syntax recognizer.
///
/// Rules hold no per-call state; the same instance serves concurrent renders.
pub trait Rule: Send + Sync {
    /// Rule name, used in logs.
    fn name(&self) -> &'static str;

    /// Where this rule is consulted.
    fn level(&self) -> Level;

    /// Try to match at byte offset `pos` of `input`.
    ///
    /// `pos` is always a char boundary. Returning `None` lets the next rule
    /// (or the default grammar) handle the position.
    fn try_match<'a>(&self, input: &'a str, pos: usize) -> Option<Span<'a>>;

    /// Write the HTML for a span previously returned by [`try_match`](Self::try_match).
    fn emit(&self, span: &Span<'_>, ctx: &RuleContext<'_>, out: &mut String);
}

/// Ordered list of rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mermaid fences followed by wiki links.
    #[must_use]
    pub fn standard() -> Self {
        Self::new().with_rule(MermaidRule).with_rule(WikiLinkRule)
    }

    /// Append a rule. Earlier rules take priority.
    #[must_use]
    pub fn with_rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Names of the registered rules, in priority order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// First rule of `level` matching at `pos`.
    pub fn match_at<'a>(
        &self,
        level: Level,
        input: &'a str,
        pos: usize,
    ) -> Option<(&dyn Rule, Span<'a>)> {
        self.rules
            .iter()
            .filter(|rule| rule.level() == level)
            .find_map(|rule| {
                rule.try_match(input, pos)
                    .map(|span| (rule.as_ref(), span))
            })
    }

    fn has_level(&self, level: Level) -> bool {
        self.rules.iter().any(|r| r.level() == level)
    }

    /// Apply block rules at every line start outside code fences.
    ///
    /// Matched spans are replaced by the rule's output; `on_match` sees each
    /// span before it is emitted. Everything else is copied unchanged.
    pub fn apply_block<'a, F>(
        &self,
        source: &'a str,
        ctx: &RuleContext<'_>,
        mut on_match: F,
    ) -> String
    where
        F: FnMut(&Span<'a>),
    {
        if !self.has_level(Level::Block) {
            return source.to_owned();
        }

        let mut out = String::with_capacity(source.len());
        let mut fence = FenceTracker::default();
        let mut pos = 0;

        while pos < source.len() {
            if !fence.in_fence()
                && let Some((rule, span)) = self.match_at(Level::Block, source, pos)
            {
                on_match(&span);
                rule.emit(&span, ctx, &mut out);
                pos = span.end;
                continue;
            }

            let line_end = source[pos..].find('\n').map_or(source.len(), |i| pos + i);
            let line = &source[pos..line_end];
            fence.update(line);
            out.push_str(line);
            if line_end < source.len() {
                out.push('\n');
            }
            pos = line_end + 1;
        }

        out
    }

    /// Apply inline rules to plain text, HTML-escaping everything unmatched.
    ///
    /// Text between backticks is not scanned.
    pub fn apply_inline(&self, text: &str, ctx: &RuleContext<'_>, out: &mut String) {
        let protected = ProtectedSource::new(self, text);
        protected.render(protected.as_str(), ctx, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_order() {
        let names: Vec<_> = RuleSet::standard().names().collect();
        assert_eq!(names, vec!["mermaid", "wiki-link"]);
    }

    #[test]
    fn test_apply_inline_escapes_unmatched_text() {
        let mut out = String::new();
        RuleSet::standard().apply_inline("a < b & [[c]]", &RuleContext::default(), &mut out);
        assert_eq!(
            out,
            r#"a &lt; b &amp; <a href="/docs/c.md" class="wiki-link" title="c.md">c</a>"#
        );
    }

    #[test]
    fn test_apply_inline_without_inline_rules() {
        let mut out = String::new();
        RuleSet::new().apply_inline("[[c]] <x>", &RuleContext::default(), &mut out);
        assert_eq!(out, "[[c]] &lt;x&gt;");
    }

    #[test]
    fn test_apply_inline_multibyte_text() {
        let mut out = String::new();
        RuleSet::standard().apply_inline("日本 [[ガイド]] 語", &RuleContext::default(), &mut out);
        assert!(out.starts_with("日本 <a href=\"/docs/ガイド.md\""));
        assert!(out.ends_with("</a> 語"));
    }

    #[test]
    fn test_apply_block_replaces_mermaid() {
        let source = "Intro\n\n```mermaid\ngraph TD\nA --> B\n```\n\nOutro";
        let mut seen = Vec::new();
        let out = RuleSet::standard().apply_block(source, &RuleContext::default(), |span| {
            seen.push(span.clone());
        });
        assert_eq!(
            out,
            "Intro\n\n<pre class=\"mermaid\">graph TD\nA --&gt; B</pre>\n\nOutro"
        );
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].token,
            Token::Mermaid {
                source: "graph TD\nA --> B".into(),
                indent: 0,
            }
        );
    }

    #[test]
    fn test_apply_block_keeps_list_indentation() {
        let source = "- item\n\n  ```mermaid\n  graph TD\n  ```\n- next";
        let out = RuleSet::standard().apply_block(source, &RuleContext::default(), |_| {});
        assert_eq!(
            out,
            "- item\n\n  <pre class=\"mermaid\">graph TD</pre>\n- next"
        );
    }

    #[test]
    fn test_token_text() {
        let link = Token::WikiLink {
            target: "a/b.md".to_owned(),
            label: "Setup".to_owned(),
        };
        assert_eq!(link.text(), "Setup");
        let custom = Token::Custom {
            name: "x",
            text: "y",
        };
        assert_eq!(custom.text(), "y");
    }

    #[test]
    fn test_apply_inline_skips_code_spans() {
        let mut out = String::new();
        RuleSet::standard().apply_inline("`[[c]]` [[d]]", &RuleContext::default(), &mut out);
        assert!(out.starts_with("`[[c]]` <a href=\"/docs/d.md\""));
    }

    #[test]
    fn test_apply_block_skips_fenced_code() {
        let source = "````md\n```mermaid\ngraph TD\n```\n````";
        let out = RuleSet::standard().apply_block(source, &RuleContext::default(), |_| {});
        assert_eq!(out, source);
    }

    #[test]
    fn test_apply_block_preserves_trailing_newline() {
        let source = "text\n";
        let out = RuleSet::standard().apply_block(source, &RuleContext::default(), |_| {});
        assert_eq!(out, source);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        struct Shadow;
        impl Rule for Shadow {
            fn name(&self) -> &'static str {
                "shadow"
            }
            fn level(&self) -> Level {
                Level::Inline
            }
            fn try_match<'a>(&self, input: &'a str, pos: usize) -> Option<Span<'a>> {
                input[pos..].starts_with("[[").then_some(Span {
                    start: pos,
                    end: pos + 2,
                    token: Token::Custom {
                        name: "shadow",
                        text: "",
                    },
                })
            }
            fn emit(&self, _span: &Span<'_>, _ctx: &RuleContext<'_>, out: &mut String) {
                out.push_str("<shadow>");
            }
        }

        let rules = RuleSet::new().with_rule(Shadow).with_rule(WikiLinkRule);
        let mut out = String::new();
        rules.apply_inline("[[x]]", &RuleContext::default(), &mut out);
        assert_eq!(out, "<shadow>x]]");
    }
}
