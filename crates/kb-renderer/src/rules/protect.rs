//! Inline rule matching ahead of the markdown parser.
//!
//! Inline rules scan the source before pulldown-cmark does, so a `[[...]]`
//! span is claimed before link references or emphasis can see its brackets
//! and underscores. Each claimed span is swapped for an opaque placeholder
//! (`U+E000 index U+E001`) that the parser passes through as plain text. The
//! render pass expands placeholders back according to where they land:
//!
//! - text runs get the rule's HTML,
//! - heading and alt text get the token's plain text,
//! - code, raw HTML and link destinations get the original source.
//!
//! Code spans, backslash escapes and fenced code are skipped while scanning.
//! Literal placeholder characters in the source are protected too, so they
//! always come back unchanged.

use std::borrow::Cow;

use super::{Level, Rule, RuleContext, RuleSet, Span};
use crate::fence::FenceTracker;
use crate::util::escape_html;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// A source range replaced by a placeholder.
struct Claimed<'a> {
    raw: &'a str,
    /// `None` for literal placeholder characters.
    matched: Option<(&'a dyn Rule, Span<'a>)>,
}

/// Piece of a text run after placeholder lookup.
enum Piece<'t, 'a> {
    Text(&'t str),
    Claimed(&'t Claimed<'a>),
}

/// Source with inline rule matches swapped for placeholders.
pub(crate) struct ProtectedSource<'a> {
    text: String,
    claimed: Vec<Claimed<'a>>,
}

impl<'a> ProtectedSource<'a> {
    /// Scan `source` for inline rule matches.
    pub(crate) fn new(rules: &'a RuleSet, source: &'a str) -> Self {
        let mut this = Self {
            text: String::with_capacity(source.len()),
            claimed: Vec::new(),
        };
        if !rules.has_level(Level::Inline) {
            this.text.push_str(source);
            return this;
        }

        let mut fence = FenceTracker::default();
        let mut pos = 0;
        while pos < source.len() {
            let rest = &source[pos..];

            if pos == 0 || source.as_bytes()[pos - 1] == b'\n' {
                let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
                let was_fenced = fence.in_fence();
                if fence.update(&rest[..line_len]) || was_fenced {
                    this.text.push_str(&rest[..line_len]);
                    pos += line_len;
                    continue;
                }
            }

            let skip = match rest.as_bytes()[0] {
                b'\\' => escape_len(rest),
                b'`' => code_span_len(rest),
                _ => 0,
            };
            if skip > 0 {
                this.text.push_str(&rest[..skip]);
                pos += skip;
                continue;
            }

            if rest.starts_with(OPEN) || rest.starts_with(CLOSE) {
                let end = pos + OPEN.len_utf8();
                this.claim(&source[pos..end], None);
                pos = end;
                continue;
            }

            if let Some((rule, span)) = rules.match_at(Level::Inline, source, pos)
                && !source[pos..span.end].contains('\n')
            {
                let end = span.end;
                this.claim(&source[pos..end], Some((rule, span)));
                pos = end;
                continue;
            }

            let ch_len = rest.chars().next().map_or(1, char::len_utf8);
            this.text.push_str(&rest[..ch_len]);
            pos += ch_len;
        }

        this
    }

    fn claim(&mut self, raw: &'a str, matched: Option<(&'a dyn Rule, Span<'a>)>) {
        let index = self.claimed.len();
        self.text.push(OPEN);
        self.text.push_str(&index.to_string());
        self.text.push(CLOSE);
        self.claimed.push(Claimed { raw, matched });
    }

    /// The text to hand to the parser.
    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    fn walk<'t>(&'t self, text: &'t str, mut visit: impl FnMut(Piece<'t, 'a>)) {
        let mut rest = text;
        while let Some(open) = rest.find(OPEN) {
            let after = &rest[open + OPEN.len_utf8()..];
            let found = after.find(CLOSE).and_then(|close| {
                let index: usize = after[..close].parse().ok()?;
                Some((self.claimed.get(index)?, close))
            });
            match found {
                Some((claimed, close)) => {
                    visit(Piece::Text(&rest[..open]));
                    visit(Piece::Claimed(claimed));
                    rest = &after[close + CLOSE.len_utf8()..];
                }
                None => {
                    visit(Piece::Text(&rest[..open + OPEN.len_utf8()]));
                    rest = after;
                }
            }
        }
        visit(Piece::Text(rest));
    }

    /// Render a text run: escaped text with rule output for claimed spans.
    pub(crate) fn render(&self, text: &str, ctx: &RuleContext<'_>, out: &mut String) {
        self.walk(text, |piece| match piece {
            Piece::Text(text) => out.push_str(&escape_html(text)),
            Piece::Claimed(Claimed {
                matched: Some((rule, span)),
                ..
            }) => rule.emit(span, ctx, out),
            Piece::Claimed(Claimed { raw, .. }) => out.push_str(&escape_html(raw)),
        });
    }

    /// Put the original source back, for code and raw HTML.
    pub(crate) fn restore<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.expand(text, |claimed| claimed.raw)
    }

    /// Replace claimed spans with their plain text, for headings and alt text.
    pub(crate) fn plain_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.expand(text, |claimed| match &claimed.matched {
            Some((_, span)) => span.token.text(),
            None => claimed.raw,
        })
    }

    fn expand<'t>(
        &self,
        text: &'t str,
        replace: impl for<'c> Fn(&'c Claimed<'a>) -> &'c str,
    ) -> Cow<'t, str> {
        if !text.contains(OPEN) {
            return Cow::Borrowed(text);
        }
        let mut out = String::with_capacity(text.len());
        self.walk(text, |piece| match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Claimed(claimed) => out.push_str(replace(claimed)),
        });
        Cow::Owned(out)
    }
}

/// Length of a backslash escape at the start of `rest`, or 0.
fn escape_len(rest: &str) -> usize {
    match rest.as_bytes().get(1) {
        Some(b) if b.is_ascii_punctuation() => 2,
        _ => 0,
    }
}

/// Length of the code span opening at the start of `rest`.
///
/// The closing backtick run must have the same length and lie in the same
/// paragraph. An unmatched opening run is skipped whole.
fn code_span_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let ticks = bytes.iter().take_while(|&&b| b == b'`').count();
    let limit = rest.find("\n\n").unwrap_or(rest.len());

    let mut i = ticks;
    while i < limit {
        if bytes[i] == b'`' {
            let run = bytes[i..limit].iter().take_while(|&&b| b == b'`').count();
            if run == ticks {
                return i + run;
            }
            i += run;
        } else {
            i += 1;
        }
    }
    ticks
}
