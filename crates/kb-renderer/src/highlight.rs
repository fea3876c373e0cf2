//! Code block syntax highlighting.
//!
//! Grammars come from syntect's bundled default syntaxes, loaded once into an
//! immutable static and shared by every renderer.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// CSS class prefix for highlighted spans.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Fence tags that map onto a differently named grammar.
const ALIASES: &[(&str, &str)] = &[
    ("shell", "sh"),
    ("zsh", "sh"),
    ("yml", "yaml"),
    ("plaintext", "txt"),
    ("text", "txt"),
    ("golang", "go"),
    ("py", "python"),
    ("c++", "cpp"),
];

/// Syntax highlighter producing class-based HTML spans.
#[derive(Clone, Copy)]
pub struct Highlighter {
    syntaxes: &'static SyntaxSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("syntaxes", &self.syntaxes.syntaxes().len())
            .finish()
    }
}

impl Highlighter {
    /// Create a highlighter backed by the shared default syntax set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntaxes: &SYNTAXES,
        }
    }

    /// Whether a grammar is registered for the fence tag.
    #[must_use]
    pub fn supports(&self, lang: &str) -> bool {
        self.find(lang).is_some()
    }

    fn find(&self, lang: &str) -> Option<&'static SyntaxReference> {
        let lang = lang.trim().to_ascii_lowercase();
        if lang.is_empty() {
            return None;
        }
        let token = ALIASES
            .iter()
            .find(|(alias, _)| *alias == lang)
            .map_or(lang.as_str(), |(_, target)| target);
        self.syntaxes.find_syntax_by_token(token)
    }

    /// Highlight `code` as `lang`.
    ///
    /// Returns `None` when no grammar matches the tag or highlighting fails;
    /// callers then emit the escaped source instead.
    #[must_use]
    pub fn highlight(&self, code: &str, lang: &str) -> Option<String> {
        let syntax = self.find(lang)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, self.syntaxes, CLASS_STYLE);

        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::warn!(lang, error = %e, "Syntax highlighting failed");
                return None;
            }
        }

        Some(generator.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_languages() {
        let h = Highlighter::new();
        for lang in ["go", "rust", "python", "js", "bash", "json", "yaml", "sql", "diff"] {
            assert!(h.supports(lang), "{lang}");
        }
    }

    #[test]
    fn test_aliases() {
        let h = Highlighter::new();
        assert!(h.supports("shell"));
        assert!(h.supports("yml"));
        assert!(h.supports("text"));
        assert!(h.supports("Go"));
    }

    #[test]
    fn test_unknown_language() {
        let h = Highlighter::new();
        assert!(!h.supports("no-such-language"));
        assert!(!h.supports(""));
        assert_eq!(h.highlight("x", "no-such-language"), None);
    }

    #[test]
    fn test_highlight_produces_spans() {
        let html = Highlighter::new()
            .highlight("func main() {}\n", "go")
            .unwrap();
        assert!(html.contains("<span class=\"hl-"));
        assert!(html.contains("func"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_highlight_escapes_markup() {
        let html = Highlighter::new()
            .highlight("<div>&</div>\n", "html")
            .unwrap();
        assert!(!html.contains("<div>"));
        assert!(html.contains("&lt;"));
        assert!(html.contains("&amp;"));
    }
}
