//! Table of contents extraction.

use std::sync::LazyLock;

use crate::renderer::MarkdownRenderer;

/// Renderer used for TOC extraction; highlighting output is thrown away.
static TOC_RENDERER: LazyLock<MarkdownRenderer> =
    LazyLock::new(|| MarkdownRenderer::new().with_highlighting(false));

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Anchor id, as produced by [`slugify`](crate::slugify).
    pub id: String,
    /// Plain heading text: markup dropped, entities decoded, wiki links
    /// replaced by their labels.
    pub text: String,
    /// Heading level (1-6).
    pub level: u8,
}

/// Collect headings from markdown, in document order.
///
/// Headings are read by the same pass [`MarkdownRenderer::render`] uses,
/// so every id here is an id the rendered HTML carries. Headings inside
/// fenced code are not headings, and headings without text are skipped.
///
/// # Examples
///
/// ```
/// use kb_renderer::extract_toc;
///
/// let toc = extract_toc("# Title\n## Section 1\n### Subsection");
/// let ids: Vec<_> = toc.iter().map(|e| e.id.as_str()).collect();
/// assert_eq!(ids, ["title", "section-1", "subsection"]);
/// ```
#[must_use]
pub fn extract_toc(markdown: &str) -> Vec<TocEntry> {
    TOC_RENDERER.render(markdown, None).toc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, text: &str, level: u8) -> TocEntry {
        TocEntry {
            id: id.to_owned(),
            text: text.to_owned(),
            level,
        }
    }

    #[test]
    fn test_extracts_headings() {
        assert_eq!(
            extract_toc("# Title\n## Section 1\n### Subsection"),
            vec![
                entry("title", "Title", 1),
                entry("section-1", "Section 1", 2),
                entry("subsection", "Subsection", 3),
            ]
        );
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(
            extract_toc("## API & Configuration (v2)"),
            vec![entry("api-configuration-v2", "API & Configuration (v2)", 2)]
        );
    }

    #[test]
    fn test_japanese_heading() {
        assert_eq!(
            extract_toc("# 日本語ガイド"),
            vec![entry("日本語ガイド", "日本語ガイド", 1)]
        );
    }

    #[test]
    fn test_empty_and_headingless() {
        assert!(extract_toc("").is_empty());
        assert!(extract_toc("Just a paragraph.\n\nAnother one.").is_empty());
    }

    #[test]
    fn test_requires_space_after_hashes() {
        assert!(extract_toc("#hashtag\n####### seven").is_empty());
    }

    #[test]
    fn test_all_levels() {
        let toc = extract_toc("# a\n## b\n### c\n#### d\n##### e\n###### f");
        let levels: Vec<_> = toc.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_text_trimmed_and_closing_hashes_removed() {
        assert_eq!(
            extract_toc("##   Spaced out   \n## Closed ##"),
            vec![
                entry("spaced-out", "Spaced out", 2),
                entry("closed", "Closed", 2)
            ]
        );
    }

    #[test]
    fn test_skips_fenced_code() {
        let md = "# Real\n\n```bash\n# not a heading\n```\n\n## Also real";
        let ids: Vec<_> = extract_toc(md).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["real", "also-real"]);
    }

    #[test]
    fn test_ids_match_rendered_headings() {
        let md = "## See [docs](http://x.com) now\n\n## Tom &amp; Jerry\n\n## Guide to [[a/b|Setup]]";
        let toc = extract_toc(md);
        let rendered = MarkdownRenderer::new().render(md, None);
        assert_eq!(toc, rendered.toc);
        assert_eq!(
            toc,
            vec![
                entry("see-docs-now", "See docs now", 2),
                entry("tom-jerry", "Tom & Jerry", 2),
                entry("guide-to-setup", "Guide to Setup", 2),
            ]
        );
        for e in &toc {
            assert!(rendered.html.contains(&format!(r#"id="{}""#, e.id)));
        }
    }

    #[test]
    fn test_setext_and_empty_headings() {
        assert_eq!(
            extract_toc("Overview\n========\n\n#\n\n## Next"),
            vec![entry("overview", "Overview", 1), entry("next", "Next", 2)]
        );
    }

    #[test]
    fn test_duplicates_kept() {
        let toc = extract_toc("## Notes\n## Notes");
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].id, toc[1].id);
    }
}
