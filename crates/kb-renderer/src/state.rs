//! Per-pass state for event-driven rendering.
//!
//! A fresh set of these structs is created for every render call.

use pulldown_cmark::Alignment;

use crate::slug::slugify;
use crate::toc::TocEntry;

/// Fenced or indented code collected until the block closes.
pub(crate) struct CodeBlock {
    /// First word of the info string (e.g. "rust").
    pub(crate) language: Option<String>,
    pub(crate) content: String,
}

/// Column alignments of the open table and the position in the current row.
#[derive(Default)]
pub(crate) struct TableCursor {
    alignments: Vec<Alignment>,
    column: usize,
    in_head: bool,
}

impl TableCursor {
    pub(crate) fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            ..Self::default()
        }
    }

    /// Move to the first cell of a header or body row.
    pub(crate) fn begin_row(&mut self, head: bool) {
        self.in_head = head;
        self.column = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.column += 1;
    }

    pub(crate) fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }

    pub(crate) fn cell_style(&self) -> &'static str {
        match self.alignments.get(self.column) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Pending image: target, title and the alt text collected so far.
pub(crate) struct PendingImage {
    pub(crate) src: String,
    pub(crate) title: String,
    pub(crate) alt: String,
    /// Nesting depth of images inside the alt text.
    pub(crate) depth: usize,
}

/// State for headings: the open heading's buffers and the collected TOC.
#[derive(Default)]
pub(crate) struct HeadingState {
    extract_title: bool,
    title: Option<String>,
    current_level: Option<u8>,
    /// Plain text of the open heading (slug source).
    text: String,
    /// Rendered inline HTML of the open heading.
    html: String,
    toc: Vec<TocEntry>,
}

impl HeadingState {
    pub(crate) fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            ..Self::default()
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Close the open heading and record it in the TOC.
    ///
    /// Returns (level, id, html). Ids are not de-duplicated: two headings with
    /// the same text share an id. Headings without text are rendered but left
    /// out of the TOC.
    pub(crate) fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let text = text.trim();
        let id = slugify(text);
        if text.is_empty() {
            return Some((level, id, html));
        }

        if self.extract_title && level == 1 && self.title.is_none() {
            self.title = Some(text.to_owned());
        }

        self.toc.push(TocEntry {
            id: id.clone(),
            text: text.to_owned(),
            level,
        });

        Some((level, id, html))
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn html_buffer(&mut self) -> &mut String {
        &mut self.html
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}
