//! Markdown to HTML rendering.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::container::preprocess_containers;
use crate::highlight::Highlighter;
use crate::html;
use crate::image::{DEFAULT_RAW_PREFIX, ImageResolver};
use crate::rules::{ProtectedSource, RuleContext, RuleSet, Token};
use crate::state::{CodeBlock, HeadingState, PendingImage, TableCursor};
use crate::toc::TocEntry;
use crate::util::{escape_html, heading_level_to_num};

/// Default route prefix for wiki link targets.
pub const DEFAULT_DOCS_ROUTE: &str = "/docs/";

/// Result of rendering markdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Text of the first H1 heading (if title extraction was enabled).
    pub title: Option<String>,
    /// Every heading in document order.
    pub toc: Vec<TocEntry>,
    /// Trimmed mermaid sources, in document order.
    pub diagrams: Vec<String>,
}

/// Pre-configured markdown renderer.
///
/// Configuration is fixed at construction; [`render`](Self::render) takes
/// `&self` and keeps all per-document state local to the call, so one
/// renderer can be shared across threads.
///
/// # Example
///
/// ```
/// use kb_renderer::MarkdownRenderer;
///
/// let renderer = MarkdownRenderer::new().with_raw_prefix("/raw/");
/// let result = renderer.render("![logo](./logo.png)", Some("docs/index.md"));
/// assert_eq!(result.html, r#"<p><img src="/raw/docs/logo.png" alt="logo"></p>"#);
/// ```
pub struct MarkdownRenderer {
    raw_prefix: String,
    docs_route: String,
    gfm: bool,
    highlight: bool,
    extract_title: bool,
    rules: RuleSet,
    highlighter: Highlighter,
}

impl MarkdownRenderer {
    /// Create a renderer with the standard rules, GFM and highlighting enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw_prefix: DEFAULT_RAW_PREFIX.to_owned(),
            docs_route: DEFAULT_DOCS_ROUTE.to_owned(),
            gfm: true,
            highlight: true,
            extract_title: false,
            rules: RuleSet::standard(),
            highlighter: Highlighter::new(),
        }
    }

    /// Set the prefix relative images are rewritten under.
    #[must_use]
    pub fn with_raw_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.raw_prefix = prefix.into();
        self
    }

    /// Set the route prefix for wiki link targets.
    #[must_use]
    pub fn with_docs_route(mut self, route: impl Into<String>) -> Self {
        self.docs_route = route.into();
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable code block highlighting.
    #[must_use]
    pub fn with_highlighting(mut self, enabled: bool) -> Self {
        self.highlight = enabled;
        self
    }

    /// Report the first H1 heading as [`RenderResult::title`].
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Replace the custom syntax rules.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn raw_prefix(&self) -> &str {
        &self.raw_prefix
    }

    #[must_use]
    pub fn docs_route(&self) -> &str {
        &self.docs_route
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Render a document.
    ///
    /// `doc_path` is the document's repository path (e.g. `docs/guide.md`).
    /// When present, relative images are rewritten under the raw prefix for
    /// this call only.
    pub fn render(&self, source: &str, doc_path: Option<&str>) -> RenderResult {
        let ctx = RuleContext {
            docs_route: &self.docs_route,
        };

        let preprocessed = preprocess_containers(source);
        let mut diagrams = Vec::new();
        let prepared = self.rules.apply_block(&preprocessed, &ctx, |span| {
            if let Token::Mermaid { source, .. } = &span.token {
                diagrams.push(source.to_string());
            }
        });
        let protected = ProtectedSource::new(&self.rules, &prepared);

        let resolver = doc_path.map(|path| ImageResolver::new(&self.raw_prefix, path));
        let mut pass = RenderPass::new(self, ctx, &protected, resolver);
        for event in Parser::new_ext(protected.as_str(), self.parser_options()) {
            pass.process_event(event);
        }
        let result = pass.finish(diagrams);

        tracing::debug!(
            doc_path,
            bytes = source.len(),
            headings = result.toc.len(),
            diagrams = result.diagrams.len(),
            "Rendered markdown"
        );
        result
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MarkdownRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownRenderer")
            .field("raw_prefix", &self.raw_prefix)
            .field("docs_route", &self.docs_route)
            .field("gfm", &self.gfm)
            .field("highlight", &self.highlight)
            .field("extract_title", &self.extract_title)
            .field("rules", &self.rules.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// State of a single render call.
struct RenderPass<'r> {
    renderer: &'r MarkdownRenderer,
    ctx: RuleContext<'r>,
    /// Inline rule matches, hidden from the parser behind placeholders.
    inline: &'r ProtectedSource<'r>,
    resolver: Option<ImageResolver<'r>>,
    output: String,
    /// Adjacent text events, merged before placeholders are expanded.
    text: String,
    code: Option<CodeBlock>,
    table: TableCursor,
    image: Option<PendingImage>,
    heading: HeadingState,
}

impl<'r> RenderPass<'r> {
    fn new(
        renderer: &'r MarkdownRenderer,
        ctx: RuleContext<'r>,
        inline: &'r ProtectedSource<'r>,
        resolver: Option<ImageResolver<'r>>,
    ) -> Self {
        Self {
            renderer,
            ctx,
            inline,
            resolver,
            output: String::with_capacity(4096),
            text: String::new(),
            code: None,
            table: TableCursor::default(),
            image: None,
            heading: HeadingState::new(renderer.extract_title),
        }
    }

    fn finish(mut self, diagrams: Vec<String>) -> RenderResult {
        self.flush_text();
        RenderResult {
            html: self.output,
            title: self.heading.take_title(),
            toc: self.heading.take_toc(),
            diagrams,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        if self.image.is_some() {
            self.image_event(event);
            return;
        }
        if let Event::Text(text) = &event {
            if let Some(code) = self.code.as_mut() {
                code.content.push_str(&self.inline.restore(text));
            } else {
                self.text.push_str(text);
            }
            return;
        }

        self.flush_text();
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.output.push_str(&self.inline.restore(&html)),
            Event::InlineHtml(html) => {
                let html = self.inline.restore(&html);
                self.push_inline(&html);
            }
            Event::SoftBreak => {
                if self.heading.is_active() {
                    self.heading.push_text(" ");
                }
                self.push_inline("\n");
            }
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => html::task_list_marker(checked, &mut self.output),
            Event::Text(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    /// Collect alt text until the image closes; markup inside is dropped.
    fn image_event(&mut self, event: Event<'_>) {
        let Some(image) = self.image.as_mut() else {
            return;
        };
        match event {
            Event::Text(text) => image.alt.push_str(&self.inline.plain_text(&text)),
            Event::Code(code) => image.alt.push_str(&self.inline.restore(&code)),
            Event::SoftBreak | Event::HardBreak => image.alt.push(' '),
            Event::Start(Tag::Image { .. }) => image.depth += 1,
            Event::End(TagEnd::Image) if image.depth > 0 => image.depth -= 1,
            Event::End(TagEnd::Image) => {
                if let Some(image) = self.image.take() {
                    let mut out = String::new();
                    html::image(&image.src, &image.alt, &image.title, &mut out);
                    self.push_inline(&out);
                }
            }
            _ => {}
        }
    }

    /// Write the pending text run, expanding inline rule matches.
    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let inline = self.inline;
        if self.heading.is_active() {
            self.heading.push_text(&inline.plain_text(&text));
            inline.render(&text, &self.ctx, self.heading.html_buffer());
        } else {
            inline.render(&text, &self.ctx, &mut self.output);
        }
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.html_buffer().push_str(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let language = match &kind {
                    CodeBlockKind::Fenced(info) => html::fence_language(info).map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBlock {
                    language,
                    content: String::new(),
                });
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table = TableCursor::new(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.begin_row(true);
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.begin_row(false);
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let (tag, style) = (self.table.cell_tag(), self.table.cell_style());
                write!(self.output, "<{tag}{style}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let href = self.inline.restore(&dest_url);
                let mut open = format!(r#"<a href="{}""#, escape_html(&href));
                if !title.is_empty() {
                    let title = self.inline.restore(&title);
                    write!(open, r#" title="{}""#, escape_html(&title)).unwrap();
                }
                open.push('>');
                self.push_inline(&open);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let dest_url = self.inline.restore(&dest_url);
                let src = match &self.resolver {
                    Some(resolver) => resolver.resolve(&dest_url).into_owned(),
                    None => dest_url.into_owned(),
                };
                self.image = Some(PendingImage {
                    src,
                    title: self.inline.restore(&title).into_owned(),
                    alt: String::new(),
                    depth: 0,
                });
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let Some(code) = self.code.take() else {
                    return;
                };
                let highlighter = self
                    .renderer
                    .highlight
                    .then_some(&self.renderer.highlighter);
                html::code_block(
                    code.language.as_deref(),
                    &code.content,
                    highlighter,
                    &mut self.output,
                );
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::Image => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => self.output.push_str("</tr></thead><tbody>"),
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                write!(self.output, "</{}>", self.table.cell_tag()).unwrap();
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
        }
    }

    fn inline_code(&mut self, code: &str) {
        let code = self.inline.restore(code);
        if self.heading.is_active() {
            self.heading.push_text(&code);
        }
        let html = format!("<code>{}</code>", escape_html(&code));
        self.push_inline(&html);
    }
}
