//! Markdown rendering pipeline for the knowledge-base viewer.
//!
//! This crate turns knowledge-base documents into HTML fragments. The
//! pipeline is a pure function of its inputs: a [`MarkdownRenderer`] holds only
//! immutable configuration and every [`render`](MarkdownRenderer::render) call
//! builds its own per-pass state.
//!
//! # Pipeline
//!
//! 1. [`preprocess_containers`] rewrites `:::name` ... `:::` blocks into
//!    passthrough HTML wrappers.
//! 2. Block [`rules`] (mermaid fences) are matched at line starts outside code
//!    fences.
//! 3. Inline [`rules`] (wiki links) claim their spans ahead of the markdown
//!    grammar; claimed spans reach the parser as opaque placeholders.
//! 4. pulldown-cmark parses the result. Placeholders become rule output in
//!    text, labels in heading text and the original source in code. Headings
//!    get [`slugify`] ids, code fences are highlighted and images are
//!    rewritten by the [`ImageResolver`].
//!
//! # Example
//!
//! ```
//! use kb_renderer::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let result = renderer.render("# Hello\n\nSee [[guide/setup|Setup]].", None);
//!
//! assert!(result.html.contains(r#"<h1 id="hello">Hello</h1>"#));
//! assert!(result.html.contains(r#"href="/docs/guide/setup.md""#));
//! ```

mod container;
mod fence;
mod frontmatter;
mod highlight;
mod html;
mod image;
mod links;
mod renderer;
pub mod rules;
mod slug;
mod state;
mod toc;
mod util;

pub use container::preprocess_containers;
pub use frontmatter::{Frontmatter, FrontmatterError};
pub use highlight::Highlighter;
pub use image::{DEFAULT_RAW_PREFIX, ImageResolver};
pub use links::extract_links;
pub use renderer::{DEFAULT_DOCS_ROUTE, MarkdownRenderer, RenderResult};
pub use slug::slugify;
pub use toc::{TocEntry, extract_toc};
pub use util::escape_html;
