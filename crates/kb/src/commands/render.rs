//! `kb render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use kb_config::{CliSettings, Config, RenderConfig};
use kb_renderer::{Frontmatter, MarkdownRenderer, RenderResult};
use serde::Serialize;

use super::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    file: Option<PathBuf>,

    /// Repository-relative path of the document, used to resolve relative
    /// image paths.
    #[arg(short, long)]
    doc_path: Option<String>,

    /// Print title, headings and diagram sources alongside the HTML as JSON.
    #[arg(long)]
    json: bool,

    /// URL prefix for resolved image paths (overrides config).
    #[arg(long)]
    raw_prefix: Option<String>,

    /// Disable tables, strikethrough and task lists.
    #[arg(long)]
    no_gfm: bool,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    #[serde(flatten)]
    result: &'a RenderResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    frontmatter: Option<&'a Frontmatter>,
}

impl RenderArgs {
    /// Execute the render command.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            raw_prefix: self.raw_prefix.clone(),
            gfm: self.no_gfm.then_some(false),
            highlight: self.no_highlight.then_some(false),
            ..Default::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;

        let text = read_input(self.file.as_deref())?;
        let (frontmatter, body) = Frontmatter::split(&text)?;

        let renderer = renderer_from_config(&config.render);
        let result = renderer.render(body, self.doc_path.as_deref());

        tracing::info!(
            headings = result.toc.len(),
            diagrams = result.diagrams.len(),
            "Rendered document"
        );

        if self.json {
            output.print_json(&RenderOutput {
                result: &result,
                frontmatter: (!frontmatter.is_empty()).then_some(&frontmatter),
            })
        } else {
            output.print(&result.html)?;
            Ok(())
        }
    }
}

fn renderer_from_config(render: &RenderConfig) -> MarkdownRenderer {
    MarkdownRenderer::new()
        .with_raw_prefix(render.raw_prefix.as_str())
        .with_docs_route(render.docs_route.as_str())
        .with_gfm(render.gfm)
        .with_highlighting(render.highlight)
        .with_title_extraction()
}
