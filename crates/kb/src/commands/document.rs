//! `kb toc`, `kb links` and `kb frontmatter` command implementations.

use std::path::PathBuf;

use clap::Args;
use kb_renderer::{Frontmatter, extract_links, extract_toc};

use super::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for commands inspecting a single markdown document.
#[derive(Args)]
pub(crate) struct DocumentArgs {
    /// Markdown file (default: stdin).
    file: Option<PathBuf>,
}

impl DocumentArgs {
    /// Print heading records as JSON.
    pub(crate) fn toc(self) -> Result<(), CliError> {
        let text = read_input(self.file.as_deref())?;
        let (_, body) = Frontmatter::split(&text)?;
        Output::new().print_json(&extract_toc(body))
    }

    /// Print linked document paths, one per line.
    pub(crate) fn links(self) -> Result<(), CliError> {
        let output = Output::new();
        let text = read_input(self.file.as_deref())?;
        let (_, body) = Frontmatter::split(&text)?;
        for link in extract_links(body) {
            output.print(&link)?;
        }
        Ok(())
    }

    /// Print frontmatter fields as JSON.
    pub(crate) fn frontmatter(self) -> Result<(), CliError> {
        let text = read_input(self.file.as_deref())?;
        let (frontmatter, _) = Frontmatter::split(&text)?;
        Output::new().print_json(&frontmatter)
    }
}
