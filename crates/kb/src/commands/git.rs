//! `kb diff`, `kb blame` and `kb log` command implementations.
//!
//! These parse output captured from git; they never run git themselves.

use std::fmt::Write;
use std::path::PathBuf;

use clap::Args;
use console::Style;
use kb_git::{
    BlameLine, Commit, DiffKind, DiffLine, DiffStats, parse_blame, parse_diff, parse_log,
};

use super::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for commands reading captured git output.
#[derive(Args)]
pub(crate) struct GitArgs {
    /// File holding the git output (default: stdin).
    file: Option<PathBuf>,

    /// Print parsed records as JSON.
    #[arg(long)]
    json: bool,
}

impl GitArgs {
    /// Show a unified diff.
    pub(crate) fn diff(self) -> Result<(), CliError> {
        let output = Output::new();
        let lines = parse_diff(&read_input(self.file.as_deref())?);

        if self.json {
            return output.print_json(&lines);
        }

        for line in &lines {
            let styled = diff_style(line.kind).apply_to(format_diff_line(line));
            output.print(&styled.to_string())?;
        }

        let stats = DiffStats::from_lines(&lines);
        output.info(&format!(
            "{} additions, {} deletions",
            stats.added, stats.deleted
        ));
        Ok(())
    }

    /// Show blame attribution per line.
    pub(crate) fn blame(self) -> Result<(), CliError> {
        let output = Output::new();
        let lines = parse_blame(&read_input(self.file.as_deref())?);

        if self.json {
            return output.print_json(&lines);
        }

        for line in &lines {
            output.print(&format_blame_line(line))?;
        }
        Ok(())
    }

    /// Show commit history.
    pub(crate) fn log(self) -> Result<(), CliError> {
        let output = Output::new();
        let commits = parse_log(&read_input(self.file.as_deref())?);

        if self.json {
            return output.print_json(&commits);
        }

        for commit in &commits {
            output.print(&format_commit(commit))?;
        }
        Ok(())
    }
}

fn diff_style(kind: DiffKind) -> Style {
    match kind {
        DiffKind::Add => Style::new().green(),
        DiffKind::Delete => Style::new().red(),
        DiffKind::Hunk => Style::new().cyan(),
        DiffKind::FileHeader => Style::new().bold(),
        DiffKind::Context => Style::new(),
    }
}

/// Gutter with the new-file line number, then marker and text.
fn format_diff_line(line: &DiffLine) -> String {
    let mut out = String::new();
    match line.new_line_number {
        Some(n) => write!(out, "{n:>5} ").unwrap(),
        None => out.push_str("      "),
    }
    out.push_str(line.kind.marker());
    out.push_str(&line.text);
    out
}

fn format_blame_line(line: &BlameLine) -> String {
    let hash = line.hash.get(..8).unwrap_or(&line.hash);
    let date = line
        .author_time
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{hash} ({:<20} {date:>10} {:>5}) {}",
        line.author, line.line_number, line.content
    )
}

fn format_commit(commit: &Commit) -> String {
    let date = commit
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{} {date:>10} {}: {}",
        commit.short_hash(),
        commit.author,
        commit.message
    )
}
