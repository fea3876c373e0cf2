//! kb CLI - Knowledge-base toolkit.
//!
//! Provides commands for:
//! - `render`, `toc`, `links`, `frontmatter`: inspect markdown documents
//! - `diff`, `blame`, `log`: parse captured git output
//! - `history`, `theme`: persisted viewer state

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DocumentArgs, GitArgs, HistoryCommand, RenderArgs, ThemeArgs};
use output::Output;

/// kb - Knowledge-base toolkit.
#[derive(Parser)]
#[command(name = "kb", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover kb.toml).
    #[arg(short, long, global = true, env = "KB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file to HTML.
    Render(RenderArgs),
    /// Print the heading outline of a markdown file as JSON.
    Toc(DocumentArgs),
    /// List documents linked from a markdown file.
    Links(DocumentArgs),
    /// Print the frontmatter of a markdown file as JSON.
    Frontmatter(DocumentArgs),
    /// Show a unified diff with new-file line numbers.
    Diff(GitArgs),
    /// Show `git blame --porcelain` output line by line.
    Blame(GitArgs),
    /// Show `git log` output captured with the kb pretty format.
    Log(GitArgs),
    /// Recent search queries.
    #[command(subcommand)]
    History(HistoryCommand),
    /// Show or change the color theme.
    Theme(ThemeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Render(args) => args.execute(config),
        Commands::Toc(args) => args.toc(),
        Commands::Links(args) => args.links(),
        Commands::Frontmatter(args) => args.frontmatter(),
        Commands::Diff(args) => args.diff(),
        Commands::Blame(args) => args.blame(),
        Commands::Log(args) => args.log(),
        Commands::History(cmd) => cmd.execute(config),
        Commands::Theme(args) => args.execute(config),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
