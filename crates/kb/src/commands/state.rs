//! `kb history` and `kb theme` command implementations.

use std::path::Path;

use clap::{Args, Subcommand, ValueEnum};
use kb_config::Config;
use kb_history::{JsonFileStore, Preferences, SearchHistory, Theme};

use crate::error::CliError;
use crate::output::Output;

/// Search history subcommands.
#[derive(Subcommand)]
pub(crate) enum HistoryCommand {
    /// List recent queries, most recent first.
    List,
    /// Record a query.
    Add {
        /// Search query.
        query: String,
    },
    /// Forget all queries.
    Clear,
}

impl HistoryCommand {
    /// Execute the history command.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(config_path, None)?;
        let store = JsonFileStore::open(&config.history_resolved.store_path)?;
        let mut history =
            SearchHistory::new(store).with_max_entries(config.history_resolved.max_entries);

        match self {
            Self::List => {
                for query in history.entries() {
                    output.print(&query)?;
                }
            }
            Self::Add { query } => {
                history.add(&query)?;
                tracing::info!(path = %history.store().path().display(), "Recorded query");
            }
            Self::Clear => {
                history.clear()?;
                output.success("Search history cleared");
            }
        }

        Ok(())
    }
}

/// Theme to switch to.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum ThemeChoice {
    Light,
    Dark,
    /// Switch to the other theme.
    Toggle,
}

/// Arguments for the theme command.
#[derive(Args)]
pub(crate) struct ThemeArgs {
    /// New theme; prints the current theme when omitted.
    #[arg(value_enum)]
    theme: Option<ThemeChoice>,
}

impl ThemeArgs {
    /// Execute the theme command.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(config_path, None)?;
        let store = JsonFileStore::open(&config.history_resolved.store_path)?;
        let mut prefs = Preferences::new(store);

        let theme = match self.theme {
            None => prefs.theme(),
            Some(ThemeChoice::Toggle) => prefs.toggle_theme()?,
            Some(ThemeChoice::Light) => apply(&mut prefs, Theme::Light)?,
            Some(ThemeChoice::Dark) => apply(&mut prefs, Theme::Dark)?,
        };

        output.print(theme.as_str())?;
        Ok(())
    }
}

fn apply(prefs: &mut Preferences<JsonFileStore>, theme: Theme) -> Result<Theme, CliError> {
    prefs.set_theme(theme)?;
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_history::KeyValueStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir) -> std::path::PathBuf {
        let path = tmp.path().join("kb.toml");
        std::fs::write(
            &path,
            "[history]\nstore_path = \"state.json\"\nmax_entries = 2\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_history_add_persists() {
        let tmp = TempDir::new().unwrap();
        let config = write_config(&tmp);

        for query in ["a", "b", "c"] {
            HistoryCommand::Add {
                query: query.to_owned(),
            }
            .execute(Some(config.as_path()))
            .unwrap();
        }

        let store = JsonFileStore::open(tmp.path().join("state.json")).unwrap();
        assert_eq!(SearchHistory::new(store).entries(), vec!["c", "b"]);
    }

    #[test]
    fn test_history_clear() {
        let tmp = TempDir::new().unwrap();
        let config = write_config(&tmp);

        HistoryCommand::Add {
            query: "a".to_owned(),
        }
        .execute(Some(config.as_path()))
        .unwrap();
        HistoryCommand::Clear.execute(Some(config.as_path())).unwrap();

        let store = JsonFileStore::open(tmp.path().join("state.json")).unwrap();
        assert_eq!(store.get(kb_history::SEARCH_HISTORY_KEY), None);
    }

    #[test]
    fn test_theme_toggle_persists() {
        let tmp = TempDir::new().unwrap();
        let config = write_config(&tmp);

        ThemeArgs {
            theme: Some(ThemeChoice::Toggle),
        }
        .execute(Some(config.as_path()))
        .unwrap();

        let store = JsonFileStore::open(tmp.path().join("state.json")).unwrap();
        assert_eq!(Preferences::new(store).theme(), Theme::Dark);
    }
}
