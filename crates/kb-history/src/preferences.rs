//! Viewer preferences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{KeyValueStore, StoreError};

/// Store key holding the color theme.
pub const THEME_KEY: &str = "markdown-kb:theme";

/// Color theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized theme name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown theme '{0}' (expected 'light' or 'dark')")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ParseThemeError(other.to_owned())),
        }
    }
}

/// Preferences over a [`KeyValueStore`].
#[derive(Debug)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Explicitly stored theme, if any.
    pub fn stored_theme(&self) -> Option<Theme> {
        match self.store.get(THEME_KEY)? {
            Value::String(name) => name.parse().ok(),
            _ => None,
        }
    }

    /// Current theme; [`Theme::Light`] unless dark was stored.
    pub fn theme(&self) -> Theme {
        self.stored_theme().unwrap_or_default()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.store.set(THEME_KEY, Value::from(theme.as_str()))
    }

    /// Switch between light and dark, returning the new theme.
    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
