//! Persisted viewer state: recent searches and the color theme.
//!
//! Both live in a [`KeyValueStore`] under `markdown-kb:*` keys, either in
//! memory ([`MemoryStore`]) or in a JSON file ([`JsonFileStore`]).
//!
//! ```
//! use kb_history::{MemoryStore, Preferences, Theme};
//!
//! let mut prefs = Preferences::new(MemoryStore::new());
//! assert_eq!(prefs.theme(), Theme::Light);
//! prefs.set_theme(Theme::Dark).unwrap();
//! assert_eq!(prefs.theme(), Theme::Dark);
//! ```

mod preferences;
mod search_history;
mod store;

pub use preferences::{ParseThemeError, Preferences, THEME_KEY, Theme};
pub use search_history::{DEFAULT_MAX_ENTRIES, SEARCH_HISTORY_KEY, SearchHistory};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
