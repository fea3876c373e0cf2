//! Configuration management for the knowledge-base toolkit.
//!
//! Parses `kb.toml` with serde and discovers it in the current directory or
//! any parent. Values from the command line are applied on top through
//! [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `render.raw_prefix`
//! - `render.docs_route`
//! - `history.store_path`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the raw file URL prefix.
    pub raw_prefix: Option<String>,
    /// Override the document route.
    pub docs_route: Option<String>,
    /// Override GFM extensions.
    pub gfm: Option<bool>,
    /// Override syntax highlighting.
    pub highlight: Option<bool>,
    /// Override the state file location.
    pub store_path: Option<PathBuf>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "kb.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering options.
    pub render: RenderConfig,
    /// History section as written in TOML (paths are relative strings).
    history: HistoryConfigRaw,

    /// Resolved history configuration (set after loading).
    #[serde(skip)]
    pub history_resolved: HistoryConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Rendering options.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// URL prefix for resolved relative image paths.
    pub raw_prefix: String,
    /// Route prefix for wiki-link targets.
    pub docs_route: String,
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Enable fenced code highlighting.
    pub highlight: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            raw_prefix: "/api/v1/raw/".to_owned(),
            docs_route: "/docs/".to_owned(),
            gfm: true,
            highlight: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct HistoryConfigRaw {
    store_path: Option<String>,
    max_entries: Option<usize>,
}

/// Resolved history configuration.
#[derive(Debug, PartialEq, Eq)]
pub struct HistoryConfig {
    /// JSON file holding search history and preferences.
    pub store_path: PathBuf,
    /// Number of remembered search queries.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

const DEFAULT_STORE_PATH: &str = ".kb/state.json";
const DEFAULT_MAX_ENTRIES: usize = 10;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`render.raw_prefix`").
        field: String,
        /// Error message (e.g., "${`KB_RAW_PREFIX`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_leading_slash(value: &str, field: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must start with '/'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `kb.toml` in the current directory and its parents, falling back
    /// to defaults relative to the current directory.
    ///
    /// CLI settings are applied last and are validated like file values.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the resulting values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(raw_prefix) = &settings.raw_prefix {
            self.render.raw_prefix.clone_from(raw_prefix);
        }
        if let Some(docs_route) = &settings.docs_route {
            self.render.docs_route.clone_from(docs_route);
        }
        if let Some(gfm) = settings.gfm {
            self.render.gfm = gfm;
        }
        if let Some(highlight) = settings.highlight {
            self.render.highlight = highlight;
        }
        if let Some(store_path) = &settings.store_path {
            self.history_resolved.store_path.clone_from(store_path);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            render: RenderConfig::default(),
            history: HistoryConfigRaw::default(),
            history_resolved: HistoryConfig {
                store_path: base.join(DEFAULT_STORE_PATH),
                max_entries: DEFAULT_MAX_ENTRIES,
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.raw_prefix, "render.raw_prefix")?;
        require_leading_slash(&self.render.raw_prefix, "render.raw_prefix")?;
        require_non_empty(&self.render.docs_route, "render.docs_route")?;
        require_leading_slash(&self.render.docs_route, "render.docs_route")?;

        if self.history_resolved.max_entries == 0 {
            return Err(ConfigError::Validation(
                "history.max_entries must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.render.raw_prefix = expand::expand_env(&self.render.raw_prefix, "render.raw_prefix")?;
        self.render.docs_route = expand::expand_env(&self.render.docs_route, "render.docs_route")?;

        if let Some(ref store_path) = self.history.store_path {
            self.history.store_path =
                Some(expand::expand_env(store_path, "history.store_path")?);
        }

        Ok(())
    }

    /// Resolve the state file against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.history_resolved = HistoryConfig {
            store_path: config_dir.join(
                self.history
                    .store_path
                    .as_deref()
                    .unwrap_or(DEFAULT_STORE_PATH),
            ),
            max_entries: self.history.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.render, RenderConfig::default());
        assert_eq!(config.render.raw_prefix, "/api/v1/raw/");
        assert_eq!(config.render.docs_route, "/docs/");
        assert!(config.render.gfm);
        assert!(config.render.highlight);
        assert_eq!(
            config.history_resolved.store_path,
            PathBuf::from("/test/.kb/state.json")
        );
        assert_eq!(config.history_resolved.max_entries, 10);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render, RenderConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
raw_prefix = "/files/"
gfm = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.raw_prefix, "/files/");
        assert_eq!(config.render.docs_route, "/docs/");
        assert!(!config.render.gfm);
        assert!(config.render.highlight);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[history]
store_path = "state/kb.json"
max_entries = 25
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.history_resolved,
            HistoryConfig {
                store_path: PathBuf::from("/project/state/kb.json"),
                max_entries: 25,
            }
        );
    }

    #[test]
    fn test_resolve_paths_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.history_resolved.store_path,
            PathBuf::from("/project/.kb/state.json")
        );
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            docs_route: Some("/wiki/".to_owned()),
            highlight: Some(false),
            store_path: Some(PathBuf::from("/tmp/state.json")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.render.docs_route, "/wiki/");
        assert!(!config.render.highlight);
        assert_eq!(config.render.raw_prefix, "/api/v1/raw/"); // Unchanged
        assert!(config.render.gfm); // Unchanged
        assert_eq!(
            config.history_resolved.store_path,
            PathBuf::from("/tmp/state.json")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.render, RenderConfig::default());
        assert_eq!(config.history_resolved.max_entries, 10);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("KB_TEST_CONFIG_STATE_DIR", "cache");
        }

        let toml = r#"
[render]
raw_prefix = "${KB_TEST_CONFIG_RAW_UNSET:-/raw/}"

[history]
store_path = "${KB_TEST_CONFIG_STATE_DIR}/state.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.render.raw_prefix, "/raw/");
        assert_eq!(
            config.history_resolved.store_path,
            PathBuf::from("/project/cache/state.json")
        );

        unsafe {
            std::env::remove_var("KB_TEST_CONFIG_STATE_DIR");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("KB_TEST_CONFIG_MISSING");
        }
        let toml = r#"
[render]
docs_route = "${KB_TEST_CONFIG_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(
            matches!(err, ConfigError::EnvVar { ref field, .. } if field == "render.docs_route"),
            "Expected ConfigError::EnvVar, got {err:?}"
        );
    }

    #[test]
    fn test_validate_empty_prefix() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.render.raw_prefix = String::new();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: render.raw_prefix cannot be empty"
        );
    }

    #[test]
    fn test_validate_prefix_without_slash() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.render.raw_prefix = "api/raw/".to_owned();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: render.raw_prefix must start with '/'"
        );
    }

    #[test]
    fn test_validate_docs_route() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.render.docs_route = "docs".to_owned();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_max_entries_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.history_resolved.max_entries = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("history.max_entries"));
    }

    #[test]
    fn test_load_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[render]\ndocs_route = \"/kb/\"\n\n[history]\nmax_entries = 3\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path()), None).unwrap();

        assert_eq!(config.render.docs_route, "/kb/");
        assert_eq!(config.history_resolved.max_entries, 3);
        assert_eq!(
            config.history_resolved.store_path,
            tmp.path().join(".kb/state.json")
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.toml");
        let err = Config::load(Some(path.as_path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render\n").unwrap();
        let err = Config::load(Some(path.as_path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[history]\nmax_entries = 0\n").unwrap();
        let err = Config::load(Some(path.as_path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            raw_prefix: Some("raw".to_owned()),
            ..Default::default()
        };
        let err = Config::load(Some(path.as_path()), Some(&overrides)).unwrap_err();
        assert!(err.to_string().contains("render.raw_prefix"));
    }

    #[test]
    fn test_discover_in_parent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path));
    }
}
