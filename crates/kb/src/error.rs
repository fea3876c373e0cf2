//! CLI error types.

use kb_config::ConfigError;
use kb_history::StoreError;
use kb_renderer::FrontmatterError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
