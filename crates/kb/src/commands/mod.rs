//! CLI command implementations.

pub(crate) mod document;
pub(crate) mod git;
pub(crate) mod render;
pub(crate) mod state;

use std::io::Read;
use std::path::Path;

pub(crate) use document::DocumentArgs;
pub(crate) use git::GitArgs;
pub(crate) use render::RenderArgs;
pub(crate) use state::{HistoryCommand, ThemeArgs};

use crate::error::CliError;

/// Read `path`, or all of stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().lock().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
