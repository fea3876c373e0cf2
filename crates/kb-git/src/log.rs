//! `git log` parsing.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Separator between fields of a formatted log line (ASCII unit separator).
pub const FIELD_SEPARATOR: char = '\x1f';

/// `--pretty` argument producing output [`parse_log`] understands.
pub const LOG_PRETTY_FORMAT: &str = "--pretty=format:%H%x1f%an%x1f%aI%x1f%s";

/// A commit touching a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    /// Author date; `None` when git printed something that is not RFC 3339.
    pub date: Option<DateTime<FixedOffset>>,
    /// Subject line.
    pub message: String,
}

impl Commit {
    /// Abbreviated hash for display.
    #[must_use]
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Parse `git log` output produced with [`LOG_PRETTY_FORMAT`].
///
/// Lines without all four fields are skipped. The subject is the remainder
/// of the line and may itself contain the separator.
#[must_use]
pub fn parse_log(output: &str) -> Vec<Commit> {
    output.lines().filter_map(parse_commit_line).collect()
}

fn parse_commit_line(line: &str) -> Option<Commit> {
    let mut fields = line.splitn(4, FIELD_SEPARATOR);
    let hash = fields.next()?.trim();
    let author = fields.next()?;
    let date = fields.next()?;
    let message = fields.next()?;
    if hash.is_empty() {
        return None;
    }

    Some(Commit {
        hash: hash.to_owned(),
        author: author.to_owned(),
        date: DateTime::parse_from_rfc3339(date.trim()).ok(),
        message: message.to_owned(),
    })
}
