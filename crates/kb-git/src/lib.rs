//! Parsers for git command output shown by the knowledge-base viewer.
//!
//! Nothing here runs git. Callers capture the output of
//! `git diff`, `git blame --porcelain` and `git log` with
//! [`LOG_PRETTY_FORMAT`] and hand the text to the matching parser. All
//! records serialize to JSON with `serde`.

mod blame;
mod diff;
mod log;

pub use blame::{BlameLine, parse_blame};
pub use diff::{DiffKind, DiffLine, DiffStats, parse_diff};
pub use log::{Commit, FIELD_SEPARATOR, LOG_PRETTY_FORMAT, parse_log};
