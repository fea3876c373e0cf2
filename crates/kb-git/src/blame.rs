//! `git blame --porcelain` parsing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Attribution of a single line of the blamed file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlameLine {
    pub hash: String,
    pub author: String,
    pub author_time: Option<DateTime<Utc>>,
    /// Line number in the final file (1-based).
    pub line_number: u32,
    pub content: String,
}

/// Commit details, printed by porcelain output only on first occurrence.
#[derive(Clone, Debug, Default)]
struct CommitInfo {
    author: String,
    author_time: Option<DateTime<Utc>>,
}

/// Parse `git blame --porcelain` output.
///
/// Each entry starts with `<hash> <orig-line> <final-line> [<count>]`,
/// followed by optional commit headers, and ends with the tab-prefixed
/// line content. Lines of an already seen commit reuse its cached author.
#[must_use]
pub fn parse_blame(porcelain: &str) -> Vec<BlameLine> {
    let mut commits: HashMap<String, CommitInfo> = HashMap::new();
    let mut current: Option<(String, u32)> = None;
    let mut lines = Vec::new();

    for line in porcelain.lines() {
        if let Some(content) = line.strip_prefix('\t') {
            if let Some((hash, line_number)) = current.take() {
                let info = commits.get(&hash).cloned().unwrap_or_default();
                lines.push(BlameLine {
                    hash,
                    author: info.author,
                    author_time: info.author_time,
                    line_number,
                    content: content.to_owned(),
                });
            }
            continue;
        }

        if let Some((hash, line_number)) = parse_entry_header(line) {
            commits.entry(hash.to_owned()).or_default();
            current = Some((hash.to_owned(), line_number));
            continue;
        }

        let Some(info) = current
            .as_ref()
            .and_then(|(hash, _)| commits.get_mut(hash))
        else {
            continue;
        };
        if let Some(author) = line.strip_prefix("author ") {
            author.clone_into(&mut info.author);
        } else if let Some(time) = line.strip_prefix("author-time ") {
            info.author_time = time
                .trim()
                .parse()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
        }
    }

    lines
}

/// `<hash> <orig-line> <final-line> [<count>]` → (hash, final line).
fn parse_entry_header(line: &str) -> Option<(&str, u32)> {
    let mut fields = line.split(' ');
    let hash = fields.next()?;
    if !is_object_id(hash) {
        return None;
    }
    let _orig_line = fields.next()?;
    let final_line = fields.next()?.parse().ok()?;
    Some((hash, final_line))
}

/// Full SHA-1 or SHA-256 object id.
fn is_object_id(s: &str) -> bool {
    matches!(s.len(), 40 | 64) && s.bytes().all(|b| b.is_ascii_hexdigit())
}
