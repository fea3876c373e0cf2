//! Unified diff parsing.

use serde::Serialize;

/// Classification of a diff line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Add,
    Delete,
    Context,
    /// `@@ -a,b +c,d @@` header.
    Hunk,
    /// `diff`, `index`, `---` and `+++` lines.
    FileHeader,
}

impl DiffKind {
    /// Gutter marker shown before the line text.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Delete => "-",
            Self::Context => " ",
            Self::Hunk | Self::FileHeader => "",
        }
    }
}

/// One classified line of a unified diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub kind: DiffKind,
    /// Line text. The `+`/`-`/space marker is stripped from add, delete and
    /// context lines; headers keep their full text.
    pub text: String,
    /// Line number in the new file; only add and context lines have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<u32>,
}

impl DiffLine {
    fn header(kind: DiffKind, line: &str) -> Self {
        Self {
            kind,
            text: line.to_owned(),
            new_line_number: None,
        }
    }
}

/// Parse unified diff text into line records.
///
/// Prefixes are checked in this order: `@@`, `+++`/`---`, `+`, `-`,
/// `diff`/`index`; anything else is context with its first character
/// dropped. The new-file counter starts at 0, is reset by each hunk header's
/// `+<n>` and advances on every add and context line.
///
/// # Examples
///
/// ```
/// use kb_git::{DiffKind, parse_diff};
///
/// let lines = parse_diff("@@ -1,2 +5,3 @@\n+new text\n context\n-old text\n");
/// assert_eq!(lines[1].kind, DiffKind::Add);
/// assert_eq!(lines[1].new_line_number, Some(5));
/// assert_eq!(lines[2].new_line_number, Some(6));
/// assert_eq!(lines[3].new_line_number, None);
/// ```
#[must_use]
pub fn parse_diff(raw: &str) -> Vec<DiffLine> {
    let mut lines = Vec::new();
    let mut next_line: u32 = 0;

    for line in raw.lines() {
        if line.starts_with("@@") {
            if let Some(start) = hunk_new_start(line) {
                next_line = start;
            }
            lines.push(DiffLine::header(DiffKind::Hunk, line));
        } else if line.starts_with("+++") || line.starts_with("---") {
            lines.push(DiffLine::header(DiffKind::FileHeader, line));
        } else if let Some(text) = line.strip_prefix('+') {
            lines.push(DiffLine {
                kind: DiffKind::Add,
                text: text.to_owned(),
                new_line_number: Some(next_line),
            });
            next_line = next_line.saturating_add(1);
        } else if let Some(text) = line.strip_prefix('-') {
            lines.push(DiffLine {
                kind: DiffKind::Delete,
                text: text.to_owned(),
                new_line_number: None,
            });
        } else if line.starts_with("diff") || line.starts_with("index") {
            lines.push(DiffLine::header(DiffKind::FileHeader, line));
        } else {
            let mut chars = line.chars();
            chars.next();
            lines.push(DiffLine {
                kind: DiffKind::Context,
                text: chars.as_str().to_owned(),
                new_line_number: Some(next_line),
            });
            next_line = next_line.saturating_add(1);
        }
    }

    lines
}

/// First `+<digits>` in a hunk header.
fn hunk_new_start(header: &str) -> Option<u32> {
    header.match_indices('+').find_map(|(i, _)| {
        let digits = &header[i + 1..];
        let len = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        digits[..len].parse().ok()
    })
}

/// Added and deleted line counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub deleted: usize,
}

impl DiffStats {
    #[must_use]
    pub fn from_lines(lines: &[DiffLine]) -> Self {
        lines.iter().fold(Self::default(), |mut stats, line| {
            match line.kind {
                DiffKind::Add => stats.added += 1,
                DiffKind::Delete => stats.deleted += 1,
                DiffKind::Context | DiffKind::Hunk | DiffKind::FileHeader => {}
            }
            stats
        })
    }
}
