//! Fenced code detection for the line scanners.
//!
//! Container markers, block rules and inline protection all skip fenced code,
//! so each of them walks the source through a [`FenceTracker`].

/// A run of fence markers at the start of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MarkerRun {
    marker: u8,
    len: usize,
}

fn marker_run(line: &str) -> Option<MarkerRun> {
    let marker = *line.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = line.bytes().take_while(|&b| b == marker).count();
    Some(MarkerRun { marker, len })
}

/// Whether `line` (leading whitespace removed) closes a fence of at least
/// `min_len` `marker` characters.
pub(crate) fn closes_fence(line: &str, marker: u8, min_len: usize) -> bool {
    marker_run(line).is_some_and(|run| {
        run.marker == marker && run.len >= min_len && line[run.len..].trim().is_empty()
    })
}

/// Line-by-line view of whether a scanner sits inside fenced code.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<MarkerRun>,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns `true` when the line opens or closes a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let line = line.trim_start();
        match self.open {
            Some(open) => {
                let closed = closes_fence(line, open.marker, open.len);
                if closed {
                    self.open = None;
                }
                closed
            }
            None => {
                self.open = marker_run(line).filter(|run| run.len >= 3);
                self.open.is_some()
            }
        }
    }
}
