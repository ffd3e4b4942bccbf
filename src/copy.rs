//! Plain-text rendering of a selection

use crate::layout::{TextAddress, TextPage};
use crate::selection::Range;

/// Line terminator inserted at line and block boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Options for [`copy_range`]
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    pub line_ending: LineEnding,
    /// Replace control chars that are not whitespace with U+FFFD
    pub replace_control_chars: bool,
}

/// Render the chars of a range in reading order
///
/// One line ending separates chars from different lines, and a second one
/// separates chars from different blocks. Whitespace is copied verbatim.
pub fn copy_range(page: &TextPage, range: &Range, options: &CopyOptions) -> String {
    let flat = page.flatten();
    let mut out = String::with_capacity(range.len());
    let mut previous: Option<TextAddress> = None;

    for index in range.start()..range.end() {
        let (addr, ch) = match (flat.get(index), page.char_at(index)) {
            (Some(addr), Some(ch)) => (*addr, ch),
            _ => break,
        };

        if let Some(prev) = previous {
            let breaks = if prev.block != addr.block {
                2
            } else if prev.line != addr.line {
                1
            } else {
                0
            };
            for _ in 0..breaks {
                out.push_str(options.line_ending.as_str());
            }
        }

        if options.replace_control_chars && ch.c.is_control() && !ch.c.is_whitespace() {
            out.push(char::REPLACEMENT_CHARACTER);
        } else {
            out.push(ch.c);
        }
        previous = Some(addr);
    }

    log::trace!("copied {} chars", range.len());
    out
}
