//! Structured text model
//!
//! A page is a tree of blocks, lines and characters, each carrying a
//! bounding box. The tree is built once and never mutated afterwards; the
//! flattened block → line → char traversal computed here is the reading
//! order every query agrees on.

use crate::geometry::{Point, Rect};
use crate::StextError;
use once_cell::sync::OnceCell;
use std::path::Path;

/// A single character with its glyph bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextChar {
    /// Unicode scalar value
    pub c: char,
    /// Glyph box in page space (may be zero-width for spaces)
    pub bbox: Rect,
}

impl TextChar {
    pub fn new(c: char, bbox: Rect) -> Self {
        Self { c, bbox }
    }

    /// Spaces, tabs and separators have no visible glyph
    pub fn is_whitespace(&self) -> bool {
        self.c.is_whitespace()
    }
}

/// A line of characters in reading order
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    bbox: Rect,
    chars: Vec<TextChar>,
}

impl TextLine {
    /// Build a line; its bbox is the union of the char boxes
    pub fn new(chars: Vec<TextChar>) -> Self {
        let bbox = Rect::union_all(chars.iter().map(|ch| &ch.bbox)).unwrap_or_default();
        Self { bbox, chars }
    }

    /// A line without characters, positioned by the producer
    pub fn empty(bbox: Rect) -> Self {
        Self {
            bbox,
            chars: Vec::new(),
        }
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn chars(&self) -> &[TextChar] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(|ch| ch.c).collect()
    }
}

/// A block (paragraph or column fragment) of lines
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    bbox: Rect,
    lines: Vec<TextLine>,
}

impl TextBlock {
    /// Build a block; its bbox is the union of the line boxes
    pub fn new(lines: Vec<TextLine>) -> Self {
        let bbox = Rect::union_all(lines.iter().map(|l| &l.bbox)).unwrap_or_default();
        Self { bbox, lines }
    }

    /// A block without lines, positioned by the producer
    pub fn empty(bbox: Rect) -> Self {
        Self {
            bbox,
            lines: Vec::new(),
        }
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }
}

/// Tree address of one character
///
/// The derived ordering compares block, then line, then char, which is the
/// reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextAddress {
    pub block: usize,
    pub line: usize,
    pub ch: usize,
}

/// The flattened char range `start..end` covered by one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub block: usize,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

/// The canonical reading order of a page
#[derive(Debug, Clone, Default)]
pub struct ReadingOrder {
    chars: Vec<TextAddress>,
    lines: Vec<LineSpan>,
}

impl ReadingOrder {
    fn compute(blocks: &[TextBlock]) -> Self {
        let mut chars = Vec::new();
        let mut lines = Vec::new();

        for (b, block) in blocks.iter().enumerate() {
            for (l, line) in block.lines.iter().enumerate() {
                let start = chars.len();
                chars.extend((0..line.chars.len()).map(|ch| TextAddress {
                    block: b,
                    line: l,
                    ch,
                }));
                lines.push(LineSpan {
                    block: b,
                    line: l,
                    start,
                    end: chars.len(),
                });
            }
        }

        Self { chars, lines }
    }

    /// Addresses of every char, indexed by flattened position
    pub fn chars(&self) -> &[TextAddress] {
        &self.chars
    }

    /// Every line in reading order, including lines without chars
    pub fn lines(&self) -> &[LineSpan] {
        &self.lines
    }

    /// The line owning the char at a flattened index
    pub fn line_of(&self, index: usize) -> Option<&LineSpan> {
        let pos = self.lines.partition_point(|span| span.end <= index);
        self.lines.get(pos).filter(|span| span.contains(index))
    }
}

/// One page of structured text
#[derive(Debug, Clone, Default)]
pub struct TextPage {
    blocks: Vec<TextBlock>,
    order: OnceCell<ReadingOrder>,
}

impl TextPage {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self {
            blocks,
            order: OnceCell::new(),
        }
    }

    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Union of all block boxes, `None` for a page without blocks
    pub fn bbox(&self) -> Option<Rect> {
        Rect::union_all(self.blocks.iter().map(|b| &b.bbox))
    }

    /// Reading order, computed on first use
    pub fn reading_order(&self) -> &ReadingOrder {
        self.order.get_or_init(|| ReadingOrder::compute(&self.blocks))
    }

    /// Flattened block → line → char addresses
    pub fn flatten(&self) -> &[TextAddress] {
        self.reading_order().chars()
    }

    pub fn line_spans(&self) -> &[LineSpan] {
        self.reading_order().lines()
    }

    pub fn char_count(&self) -> usize {
        self.flatten().len()
    }

    /// True when the page has no characters at all
    pub fn is_empty(&self) -> bool {
        self.char_count() == 0
    }

    pub fn address(&self, index: usize) -> Option<TextAddress> {
        self.flatten().get(index).copied()
    }

    /// The char at a flattened index
    pub fn char_at(&self, index: usize) -> Option<&TextChar> {
        let addr = self.address(index)?;
        Some(&self.blocks[addr.block].lines[addr.line].chars[addr.ch])
    }

    pub fn line(&self, span: &LineSpan) -> &TextLine {
        &self.blocks[span.block].lines[span.line]
    }

    /// Chars of a line span, in reading order
    pub fn span_chars(&self, span: &LineSpan) -> &[TextChar] {
        self.line(span).chars()
    }

    /// All chars in reading order
    pub fn chars(&self) -> impl Iterator<Item = &TextChar> + '_ {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.chars.iter())
    }
}

/// Cell geometry for [`layout_text`]
#[derive(Debug, Clone)]
pub struct LayoutMetrics {
    /// Advance of every glyph
    pub cell_width: f32,
    /// Height of every glyph
    pub cell_height: f32,
    /// Extra space between rows
    pub line_gap: f32,
    /// Top-left corner of the first cell
    pub origin: Point,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            cell_width: 10.0,
            cell_height: 10.0,
            line_gap: 0.0,
            origin: Point::new(0.0, 0.0),
        }
    }
}

/// Lay plain text out on a monospace grid
///
/// Each non-blank row becomes a line, consecutive rows form a block and
/// blank rows separate blocks. Blank rows still take vertical space.
pub fn layout_text(text: &str, metrics: &LayoutMetrics) -> TextPage {
    let mut blocks = Vec::new();
    let mut lines: Vec<TextLine> = Vec::new();
    let row_height = metrics.cell_height + metrics.line_gap;

    for (row, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            if !lines.is_empty() {
                blocks.push(TextBlock::new(std::mem::take(&mut lines)));
            }
            continue;
        }

        let y = metrics.origin.y + row as f32 * row_height;
        let chars = raw
            .chars()
            .enumerate()
            .map(|(col, c)| {
                let x = metrics.origin.x + col as f32 * metrics.cell_width;
                TextChar::new(
                    c,
                    Rect::from_xywh(x, y, metrics.cell_width, metrics.cell_height),
                )
            })
            .collect();
        lines.push(TextLine::new(chars));
    }

    if !lines.is_empty() {
        blocks.push(TextBlock::new(lines));
    }

    log::debug!("laid out {} blocks from {} bytes", blocks.len(), text.len());
    TextPage::new(blocks)
}

/// Lay out the contents of a UTF-8 text file
pub fn layout_text_file<P: AsRef<Path>>(
    path: P,
    metrics: &LayoutMetrics,
) -> Result<TextPage, StextError> {
    let text = std::fs::read_to_string(path)?;
    Ok(layout_text(&text, metrics))
}
