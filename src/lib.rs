//! Structured page text with search, highlight and copy
//!
//! This crate provides:
//! - A block → line → char model of one page's extracted text
//! - Point to character resolution in a canonical reading order
//! - Per-line highlight rectangles for point-to-point selections
//! - Substring search reported as rectangle groups
//! - Plain-text copy with line and paragraph breaks

pub mod copy;
pub mod geometry;
pub mod layout;
pub mod locator;
pub mod outline;
pub mod search;
pub mod selection;

pub use copy::{copy_range, CopyOptions, LineEnding};
pub use geometry::{Point, Rect};
pub use layout::{
    layout_text, layout_text_file, LayoutMetrics, LineSpan, ReadingOrder, TextAddress, TextBlock,
    TextChar, TextLine, TextPage,
};
pub use locator::{Position, SelectionMode};
pub use outline::{OutlineItem, OutlineSession, OutlineState, OutlineView};
pub use search::{search_pages, PageHits, SearchHit, SearchOptions};
pub use selection::Range;

/// Exclusively owned handle to one page of structured text
///
/// All queries borrow the handle immutably, so a shared reference can be
/// used from any number of threads. [`release`](Self::release) needs
/// exclusive access and may only happen once; every call after it fails
/// with [`StextError::UseAfterRelease`].
#[derive(Debug)]
pub struct StructuredText {
    page: Option<TextPage>,
}

impl StructuredText {
    pub fn new(page: TextPage) -> Self {
        Self { page: Some(page) }
    }

    /// Build a handle straight from blocks
    pub fn from_blocks(blocks: Vec<TextBlock>) -> Self {
        Self::new(TextPage::new(blocks))
    }

    /// Lay out plain text on a monospace grid and wrap it
    pub fn from_text(text: &str, metrics: &LayoutMetrics) -> Self {
        Self::new(layout_text(text, metrics))
    }

    /// The page model, unless released
    pub fn page(&self) -> Result<&TextPage, StextError> {
        self.page.as_ref().ok_or(StextError::UseAfterRelease)
    }

    pub fn blocks(&self) -> Result<&[TextBlock], StextError> {
        Ok(self.page()?.blocks())
    }

    /// Flattened reading order
    pub fn flatten(&self) -> Result<&[TextAddress], StextError> {
        Ok(self.page()?.flatten())
    }

    pub fn char_count(&self) -> Result<usize, StextError> {
        Ok(self.page()?.char_count())
    }

    pub fn locate(&self, p: Point) -> Result<Position, StextError> {
        locator::locate(self.page()?, p)
    }

    pub fn locate_with(&self, p: Point, mode: SelectionMode) -> Result<Position, StextError> {
        locator::locate_with(self.page()?, p, mode)
    }

    /// A point that resolves back to `pos`
    pub fn center_point(&self, pos: Position) -> Result<Point, StextError> {
        locator::center_point(self.page()?, pos)
    }

    /// Selection between two points with per-line highlight rectangles
    pub fn range(&self, a: Point, b: Point) -> Result<Range, StextError> {
        self.range_with(a, b, SelectionMode::default())
    }

    pub fn range_with(&self, a: Point, b: Point, mode: SelectionMode) -> Result<Range, StextError> {
        selection::resolve_range(self.page()?, a, b, mode)
    }

    /// Selection between two positions obtained earlier
    pub fn range_between(&self, a: Position, b: Position) -> Result<Range, StextError> {
        selection::range_between(self.page()?, a, b)
    }

    /// Highlight rectangles between two points
    pub fn highlight(&self, a: Point, b: Point) -> Result<Vec<Rect>, StextError> {
        Ok(self.range(a, b)?.rects)
    }

    /// Exact, case-sensitive search
    pub fn search(&self, needle: &str) -> Result<Vec<SearchHit>, StextError> {
        self.search_with(needle, &SearchOptions::default())
    }

    pub fn search_with(
        &self,
        needle: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, StextError> {
        search::search(self.page()?, needle, options)
    }

    /// Text between two points, with `\n` at line breaks
    pub fn copy_text(&self, a: Point, b: Point) -> Result<String, StextError> {
        self.copy_text_with(a, b, &CopyOptions::default())
    }

    pub fn copy_text_with(
        &self,
        a: Point,
        b: Point,
        options: &CopyOptions,
    ) -> Result<String, StextError> {
        let page = self.page()?;
        let range = selection::resolve_range(page, a, b, SelectionMode::default())?;
        Ok(copy_range(page, &range, options))
    }

    /// Free the page; fails if it was already released
    pub fn release(&mut self) -> Result<(), StextError> {
        match self.page.take() {
            Some(page) => {
                log::debug!("released structured text ({} chars)", page.char_count());
                Ok(())
            }
            None => Err(StextError::UseAfterRelease),
        }
    }

    pub fn is_released(&self) -> bool {
        self.page.is_none()
    }
}

impl From<TextPage> for StructuredText {
    fn from(page: TextPage) -> Self {
        Self::new(page)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StextError {
    #[error("Document has no extractable text")]
    EmptyDocument,
    #[error("Structured text used after release")]
    UseAfterRelease,
    #[error("Position {index} is outside the page ({len} chars)")]
    InvalidRange { index: usize, len: usize },
    #[error("Outline entry {index} does not exist ({len} entries)")]
    OutlineIndex { index: usize, len: usize },
    #[error("Search pattern error: {0}")]
    Pattern(#[from] regex::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
