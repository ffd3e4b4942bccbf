//! Range resolution and highlight geometry
//!
//! A range is an ordered pair of positions. Its highlight is one rectangle
//! per intersected line rather than one box for the whole range, so that a
//! selection wrapping over several lines renders the way text flows.

use crate::geometry::{Point, Rect};
use crate::layout::TextPage;
use crate::locator::{locate_with, Position, SelectionMode};
use crate::StextError;

/// A resolved selection with its covering rectangles
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    /// Lower end in reading order
    pub lo: Position,
    /// Upper end in reading order
    pub hi: Position,
    /// One rect per intersected line, or a single caret for empty ranges
    pub rects: Vec<Rect>,
}

impl Range {
    /// First covered char
    pub fn start(&self) -> usize {
        self.lo.start()
    }

    /// One past the last covered char
    pub fn end(&self) -> usize {
        if self.lo == self.hi {
            self.start()
        } else {
            self.hi.end().max(self.start())
        }
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve two points to a range, whatever order they come in
pub fn resolve_range(
    page: &TextPage,
    a: Point,
    b: Point,
    mode: SelectionMode,
) -> Result<Range, StextError> {
    let pa = locate_with(page, a, mode)?;
    let pb = locate_with(page, b, mode)?;
    Ok(build_range(page, pa, pb))
}

/// Build a range from positions supplied by the caller
///
/// Both positions must refer to chars of this page.
pub fn range_between(page: &TextPage, a: Position, b: Position) -> Result<Range, StextError> {
    let len = page.char_count();
    if len == 0 {
        return Err(StextError::EmptyDocument);
    }
    for pos in [a, b] {
        if pos.index() >= len {
            return Err(StextError::InvalidRange {
                index: pos.index(),
                len,
            });
        }
    }
    Ok(build_range(page, a, b))
}

fn build_range(page: &TextPage, a: Position, b: Position) -> Range {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut range = Range {
        lo,
        hi,
        rects: Vec::new(),
    };

    range.rects = if range.is_empty() {
        caret_rect(page, lo).into_iter().collect()
    } else {
        covering_rects(page, range.start(), range.end())
    };
    range
}

/// Per-line union boxes of the chars in `start..end`
///
/// Each rect is the union of the char boxes of one line that fall inside
/// the range, so it never leaves that line's bbox.
pub fn covering_rects(page: &TextPage, start: usize, end: usize) -> Vec<Rect> {
    if start >= end {
        return Vec::new();
    }

    page.line_spans()
        .iter()
        .filter(|span| span.start < end && start < span.end)
        .filter_map(|span| {
            let from = start.max(span.start) - span.start;
            let to = end.min(span.end) - span.start;
            let chars = &page.span_chars(span)[from..to];
            Rect::union_all(chars.iter().map(|ch| &ch.bbox))
        })
        .collect()
}

/// Zero-width rect marking the boundary a position anchors to
fn caret_rect(page: &TextPage, pos: Position) -> Option<Rect> {
    let bbox = page.char_at(pos.index())?.bbox;
    let x = match pos {
        Position::Before(_) | Position::At(_) => bbox.x0,
        Position::After(_) => bbox.x1,
    };
    Some(bbox.caret_at(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_text, LayoutMetrics};

    fn page(text: &str) -> TextPage {
        layout_text(text, &LayoutMetrics::default())
    }

    #[test]
    fn test_same_point_is_empty_caret() {
        let p = page("HELLO WORLD");
        let pt = Point::new(65.0, 5.0);
        let range = resolve_range(&p, pt, pt, SelectionMode::Character).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.rects, vec![Rect::new(60.0, 0.0, 60.0, 10.0)]);
    }

    #[test]
    fn test_character_pair_is_inclusive() {
        let p = page("HELLO WORLD");
        let range = resolve_range(
            &p,
            Point::new(65.0, 5.0),
            Point::new(105.0, 5.0),
            SelectionMode::Character,
        )
        .unwrap();
        assert_eq!((range.start(), range.end()), (6, 11));
        assert_eq!(range.rects, vec![Rect::new(60.0, 0.0, 110.0, 10.0)]);
    }

    #[test]
    fn test_order_independent() {
        let p = page("abc def\nghi jkl\n\nmno");
        let a = Point::new(25.0, 4.0);
        let b = Point::new(12.0, 33.0);
        for mode in [SelectionMode::Character, SelectionMode::Caret] {
            let ab = resolve_range(&p, a, b, mode).unwrap();
            let ba = resolve_range(&p, b, a, mode).unwrap();
            assert_eq!(ab, ba);
        }
    }

    #[test]
    fn test_one_rect_per_line() {
        let p = page("abcdef\nghij\nklmnop");
        let range = resolve_range(
            &p,
            Point::new(35.0, 5.0),
            Point::new(15.0, 25.0),
            SelectionMode::Character,
        )
        .unwrap();
        assert_eq!(
            range.rects,
            vec![
                Rect::new(30.0, 0.0, 60.0, 10.0),
                Rect::new(0.0, 10.0, 40.0, 20.0),
                Rect::new(0.0, 20.0, 20.0, 30.0),
            ]
        );
    }

    #[test]
    fn test_caret_halves_of_one_glyph() {
        let p = page("abc");
        let range = resolve_range(
            &p,
            Point::new(11.0, 5.0),
            Point::new(19.0, 5.0),
            SelectionMode::Caret,
        )
        .unwrap();
        assert_eq!((range.start(), range.end()), (1, 2));
        assert_eq!(range.rects, vec![Rect::new(10.0, 0.0, 20.0, 10.0)]);
    }

    #[test]
    fn test_adjacent_boundaries_are_empty() {
        let p = page("ab\ncd");
        let range = range_between(&p, Position::After(1), Position::Before(2)).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.rects, vec![Rect::new(20.0, 0.0, 20.0, 10.0)]);
    }

    #[test]
    fn test_range_between_rejects_out_of_bounds() {
        let p = page("ab");
        assert!(matches!(
            range_between(&p, Position::At(0), Position::At(7)),
            Err(StextError::InvalidRange { index: 7, len: 2 })
        ));
        assert!(matches!(
            range_between(&TextPage::default(), Position::At(0), Position::At(0)),
            Err(StextError::EmptyDocument)
        ));
    }

    #[test]
    fn test_covering_rects_empty_input() {
        let p = page("abc");
        assert!(covering_rects(&p, 2, 2).is_empty());
        assert!(covering_rects(&p, 3, 1).is_empty());
    }
}
