//! Point to reading-order position resolution
//!
//! A page-space point is resolved in two steps: first the nearest line,
//! then the nearest character within that line. Points past either end of
//! a line resolve to the boundary before its first char or after its last.

use crate::geometry::{Point, Rect};
use crate::layout::{LineSpan, TextPage};
use crate::StextError;
use std::cmp::Ordering;

/// A resolved location in the flattened char sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Caret boundary immediately before char `i`
    Before(usize),
    /// Inside the glyph of char `i`
    At(usize),
    /// Caret boundary immediately after char `i`
    After(usize),
}

impl Position {
    /// Flattened index of the char this position refers to
    pub fn index(&self) -> usize {
        match *self {
            Position::Before(i) | Position::At(i) | Position::After(i) => i,
        }
    }

    fn rank(&self) -> (usize, u8) {
        match *self {
            Position::Before(i) => (i, 0),
            Position::At(i) => (i, 1),
            Position::After(i) => (i, 2),
        }
    }

    /// First char covered when this position opens a range
    pub fn start(&self) -> usize {
        match *self {
            Position::Before(i) | Position::At(i) => i,
            Position::After(i) => i + 1,
        }
    }

    /// One past the last char covered when this position closes a range
    pub fn end(&self) -> usize {
        match *self {
            Position::Before(i) => i,
            Position::At(i) | Position::After(i) => i + 1,
        }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How a point inside a glyph is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// A point inside a glyph selects that whole char
    #[default]
    Character,
    /// A point snaps to the nearest char boundary (left or right glyph half)
    Caret,
}

/// Resolve a point using [`SelectionMode::Character`]
pub fn locate(page: &TextPage, p: Point) -> Result<Position, StextError> {
    locate_with(page, p, SelectionMode::Character)
}

/// Resolve a point to a position in reading order
pub fn locate_with(page: &TextPage, p: Point, mode: SelectionMode) -> Result<Position, StextError> {
    let span = nearest_line(page, p).ok_or(StextError::EmptyDocument)?;
    let chars = page.span_chars(span);

    let (first, last) = match (chars.first(), chars.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(StextError::EmptyDocument),
    };
    if p.x < first.bbox.x0 {
        return Ok(Position::Before(span.start));
    }
    if p.x > last.bbox.x1 {
        return Ok(Position::After(span.end - 1));
    }

    // Containing glyphs have distance 0; among those prefer the nearest centre
    let (offset, bbox) = chars
        .iter()
        .enumerate()
        .map(|(i, ch)| (i, ch.bbox))
        .min_by(|(_, a), (_, b)| cmp_key(&char_key(a, p.x), &char_key(b, p.x)))
        .ok_or(StextError::EmptyDocument)?;
    let index = span.start + offset;

    let position = match mode {
        SelectionMode::Character => Position::At(index),
        SelectionMode::Caret if p.x < bbox.center().x => Position::Before(index),
        SelectionMode::Caret => Position::After(index),
    };
    log::trace!("located ({}, {}) at {:?}", p.x, p.y, position);
    Ok(position)
}

/// A point that resolves back to `pos` under [`locate`]
///
/// Inside positions prefer the glyph centre. Boundary positions prefer a
/// point half a cell beyond the glyph's leading or trailing edge, moving
/// closer to the edge when a neighbouring line would claim that point.
/// A position `locate` can never produce gets the preferred point.
pub fn center_point(page: &TextPage, pos: Position) -> Result<Point, StextError> {
    let len = page.char_count();
    if len == 0 {
        return Err(StextError::EmptyDocument);
    }
    let ch = page
        .char_at(pos.index())
        .ok_or(StextError::InvalidRange {
            index: pos.index(),
            len,
        })?;

    let candidates = candidate_points(&ch.bbox, pos);
    let preferred = candidates[0];
    for candidate in candidates {
        if matches!(locate(page, candidate), Ok(found) if found == pos) {
            return Ok(candidate);
        }
    }
    log::debug!("no point resolves back to {:?}", pos);
    Ok(preferred)
}

const ROW_FRACTIONS: [f32; 5] = [0.5, 0.25, 0.75, 0.05, 0.95];
const NUDGE_STEPS: [f32; 6] = [1.0, 0.5, 0.25, 0.125, 0.0625, 0.015625];

/// Points tried by [`center_point`], preferred first
fn candidate_points(bbox: &Rect, pos: Position) -> Vec<Point> {
    let rows = ROW_FRACTIONS.map(|f| bbox.y0 + bbox.height() * f);
    let nudge = bbox.width().max(bbox.height()).max(1.0) / 2.0;

    let (edge, sign) = match pos {
        Position::At(_) => {
            let cols = ROW_FRACTIONS.map(|f| bbox.x0 + bbox.width() * f);
            return rows
                .iter()
                .flat_map(|&y| cols.iter().map(move |&x| Point::new(x, y)))
                .collect();
        }
        Position::Before(_) => (bbox.x0, -1.0),
        Position::After(_) => (bbox.x1, 1.0),
    };
    rows.iter()
        .flat_map(|&y| {
            NUDGE_STEPS
                .into_iter()
                .map(move |step| Point::new(edge + sign * nudge * step, y))
        })
        .collect()
}

/// The line a point belongs to
///
/// Lines are ranked by vertical distance, then horizontal distance, then
/// distance from the line's vertical centre; the earliest line in reading
/// order wins remaining ties. Lines without chars are skipped.
pub(crate) fn nearest_line(page: &TextPage, p: Point) -> Option<&LineSpan> {
    let mut best: Option<(&LineSpan, [f32; 3])> = None;

    for span in page.line_spans().iter().filter(|s| !s.is_empty()) {
        let bbox = page.line(span).bbox();
        let key = [
            bbox.vertical_distance(p.y),
            bbox.horizontal_distance(p.x),
            (bbox.center().y - p.y).abs(),
        ];
        let better = match &best {
            None => true,
            Some((_, best_key)) => cmp_key(&key, best_key) == Ordering::Less,
        };
        if better {
            best = Some((span, key));
        }
    }

    best.map(|(span, _)| span)
}

fn char_key(bbox: &Rect, x: f32) -> [f32; 2] {
    [bbox.horizontal_distance(x), (bbox.center().x - x).abs()]
}

/// Lexicographic comparison of distance keys
fn cmp_key(a: &[f32], b: &[f32]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}
