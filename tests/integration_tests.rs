//! Integration tests for the structured text query engine

use stext_inspector::{
    layout_text, layout_text_file, search_pages, CopyOptions, LayoutMetrics, LineEnding,
    OutlineItem, OutlineState, OutlineView, Point, Position, Rect, SearchOptions, SelectionMode,
    StextError, StructuredText, TextBlock, TextChar, TextLine,
};
use std::io::Write;

// Helper to lay out text on the default 10x10 grid
fn make_text(text: &str) -> StructuredText {
    StructuredText::from_text(text, &LayoutMetrics::default())
}

fn make_line(text: &str, x: f32, y: f32, advance: f32) -> TextLine {
    let chars = text
        .chars()
        .enumerate()
        .map(|(i, c)| TextChar::new(c, Rect::from_xywh(x + i as f32 * advance, y, advance, 12.0)))
        .collect();
    TextLine::new(chars)
}

const SAMPLE: &str = "Structured text keeps\nglyph boxes per char\n\nSearch and copy\nwork on them";

// ============================================================================
// Search Tests
// ============================================================================

#[test]
fn test_search_hello_world() {
    let text = make_text("HELLO WORLD");
    let hits = text.search("WORLD").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rects, vec![Rect::new(60.0, 0.0, 110.0, 10.0)]);
}

#[test]
fn test_search_empty_needle_on_any_document() {
    for doc in ["", "a", SAMPLE] {
        let text = make_text(doc);
        assert!(text.search("").unwrap().is_empty());
    }
}

#[test]
fn test_search_no_match_is_empty() {
    let text = make_text(SAMPLE);
    assert!(text.search("absent").unwrap().is_empty());
}

#[test]
fn test_search_hits_in_reading_order() {
    let text = make_text(SAMPLE);
    let hits = text.search("e").unwrap();
    assert!(hits.len() > 3);
    assert!(hits.windows(2).all(|w| w[0].end <= w[1].start));
}

#[test]
fn test_search_normalized_across_blocks() {
    let text = make_text(SAMPLE);
    let opts = SearchOptions {
        normalize_whitespace: true,
        ..Default::default()
    };
    let hits = text.search_with("per char Search", &opts).unwrap();
    assert_eq!(hits.len(), 1);
    // One rect on the last line of the first block, one on the first of the second
    assert_eq!(hits[0].rects.len(), 2);
    assert!(text.search("per char Search").unwrap().is_empty());
}

#[test]
fn test_search_pages_in_parallel() {
    let pages = vec![
        make_text("alpha beta"),
        make_text("gamma"),
        make_text("beta beta"),
    ];
    let results = search_pages(&pages, "beta", &SearchOptions::default()).unwrap();
    let summary: Vec<(usize, usize)> = results.iter().map(|p| (p.page, p.hits.len())).collect();
    assert_eq!(summary, vec![(0, 1), (2, 2)]);
}

#[test]
fn test_search_pages_fails_on_released_page() {
    let mut released = make_text("beta");
    released.release().unwrap();
    let pages = vec![make_text("beta"), released];
    assert!(matches!(
        search_pages(&pages, "beta", &SearchOptions::default()),
        Err(StextError::UseAfterRelease)
    ));
}

// ============================================================================
// Range / Highlight Tests
// ============================================================================

#[test]
fn test_range_same_point_is_caret() {
    let text = make_text(SAMPLE);
    for p in [Point::new(33.0, 4.0), Point::new(-10.0, 15.0), Point::new(999.0, 45.0)] {
        let range = text.range(p, p).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.rects.len(), 1);
        assert_eq!(range.rects[0].width(), 0.0);
    }
}

#[test]
fn test_range_is_order_independent() {
    let text = make_text(SAMPLE);
    let a = Point::new(47.0, 3.0);
    let b = Point::new(28.0, 41.0);
    assert_eq!(text.range(a, b).unwrap(), text.range(b, a).unwrap());
}

#[test]
fn test_range_rects_stay_inside_lines() {
    let text = make_text(SAMPLE);
    let page = text.page().unwrap();
    let range = text
        .range(Point::new(55.0, 5.0), Point::new(35.0, 45.0))
        .unwrap();

    let line_boxes: Vec<Rect> = page
        .line_spans()
        .iter()
        .filter(|s| s.start < range.end() && range.start() < s.end)
        .map(|s| page.line(s).bbox())
        .collect();
    assert_eq!(line_boxes.len(), range.rects.len());
    for (rect, line) in range.rects.iter().zip(&line_boxes) {
        assert!(line.encloses(rect), "{:?} outside {:?}", rect, line);
    }
}

#[test]
fn test_range_over_irregular_lines() {
    // Two lines with different advances, the second indented
    let text = StructuredText::from_blocks(vec![TextBlock::new(vec![
        make_line("wide", 0.0, 0.0, 8.0),
        make_line("narrow", 20.0, 14.0, 5.0),
    ])]);
    let range = text
        .range(Point::new(9.0, 6.0), Point::new(31.0, 20.0))
        .unwrap();
    assert_eq!((range.start(), range.end()), (1, 7));
    assert_eq!(
        range.rects,
        vec![Rect::new(8.0, 0.0, 32.0, 12.0), Rect::new(20.0, 14.0, 35.0, 26.0)]
    );
}

#[test]
fn test_range_between_rejects_foreign_positions() {
    let text = make_text("abc");
    assert!(matches!(
        text.range_between(Position::At(0), Position::After(10)),
        Err(StextError::InvalidRange { index: 10, len: 3 })
    ));
}

#[test]
fn test_empty_document_errors() {
    let text = make_text("");
    let p = Point::new(1.0, 1.0);
    assert!(matches!(text.locate(p), Err(StextError::EmptyDocument)));
    assert!(matches!(text.range(p, p), Err(StextError::EmptyDocument)));
    assert!(matches!(text.copy_text(p, p), Err(StextError::EmptyDocument)));
    assert!(text.search("x").unwrap().is_empty());
}

// ============================================================================
// Locate Tests
// ============================================================================

#[test]
fn test_locate_idempotent_over_grid() {
    let text = make_text(SAMPLE);
    for y in (-20..70).step_by(7) {
        for x in (-30..260).step_by(13) {
            let p = Point::new(x as f32, y as f32);
            let pos = text.locate(p).unwrap();
            let again = text.locate(text.center_point(pos).unwrap()).unwrap();
            assert_eq!(pos, again, "point ({}, {})", x, y);
        }
    }
}

#[test]
fn test_caret_mode_two_points_in_one_glyph() {
    let text = make_text("HELLO");
    let range = text
        .range_with(Point::new(21.0, 5.0), Point::new(28.0, 5.0), SelectionMode::Caret)
        .unwrap();
    assert_eq!(range.len(), 1);

    let range = text
        .range_with(Point::new(21.0, 5.0), Point::new(24.0, 5.0), SelectionMode::Caret)
        .unwrap();
    assert!(range.is_empty());
}

// ============================================================================
// Copy Tests
// ============================================================================

#[test]
fn test_copy_round_trips_without_separators() {
    let text = make_text(SAMPLE);
    let page = text.page().unwrap();
    let first = page.char_at(0).unwrap().bbox.center();
    let last = page.char_at(page.char_count() - 1).unwrap().bbox.center();

    let copied = text.copy_text(first, last).unwrap();
    assert_eq!(
        copied,
        "Structured text keeps\nglyph boxes per char\n\nSearch and copy\nwork on them"
    );

    let stripped: String = copied.chars().filter(|&c| c != '\n').collect();
    let original: String = page.chars().map(|c| c.c).collect();
    assert_eq!(stripped, original);
}

#[test]
fn test_copy_crlf() {
    let text = make_text("ab\ncd\n\nef");
    let opts = CopyOptions {
        line_ending: LineEnding::CrLf,
        ..Default::default()
    };
    let copied = text
        .copy_text_with(Point::new(-5.0, 5.0), Point::new(50.0, 35.0), &opts)
        .unwrap();
    assert_eq!(copied, "ab\r\ncd\r\n\r\nef");
}

// ============================================================================
// Release Tests
// ============================================================================

#[test]
fn test_release_then_queries_fail() {
    let mut text = make_text(SAMPLE);
    let p = Point::new(5.0, 5.0);
    assert!(text.search("text").is_ok());

    text.release().unwrap();
    assert!(matches!(text.search("text"), Err(StextError::UseAfterRelease)));
    assert!(matches!(text.locate(p), Err(StextError::UseAfterRelease)));
    assert!(matches!(text.copy_text(p, p), Err(StextError::UseAfterRelease)));
    assert!(matches!(text.release(), Err(StextError::UseAfterRelease)));
}

#[test]
fn test_concurrent_queries() {
    let text = make_text(SAMPLE);
    let expected = text.search("o").unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                assert_eq!(text.search("o").unwrap(), expected);
                assert!(text.copy_text(Point::new(0.0, 0.0), Point::new(50.0, 5.0)).is_ok());
            });
        }
    });
}

// ============================================================================
// Layout Input Tests
// ============================================================================

#[test]
fn test_layout_text_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", SAMPLE).unwrap();

    let page = layout_text_file(file.path(), &LayoutMetrics::default()).unwrap();
    let direct = layout_text(SAMPLE, &LayoutMetrics::default());
    assert_eq!(page.blocks(), direct.blocks());
    assert_eq!(page.blocks().len(), 2);
}

#[test]
fn test_layout_text_file_missing() {
    let result = layout_text_file("/nonexistent/page.txt", &LayoutMetrics::default());
    assert!(matches!(result, Err(StextError::Io(_))));
}

// ============================================================================
// Outline Session Tests
// ============================================================================

#[test]
fn test_outline_session_lifecycle() {
    let mut state = OutlineState::new();
    let toc = || {
        vec![
            OutlineItem::new("Cover", 0, 0),
            OutlineItem::new("Chapter 1", 3, 0),
            OutlineItem::new("Section 1.1", 4, 1),
        ]
    };

    let view = OutlineView::open(state.open("book.pdf", toc));
    assert_eq!(view.initial_scroll_position(), 0);
    assert_eq!(view.select(2, 1).unwrap(), 4);

    let view = OutlineView::open(state.open("book.pdf", toc));
    assert_eq!(view.initial_scroll_position(), 1);
    view.dismiss();

    let view = OutlineView::open(state.open("other.pdf", Vec::new));
    assert_eq!(view.initial_scroll_position(), 0);
    assert!(view.items().is_empty());
}
