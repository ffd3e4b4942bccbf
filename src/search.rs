//! Substring search over the reading order
//!
//! The haystack is the page text in reading order with a `\n` separator
//! after every line and another after every block. Separators carry no
//! geometry: a hit is reported by the rectangles of the real chars it
//! covers. Exact matching runs line by line, so only whitespace
//! normalization lets a match cross a separator.

use crate::geometry::Rect;
use crate::layout::TextPage;
use crate::selection::covering_rects;
use crate::{StextError, StructuredText};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Compiled size limit for needle patterns
const PATTERN_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Options for [`search`]
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Match regardless of letter case
    pub ignore_case: bool,
    /// Any whitespace run in the needle matches any whitespace run in the
    /// text, line breaks included
    pub normalize_whitespace: bool,
    /// Stop after this many hits
    pub max_hits: Option<usize>,
}

/// One occurrence of the needle
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// First matched char (flattened index)
    pub start: usize,
    /// One past the last matched char
    pub end: usize,
    /// One rect per line the match touches
    pub rects: Vec<Rect>,
}

/// Hits on one page of a multi-page search
#[derive(Debug, Clone, PartialEq)]
pub struct PageHits {
    /// Index of the page in the searched slice
    pub page: usize,
    pub hits: Vec<SearchHit>,
}

/// Page text with a map from haystack chars back to flattened indices
struct Haystack {
    text: String,
    /// Byte offset of every haystack char
    offsets: Vec<usize>,
    /// Flattened index of every haystack char, `None` for separators
    slots: Vec<Option<usize>>,
    /// Byte range of every line's real chars
    lines: Vec<std::ops::Range<usize>>,
}

impl Haystack {
    fn build(page: &TextPage) -> Self {
        let mut text = String::with_capacity(page.char_count() * 2);
        let mut offsets = Vec::with_capacity(page.char_count());
        let mut slots = Vec::with_capacity(page.char_count());
        let mut lines = Vec::new();
        let mut push = |c: char, slot: Option<usize>, text: &mut String| {
            offsets.push(text.len());
            slots.push(slot);
            text.push(c);
        };

        let mut index = 0;
        for block in page.blocks() {
            for line in block.lines() {
                let line_start = text.len();
                for ch in line.chars() {
                    push(ch.c, Some(index), &mut text);
                    index += 1;
                }
                lines.push(line_start..text.len());
                push('\n', None, &mut text);
            }
            push('\n', None, &mut text);
        }

        Self {
            text,
            offsets,
            slots,
            lines,
        }
    }

    /// Byte ranges of every match, per line unless `across_lines`
    fn matches(&self, re: &Regex, across_lines: bool) -> Vec<(usize, usize)> {
        if across_lines {
            return re
                .find_iter(&self.text)
                .map(|m| (m.start(), m.end()))
                .collect();
        }
        self.lines
            .iter()
            .flat_map(|line| {
                re.find_iter(&self.text[line.clone()])
                    .map(move |m| (line.start + m.start(), line.start + m.end()))
            })
            .collect()
    }

    /// Flattened char range covered by the byte range of a match
    fn char_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let from = self.offsets.partition_point(|&o| o < start);
        let to = self.offsets.partition_point(|&o| o < end);
        let mut covered = self.slots[from..to].iter().flatten();
        let first = *covered.next()?;
        let last = covered.last().copied().unwrap_or(first);
        Some((first, last + 1))
    }
}

/// Build the regex a needle compiles to, `None` if nothing can match
fn needle_pattern(needle: &str, options: &SearchOptions) -> Result<Option<Regex>, StextError> {
    let pattern = if options.normalize_whitespace {
        let mut pattern = String::new();
        let mut last = 0;
        for run in WHITESPACE_RUN.find_iter(needle) {
            pattern.push_str(&regex::escape(&needle[last..run.start()]));
            pattern.push_str(r"\s+");
            last = run.end();
        }
        pattern.push_str(&regex::escape(&needle[last..]));
        pattern
    } else {
        regex::escape(needle)
    };

    if pattern.is_empty() {
        return Ok(None);
    }

    let re = RegexBuilder::new(&pattern)
        .case_insensitive(options.ignore_case)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()?;
    Ok(Some(re))
}

/// True when the needle has more chars than the page could ever match
///
/// Each needle char matches exactly one page char; under whitespace
/// normalization only the non-whitespace chars are counted.
fn longer_than_page(page: &TextPage, needle: &str, options: &SearchOptions) -> bool {
    if options.normalize_whitespace {
        let solid = |c: &char| !c.is_whitespace();
        needle.chars().filter(solid).count() > page.chars().map(|ch| ch.c).filter(solid).count()
    } else {
        needle.chars().count() > page.char_count()
    }
}

/// Find every leftmost, non-overlapping occurrence of `needle`
///
/// An empty needle, a page without text, or a needle longer than the
/// page yields no hits.
pub fn search(
    page: &TextPage,
    needle: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchHit>, StextError> {
    if needle.is_empty() || page.is_empty() || longer_than_page(page, needle, options) {
        return Ok(Vec::new());
    }
    let re = match needle_pattern(needle, options)? {
        Some(re) => re,
        None => return Ok(Vec::new()),
    };

    let haystack = Haystack::build(page);
    let limit = options.max_hits.unwrap_or(usize::MAX);
    let hits: Vec<SearchHit> = haystack
        .matches(&re, options.normalize_whitespace)
        .into_iter()
        .filter_map(|(start, end)| haystack.char_range(start, end))
        .take(limit)
        .map(|(start, end)| SearchHit {
            start,
            end,
            rects: covering_rects(page, start, end),
        })
        .collect();

    log::debug!("search for {:?} found {} hits", needle, hits.len());
    Ok(hits)
}

/// Search many pages in parallel
///
/// Results come back in page order; pages without hits are left out. A
/// released page fails the whole search.
pub fn search_pages(
    pages: &[StructuredText],
    needle: &str,
    options: &SearchOptions,
) -> Result<Vec<PageHits>, StextError> {
    let results: Vec<PageHits> = pages
        .par_iter()
        .enumerate()
        .map(|(page, text)| {
            text.search_with(needle, options)
                .map(|hits| PageHits { page, hits })
        })
        .collect::<Result<_, _>>()?;

    Ok(results.into_iter().filter(|p| !p.hits.is_empty()).collect())
}
