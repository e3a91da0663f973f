//! Paging and filtering state for a displayed extraction result.
//!
//! Each of the four content sections (headings, paragraphs, links, images)
//! is either shown inline or paginated:
//!
//! - A section with at most [`PAGINATION_THRESHOLD`] items is shown inline,
//!   limited to the first [`INLINE_LIMIT`] items, without controls.
//! - A section with more items gets a [`PaginationState`] starting at page 1.
//!   Its first display still shows the inline items; after navigation a page
//!   shows a window of [`PAGE_SIZE`] items.
//!
//! Note the thresholds do not line up: a 10 item section shows 9 items and
//! no controls, so its tenth item is never displayed.

use crate::results::{ExtractionResult, Heading, Image, Link, Stats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Items per page once a section is paginated
pub const PAGE_SIZE: usize = 10;

/// Items shown inline before any navigation
pub const INLINE_LIMIT: usize = 9;

/// A section is paginated when it holds more items than this
pub const PAGINATION_THRESHOLD: usize = 10;

/// One of the four pageable content groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Headings,
    Paragraphs,
    Links,
    Images,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Headings,
        Section::Paragraphs,
        Section::Links,
        Section::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Headings => "headings",
            Section::Paragraphs => "paragraphs",
            Section::Links => "links",
            Section::Images => "images",
        }
    }

    /// Number of items this section holds in `result`
    pub fn item_count(&self, result: &ExtractionResult) -> usize {
        match self {
            Section::Headings => result.headings.len(),
            Section::Paragraphs => result.paragraphs.len(),
            Section::Links => result.links.len(),
            Section::Images => result.images.len(),
        }
    }

    /// The section's items in `result`
    pub fn items<'a>(&self, result: &'a ExtractionResult) -> SectionItems<'a> {
        match self {
            Section::Headings => SectionItems::Headings(&result.headings),
            Section::Paragraphs => SectionItems::Paragraphs(&result.paragraphs),
            Section::Links => SectionItems::Links(&result.links),
            Section::Images => SectionItems::Images(&result.images),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed items of one section
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionItems<'a> {
    Headings(&'a [Heading]),
    Paragraphs(&'a [String]),
    Links(&'a [Link]),
    Images(&'a [Image]),
}

impl<'a> SectionItems<'a> {
    pub fn len(&self) -> usize {
        match self {
            SectionItems::Headings(items) => items.len(),
            SectionItems::Paragraphs(items) => items.len(),
            SectionItems::Links(items) => items.len(),
            SectionItems::Images(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The items inside `window`, clamped to the section length
    pub fn slice(&self, window: Range<usize>) -> SectionItems<'a> {
        let end = window.end.min(self.len());
        let start = window.start.min(end);
        match *self {
            SectionItems::Headings(items) => SectionItems::Headings(&items[start..end]),
            SectionItems::Paragraphs(items) => SectionItems::Paragraphs(&items[start..end]),
            SectionItems::Links(items) => SectionItems::Links(&items[start..end]),
            SectionItems::Images(items) => SectionItems::Images(&items[start..end]),
        }
    }
}

/// Page navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Number of pages needed for `item_count` items
pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    item_count.div_ceil(page_size.max(1))
}

/// Half-open item range shown on 1-based `page`
pub fn page_window(page: usize, page_size: usize, item_count: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = (page.max(1) - 1).saturating_mul(page_size).min(item_count);
    let end = start.saturating_add(page_size).min(item_count);
    start..end
}

/// Items shown before any pagination kicks in
pub fn inline_window(item_count: usize) -> Range<usize> {
    0..item_count.min(INLINE_LIMIT)
}

/// Whether a section of `item_count` items gets pagination controls
pub fn needs_pagination(item_count: usize) -> bool {
    item_count > PAGINATION_THRESHOLD
}

/// Page position of one paginated section
///
/// Fully determined by item count, page size and current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    current_page: usize,
    total_pages: usize,
    page_size: usize,
}

impl PaginationState {
    /// State on page 1
    pub fn new(item_count: usize, page_size: usize) -> Self {
        Self::from_parts(item_count, page_size, 1)
    }

    /// Rebuilds a state, clamping `current_page` into the valid range
    pub fn from_parts(item_count: usize, page_size: usize, current_page: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(item_count, page_size);
        Self {
            current_page: current_page.clamp(1, total_pages.max(1)),
            total_pages,
            page_size,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Moves one page; returns false when already at the edge
    pub fn advance(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Next if self.has_next() => {
                self.current_page += 1;
                true
            }
            Direction::Previous if self.has_previous() => {
                self.current_page -= 1;
                true
            }
            _ => false,
        }
    }

    /// Jumps to `page`; out of range pages are ignored
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Previous button enablement
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Next button enablement
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Items on the current page
    pub fn window(&self, item_count: usize) -> Range<usize> {
        page_window(self.current_page, self.page_size, item_count)
    }
}

/// Navigation controls as displayed for a paginated section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavControls {
    pub current_page: usize,
    pub total_pages: usize,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl From<&PaginationState> for NavControls {
    fn from(state: &PaginationState) -> Self {
        Self {
            current_page: state.current_page(),
            total_pages: state.total_pages(),
            previous_enabled: state.has_previous(),
            next_enabled: state.has_next(),
        }
    }
}

/// Which sections the statistics filter currently shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFilter {
    #[default]
    All,
    Only(Section),
}

impl ContentFilter {
    pub fn shows(&self, section: Section) -> bool {
        match self {
            ContentFilter::All => true,
            ContentFilter::Only(only) => *only == section,
        }
    }

    /// Figure shown on the statistics card for this filter
    pub fn stat_value(&self, stats: &Stats) -> usize {
        match self {
            ContentFilter::All => stats.word_count,
            ContentFilter::Only(Section::Headings) => stats.total_headings,
            ContentFilter::Only(Section::Paragraphs) => stats.total_paragraphs,
            ContentFilter::Only(Section::Links) => stats.total_links,
            ContentFilter::Only(Section::Images) => stats.total_images,
        }
    }
}

/// Paging and filter state for the result set currently on display
#[derive(Debug, Clone)]
pub struct PaginationViewModel {
    page_size: usize,
    counts: HashMap<Section, usize>,
    states: HashMap<Section, PaginationState>,
    filter: ContentFilter,
}

impl Default for PaginationViewModel {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PaginationViewModel {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            counts: HashMap::new(),
            states: HashMap::new(),
            filter: ContentFilter::default(),
        }
    }

    /// View model already holding `result`
    pub fn for_result(result: &ExtractionResult) -> Self {
        let mut view = Self::default();
        view.load(result);
        view
    }

    /// Replaces every section state with fresh ones for `result`
    ///
    /// Page positions never carry over from the previous result set and the
    /// filter goes back to showing everything.
    pub fn load(&mut self, result: &ExtractionResult) {
        self.counts.clear();
        self.states.clear();
        self.filter = ContentFilter::All;

        for section in Section::ALL {
            let count = section.item_count(result);
            self.counts.insert(section, count);
            if needs_pagination(count) {
                let state = PaginationState::new(count, self.page_size);
                ::log::debug!(
                    "Paginating {} ({} items, {} pages)",
                    section,
                    count,
                    state.total_pages()
                );
                self.states.insert(section, state);
            }
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn item_count(&self, section: Section) -> usize {
        self.counts.get(&section).copied().unwrap_or(0)
    }

    /// Pagination state, if the section is paginated
    pub fn state(&self, section: Section) -> Option<&PaginationState> {
        self.states.get(&section)
    }

    pub fn is_paginated(&self, section: Section) -> bool {
        self.states.contains_key(&section)
    }

    /// Moves a paginated section one page; no-op at the edges or when inline
    pub fn advance(&mut self, section: Section, direction: Direction) -> bool {
        match self.states.get_mut(&section) {
            Some(state) => state.advance(direction),
            None => false,
        }
    }

    /// Jumps a paginated section to `page`; out of range pages are ignored
    pub fn go_to(&mut self, section: Section, page: usize) -> bool {
        match self.states.get_mut(&section) {
            Some(state) => state.go_to(page),
            None => false,
        }
    }

    /// Puts a paginated section back on page 1
    pub fn reset(&mut self, section: Section) {
        if let Some(state) = self.states.get_mut(&section) {
            state.reset();
        }
    }

    /// Items on `page` of a section
    pub fn render(&self, section: Section, page: usize) -> Range<usize> {
        page_window(page, self.page_size, self.item_count(section))
    }

    /// Items shown when the result set is first displayed
    pub fn initial_window(&self, section: Section) -> Range<usize> {
        inline_window(self.item_count(section))
    }

    /// Items on the current page, or the inline items when not paginated
    pub fn current_window(&self, section: Section) -> Range<usize> {
        match self.states.get(&section) {
            Some(state) => state.window(self.item_count(section)),
            None => self.initial_window(section),
        }
    }

    /// Navigation controls, present only for paginated sections
    pub fn controls(&self, section: Section) -> Option<NavControls> {
        self.states.get(&section).map(NavControls::from)
    }

    pub fn filter(&self) -> ContentFilter {
        self.filter
    }

    /// Changes the visible sections; page positions are kept
    pub fn set_filter(&mut self, filter: ContentFilter) {
        self.filter = filter;
    }

    /// Visible sections in display order
    pub fn visible_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|section| self.filter.shows(*section))
            .collect()
    }
}
