use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::warn;

/// Page size used when the caller supplies none, or an invalid one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Number of entries shown per page; always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub fn new(size: usize) -> Option<PageSize> {
        match size {
            0 => None,
            n => Some(PageSize(n)),
        }
    }

    /// Parse user-supplied text as a positive integer
    pub fn parse(input: &str) -> Result<PageSize, String> {
        input
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(PageSize::new)
            .ok_or_else(|| {
                format!(
                    "page size should be a positive integer, but is {:?}. Replacing with default ({}).",
                    input, DEFAULT_PAGE_SIZE
                )
            })
    }

    /// Parse user-supplied text, falling back to [`DEFAULT_PAGE_SIZE`] with a
    /// warning when it is not a positive integer
    pub fn parse_or_default(input: &str) -> PageSize {
        PageSize::parse(input).unwrap_or_else(|msg| {
            warn!("{}", msg);
            PageSize::default()
        })
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(DEFAULT_PAGE_SIZE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        PageSize::new(value).ok_or_else(|| "page size must be a positive integer".to_string())
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

/// A clickable page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// Zero-based page index
    pub index: usize,
    /// Offset of the first entry on the page
    pub offset: usize,
}

/// Windowed view over an ordered slice of entries
///
/// Holds no current-page state; every call takes the offset to show.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a, T> {
    entries: &'a [T],
    page_size: PageSize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(entries: &'a [T], page_size: PageSize) -> Self {
        Self { entries, page_size }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Number of pages, at least 1 so an empty result still shows one page
    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(self.page_size.get()).max(1)
    }

    /// Entries `[offset, offset + page_size)`, clipped to the slice; empty when
    /// `offset` is past the end
    pub fn page(&self, offset: usize) -> &'a [T] {
        let range = self.page_range(offset);
        &self.entries[range]
    }

    /// Index range [`page`](Self::page) returns
    pub fn page_range(&self, offset: usize) -> Range<usize> {
        let len = self.entries.len();
        let start = offset.min(len);
        let end = offset.saturating_add(self.page_size.get()).min(len);
        start..end
    }

    /// Zero-based index of the page containing `offset`
    pub fn current_page(&self, offset: usize) -> usize {
        offset / self.page_size.get()
    }

    /// Page indices `0..page_count`
    pub fn page_index_sequence(&self) -> Range<usize> {
        0..self.page_count()
    }

    /// Page selectors with the offset each one maps to
    pub fn page_links(&self) -> Vec<PageLink> {
        self.page_index_sequence()
            .map(|index| PageLink {
                index,
                offset: index * self.page_size.get(),
            })
            .collect()
    }
}
