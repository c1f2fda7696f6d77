use crate::constants::DEFAULT_PAGE_SIZE;
use std::num::NonZeroUsize;
use tracing::debug;

/// Number of lines shown on one page. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    pub fn new(lines: usize) -> Option<Self> {
        NonZeroUsize::new(lines).map(PageSize)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(NonZeroUsize::MIN.saturating_add(DEFAULT_PAGE_SIZE - 1))
    }
}

/// Splits a book's lines into fixed-size pages and tracks the visible one.
///
/// The current page index is kept inside `0..total_pages()` at all times;
/// out-of-range requests saturate at the nearest valid page.
#[derive(Debug)]
pub struct Paginator {
    lines: Vec<String>,
    page_size: PageSize,
    page_index: usize,
}

impl Paginator {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            lines: Vec::new(),
            page_size,
            page_index: 0,
        }
    }

    pub fn load_lines(&mut self, lines: Vec<String>) {
        debug!("Loading {} lines into paginator", lines.len());
        self.lines = lines;
        self.page_index = 0;
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn total_pages(&self) -> usize {
        self.lines.len().div_ceil(self.page_size.get()).max(1)
    }

    /// Moves to `requested`, clamped into the valid page range.
    pub fn go_to(&mut self, requested: i64) {
        let last = (self.total_pages() - 1) as i64;
        self.page_index = requested.clamp(0, last) as usize;
    }

    pub fn next_page(&mut self) {
        self.go_to(self.page_index as i64 + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to(self.page_index as i64 - 1);
    }

    pub fn first_page(&mut self) {
        self.page_index = 0;
    }

    pub fn last_page(&mut self) {
        self.page_index = self.total_pages() - 1;
    }

    pub fn current_page_lines(&self) -> &[String] {
        let start = (self.page_index * self.page_size.get()).min(self.lines.len());
        let end = (start + self.page_size.get()).min(self.lines.len());
        &self.lines[start..end]
    }

    pub fn current_page_text(&self) -> String {
        self.current_page_lines().join("\n")
    }

    pub fn status_label(&self) -> String {
        format!("Page {} of {}", self.page_index + 1, self.total_pages())
    }

    /// Page that contains the given 0-based line of the book.
    pub fn page_for_line(&self, absolute_line: usize) -> usize {
        (absolute_line / self.page_size.get()).min(self.total_pages() - 1)
    }
}
