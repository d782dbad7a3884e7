//! Pagination types

/// Line number of the first record (windows are 1-based)
pub const FIRST_LINE: u32 = 1;

/// Result of processing one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Another page is needed, starting at this line
    Continue {
        /// First line of the next window
        start_line: u32,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Tracks the page window of one schema during extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// First line of the current window
    pub start_line: u32,
    /// Pages processed so far
    pub pages_fetched: u32,
    /// Records processed across all pages
    pub total_fetched: u64,
    /// Records processed in the most recent page
    pub last_page_count: usize,
    /// Is pagination complete?
    pub done: bool,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            start_line: FIRST_LINE,
            pages_fetched: 0,
            total_fetched: 0,
            last_page_count: 0,
            done: false,
        }
    }
}

impl PageWindow {
    /// Create a window positioned on the first line
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Record a page of `records_count` records requested with `page_size`.
    ///
    /// A full page advances the window by `page_size`; a short page
    /// (including an empty one) ends pagination.
    pub fn process_page(&mut self, records_count: usize, page_size: u32) -> NextPage {
        self.pages_fetched += 1;
        self.last_page_count = records_count;
        self.total_fetched += records_count as u64;

        if page_size == 0 || records_count < page_size as usize {
            self.mark_done();
            return NextPage::Done;
        }

        match self.start_line.checked_add(page_size) {
            Some(next) => {
                self.start_line = next;
                NextPage::Continue { start_line: next }
            }
            None => {
                self.mark_done();
                NextPage::Done
            }
        }
    }
}
