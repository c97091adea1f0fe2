//! Page navigation for multi-page record forms.
//!
//! Several entities are entered through a paged wizard (page 1 identity,
//! later pages content sections). All pages share one underlying draft;
//! the pager only tracks which page is visible.

/// First page number (1-based).
pub const FIRST_PAGE: u8 = 1;

/// Bounded page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    current: u8,
    total: u8,
}

impl Pager {
    /// Create a pager positioned on the first page.
    ///
    /// A `total` of zero is treated as a single page.
    pub fn new(total: u8) -> Self {
        Self {
            current: FIRST_PAGE,
            total: total.max(FIRST_PAGE),
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == FIRST_PAGE
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    /// Advance one page. A no-op on the last page.
    ///
    /// Returns whether the visible page changed.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Go back one page. A no-op on the first page.
    pub fn back(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Jump to a page, clamped into range.
    pub fn goto(&mut self, page: u8) {
        self.current = page.clamp(FIRST_PAGE, self.total);
    }

    pub fn reset(&mut self) {
        self.current = FIRST_PAGE;
    }
}
