//! Offset pagination helpers.

use thiserror::Error;

/// A bounded slice of the product listing, ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    limit: i64,
    offset: i64,
}

impl PageWindow {
    /// Build a window; `limit` must be at least 1 and `offset` must not be negative.
    pub fn new(limit: i64, offset: i64) -> Result<Self, PaginationError> {
        if limit < 1 {
            return Err(PaginationError::Limit(limit));
        }
        if offset < 0 {
            return Err(PaginationError::Offset(offset));
        }
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Apply the window to an already ordered sequence.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.iter().skip(skip).take(take).cloned().collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid limit: has value {0}, must be ge 1")]
    Limit(i64),
    #[error("invalid offset: has value {0}, must be ge 0")]
    Offset(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_bounds() {
        assert_eq!(PageWindow::new(0, 0), Err(PaginationError::Limit(0)));
        assert_eq!(PageWindow::new(5, -1), Err(PaginationError::Offset(-1)));
    }

    #[test]
    fn slice_past_end_is_empty() {
        let window = PageWindow::new(2, 10).expect("valid window");
        assert!(window.slice(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn slice_near_end_is_shorter() {
        let window = PageWindow::new(2, 2).expect("valid window");
        assert_eq!(window.slice(&[1, 2, 3]), vec![3]);
    }
}
