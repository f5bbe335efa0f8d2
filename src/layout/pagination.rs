//! Pagination for a whole row queue

use crate::layout::dimension::PageSize;
use crate::layout::packer::{RowMetric, RowPacker};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Rows assigned to one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSlice {
    /// Page number
    pub folio: u32,
    /// First row index (inclusive)
    pub start: usize,
    /// Last row index (exclusive)
    pub end: usize,
}

impl PageSlice {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this page contains a given row
    pub fn contains_row(&self, index: usize) -> bool {
        self.rows().contains(&index)
    }
}

/// Iterator over the pages cut from a row queue
pub struct Pages<'a, T> {
    packer: &'a RowPacker,
    rows: &'a [T],
    offset: usize,
    folio: u32,
}

impl<'a, T: RowMetric> Pages<'a, T> {
    pub fn new(packer: &'a RowPacker, rows: &'a [T], starting_folio: u32) -> Self {
        Self {
            packer,
            rows,
            offset: 0,
            folio: starting_folio,
        }
    }

    /// Rows not yet assigned to a page
    pub fn pending(&self) -> &'a [T] {
        &self.rows[self.offset..]
    }
}

impl<T: RowMetric> Iterator for Pages<'_, T> {
    type Item = PageSlice;

    fn next(&mut self) -> Option<PageSlice> {
        let (placed, rest) = self.packer.pack(self.pending());
        if placed.is_empty() {
            return None;
        }

        // No folio after u32::MAX: the last numbered page takes the remainder
        let Some(next_folio) = self.folio.checked_add(1) else {
            if !rest.is_empty() {
                log::warn!(
                    "folio {} is the last page number, placing {} remaining rows on it",
                    self.folio,
                    rest.len()
                );
            }
            let slice = PageSlice {
                folio: self.folio,
                start: self.offset,
                end: self.rows.len(),
            };
            self.offset = slice.end;
            return Some(slice);
        };

        let slice = PageSlice {
            folio: self.folio,
            start: self.offset,
            end: self.offset + placed.len(),
        };
        self.offset = slice.end;
        self.folio = next_folio;
        Some(slice)
    }
}

/// Cut `rows` into pages numbered from `starting_folio`
pub fn paginate<T: RowMetric>(
    packer: &RowPacker,
    rows: &[T],
    starting_folio: u32,
) -> Vec<PageSlice> {
    Pages::new(packer, rows, starting_folio).collect()
}

/// Host-independent description of a pagination run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePlan {
    pub page_size: PageSize,
    pub margin_px: u32,
    pub reserved_height: u32,
    pub pages: Vec<PageSlice>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page holding the row at `index`
    pub fn page_for_row(&self, index: usize) -> Option<&PageSlice> {
        self.pages.iter().find(|page| page.contains_row(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::packer::PackOptions;

    #[test]
    fn test_paginate_covers_all_rows() {
        let packer = RowPacker::new(1000, 140, PackOptions::default());
        let rows = [300u32, 300, 300, 300];
        let pages = paginate(&packer, &rows, 1);

        assert_eq!(
            pages,
            vec![
                PageSlice { folio: 1, start: 0, end: 3 },
                PageSlice { folio: 2, start: 3, end: 4 },
            ]
        );
    }

    #[test]
    fn test_starting_folio() {
        let packer = RowPacker::new(1000, 140, PackOptions::default());
        let rows = [1000u32, 1000, 1000];
        let folios: Vec<_> = paginate(&packer, &rows, 5).iter().map(|p| p.folio).collect();
        assert_eq!(folios, vec![5, 6, 7]);
    }

    #[test]
    fn test_last_folio_does_not_overflow() {
        let packer = RowPacker::new(1000, 140, PackOptions::default());
        let pages = paginate(&packer, &[20u32], u32::MAX);
        assert_eq!(pages, vec![PageSlice { folio: u32::MAX, start: 0, end: 1 }]);
    }

    #[test]
    fn test_last_folio_takes_remaining_rows() {
        let packer = RowPacker::new(1000, 140, PackOptions::default());
        let rows = [1000u32, 1000, 1000];
        let pages = paginate(&packer, &rows, u32::MAX - 1);
        assert_eq!(
            pages,
            vec![
                PageSlice { folio: u32::MAX - 1, start: 0, end: 1 },
                PageSlice { folio: u32::MAX, start: 1, end: 3 },
            ]
        );
    }

    #[test]
    fn test_no_rows_no_pages() {
        let packer = RowPacker::new(1000, 140, PackOptions::default());
        let rows: [u32; 0] = [];
        assert!(paginate(&packer, &rows, 1).is_empty());
    }

    #[test]
    fn test_page_for_row() {
        let plan = PagePlan {
            page_size: PageSize { width: 816, height: 1054 },
            margin_px: 57,
            reserved_height: 150,
            pages: vec![
                PageSlice { folio: 1, start: 0, end: 2 },
                PageSlice { folio: 2, start: 2, end: 5 },
            ],
        };

        assert_eq!(plan.page_for_row(3).map(|p| p.folio), Some(2));
        assert!(plan.page_for_row(5).is_none());
        assert_eq!(plan.page_count(), 2);
    }
}
