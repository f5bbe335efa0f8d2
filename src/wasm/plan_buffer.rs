//! Flat buffer protocol for zero-copy plan transfer
//!
//! Binary format of a [`PagePlan`]:
//!
//! ## u32 Buffer Layout:
//! ```text
//! Header:
//! [0]     MAGIC (0x5254504C = "RTPL" for validation)
//! [1]     SCHEMA_VERSION (protocol version, currently 1)
//! [2]     page_count
//! [3]     page_width (px)
//! [4]     page_height (px)
//! [5]     margin_px
//! [6]     reserved_height (header + both margins, px)
//! [7..]   page data...
//!
//! Per-page:
//!   [folio, first_row, end_row]
//!     first_row inclusive, end_row exclusive
//! ```

use crate::layout::{PagePlan, PageSize, PageSlice};

/// Magic number for format validation: "RTPL" (Report Table PLan)
pub const MAGIC: u32 = 0x5254504C;

/// Schema version for protocol compatibility checking
pub const SCHEMA_VERSION: u32 = 1;

/// Header size in u32 elements
pub const HEADER_SIZE: usize = 7;

/// Number of u32 values per page
pub const U32_PER_PAGE: usize = 3;

/// Plan buffer for zero-copy WASM transfer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanBuffer {
    pub u32_data: Vec<u32>,
}

impl PlanBuffer {
    /// Encode a plan
    pub fn from_plan(plan: &PagePlan) -> Self {
        let mut u32_data = Vec::with_capacity(HEADER_SIZE + plan.pages.len() * U32_PER_PAGE);
        u32_data.extend_from_slice(&[
            MAGIC,
            SCHEMA_VERSION,
            plan.pages.len() as u32,
            plan.page_size.width,
            plan.page_size.height,
            plan.margin_px,
            plan.reserved_height,
        ]);

        for page in &plan.pages {
            u32_data.extend_from_slice(&[page.folio, page.start as u32, page.end as u32]);
        }

        Self { u32_data }
    }

    /// Decode a buffer, rejecting a bad header or a truncated page table
    pub fn decode(data: &[u32]) -> Option<PagePlan> {
        let header = data.get(..HEADER_SIZE)?;
        if header[0] != MAGIC || header[1] != SCHEMA_VERSION {
            return None;
        }

        let page_count = header[2] as usize;
        let body = data.get(HEADER_SIZE..HEADER_SIZE + page_count * U32_PER_PAGE)?;
        let pages = body
            .chunks_exact(U32_PER_PAGE)
            .map(|page| PageSlice {
                folio: page[0],
                start: page[1] as usize,
                end: page[2] as usize,
            })
            .collect();

        Some(PagePlan {
            page_size: PageSize {
                width: header[3],
                height: header[4],
            },
            margin_px: header[5],
            reserved_height: header[6],
            pages,
        })
    }

    pub fn page_count(&self) -> usize {
        self.u32_data.get(2).copied().unwrap_or(0) as usize
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.u32_data
    }
}
