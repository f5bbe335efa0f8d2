//! Page geometry and row packing

pub mod dimension;
mod packer;
mod pagination;

pub use dimension::{
    mm_to_px, page_size, px_to_mm, screen_dpi, Dpi, Margin, MarginUnit, Orientation, PageSize,
    PaperSize, FALLBACK_PAGE_SIZE,
};
pub use packer::{OverflowAllowance, PackOptions, RowMetric, RowPacker};
pub use pagination::{paginate, PagePlan, PageSlice, Pages};
