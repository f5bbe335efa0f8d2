//! Host document abstraction
//!
//! The paginator never touches a DOM directly. Everything it needs from the
//! page (element lookup, measurement, cloning, print) goes through the
//! [`Document`] trait. [`MemoryDocument`] implements it without a browser.

mod memory;

pub use memory::{
    GeneratedPage, HookKey, MemoryDocument, MemoryNode, NodeId, PageKey, RowSpec, TableSpec,
};

use crate::layout::RowMetric;
use crate::render::PageContainer;
use crate::Callback;

/// Table sections the paginator reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    Body,
}

impl Section {
    /// Markup tag of the section
    pub fn tag(self) -> &'static str {
        match self {
            Section::Header => "thead",
            Section::Body => "tbody",
        }
    }
}

/// A source table row: a host node plus its rendered height
#[derive(Debug, Clone, PartialEq)]
pub struct Row<N> {
    pub node: N,
    pub height: u32,
}

impl<N> RowMetric for Row<N> {
    fn height(&self) -> u32 {
        self.height
    }
}

/// Primitives supplied by the host page
pub trait Document {
    /// Handle to an element of the source document
    type Node: Clone;
    /// Handle to a generated page container
    type Page;
    /// Handle to a registered print completion hook
    type Subscription;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// First `thead`/`tbody` of `table`
    fn section(&self, table: &Self::Node, section: Section) -> Option<Self::Node>;

    /// Rows of a table section, in document order
    fn rows(&self, section: &Self::Node) -> Vec<Self::Node>;

    /// Rendered height in CSS pixels
    fn offset_height(&self, node: &Self::Node) -> f64;

    fn class_list(&self, node: &Self::Node) -> Vec<String>;

    /// Constrain an element's width, or clear the constraint with `None`
    fn set_width(&mut self, node: &Self::Node, width: Option<u32>);

    fn set_visible(&mut self, node: &Self::Node, visible: bool);

    fn insert_style(&mut self, style_id: &str, css: &str);

    /// Materialize `page` at the end of the document body.
    ///
    /// The header and row nodes must be cloned; source nodes stay in place.
    fn append_page(&mut self, page: &PageContainer<'_, Self::Node>) -> Self::Page;

    fn remove_page(&mut self, page: Self::Page);

    /// Open the host print dialog
    fn print(&mut self);

    /// Run `hook` once when the host reports that printing finished
    fn on_print_complete(&mut self, hook: Callback) -> Self::Subscription;

    /// Drop a hook registered with [`Document::on_print_complete`].
    ///
    /// Must be a no-op if the hook already fired.
    fn cancel_print_complete(&mut self, subscription: Self::Subscription);

    fn device_pixel_ratio(&self) -> f64;

    /// Host clock in milliseconds
    fn now_ms(&self) -> f64;
}

/// Round a measured height up to whole pixels
pub fn measured_px(height: f64) -> u32 {
    if height.is_finite() && height > 0.0 {
        height.ceil() as u32
    } else {
        0
    }
}

/// Read the rows of `body` with their heights
pub fn read_rows<D: Document>(document: &D, body: &D::Node) -> Vec<Row<D::Node>> {
    document
        .rows(body)
        .into_iter()
        .map(|node| {
            let height = measured_px(document.offset_height(&node));
            Row { node, height }
        })
        .collect()
}
