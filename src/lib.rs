//! Report Table: print pagination for long HTML tables
//!
//! This crate splits a table across print pages:
//! - Paper sizes are converted to screen pixels for the current density
//! - Measured rows are packed greedily into page-sized containers
//! - Every page repeats the header and carries a folio number
//! - The source document is restored once printing completes
//!
//! The DOM is reached only through the [`Document`] trait, implemented for
//! browsers by the WASM bridge and natively by [`MemoryDocument`].

pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod render;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmReportTable;

// Re-export primary types
pub use config::ReportConfig;
pub use document::{Document, MemoryDocument, Row, Section, TableSpec};
pub use error::{Error, Result};
pub use layout::{
    Margin, MarginUnit, Orientation, OverflowAllowance, PackOptions, PagePlan, PageSize,
    PageSlice, PaperSize, RowPacker,
};
pub use render::{PageAssembler, PageClass, PageContainer, StyleRegistry};

use document::{measured_px, read_rows};
use layout::Pages;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

/// Invoked once when a print cycle completes
pub type Callback = Box<dyn FnOnce()>;

/// Builds the extra work run by each cycle's print completion hook
pub type CompletionHandler = Box<dyn Fn() -> Callback>;

/// Lifecycle of a [`ReportTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// Generated pages torn down, measurement pending
    Idle,
    /// Source table measured and visible, no generated pages
    Measured,
    /// Pages being packed and appended
    Paginating,
    /// Pages in the document, waiting for the print completion signal
    Printing,
}

/// A format/print cycle awaiting completion
struct PrintCycle<S> {
    armed_at_ms: f64,
    on_complete: Option<Callback>,
    /// Set by the host hook once printing finished
    completed: Rc<Cell<bool>>,
    subscription: S,
}

/// Measurements taken from the source table
struct Measurement<N> {
    header_height: u32,
    body_height: u32,
    rows: Vec<Row<N>>,
}

/// Measure `table` while its width is constrained to the printable width
fn measure<D: Document>(
    document: &mut D,
    table: &D::Node,
    header: &D::Node,
    body: &D::Node,
    printable_width: u32,
) -> Measurement<D::Node> {
    document.set_width(table, Some(printable_width));
    let measurement = Measurement {
        header_height: measured_px(document.offset_height(header)),
        body_height: measured_px(document.offset_height(body)),
        rows: read_rows(document, body),
    };
    document.set_width(table, None);
    measurement
}

/// Paginates one source table of a host document
pub struct ReportTable<D: Document> {
    document: D,
    config: ReportConfig,
    table: D::Node,
    header: D::Node,
    body: D::Node,
    table_classes: Vec<String>,
    page_size: PageSize,
    margin_px: u32,
    header_height: u32,
    body_height: u32,
    packer: RowPacker,
    assembler: PageAssembler,
    /// Measured rows; the pending queue is `rows[cursor..]`
    rows: Vec<Row<D::Node>>,
    cursor: usize,
    current_folio: u32,
    generated: Vec<D::Page>,
    state: PaginationState,
    cycle: Option<PrintCycle<D::Subscription>>,
    completion_handler: Option<CompletionHandler>,
}

impl<D: Document> ReportTable<D> {
    /// Resolve and measure the configured table.
    ///
    /// Fails if the table, its header or its body cannot be found.
    pub fn new(document: D, config: ReportConfig) -> Result<Self> {
        Self::with_style_registry(document, config, StyleRegistry::global())
    }

    /// Like [`ReportTable::new`], tracking injected styles in `registry`
    pub fn with_style_registry(
        mut document: D,
        config: ReportConfig,
        registry: Arc<StyleRegistry>,
    ) -> Result<Self> {
        config.validate()?;

        let table = document
            .element_by_id(&config.table_id)
            .ok_or_else(|| Error::TableNotFound(config.table_id.clone()))?;
        let header = document
            .section(&table, Section::Header)
            .ok_or_else(|| Error::MissingHeader(config.table_id.clone()))?;
        let body = document
            .section(&table, Section::Body)
            .ok_or_else(|| Error::MissingBody(config.table_id.clone()))?;

        let dpi = layout::screen_dpi(document.device_pixel_ratio());
        let page_size = layout::page_size(config.paper_size, config.orientation, dpi);
        let margin_px = config.margin().to_px(dpi);
        let printable_width = page_size.width.saturating_sub(margin_px.saturating_mul(2));

        let Measurement {
            header_height,
            body_height,
            rows,
        } = measure(&mut document, &table, &header, &body, printable_width);

        let reserved = header_height.saturating_add(margin_px.saturating_mul(2));
        let packer = RowPacker::new(page_size.height, reserved, config.pack_options());
        let assembler = PageAssembler::with_registry(
            PageClass::from_config(config.class_name.as_deref()),
            page_size,
            margin_px,
            registry,
        );
        let table_classes = document.class_list(&table);

        log::debug!(
            "report table `{}`: {:?} {:?} at {} dpi, page {}x{}px, margin {}px, header {}px, body {}px, {} rows",
            config.table_id,
            config.paper_size,
            config.orientation,
            dpi,
            page_size.width,
            page_size.height,
            margin_px,
            header_height,
            body_height,
            rows.len()
        );

        Ok(Self {
            current_folio: config.starting_folio,
            document,
            config,
            table,
            header,
            body,
            table_classes,
            page_size,
            margin_px,
            header_height,
            body_height,
            packer,
            assembler,
            rows,
            cursor: 0,
            generated: Vec::new(),
            state: PaginationState::Measured,
            cycle: None,
            completion_handler: None,
        })
    }

    pub fn table_element(&self) -> &D::Node {
        &self.table
    }

    pub fn hide_table(&mut self) {
        self.document.set_visible(&self.table, false);
    }

    pub fn show_table(&mut self) {
        self.document.set_visible(&self.table, true);
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn margin_px(&self) -> u32 {
        self.margin_px
    }

    pub fn header_height(&self) -> u32 {
        self.header_height
    }

    pub fn body_height(&self) -> u32 {
        self.body_height
    }

    /// Header plus both margins
    pub fn reserved_height(&self) -> u32 {
        self.packer.reserved()
    }

    /// Rows not yet placed on a page
    pub fn pending_rows(&self) -> &[Row<D::Node>] {
        &self.rows[self.cursor..]
    }

    /// Folio the next generated page will carry
    pub fn current_folio(&self) -> u32 {
        self.current_folio
    }

    /// Handles of pages currently in the document
    pub fn generated_pages(&self) -> &[D::Page] {
        &self.generated
    }

    /// Whether the whole table fits on one page without splitting
    pub fn fits_on_single_page(&self) -> bool {
        let total = u64::from(self.reserved_height()) + u64::from(self.body_height);
        total <= u64::from(self.page_size.height)
    }

    /// Page ranges for the measured rows, without touching the document
    pub fn plan(&self) -> PagePlan {
        PagePlan {
            page_size: self.page_size,
            margin_px: self.margin_px,
            reserved_height: self.reserved_height(),
            pages: layout::paginate(&self.packer, &self.rows, self.config.starting_folio),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Extend every cycle's print completion hook with a callback built by
    /// `handler`, typically one that calls [`ReportTable::after_print`] on a
    /// shared handle to this table.
    pub fn set_completion_handler<F>(&mut self, handler: F)
    where
        F: Fn() -> Callback + 'static,
    {
        self.completion_handler = Some(Box::new(handler));
    }

    /// Whether the host signalled print completion for the pending cycle
    pub fn print_completed(&self) -> bool {
        self.cycle
            .as_ref()
            .is_some_and(|cycle| cycle.completed.get())
    }

    /// Append one page per packed slice, hide the source table and register
    /// a one-shot print completion hook with the host.
    ///
    /// The cycle ends with [`ReportTable::after_print`], or with
    /// [`ReportTable::poll`] once the hook fired or the timeout passed.
    pub fn format(&mut self, on_complete: Option<Callback>) {
        if self.cycle.is_some() {
            log::warn!(
                "report table `{}` formatted again before print completed, restoring first",
                self.config.table_id
            );
            self.restore(false);
        }

        self.state = PaginationState::Paginating;
        self.assembler.install_style(&mut self.document);

        let slices: Vec<PageSlice> =
            Pages::new(&self.packer, self.pending_rows(), self.current_folio).collect();

        for slice in slices {
            let start = self.cursor + slice.start;
            let end = self.cursor + slice.end;
            let page = self.assembler.assemble(
                &self.header,
                &self.rows[start..end],
                &self.table_classes,
                slice.folio,
            );
            let handle = self.document.append_page(&page);
            self.generated.push(handle);
            self.current_folio = slice.folio.saturating_add(1);
        }
        self.cursor = self.rows.len();

        self.hide_table();

        let completed = Rc::new(Cell::new(false));
        let signal = completed.clone();
        let handler = self.completion_handler.as_ref().map(|build| build());
        let subscription = self.document.on_print_complete(Box::new(move || {
            signal.set(true);
            if let Some(handler) = handler {
                handler();
            }
        }));

        self.cycle = Some(PrintCycle {
            armed_at_ms: self.document.now_ms(),
            on_complete,
            completed,
            subscription,
        });
        self.state = PaginationState::Printing;

        log::info!(
            "report table `{}` formatted into {} pages",
            self.config.table_id,
            self.generated.len()
        );
    }

    /// [`ReportTable::format`], then open the print dialog
    pub fn print_table(&mut self, on_complete: Option<Callback>) {
        self.format(on_complete);
        self.document.print();
    }

    /// Print completion signal: tear down generated pages, show the source
    /// table, reset the queue and folio, then run the completion callback.
    ///
    /// Returns `false` if no cycle was pending.
    pub fn after_print(&mut self) -> bool {
        if self.cycle.is_none() {
            log::debug!("ignoring print completion with no pending cycle");
            return false;
        }
        self.restore(true);
        true
    }

    /// Restore the document if the host hook fired, or if the pending cycle
    /// outlived the configured print timeout. Returns `true` if it did.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if self.print_completed() {
            self.restore(true);
            return true;
        }

        let (Some(timeout), Some(cycle)) = (self.config.print_timeout_ms, &self.cycle) else {
            return false;
        };
        if now_ms - cycle.armed_at_ms < timeout {
            return false;
        }

        log::warn!(
            "report table `{}`: no print completion after {}ms, restoring",
            self.config.table_id,
            timeout
        );
        self.restore(true);
        true
    }

    /// Abandon the pending cycle without running its callback
    pub fn cancel(&mut self) -> bool {
        if self.cycle.is_none() {
            return false;
        }
        self.restore(false);
        true
    }

    fn restore(&mut self, notify: bool) {
        let Some(cycle) = self.cycle.take() else {
            return;
        };

        self.state = PaginationState::Idle;
        self.document.cancel_print_complete(cycle.subscription);
        self.show_table();
        let pages = self.generated.len();
        for page in self.generated.drain(..) {
            self.document.remove_page(page);
        }

        let printable_width = self
            .page_size
            .width
            .saturating_sub(self.margin_px.saturating_mul(2));
        let measurement = measure(
            &mut self.document,
            &self.table,
            &self.header,
            &self.body,
            printable_width,
        );
        self.rows = measurement.rows;
        self.body_height = measurement.body_height;
        self.cursor = 0;
        self.current_folio = self.config.starting_folio;
        self.state = PaginationState::Measured;

        log::info!(
            "report table `{}` restored, removed {} pages",
            self.config.table_id,
            pages
        );

        if notify {
            if let Some(callback) = cycle.on_complete {
                callback();
            }
        }
    }
}
