//! WASM bindings for the report table

pub mod plan_buffer;

use crate::document::{Document, Section};
use crate::layout::{self, OverflowAllowance, Orientation, PackOptions, PaperSize, RowPacker};
use crate::render::PageContainer;
use crate::{Callback, Error, ReportConfig, ReportTable};
use js_sys::{Array, Function};
use plan_buffer::PlanBuffer;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
extern "C" {
    /// DOM primitives supplied by the page
    #[derive(Clone)]
    pub type JsHost;

    #[wasm_bindgen(method, js_name = getElementById)]
    fn get_element_by_id(this: &JsHost, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = querySection)]
    fn query_section(this: &JsHost, table: &JsValue, tag: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = queryRows)]
    fn query_rows(this: &JsHost, section: &JsValue) -> Array;

    #[wasm_bindgen(method, js_name = offsetHeight)]
    fn offset_height(this: &JsHost, node: &JsValue) -> f64;

    #[wasm_bindgen(method, js_name = classList)]
    fn class_list(this: &JsHost, node: &JsValue) -> Array;

    #[wasm_bindgen(method, js_name = setWidth)]
    fn set_width(this: &JsHost, node: &JsValue, width: Option<u32>);

    #[wasm_bindgen(method, js_name = setVisible)]
    fn set_visible(this: &JsHost, node: &JsValue, visible: bool);

    #[wasm_bindgen(method, js_name = insertStyle)]
    fn insert_style(this: &JsHost, style_id: &str, css: &str);

    /// Create the container from `[name, value]` attribute pairs, clone the
    /// header and rows into it and append it to the body
    #[wasm_bindgen(method, js_name = appendPage)]
    fn append_page(
        this: &JsHost,
        attributes: &Array,
        table_classes: &Array,
        header: &JsValue,
        rows: &Array,
    ) -> JsValue;

    #[wasm_bindgen(method, js_name = removePage)]
    fn remove_page(this: &JsHost, page: &JsValue);

    #[wasm_bindgen(method)]
    fn print(this: &JsHost);

    /// Add a one-shot `afterprint` listener
    #[wasm_bindgen(method, js_name = onAfterPrint)]
    fn on_after_print(this: &JsHost, listener: &Function);

    #[wasm_bindgen(method, js_name = offAfterPrint)]
    fn off_after_print(this: &JsHost, listener: &Function);

    #[wasm_bindgen(method, js_name = setTimeout)]
    fn set_timeout(this: &JsHost, callback: &Function, delay_ms: f64);

    #[wasm_bindgen(method, js_name = devicePixelRatio)]
    fn device_pixel_ratio(this: &JsHost) -> f64;

    #[wasm_bindgen(method)]
    fn now(this: &JsHost) -> f64;
}

fn present(value: JsValue) -> Option<JsValue> {
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn to_js_error(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn js_callback(function: Function) -> Callback {
    Box::new(move || {
        if let Err(err) = function.call0(&JsValue::NULL) {
            log::warn!("print completion callback threw: {:?}", err);
        }
    })
}

/// [`Document`] backed by a JS host object
#[derive(Clone)]
pub struct JsDocument {
    host: JsHost,
}

impl JsDocument {
    pub fn new(host: JsHost) -> Self {
        Self { host }
    }
}

impl Document for JsDocument {
    type Node = JsValue;
    type Page = JsValue;
    type Subscription = Function;

    fn element_by_id(&self, id: &str) -> Option<JsValue> {
        present(self.host.get_element_by_id(id))
    }

    fn section(&self, table: &JsValue, section: Section) -> Option<JsValue> {
        present(self.host.query_section(table, section.tag()))
    }

    fn rows(&self, section: &JsValue) -> Vec<JsValue> {
        self.host.query_rows(section).iter().collect()
    }

    fn offset_height(&self, node: &JsValue) -> f64 {
        self.host.offset_height(node)
    }

    fn class_list(&self, node: &JsValue) -> Vec<String> {
        self.host
            .class_list(node)
            .iter()
            .filter_map(|class| class.as_string())
            .collect()
    }

    fn set_width(&mut self, node: &JsValue, width: Option<u32>) {
        self.host.set_width(node, width);
    }

    fn set_visible(&mut self, node: &JsValue, visible: bool) {
        self.host.set_visible(node, visible);
    }

    fn insert_style(&mut self, style_id: &str, css: &str) {
        self.host.insert_style(style_id, css);
    }

    fn append_page(&mut self, page: &PageContainer<'_, JsValue>) -> JsValue {
        let attributes: Array = page
            .attributes()
            .into_iter()
            .map(|(name, value)| Array::of2(&JsValue::from_str(name), &JsValue::from(value)))
            .collect();
        let table_classes: Array = page
            .table_classes
            .iter()
            .map(|class| JsValue::from_str(class))
            .collect();
        let rows: Array = page.rows.iter().map(|row| row.node.clone()).collect();

        self.host
            .append_page(&attributes, &table_classes, page.header, &rows)
    }

    fn remove_page(&mut self, page: JsValue) {
        self.host.remove_page(&page);
    }

    fn print(&mut self) {
        self.host.print();
    }

    // The closure frees itself when it runs; a listener removed before
    // printing finishes keeps its small allocation.
    fn on_print_complete(&mut self, hook: Callback) -> Function {
        let listener: Function = Closure::once_into_js(move || hook()).unchecked_into();
        self.host.on_after_print(&listener);
        listener
    }

    fn cancel_print_complete(&mut self, subscription: Function) {
        self.host.off_after_print(&subscription);
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.host.device_pixel_ratio()
    }

    fn now_ms(&self) -> f64 {
        self.host.now()
    }
}

type SharedTable = Rc<RefCell<ReportTable<JsDocument>>>;

/// Completion hook body: end the cycle of the shared table, if it still exists
/// and is not borrowed by the call that triggered printing.
fn after_print_handler(table: Weak<RefCell<ReportTable<JsDocument>>>) -> Callback {
    Box::new(move || {
        let Some(table) = table.upgrade() else {
            return;
        };
        // A synchronous `print()` fires `afterprint` while `printTable` still
        // holds the table; the hook's flag is picked up once it returns.
        if let Ok(mut table) = table.try_borrow_mut() {
            table.after_print();
        };
    })
}

/// WASM-exposed report table
#[wasm_bindgen]
pub struct WasmReportTable {
    table: SharedTable,
    host: JsDocument,
}

impl WasmReportTable {
    /// Ask the host to call `poll` once the configured print timeout passes
    fn schedule_timeout(&self) {
        let Some(timeout) = self.table.borrow().config().print_timeout_ms else {
            return;
        };
        let handle = Rc::downgrade(&self.table);
        let host = self.host.clone();
        let check = move || {
            let Some(table) = handle.upgrade() else {
                return;
            };
            if let Ok(mut table) = table.try_borrow_mut() {
                table.poll(host.now_ms());
            };
        };
        let callback: Function = Closure::once_into_js(check).unchecked_into();
        self.host.host.set_timeout(&callback, timeout);
    }
}

#[wasm_bindgen]
impl WasmReportTable {
    /// Measure the table named in `config_json` through `host`
    #[wasm_bindgen(constructor)]
    pub fn new(host: JsHost, config_json: &str) -> Result<WasmReportTable, JsValue> {
        let config = ReportConfig::from_json(config_json).map_err(to_js_error)?;
        let document = JsDocument::new(host);
        let table = ReportTable::new(document.clone(), config).map_err(to_js_error)?;

        let table = Rc::new(RefCell::new(table));
        let handle = Rc::downgrade(&table);
        table
            .borrow_mut()
            .set_completion_handler(move || after_print_handler(handle.clone()));

        Ok(Self {
            table,
            host: document,
        })
    }

    #[wasm_bindgen(js_name = getTableElement)]
    pub fn get_table_element(&self) -> JsValue {
        self.table.borrow().table_element().clone()
    }

    #[wasm_bindgen(js_name = hideTable)]
    pub fn hide_table(&mut self) {
        self.table.borrow_mut().hide_table();
    }

    #[wasm_bindgen(js_name = showTable)]
    pub fn show_table(&mut self) {
        self.table.borrow_mut().show_table();
    }

    /// Insert the generated pages without printing
    pub fn format(&mut self, callback: Option<Function>) {
        self.table.borrow_mut().format(callback.map(js_callback));
        self.schedule_timeout();
    }

    /// Insert the generated pages and open the print dialog
    #[wasm_bindgen(js_name = printTable)]
    pub fn print_table(&mut self, callback: Option<Function>) {
        self.table.borrow_mut().print_table(callback.map(js_callback));
        let now = self.host.now_ms();
        if !self.table.borrow_mut().poll(now) {
            self.schedule_timeout();
        }
    }

    /// Print completion signal for hosts that dispatch it themselves
    #[wasm_bindgen(js_name = afterPrint)]
    pub fn after_print(&mut self) -> bool {
        self.table.borrow_mut().after_print()
    }

    /// Restore if the print completion signal arrived or is overdue
    pub fn poll(&mut self, now_ms: f64) -> bool {
        self.table.borrow_mut().poll(now_ms)
    }

    pub fn cancel(&mut self) -> bool {
        self.table.borrow_mut().cancel()
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.table.borrow().generated_pages().len()
    }

    #[wasm_bindgen(js_name = getCurrentFolio)]
    pub fn get_current_folio(&self) -> u32 {
        self.table.borrow().current_folio()
    }

    #[wasm_bindgen(js_name = getPendingRowCount)]
    pub fn get_pending_row_count(&self) -> usize {
        self.table.borrow().pending_rows().len()
    }

    #[wasm_bindgen(js_name = fitsOnSinglePage)]
    pub fn fits_on_single_page(&self) -> bool {
        self.table.borrow().fits_on_single_page()
    }

    /// Page ranges as JSON
    #[wasm_bindgen(js_name = getPlan)]
    pub fn get_plan(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.table.borrow().plan()).map_err(|e| to_js_error(e.into()))
    }

    /// Page ranges as a flat `Uint32Array` (see [`plan_buffer`])
    #[wasm_bindgen(js_name = getPlanBuffer)]
    pub fn get_plan_buffer(&self) -> Vec<u32> {
        PlanBuffer::from_plan(&self.table.borrow().plan()).into_vec()
    }
}

fn parse_paper(paper: &str) -> Result<PaperSize, JsValue> {
    PaperSize::parse(paper)
        .ok_or_else(|| JsValue::from_str(&format!("unknown paper size `{}`", paper)))
}

fn parse_orientation(orientation: &str) -> Result<Orientation, JsValue> {
    Orientation::parse(orientation)
        .ok_or_else(|| JsValue::from_str(&format!("unknown orientation `{}`", orientation)))
}

/// `[width, height]` in pixels of a paper size at `dpi`
#[wasm_bindgen(js_name = pageSize)]
pub fn page_size(paper: &str, orientation: &str, dpi: f64) -> Result<Vec<u32>, JsValue> {
    let size = layout::page_size(parse_paper(paper)?, parse_orientation(orientation)?, dpi);
    Ok(vec![size.width, size.height])
}

#[wasm_bindgen(js_name = mmToPx)]
pub fn mm_to_px(mm: f64, dpi: f64) -> f64 {
    layout::mm_to_px(mm, dpi)
}

#[wasm_bindgen(js_name = pxToMm)]
pub fn px_to_mm(px: f64, dpi: f64) -> f64 {
    layout::px_to_mm(px, dpi)
}

#[wasm_bindgen(js_name = screenDpi)]
pub fn screen_dpi(device_pixel_ratio: f64) -> f64 {
    layout::screen_dpi(device_pixel_ratio)
}

/// Pack measured heights without a host document.
///
/// Returns flat `[folio, start, end]` triples.
#[wasm_bindgen(js_name = paginateHeights)]
pub fn paginate_heights(
    heights: Vec<u32>,
    capacity: u32,
    reserved: u32,
    gap_tolerance: Option<f64>,
    average_row_allowance: bool,
    starting_folio: u32,
) -> Vec<u32> {
    let options = PackOptions {
        overflow: if average_row_allowance {
            OverflowAllowance::AverageRow
        } else {
            OverflowAllowance::None
        },
        gap_tolerance,
    };
    let packer = RowPacker::new(capacity, reserved, options);

    layout::paginate(&packer, &heights, starting_folio)
        .into_iter()
        .flat_map(|page| [page.folio, page.start as u32, page.end as u32])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_heights() {
        let triples = paginate_heights(vec![300, 300, 300, 300], 1000, 140, None, true, 1);
        assert_eq!(triples, vec![1, 0, 3, 2, 3, 4]);
    }

    #[test]
    fn test_paginate_heights_strict() {
        let triples = paginate_heights(vec![300, 300, 300, 300], 1000, 140, None, false, 1);
        assert_eq!(triples, vec![1, 0, 2, 2, 2, 4]);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(screen_dpi(1.0), 96.0);
        assert!((mm_to_px(px_to_mm(150.0, 96.0), 96.0) - 150.0).abs() < 1e-9);
    }
}
