//! In-memory document
//!
//! A small element arena that behaves like the parts of a browser DOM the
//! paginator uses. Heights are supplied up front instead of being laid out.

use super::{Document, Section};
use crate::render::{markup, PageContainer};
use crate::Callback;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Handle to a page appended to a [`MemoryDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey(pub u64);

/// Handle to a print completion hook of a [`MemoryDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookKey(pub u64);

/// An element in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    pub tag: String,
    pub element_id: Option<String>,
    pub classes: Vec<String>,
    /// Inner markup of leaf elements (rows)
    pub html: String,
    /// Height of leaf elements; containers sum their children
    pub height: f64,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub width: Option<u32>,
    pub visible: bool,
}

impl MemoryNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            element_id: None,
            classes: Vec::new(),
            html: String::new(),
            height: 0.0,
            children: Vec::new(),
            parent: None,
            width: None,
            visible: true,
        }
    }
}

/// One table row: cell markup and rendered height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSpec {
    pub html: String,
    pub height: f64,
}

impl RowSpec {
    pub fn new(html: impl Into<String>, height: f64) -> Self {
        Self {
            html: html.into(),
            height,
        }
    }
}

/// Description of a source table. A `None` section is left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSpec {
    pub id: String,
    pub classes: Vec<String>,
    pub header: Option<RowSpec>,
    pub rows: Option<Vec<RowSpec>>,
}

impl TableSpec {
    /// Table with a header row and a body of rows with the given heights
    pub fn with_heights(id: &str, header_height: f64, heights: &[f64]) -> Self {
        Self {
            id: id.to_string(),
            classes: Vec::new(),
            header: Some(RowSpec::new("<th>#</th>", header_height)),
            rows: Some(
                heights
                    .iter()
                    .enumerate()
                    .map(|(i, &h)| RowSpec::new(format!("<td>{}</td>", i), h))
                    .collect(),
            ),
        }
    }
}

/// A page container appended to the document, holding cloned markup
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub key: PageKey,
    pub element_id: String,
    pub folio: u32,
    pub class_name: String,
    pub style: String,
    pub table_classes: Vec<String>,
    pub header_html: String,
    pub rows_html: Vec<String>,
}

impl GeneratedPage {
    pub fn to_html(&self) -> String {
        let attributes = [
            ("id", self.element_id.clone()),
            ("class", self.class_name.clone()),
            ("data-folio", self.folio.to_string()),
            ("style", self.style.clone()),
        ];
        let mut out = String::new();
        markup::write_page(
            &mut out,
            &attributes,
            &self.table_classes,
            &self.header_html,
            self.rows_html.as_slice(),
        );
        out
    }
}

/// Browser-free [`Document`]
pub struct MemoryDocument {
    nodes: Vec<MemoryNode>,
    pages: Vec<GeneratedPage>,
    styles: Vec<(String, String)>,
    next_page: u64,
    device_pixel_ratio: f64,
    clock_ms: f64,
    print_count: usize,
    width_log: Vec<Option<u32>>,
    print_hooks: Vec<(HookKey, Callback)>,
    next_hook: u64,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MemoryDocument {
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            nodes: Vec::new(),
            pages: Vec::new(),
            styles: Vec::new(),
            next_page: 0,
            device_pixel_ratio,
            clock_ms: 0.0,
            print_count: 0,
            width_log: Vec::new(),
            print_hooks: Vec::new(),
            next_hook: 0,
        }
    }

    fn push(&mut self, node: MemoryNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        for &child in &node.children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(node);
        id
    }

    fn push_row(&mut self, row: &RowSpec) -> NodeId {
        let mut node = MemoryNode::new("tr");
        node.html = row.html.clone();
        node.height = row.height;
        self.push(node)
    }

    /// Build a table from `spec` and return its node
    pub fn add_table(&mut self, spec: &TableSpec) -> NodeId {
        let mut table = MemoryNode::new("table");
        table.element_id = Some(spec.id.clone());
        table.classes = spec.classes.clone();

        if let Some(header) = &spec.header {
            let row = self.push_row(header);
            let mut thead = MemoryNode::new("thead");
            thead.children.push(row);
            table.children.push(self.push(thead));
        }

        if let Some(rows) = &spec.rows {
            let mut tbody = MemoryNode::new("tbody");
            for row in rows {
                let id = self.push_row(row);
                tbody.children.push(id);
            }
            table.children.push(self.push(tbody));
        }

        self.push(table)
    }

    pub fn node(&self, id: NodeId) -> &MemoryNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut MemoryNode {
        &mut self.nodes[id.0]
    }

    /// Generated pages, in document order
    pub fn pages(&self) -> &[GeneratedPage] {
        &self.pages
    }

    /// Inserted style rules as `(style id, css)`
    pub fn styles(&self) -> &[(String, String)] {
        &self.styles
    }

    pub fn print_count(&self) -> usize {
        self.print_count
    }

    /// Every width constraint applied so far, in order
    pub fn width_log(&self) -> &[Option<u32>] {
        &self.width_log
    }

    pub fn advance_clock(&mut self, ms: f64) {
        self.clock_ms += ms;
    }

    /// Print completion hooks still registered
    pub fn print_hook_count(&self) -> usize {
        self.print_hooks.len()
    }

    /// Unregister every print completion hook and hand them to the caller,
    /// like a browser dispatching a one-shot `afterprint` listener.
    ///
    /// Use this when a hook reaches back into whatever owns the document.
    pub fn take_print_hooks(&mut self) -> Vec<Callback> {
        self.print_hooks.drain(..).map(|(_, hook)| hook).collect()
    }

    /// Signal print completion to every registered hook
    pub fn complete_print(&mut self) {
        for hook in self.take_print_hooks() {
            hook();
        }
    }

    /// Whether `id` and all of its ancestors are visible
    fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.node(id);
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn layout_height(&self, id: NodeId) -> f64 {
        let node = self.node(id);
        if !node.visible {
            return 0.0;
        }
        if node.children.is_empty() {
            node.height
        } else {
            node.children.iter().map(|&c| self.layout_height(c)).sum()
        }
    }

    /// Markup of all generated pages
    pub fn render_pages(&self) -> String {
        self.pages
            .iter()
            .map(GeneratedPage::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn outer_html(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.children.is_empty() {
            return format!("<{tag}>{}</{tag}>", node.html, tag = node.tag);
        }
        let inner: String = node.children.iter().map(|&c| self.outer_html(c)).collect();
        format!("<{tag}>{}</{tag}>", inner, tag = node.tag)
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;
    type Page = PageKey;
    type Subscription = HookKey;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.element_id.as_deref() == Some(id))
            .map(NodeId)
    }

    fn section(&self, table: &NodeId, section: Section) -> Option<NodeId> {
        self.node(*table)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).tag == section.tag())
    }

    fn rows(&self, section: &NodeId) -> Vec<NodeId> {
        self.node(*section)
            .children
            .iter()
            .copied()
            .filter(|&child| self.node(child).tag == "tr")
            .collect()
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        if !self.is_rendered(*node) {
            return 0.0;
        }
        self.layout_height(*node)
    }

    fn class_list(&self, node: &NodeId) -> Vec<String> {
        self.node(*node).classes.clone()
    }

    fn set_width(&mut self, node: &NodeId, width: Option<u32>) {
        self.width_log.push(width);
        self.node_mut(*node).width = width;
    }

    fn set_visible(&mut self, node: &NodeId, visible: bool) {
        self.node_mut(*node).visible = visible;
    }

    fn insert_style(&mut self, style_id: &str, css: &str) {
        self.styles.push((style_id.to_string(), css.to_string()));
    }

    fn append_page(&mut self, page: &PageContainer<'_, NodeId>) -> PageKey {
        let key = PageKey(self.next_page);
        self.next_page += 1;

        let generated = GeneratedPage {
            key,
            element_id: page.element_id(),
            folio: page.folio,
            class_name: page.class_name.to_string(),
            style: page.style(),
            table_classes: page.table_classes.to_vec(),
            header_html: self.outer_html(*page.header),
            rows_html: page.rows.iter().map(|row| self.outer_html(row.node)).collect(),
        };
        self.pages.push(generated);
        key
    }

    fn remove_page(&mut self, page: PageKey) {
        self.pages.retain(|p| p.key != page);
    }

    fn print(&mut self) {
        self.print_count += 1;
    }

    fn on_print_complete(&mut self, hook: Callback) -> HookKey {
        let key = HookKey(self.next_hook);
        self.next_hook += 1;
        self.print_hooks.push((key, hook));
        key
    }

    fn cancel_print_complete(&mut self, subscription: HookKey) {
        self.print_hooks.retain(|(key, _)| *key != subscription);
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn now_ms(&self) -> f64 {
        self.clock_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_structure() {
        let mut doc = MemoryDocument::default();
        let table = doc.add_table(&TableSpec::with_heights("t", 30.0, &[10.0, 20.5]));

        assert_eq!(doc.element_by_id("t"), Some(table));
        let thead = doc.section(&table, Section::Header).unwrap();
        let tbody = doc.section(&table, Section::Body).unwrap();

        assert_eq!(doc.offset_height(&thead), 30.0);
        assert_eq!(doc.offset_height(&tbody), 30.5);
        assert_eq!(doc.offset_height(&table), 60.5);
        assert_eq!(doc.rows(&tbody).len(), 2);
    }

    #[test]
    fn test_missing_sections() {
        let mut doc = MemoryDocument::default();
        let table = doc.add_table(&TableSpec {
            id: "bare".into(),
            ..TableSpec::default()
        });

        assert!(doc.section(&table, Section::Header).is_none());
        assert!(doc.section(&table, Section::Body).is_none());
        assert!(doc.element_by_id("other").is_none());
    }

    #[test]
    fn test_hidden_node_has_no_height() {
        let mut doc = MemoryDocument::default();
        let table = doc.add_table(&TableSpec::with_heights("t", 30.0, &[10.0]));
        doc.set_visible(&table, false);
        assert_eq!(doc.offset_height(&table), 0.0);
    }

    #[test]
    fn test_hidden_ancestor_hides_rows() {
        let mut doc = MemoryDocument::default();
        let table = doc.add_table(&TableSpec::with_heights("t", 30.0, &[10.0, 20.0]));
        let tbody = doc.section(&table, Section::Body).unwrap();
        let rows = doc.rows(&tbody);
        assert_eq!(doc.node(rows[0]).parent, Some(tbody));
        assert_eq!(doc.node(tbody).parent, Some(table));

        doc.set_visible(&table, false);
        assert_eq!(doc.offset_height(&rows[0]), 0.0);
        assert_eq!(doc.offset_height(&tbody), 0.0);

        doc.set_visible(&table, true);
        assert_eq!(doc.offset_height(&rows[1]), 20.0);
    }

    #[test]
    fn test_print_hooks_fire_once() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut doc = MemoryDocument::default();
        let fired = Rc::new(Cell::new(0));
        let first = fired.clone();
        let second = fired.clone();
        doc.on_print_complete(Box::new(move || first.set(first.get() + 1)));
        let cancelled = doc.on_print_complete(Box::new(move || second.set(second.get() + 10)));
        assert_eq!(doc.print_hook_count(), 2);

        doc.cancel_print_complete(cancelled);
        doc.complete_print();
        assert_eq!(fired.get(), 1);
        assert_eq!(doc.print_hook_count(), 0);

        doc.complete_print();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_outer_html() {
        let mut doc = MemoryDocument::default();
        let table = doc.add_table(&TableSpec::with_heights("t", 30.0, &[10.0]));
        let thead = doc.section(&table, Section::Header).unwrap();
        assert_eq!(doc.outer_html(thead), "<thead><tr><th>#</th></tr></thead>");
    }
}
