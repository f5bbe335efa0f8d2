//! Page assembly

use crate::document::{Document, Row};
use crate::layout::PageSize;
use crate::render::style::{StyleRegistry, DEFAULT_PAGE_CLASS, DEFAULT_STYLE_ID, DEFAULT_STYLE_RULE};
use smallvec::SmallVec;
use std::sync::Arc;

/// Inline custom property carrying the page margin to the default rule
pub const MARGIN_PROPERTY: &str = "--print-folio-margin";

/// Class applied to generated page containers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageClass {
    /// `print-folio`, backed by the injected default style rule
    #[default]
    Default,
    /// Caller-supplied class; the caller styles it
    Custom(String),
}

impl PageClass {
    pub fn from_config(class_name: Option<&str>) -> Self {
        match class_name {
            Some(name) => PageClass::Custom(name.to_string()),
            None => PageClass::Default,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PageClass::Default => DEFAULT_PAGE_CLASS,
            PageClass::Custom(name) => name,
        }
    }
}

/// A page ready to be materialized by the host: header plus rows, all to be
/// cloned into a container of exactly `size`
#[derive(Debug)]
pub struct PageContainer<'a, N> {
    pub folio: u32,
    pub size: PageSize,
    pub margin_px: u32,
    pub class_name: &'a str,
    /// Classes copied from the source table
    pub table_classes: &'a [String],
    pub header: &'a N,
    pub rows: &'a [Row<N>],
}

impl<N> PageContainer<'_, N> {
    /// DOM id of the container
    pub fn element_id(&self) -> String {
        format!("page_{}", self.folio)
    }

    /// Inline style: exact page dimensions plus the margin property
    pub fn style(&self) -> String {
        format!(
            "width:{}px;height:{}px;{}:{}px",
            self.size.width, self.size.height, MARGIN_PROPERTY, self.margin_px
        )
    }

    /// Container attributes in output order
    pub fn attributes(&self) -> SmallVec<[(&'static str, String); 4]> {
        smallvec::smallvec![
            ("id", self.element_id()),
            ("class", self.class_name.to_string()),
            ("data-folio", self.folio.to_string()),
            ("style", self.style()),
        ]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Builds page containers for one report table
#[derive(Debug, Clone)]
pub struct PageAssembler {
    class: PageClass,
    size: PageSize,
    margin_px: u32,
    registry: Arc<StyleRegistry>,
}

impl PageAssembler {
    pub fn new(class: PageClass, size: PageSize, margin_px: u32) -> Self {
        Self::with_registry(class, size, margin_px, StyleRegistry::global())
    }

    pub fn with_registry(
        class: PageClass,
        size: PageSize,
        margin_px: u32,
        registry: Arc<StyleRegistry>,
    ) -> Self {
        Self {
            class,
            size,
            margin_px,
            registry,
        }
    }

    pub fn class(&self) -> &PageClass {
        &self.class
    }

    /// Insert the default style rule into `document` unless it was already
    /// registered. Custom classes never inject anything.
    pub fn install_style<D: Document>(&self, document: &mut D) -> bool {
        if self.class != PageClass::Default {
            return false;
        }
        if !self.registry.register(DEFAULT_STYLE_ID) {
            return false;
        }
        log::debug!("injecting `{}` style rule", DEFAULT_STYLE_ID);
        document.insert_style(DEFAULT_STYLE_ID, DEFAULT_STYLE_RULE);
        true
    }

    pub fn assemble<'a, N>(
        &'a self,
        header: &'a N,
        rows: &'a [Row<N>],
        table_classes: &'a [String],
        folio: u32,
    ) -> PageContainer<'a, N> {
        PageContainer {
            folio,
            size: self.size,
            margin_px: self.margin_px,
            class_name: self.class.name(),
            table_classes,
            header,
            rows,
        }
    }
}
