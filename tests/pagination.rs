//! Pagination properties over generated tables

use proptest::prelude::*;
use report_table::layout::{page_size, paginate, FALLBACK_PAGE_SIZE};
use report_table::{
    Document, MemoryDocument, Orientation, OverflowAllowance, PackOptions, PaginationState,
    PaperSize, ReportConfig, ReportTable, RowPacker, StyleRegistry, TableSpec,
};
use std::sync::Arc;

fn pack_options() -> impl Strategy<Value = PackOptions> {
    (any::<bool>(), proptest::option::of(0.0f64..=1.0)).prop_map(|(average, gap_tolerance)| {
        PackOptions {
            overflow: if average {
                OverflowAllowance::AverageRow
            } else {
                OverflowAllowance::None
            },
            gap_tolerance,
        }
    })
}

fn report_table(heights: &[f64], config: ReportConfig) -> ReportTable<MemoryDocument> {
    let _ = env_logger::try_init();
    let mut document = MemoryDocument::new(1.0);
    document.add_table(&TableSpec::with_heights("report", 36.0, heights));
    ReportTable::with_style_registry(document, config, Arc::new(StyleRegistry::new()))
        .expect("table resolves")
}

proptest! {
    #[test]
    fn pages_cover_every_row_once_in_order(
        heights in prop::collection::vec(1u32..600, 0..200),
        capacity in 200u32..2000,
        reserved in 0u32..300,
        options in pack_options(),
        starting_folio in 1u32..50,
    ) {
        let packer = RowPacker::new(capacity, reserved, options);
        let pages = paginate(&packer, &heights, starting_folio);

        let mut next_row = 0;
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.start, next_row);
            prop_assert!(page.end > page.start, "every page places at least one row");
            prop_assert_eq!(page.folio, starting_folio + i as u32);
            next_row = page.end;
        }
        prop_assert_eq!(next_row, heights.len());
    }

    #[test]
    fn multi_row_pages_stay_within_limit(
        heights in prop::collection::vec(1u32..600, 1..200),
        capacity in 200u32..2000,
        reserved in 0u32..300,
        options in pack_options(),
    ) {
        let packer = RowPacker::new(capacity, reserved, options);

        for page in paginate(&packer, &heights, 1) {
            if page.len() < 2 {
                continue;
            }
            let total: u64 = heights[page.rows()].iter().map(|&h| u64::from(h)).sum();
            prop_assert!(total <= packer.limit_for(&heights[page.start..]));
        }
    }

    #[test]
    fn format_then_print_restores_document(
        heights in prop::collection::vec(1.0f64..400.0, 0..60),
        starting_folio in 1u32..20,
    ) {
        let config = ReportConfig::new("report").with_starting_folio(starting_folio);
        let mut table = report_table(&heights, config);
        let plan = table.plan();

        table.print_table(None);
        let pages = table.document().pages();
        prop_assert_eq!(pages.len(), plan.page_count());
        let rows: usize = pages.iter().map(|p| p.rows_html.len()).sum();
        prop_assert_eq!(rows, heights.len());
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.folio, starting_folio + i as u32);
            prop_assert_eq!(&page.element_id, &format!("page_{}", page.folio));
        }

        prop_assert!(table.after_print());
        prop_assert_eq!(table.state(), PaginationState::Measured);
        prop_assert!(table.document().pages().is_empty());
        prop_assert!(table.generated_pages().is_empty());
        prop_assert_eq!(table.pending_rows().len(), heights.len());
        prop_assert_eq!(table.current_folio(), starting_folio);
        prop_assert!(table.document().node(*table.table_element()).visible);
        prop_assert_eq!(table.plan(), plan);
    }
}

#[test]
fn header_and_margin_reservation() {
    let _ = env_logger::try_init();
    // capacity 1000, header 100, margins 2 x 20
    let packer = RowPacker::new(1000, 140, PackOptions::default());
    let pages = paginate(&packer, &[300u32, 300, 300, 300], 1);

    let sizes: Vec<_> = pages.iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![3, 1]);
}

#[test]
fn oversized_row_gets_its_own_page() {
    let packer = RowPacker::new(1000, 140, PackOptions::default());
    let pages = paginate(&packer, &[2000u32], 1);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].rows(), 0..1);
}

#[test]
fn unsupported_density_uses_fallback_size() {
    assert_eq!(
        page_size(PaperSize::Letter, Orientation::Portrait, 250.0),
        FALLBACK_PAGE_SIZE
    );
}

#[test]
fn fallback_density_still_paginates() {
    let _ = env_logger::try_init();
    // 2.6dppx is 249.6dpi, outside the table
    let mut document = MemoryDocument::new(2.6);
    document.add_table(&TableSpec::with_heights("report", 20.0, &[50.0; 12]));
    let mut table = ReportTable::with_style_registry(
        document,
        ReportConfig::new("report").with_margin(report_table::Margin::mm(0.0)),
        Arc::new(StyleRegistry::new()),
    )
    .expect("table resolves");

    assert_eq!(table.page_size(), FALLBACK_PAGE_SIZE);
    table.format(None);
    assert!(table.document().pages().len() > 1);
    assert!(table.document().pages()[0]
        .style
        .starts_with("width:404px;height:404px"));
}

#[test]
fn generated_markup() {
    let _ = env_logger::try_init();
    let mut document = MemoryDocument::new(1.0);
    document.add_table(&TableSpec {
        classes: vec!["ledger".into()],
        ..TableSpec::with_heights("report", 30.0, &[20.0, 20.0])
    });
    let mut table = ReportTable::with_style_registry(
        document,
        ReportConfig::new("report"),
        Arc::new(StyleRegistry::new()),
    )
    .expect("table resolves");

    table.format(None);
    let html = table.document().render_pages();
    assert_eq!(
        html,
        "<div id=\"page_1\" class=\"print-folio\" data-folio=\"1\" \
         style=\"width:816px;height:1054px;--print-folio-margin:57px\">\
         <table class=\"ledger\"><thead><tr><th>#</th></tr></thead>\
         <tbody><tr><td>0</td></tr><tr><td>1</td></tr></tbody></table></div>"
    );

    // source rows still in place
    let source = table.document().element_by_id("report").expect("source table");
    assert_eq!(table.document().offset_height(&source), 0.0);
    table.after_print();
    assert_eq!(table.document().offset_height(&source), 70.0);
}

#[test]
fn last_folio_keeps_every_row() {
    let config = ReportConfig::new("report").with_starting_folio(u32::MAX - 1);
    let mut table = report_table(&[900.0; 5], config);

    table.format(None);
    let folios: Vec<_> = table.document().pages().iter().map(|p| p.folio).collect();
    assert_eq!(folios, vec![u32::MAX - 1, u32::MAX]);
    let rows: usize = table.document().pages().iter().map(|p| p.rows_html.len()).sum();
    assert_eq!(rows, 5);
}

#[test]
fn host_print_completion_restores_document() {
    let mut table = report_table(&[300.0; 7], ReportConfig::new("report"));

    table.print_table(None);
    assert_eq!(table.state(), PaginationState::Printing);
    table.document_mut().complete_print();

    assert!(table.poll(table.document().now_ms()));
    assert_eq!(table.state(), PaginationState::Measured);
    assert!(table.document().pages().is_empty());
    assert_eq!(table.document().print_hook_count(), 0);
}
