//! End-to-end export tests
//!
//! Drive the ledger through the async renderer and check the PDFs with lopdf.
//!
//! Run with: cargo test -p quote-pdf --test export_pipeline

use std::path::PathBuf;

use quote_ledger::{Ledger, Service};
use quote_pdf::{
    get_page_count, save_document, DocumentRenderer, ExportRequest, RenderConfig, RenderError,
};
use quote_types::{DocumentKind, DocumentMetadata, NewLineItem, PartyInfo, VatRate};

fn renderer_with_assets(root: PathBuf) -> DocumentRenderer {
    let mut config = RenderConfig::default();
    config.assets.root = root;
    DocumentRenderer::new(config).expect("bundled fonts should load")
}

fn ledger_with(count: usize) -> Ledger {
    let mut ledger = Ledger::new();
    for i in 0..count {
        ledger
            .add_item(
                NewLineItem::new(format!("Κατασκευή Ιστοσελίδας {}", i + 1), 400.0)
                    .with_vat(VatRate::STANDARD)
                    .with_discount(if i % 3 == 0 { 10.0 } else { 0.0 }),
            )
            .unwrap();
    }
    ledger
}

fn request(ledger: &Ledger, kind: DocumentKind) -> ExportRequest {
    ExportRequest::from_ledger(
        ledger,
        PartyInfo::default(),
        PartyInfo::new("ΠΕΛΑΤΗΣ Α.Ε.")
            .with_tax_id("123456789")
            .with_tax_office("Α' ΑΘΗΝΩΝ"),
        DocumentMetadata::new(kind, "17", ""),
    )
}

// ============================================================================
// Single and multi page exports
// ============================================================================

#[tokio::test]
async fn test_quotation_without_logo_renders_one_page() {
    let assets = tempfile::tempdir().unwrap();
    let renderer = renderer_with_assets(assets.path().to_path_buf());

    let ledger = ledger_with(2);
    let document = renderer
        .export(request(&ledger, DocumentKind::Quotation))
        .await
        .unwrap();

    assert_eq!(document.page_count, 1);
    assert_eq!(get_page_count(&document.bytes).unwrap(), 1);
    assert!(document.file_name.starts_with("quotation-"));
    assert!(document.file_name.ends_with(".pdf"));
}

#[tokio::test]
async fn test_many_items_span_several_pages() {
    let assets = tempfile::tempdir().unwrap();
    let renderer = renderer_with_assets(assets.path().to_path_buf());

    let ledger = ledger_with(120);
    let document = renderer
        .export(request(&ledger, DocumentKind::ProFormaInvoice))
        .await
        .unwrap();

    assert!(document.page_count > 1);
    assert_eq!(
        get_page_count(&document.bytes).unwrap() as usize,
        document.page_count
    );
    assert!(document.file_name.starts_with("proforma-invoice-"));

    // Every page carries text, all of it placed inside the page box
    let page_height = renderer.config().page.geometry().height;
    let doc = lopdf::Document::load_mem(&document.bytes).unwrap();
    for (number, page_id) in doc.get_pages() {
        let content =
            lopdf::content::Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let baselines: Vec<f32> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Td")
            .map(|op| op.operands[1].as_float().unwrap())
            .collect();

        assert!(!baselines.is_empty(), "page {number} has no text");
        for y in baselines {
            assert!(
                (0.0..=page_height).contains(&y),
                "page {number} text at {y} is off the page"
            );
        }
    }
}

#[tokio::test]
async fn test_catalog_service_renders() {
    let assets = tempfile::tempdir().unwrap();
    let renderer = renderer_with_assets(assets.path().to_path_buf());

    let service = Service::parse("Local SEO", "Τοπικό").unwrap();
    let mut ledger = Ledger::new();
    let price = service.list_price().unwrap_or(200.0);
    ledger
        .add_item(service.line_item(price, VatRate::STANDARD, 0.0))
        .unwrap();

    let document = renderer
        .export(request(&ledger, DocumentKind::Quotation))
        .await
        .unwrap();
    assert_eq!(document.page_count, 1);
}

// ============================================================================
// Logo handling
// ============================================================================

#[tokio::test]
async fn test_png_logo_is_embedded() {
    let assets = tempfile::tempdir().unwrap();
    let mut png_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, 8, 8);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0x20; 8 * 8 * 3]).unwrap();
    }
    std::fs::write(assets.path().join("logo.png"), png_bytes).unwrap();

    let renderer = renderer_with_assets(assets.path().to_path_buf());
    let ledger = ledger_with(1);
    let document = renderer
        .export(request(&ledger, DocumentKind::Quotation))
        .await
        .unwrap();

    let doc = lopdf::Document::load_mem(&document.bytes).unwrap();
    let has_image = doc.objects.values().any(|object| {
        object
            .as_stream()
            .ok()
            .and_then(|stream| stream.dict.get(b"Subtype").ok())
            .and_then(|subtype| subtype.as_name().ok())
            == Some(b"Image".as_slice())
    });
    assert!(has_image);
}

#[tokio::test]
async fn test_missing_asset_root_still_renders() {
    let renderer = renderer_with_assets(PathBuf::from("/nonexistent/quote-assets"));
    let ledger = ledger_with(1);

    let document = renderer
        .export(request(&ledger, DocumentKind::Quotation))
        .await
        .unwrap();
    assert_eq!(document.page_count, 1);
}

// ============================================================================
// Failures and saving
// ============================================================================

#[tokio::test]
async fn test_empty_export_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer_with_assets(out.path().join("assets"));

    let result = renderer
        .export(request(&Ledger::new(), DocumentKind::Quotation))
        .await;

    assert!(matches!(result, Err(RenderError::EmptyDocument)));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_save_document_writes_named_file() {
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer_with_assets(out.path().join("assets"));
    let ledger = ledger_with(3);

    let document = renderer
        .export(request(&ledger, DocumentKind::Quotation))
        .await
        .unwrap();
    let path = save_document(&document, out.path().join("exports"))
        .await
        .unwrap();

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some(document.file_name.as_str())
    );
    assert_eq!(std::fs::read(&path).unwrap(), document.bytes);
}

#[tokio::test]
async fn test_exports_are_independent() {
    let assets = tempfile::tempdir().unwrap();
    let renderer = renderer_with_assets(assets.path().to_path_buf());

    let small = ledger_with(1);
    let large = ledger_with(90);
    let (a, b) = tokio::join!(
        renderer.export(request(&small, DocumentKind::Quotation)),
        renderer.export(request(&large, DocumentKind::Quotation)),
    );

    assert_eq!(a.unwrap().page_count, 1);
    assert!(b.unwrap().page_count > 1);
}
