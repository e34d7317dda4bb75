//! Quotation and pro-forma invoice rendering
//!
//! Turns a ledger snapshot into a paginated PDF using lopdf.
//!
//! The document is laid out as vector elements on one tall canvas, sliced into
//! page-height bands and written one band per page:
//! - `layout`: template sections placed with a keep-together cursor
//! - `paginate`: band slicing
//! - `pdf`: page content streams, embedded Unicode fonts and the logo image
//! - `export`: the sync pipeline and the cancellable async renderer

pub mod config;
pub mod error;
pub mod export;
pub mod fonts;
pub mod layout;
pub mod logo;
pub mod paginate;
pub mod pdf;

pub use config::{AssetConfig, FontConfig, PageConfig, RenderConfig};
pub use error::{LogoError, RenderError};
pub use export::{
    render_document, save_document, DocumentRenderer, ExportRequest, ExportedDocument,
    RenderedDocument,
};
pub use fonts::{FontFace, FontSet, FontWeight, TextMeasure};
pub use layout::{layout_document, Canvas, DocumentContent, Element, PageGeometry};
pub use logo::{resolve_logo, LogoImage};
pub use paginate::{page_count, paginate, PageBand};
pub use tokio_util::sync::CancellationToken;

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, RenderError> {
    let doc = lopdf::Document::load_mem(bytes)?;
    Ok(doc.get_pages().len() as u32)
}
