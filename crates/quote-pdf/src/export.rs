//! Export pipeline: layout, pagination and PDF emission
//!
//! [`render_document`] does the work synchronously. [`DocumentRenderer`]
//! wraps it for async callers: the logo is loaded with async reads, the
//! CPU-bound part runs on the blocking pool, and the whole export can be
//! abandoned through a [`CancellationToken`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use quote_ledger::{DerivedTotals, Ledger};
use quote_types::{DocumentMetadata, LineItem, PartyInfo, DOCUMENT_SERIES, PLACEHOLDER};
use tokio_util::sync::CancellationToken;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::fonts::FontSet;
use crate::layout::{layout_document, DocumentContent, LogoSlot};
use crate::logo::{resolve_logo, LogoImage};
use crate::paginate::paginate;
use crate::pdf::{write_pdf, DocumentInfo};

/// Owned snapshot of everything one export needs
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub items: Vec<LineItem>,
    pub totals: DerivedTotals,
    pub issuer: PartyInfo,
    pub recipient: PartyInfo,
    pub metadata: DocumentMetadata,
}

impl ExportRequest {
    /// Snapshot the ledger so later edits cannot affect the export
    pub fn from_ledger(
        ledger: &Ledger,
        issuer: PartyInfo,
        recipient: PartyInfo,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            items: ledger.items().to_vec(),
            totals: ledger.compute_totals(),
            issuer,
            recipient,
            metadata,
        }
    }

    /// Reject requests the template cannot print
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.items.is_empty() {
            return Err(RenderError::EmptyDocument);
        }
        if self.totals.lines.len() != self.items.len() {
            return Err(RenderError::TotalsMismatch {
                items: self.items.len(),
                lines: self.totals.lines.len(),
            });
        }
        Ok(())
    }
}

/// Output of the synchronous pipeline
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// A finished export, ready to be saved or streamed
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Lay out, paginate and emit one document
///
/// `today` fills in a blank issue date.
pub fn render_document(
    request: &ExportRequest,
    config: &RenderConfig,
    fonts: &FontSet,
    logo: Option<&LogoImage>,
    today: NaiveDate,
) -> Result<RenderedDocument, RenderError> {
    // 1. Validate before any layout work
    request.validate()?;

    // 2. Resolve printed strings
    let issuer = request.issuer.resolve_issuer(&config.issuer);
    let recipient = request.recipient.resolve_recipient();
    let metadata = &request.metadata;
    let sequence_number = match metadata.sequence_number.trim() {
        "" => PLACEHOLDER,
        number => number,
    };
    let issue_date = metadata.issue_date_or(today);
    let title = metadata.kind.title();

    // 3. Layout on one tall canvas
    let geometry = config.page.geometry();
    let content = DocumentContent {
        items: &request.items,
        totals: &request.totals,
        issuer: &issuer,
        recipient: &recipient,
        title,
        sequence_number,
        issue_date: &issue_date,
        logo: logo.map(|logo| LogoSlot {
            width: logo.width,
            height: logo.height,
        }),
    };
    let canvas = layout_document(&content, &geometry, fonts);

    // 4. Slice into pages
    let bands = paginate(canvas.height, geometry.height);
    tracing::debug!(
        "Canvas of {:.1}pt split into {} pages of {:.1}pt",
        canvas.height,
        bands.len(),
        geometry.height
    );

    // 5. Emit
    let subject = format!("{}-{}", DOCUMENT_SERIES, sequence_number);
    let info = DocumentInfo {
        title,
        subject: &subject,
    };
    let bytes = write_pdf(&canvas, &bands, geometry.height, fonts, logo, &info)?;

    Ok(RenderedDocument {
        bytes,
        page_count: bands.len(),
    })
}

/// Calendar dates one export is stamped with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExportDates {
    /// Local date, printed when the issue date is blank
    issue: NaiveDate,
    /// UTC date, used in the file name
    file: NaiveDate,
}

impl ExportDates {
    fn at<Tz: TimeZone>(now: DateTime<Utc>, local: &Tz) -> Self {
        Self {
            issue: now.with_timezone(local).date_naive(),
            file: now.date_naive(),
        }
    }
}

/// Shared, read-only rendering context for async exports
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    config: Arc<RenderConfig>,
    fonts: Arc<FontSet>,
}

impl DocumentRenderer {
    /// Resolve fonts once; they are reused by every export
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        let fonts = FontSet::from_config(&config.fonts)?;
        Ok(Self::with_fonts(config, fonts))
    }

    pub fn with_fonts(config: RenderConfig, fonts: Arc<FontSet>) -> Self {
        Self {
            config: Arc::new(config),
            fonts,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Export with a token that is never cancelled
    pub async fn export(&self, request: ExportRequest) -> Result<ExportedDocument, RenderError> {
        self.export_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Export, giving up with [`RenderError::Cancelled`] once `cancel` fires
    ///
    /// A blocking render already in flight finishes in the background and
    /// its result is dropped.
    pub async fn export_with_cancel(
        &self,
        request: ExportRequest,
        cancel: CancellationToken,
    ) -> Result<ExportedDocument, RenderError> {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let kind = request.metadata.kind;
        tracing::info!(
            "Starting {:?} export with {} items",
            kind,
            request.items.len()
        );

        // 1. Look up the logo candidates
        let assets = &self.config.assets;
        let logo = tokio::select! {
            _ = cancel.cancelled() => return Err(RenderError::Cancelled),
            logo = resolve_logo(&assets.root, &assets.logo_candidates) => logo,
        };

        // 2. Layout and emit on the blocking pool
        let dates = ExportDates::at(Utc::now(), &Local);
        let config = Arc::clone(&self.config);
        let fonts = Arc::clone(&self.fonts);
        let task = tokio::task::spawn_blocking(move || {
            render_document(&request, &config, &fonts, logo.as_ref(), dates.issue)
        });

        // 3. Wait for the render or the cancellation, whichever comes first
        let rendered = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Export cancelled");
                return Err(RenderError::Cancelled);
            }
            joined = task => joined.map_err(|e| {
                RenderError::Task(format!("Render task panicked: {}", e))
            })??,
        };

        tracing::info!("Export finished with {} pages", rendered.page_count);
        Ok(ExportedDocument {
            file_name: kind.file_name(dates.file),
            bytes: rendered.bytes,
            page_count: rendered.page_count,
        })
    }
}

/// Write an exported document into `dir`, returning the file path
pub async fn save_document(
    document: &ExportedDocument,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, RenderError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&document.file_name);
    tokio::fs::write(&path, &document.bytes).await?;
    tracing::info!("Saved {} ({} bytes)", path.display(), document.bytes.len());
    Ok(path)
}
