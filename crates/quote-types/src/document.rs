use chrono::NaiveDate;

/// Series label printed on every document
pub const DOCUMENT_SERIES: &str = "ΤΠΥ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Quotation,
    ProFormaInvoice,
}

impl DocumentKind {
    /// Title printed at the top of the document details box
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "Προσφορά Παροχής Υπηρεσιών",
            DocumentKind::ProFormaInvoice => "Προτιμολόγιο",
        }
    }

    /// Prefix of the exported file name
    pub fn file_stem(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "quotation",
            DocumentKind::ProFormaInvoice => "proforma-invoice",
        }
    }

    /// `<kind>-<ISO date>.pdf`
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("{}-{}.pdf", self.file_stem(), date.format("%Y-%m-%d"))
    }
}

/// Free-text document header fields
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct DocumentMetadata {
    pub kind: DocumentKind,
    #[serde(default)]
    pub sequence_number: String,
    /// Empty means "today" at render time
    #[serde(default)]
    pub issue_date: String,
}

impl DocumentMetadata {
    pub fn new(kind: DocumentKind, sequence_number: impl Into<String>, issue_date: impl Into<String>) -> Self {
        Self {
            kind,
            sequence_number: sequence_number.into(),
            issue_date: issue_date.into(),
        }
    }

    /// Issue date as printed, falling back to `today` in Greek short form
    pub fn issue_date_or(&self, today: NaiveDate) -> String {
        let trimmed = self.issue_date.trim();
        if trimmed.is_empty() {
            greek_short_date(today)
        } else {
            trimmed.to_string()
        }
    }
}

/// `d/m/yyyy` without zero padding, as the el-GR locale prints dates
pub fn greek_short_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}
