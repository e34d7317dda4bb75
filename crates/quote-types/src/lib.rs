pub mod document;
pub mod party;
pub mod types;

pub use document::{greek_short_date, DocumentKind, DocumentMetadata, DOCUMENT_SERIES};
pub use party::{IssuerDefaults, PartyInfo, ResolvedParty, PLACEHOLDER};
pub use types::{ItemId, LineItem, NewLineItem, VatRate};
