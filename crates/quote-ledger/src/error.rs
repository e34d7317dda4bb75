use thiserror::Error;

/// Rejected line item input; the ledger is left untouched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Service name is required")]
    BlankName,

    #[error("Price must be a finite number greater than 0, got {0}")]
    InvalidPrice(f64),
}

/// Category/sub-option strings that do not name a catalog entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown service category: {0}")]
    UnknownCategory(String),

    #[error("Unknown option '{option}' for {category}")]
    UnknownSubOption { category: String, option: String },

    #[error("Please select a {0} option")]
    MissingSubOption(&'static str),

    #[error("Please enter the advertisement package")]
    MissingPackage,
}
