use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Error decoding YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("YML file {} not found or can't be read", path.display())]
    DefaultsNotFound { path: PathBuf },

    #[error("Template file {} not found or can't be read", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Items not in the right format, something is missing")]
    ItemsNotASequence,

    #[error("Item {index} must have 3 values: description, quantity and unit price")]
    MalformedItem { index: usize },

    #[error("Unknown currency code: '{code}'")]
    UnknownCurrency { code: String },

    #[error("Invoice counter '{value}' is not a number")]
    BadCounter { value: String },

    #[error("Can't parse '{value}' as a date, expected YYYY-MM-DD")]
    DateParse { value: String },

    #[error("PDF rendering failed: {reason}")]
    Render { reason: String },

    #[error("Error building email: {source}")]
    Email {
        #[from]
        source: lettre::error::Error,
    },

    #[error("Error sending email: {source}")]
    Smtp {
        #[from]
        source: lettre::transport::smtp::Error,
    },

    #[error("Invalid email address: {source}")]
    Address {
        #[from]
        source: lettre::address::AddressError,
    },
}

impl RunError {
    pub fn malformed_item(index: usize) -> Self {
        Self::MalformedItem { index: index + 1 }
    }
}
