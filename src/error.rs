use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("Config directory not found at {0}. Run 'receipt init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Service '{0}' not found in services.toml. Use '<label>:<amount>' for ad-hoc items.")]
    ServiceNotFound(String),

    #[error("No items specified. Use --item <service> or --item '<label>:<amount>'.")]
    NoItems,

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'receipt list' to see stored invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Invoice file not found: {0}")]
    InvoiceFileNotFound(PathBuf),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid config value: {0}")]
    InvalidConfig(String),

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
