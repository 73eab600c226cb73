pub mod config;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod receipt;
pub mod store;

pub use config::{Clinic, Config, Service, State};
pub use error::{ReceiptError, Result};
pub use layout::{compute_layout, HeightPolicy, LayoutPlan, PageFormat, ReceiptStyle, WordsBasis};
pub use receipt::{amount_to_words, InvoiceRecord, LineItem};
pub use store::{open_store, RecordStore};
