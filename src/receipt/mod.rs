mod record;
mod words;

pub use record::{
    coerce_amount, day_key, format_invoice_number, InvoiceRecord, LineItem, LogoBlock, LogoImage,
};
pub use words::{amount_to_words, integer_to_words};
