use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single billed line on the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: f64,
}

/// Logo slot for the receipt header. A configured logo that failed to
/// load still reserves its block height so every later block keeps the
/// same vertical offset.
#[derive(Debug, Clone, Default)]
pub enum LogoBlock {
    /// No logo configured; the block is skipped entirely
    #[default]
    Absent,
    /// Logo configured but unavailable; blank space is reserved
    Reserved,
    /// Decoded raster image ready for embedding
    Loaded(LogoImage),
}

/// Raw RGB pixels of the clinic logo, decoded before layout.
#[derive(Debug, Clone)]
pub struct LogoImage {
    pub width_px: u32,
    pub height_px: u32,
    pub rgb: Vec<u8>,
}

/// Invoice data for one receipt render. Built fresh from inputs each
/// time; the layout plan derived from it is used once and discarded.
#[derive(Debug, Clone)]
pub struct InvoiceRecord {
    /// INV-YYYYMMDD-NNN, unique per issuing day
    pub invoice_no: String,
    pub date: NaiveDate,
    pub payer: String,
    pub line_items: Vec<LineItem>,
    /// Declared amount overriding the item sum for the rupees row and
    /// (depending on config) the amount-in-words line
    pub declared_total: Option<f64>,
    pub logo: LogoBlock,
}

impl InvoiceRecord {
    /// Sum of line item amounts. Invalid amounts were already coerced to
    /// zero at parse time, so this never fails. Folded from positive zero:
    /// an empty item list must print "0.00", not the "-0.00" a bare float
    /// sum yields.
    pub fn item_sum(&self) -> f64 {
        self.line_items.iter().fold(0.0, |acc, i| acc + i.amount)
    }

    /// The amount shown on the bottom "Rupees" row: the declared total
    /// when one was given, otherwise the item sum.
    pub fn bottom_amount(&self) -> f64 {
        self.declared_total.unwrap_or_else(|| self.item_sum())
    }
}

/// Coerce a user-supplied amount string to a number. Missing or
/// malformed amounts become 0.0 by policy: a receipt render never fails
/// on bad numeric input, it prints zero.
pub fn coerce_amount(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Format an invoice number for `date` and sequence `seq`.
pub fn format_invoice_number(date: NaiveDate, seq: u32) -> String {
    format!("INV-{}-{:03}", date.format("%Y%m%d"), seq)
}

/// Day key used by the daily counter (YYYYMMDD).
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(items: Vec<LineItem>, declared: Option<f64>) -> InvoiceRecord {
        InvoiceRecord {
            invoice_no: "INV-20240101-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            payer: "Test Payer".to_string(),
            line_items: items,
            declared_total: declared,
            logo: LogoBlock::Absent,
        }
    }

    #[test]
    fn item_sum_adds_amounts() {
        let record = record_with(
            vec![
                LineItem {
                    label: "Consultation".to_string(),
                    amount: 500.0,
                },
                LineItem {
                    label: "Lab Test".to_string(),
                    amount: 300.0,
                },
            ],
            None,
        );
        assert_eq!(record.item_sum(), 800.0);
        assert_eq!(record.bottom_amount(), 800.0);
    }

    #[test]
    fn declared_total_overrides_bottom() {
        let record = record_with(
            vec![LineItem {
                label: "Consultation".to_string(),
                amount: 500.0,
            }],
            Some(450.0),
        );
        assert_eq!(record.item_sum(), 500.0);
        assert_eq!(record.bottom_amount(), 450.0);
    }

    #[test]
    fn empty_items_sum_to_positive_zero() {
        let record = record_with(Vec::new(), None);
        assert_eq!(record.item_sum().to_bits(), 0.0f64.to_bits());
        assert_eq!(format!("{:.2}", record.item_sum()), "0.00");
        assert_eq!(format!("{:.2}", record.bottom_amount()), "0.00");
    }

    #[test]
    fn coerce_amount_fails_closed() {
        assert_eq!(coerce_amount("500"), 500.0);
        assert_eq!(coerce_amount(" 12.5 "), 12.5);
        assert_eq!(coerce_amount("abc"), 0.0);
        assert_eq!(coerce_amount(""), 0.0);
        assert_eq!(coerce_amount("-5"), 0.0);
        assert_eq!(coerce_amount("inf"), 0.0);
    }

    #[test]
    fn invoice_number_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_invoice_number(date, 1), "INV-20240101-001");
        assert_eq!(format_invoice_number(date, 42), "INV-20240101-042");
        assert_eq!(format_invoice_number(date, 1000), "INV-20240101-1000");
    }
}
