//! Receipt layout computation. One configurable engine replaces the
//! drifting per-page copies of the original receipt generator: page
//! width, height policy and the words basis are explicit configuration.

use super::font::FontWeight;
use super::plan::{Align, DrawOp, LayoutPlan};
use super::wrap::wrap_to_width;
use crate::receipt::{amount_to_words, InvoiceRecord, LogoBlock};

/// How the page height is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightPolicy {
    /// Height follows the content, clamped to a minimum. No shrinking.
    Dynamic { min_height_mm: f64 },
    /// Constant height (fixed thermal stock); content is proportionally
    /// shrunk when it would overflow, never below `shrink_floor`.
    Fixed {
        height_mm: f64,
        shrink_floor: f64,
    },
}

/// Physical page format: width plus the height policy.
#[derive(Debug, Clone, Copy)]
pub struct PageFormat {
    pub width_mm: f64,
    pub height: HeightPolicy,
}

/// Which amount feeds the amount-in-words line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordsBasis {
    /// The declared total when given, the item sum otherwise
    DeclaredTotal,
    /// Always the computed item sum
    ItemSum,
}

/// Fixed style configuration: font sizes in pt, everything else in mm.
/// Values are the measured allowances of the original thermal receipt.
#[derive(Debug, Clone)]
pub struct ReceiptStyle {
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_x: f64,
    pub logo_width: f64,
    pub logo_height: f64,
    pub logo_gap: f64,
    pub body_size_pt: f64,
    pub words_size_pt: f64,
    pub footer_size_pt: f64,
    pub address_size_pt: f64,
    pub meta_row: f64,
    pub label_row: f64,
    pub payer_row: f64,
    pub header_row: f64,
    pub item_row: f64,
    pub totals_gap: f64,
    pub totals_row: f64,
    pub words_line: f64,
    pub signature_gap: f64,
    pub signature_row: f64,
    pub signature_width: f64,
    pub footer_name_row: f64,
    pub address_line: f64,
    pub rule_thickness: f64,
}

impl Default for ReceiptStyle {
    fn default() -> Self {
        Self {
            margin_top: 5.0,
            margin_bottom: 3.0,
            margin_x: 5.0,
            logo_width: 46.0,
            logo_height: 12.0,
            logo_gap: 3.0,
            body_size_pt: 8.0,
            words_size_pt: 6.5,
            footer_size_pt: 8.0,
            address_size_pt: 6.5,
            meta_row: 4.0,
            label_row: 3.0,
            payer_row: 4.0,
            header_row: 4.0,
            item_row: 3.5,
            totals_gap: 2.0,
            totals_row: 4.0,
            words_line: 3.0,
            signature_gap: 2.0,
            signature_row: 4.0,
            signature_width: 32.0,
            footer_name_row: 3.5,
            address_line: 3.0,
            rule_thickness: 0.2,
        }
    }
}

/// Compute the print-ready plan for one record. Deterministic: the plan
/// is fully determined by the record, the clinic footer strings, the
/// style and the page format.
pub fn compute_layout(
    record: &InvoiceRecord,
    clinic_name: &str,
    clinic_address: &str,
    style: &ReceiptStyle,
    format: &PageFormat,
    words_basis: WordsBasis,
) -> LayoutPlan {
    match format.height {
        HeightPolicy::Dynamic { min_height_mm } => {
            let (ops, required) = build_at_scale(
                record,
                clinic_name,
                clinic_address,
                style,
                format.width_mm,
                words_basis,
                1.0,
            );
            LayoutPlan {
                page_width_mm: format.width_mm,
                page_height_mm: required.max(min_height_mm),
                scale: 1.0,
                ops,
            }
        }
        HeightPolicy::Fixed {
            height_mm,
            shrink_floor,
        } => {
            let (mut ops, mut required) = build_at_scale(
                record,
                clinic_name,
                clinic_address,
                style,
                format.width_mm,
                words_basis,
                1.0,
            );
            let mut scale = 1.0;
            // Shrink with a small safety margin, re-wrapping at each step
            // since smaller text changes line counts. Clamped at the
            // floor: a crowded receipt beats a failed render.
            let mut rounds = 0;
            while required > height_mm && scale > shrink_floor && rounds < 8 {
                scale = (scale * height_mm / required * 0.98).max(shrink_floor);
                let rebuilt = build_at_scale(
                    record,
                    clinic_name,
                    clinic_address,
                    style,
                    format.width_mm,
                    words_basis,
                    scale,
                );
                ops = rebuilt.0;
                required = rebuilt.1;
                rounds += 1;
            }
            LayoutPlan {
                page_width_mm: format.width_mm,
                page_height_mm: height_mm,
                scale,
                ops,
            }
        }
    }
}

/// Emit the full block sequence at one scale factor and return the ops
/// together with the height the content needs (content end plus bottom
/// margin). Estimation and painting share this single pass, so the two
/// can never disagree on wrapping or row heights.
fn build_at_scale(
    record: &InvoiceRecord,
    clinic_name: &str,
    clinic_address: &str,
    style: &ReceiptStyle,
    width_mm: f64,
    words_basis: WordsBasis,
    scale: f64,
) -> (Vec<DrawOp>, f64) {
    let s = scale;
    let mut ops: Vec<DrawOp> = Vec::new();
    let left = style.margin_x;
    let right = width_mm - style.margin_x;
    let center = width_mm / 2.0;
    let body = style.body_size_pt * s;
    let mut y = style.margin_top;

    // Logo block. A configured-but-missing logo still reserves its
    // height so every later offset stays put.
    match &record.logo {
        LogoBlock::Absent => {}
        LogoBlock::Reserved => {
            y += (style.logo_height + style.logo_gap) * s;
        }
        LogoBlock::Loaded(_) => {
            let w = style.logo_width * s;
            let h = style.logo_height * s;
            ops.push(DrawOp::Logo {
                x_mm: (width_mm - w) / 2.0,
                y_mm: y,
                width_mm: w,
                height_mm: h,
            });
            y += (style.logo_height + style.logo_gap) * s;
        }
    }

    // Invoice number and date rows
    let meta_row = |ops: &mut Vec<DrawOp>, y: &mut f64, label: &str, value: String| {
        ops.push(text(label, left, *y, body, FontWeight::Normal, Align::Left));
        ops.push(text(&value, right, *y, body, FontWeight::Normal, Align::Right));
        *y += style.meta_row * s;
    };
    meta_row(&mut ops, &mut y, "Invoice No:", record.invoice_no.clone());
    meta_row(&mut ops, &mut y, "Date:", record.date.format("%d/%m/%Y").to_string());

    // Payer
    ops.push(text(
        "Received with Thanks from:",
        left,
        y,
        body,
        FontWeight::Normal,
        Align::Left,
    ));
    y += style.label_row * s;
    ops.push(text(&record.payer, left, y, body, FontWeight::Bold, Align::Left));
    y += style.payer_row * s;

    // Items
    ops.push(text("On Account of:", left, y, body, FontWeight::Bold, Align::Left));
    y += style.header_row * s;

    let item_width = width_mm - 2.0 * style.margin_x;
    if record.line_items.is_empty() {
        ops.push(text("\u{2022} \u{2014}", left, y, body, FontWeight::Normal, Align::Left));
        y += style.item_row * s;
    } else {
        for item in &record.line_items {
            let line = format!("\u{2022} {} - Rs {:.2}", item.label, item.amount);
            for wrapped in wrap_to_width(&line, item_width, body, FontWeight::Normal) {
                ops.push(text(&wrapped, left, y, body, FontWeight::Normal, Align::Left));
                y += style.item_row * s;
            }
        }
    }
    y += style.totals_gap * s;

    // Totals: computed sum row, then the rupees row (declared override
    // when present)
    let sum = record.item_sum();
    let bottom = record.bottom_amount();
    ops.push(text("Sum of Rs", left, y, body, FontWeight::Bold, Align::Left));
    ops.push(text(&format!("{sum:.2}"), right, y, body, FontWeight::Bold, Align::Right));
    y += style.totals_row * s;
    ops.push(text("Rupees", left, y, body, FontWeight::Bold, Align::Left));
    ops.push(text(&format!("{bottom:.2}"), right, y, body, FontWeight::Bold, Align::Right));
    y += style.totals_row * s;

    // Amount in words, right-aligned under the numbers. Wrapped with the
    // exact face and size that renders it.
    let words_amount = match words_basis {
        WordsBasis::DeclaredTotal => bottom,
        WordsBasis::ItemSum => sum,
    };
    let words = amount_to_words(words_amount.round());
    let words_size = style.words_size_pt * s;
    for line in wrap_to_width(&words, width_mm - 20.0, words_size, FontWeight::Bold) {
        ops.push(text(&line, right, y, words_size, FontWeight::Bold, Align::Right));
        y += style.words_line * s;
    }
    y += style.signature_gap * s;

    // Signature rule, centered
    let sig_w = style.signature_width * s;
    ops.push(DrawOp::Rule {
        x_mm: (width_mm - sig_w) / 2.0,
        y_mm: y,
        width_mm: sig_w,
        thickness_mm: style.rule_thickness,
    });
    y += style.signature_row * s;

    // Clinic footer
    let footer_size = style.footer_size_pt * s;
    ops.push(text(clinic_name, center, y, footer_size, FontWeight::Bold, Align::Center));
    y += style.footer_name_row * s;

    let addr_size = style.address_size_pt * s;
    for line in wrap_to_width(clinic_address, width_mm - 30.0, addr_size, FontWeight::Normal) {
        ops.push(text(&line, center, y, addr_size, FontWeight::Normal, Align::Center));
        y += style.address_line * s;
    }

    (ops, y + style.margin_bottom)
}

fn text(
    text: &str,
    x_mm: f64,
    y_mm: f64,
    size_pt: f64,
    weight: FontWeight,
    align: Align,
) -> DrawOp {
    DrawOp::Text {
        text: text.to_string(),
        x_mm,
        y_mm,
        size_pt,
        weight,
        align,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{InvoiceRecord, LineItem, LogoBlock, LogoImage};
    use chrono::NaiveDate;

    const CLINIC: &str = "Tulsi Sugar Care Clinic";
    const ADDRESS: &str = "Near Agha Khan Laboratory VIP Road Larkana";

    fn record(items: Vec<LineItem>, declared: Option<f64>, logo: LogoBlock) -> InvoiceRecord {
        InvoiceRecord {
            invoice_no: "INV-20240101-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            payer: "Ali Raza".to_string(),
            line_items: items,
            declared_total: declared,
            logo,
        }
    }

    fn items(n: usize) -> Vec<LineItem> {
        (0..n)
            .map(|i| LineItem {
                label: format!("Service {i}"),
                amount: 100.0,
            })
            .collect()
    }

    fn dynamic(min: f64) -> PageFormat {
        PageFormat {
            width_mm: 80.0,
            height: HeightPolicy::Dynamic { min_height_mm: min },
        }
    }

    fn layout(record: &InvoiceRecord, format: &PageFormat) -> LayoutPlan {
        compute_layout(
            record,
            CLINIC,
            ADDRESS,
            &ReceiptStyle::default(),
            format,
            WordsBasis::DeclaredTotal,
        )
    }

    #[test]
    fn dynamic_height_matches_block_allowances() {
        let style = ReceiptStyle::default();
        let rec = record(items(3), None, LogoBlock::Absent);
        let plan = layout(&rec, &dynamic(10.0));

        let words = amount_to_words(rec.bottom_amount().round());
        let words_lines =
            wrap_to_width(&words, 60.0, style.words_size_pt, FontWeight::Bold).len() as f64;
        let addr_lines =
            wrap_to_width(ADDRESS, 50.0, style.address_size_pt, FontWeight::Normal).len() as f64;

        let expected = style.margin_top
            + 2.0 * style.meta_row
            + style.label_row
            + style.payer_row
            + style.header_row
            + 3.0 * style.item_row
            + style.totals_gap
            + 2.0 * style.totals_row
            + words_lines * style.words_line
            + style.signature_gap
            + style.signature_row
            + style.footer_name_row
            + addr_lines * style.address_line
            + style.margin_bottom;

        assert!((plan.page_height_mm - expected).abs() < 1e-9);
        assert_eq!(plan.scale, 1.0);
    }

    #[test]
    fn dynamic_height_reconstructed_from_ops() {
        let rec = record(items(5), None, LogoBlock::Absent);
        let plan = layout(&rec, &dynamic(10.0));
        // The last instruction sits one line allowance above the content
        // end; content end plus the bottom margin is the page height.
        let style = ReceiptStyle::default();
        let last_y = plan.content_bottom_mm();
        let reconstructed = last_y + style.address_line + style.margin_bottom;
        assert!((plan.page_height_mm - reconstructed).abs() < 1e-9);
        assert!(last_y < plan.page_height_mm);
    }

    #[test]
    fn dynamic_height_clamps_to_minimum() {
        let rec = record(items(1), None, LogoBlock::Absent);
        let plan = layout(&rec, &dynamic(80.0));
        assert_eq!(plan.page_height_mm, 80.0);
    }

    #[test]
    fn each_extra_item_adds_one_row() {
        let plan2 = layout(&record(items(2), None, LogoBlock::Absent), &dynamic(10.0));
        let plan3 = layout(&record(items(3), None, LogoBlock::Absent), &dynamic(10.0));
        let style = ReceiptStyle::default();
        assert!((plan3.page_height_mm - plan2.page_height_mm - style.item_row).abs() < 1e-9);
    }

    #[test]
    fn fixed_policy_shrinks_until_it_fits() {
        let format = PageFormat {
            width_mm: 76.2,
            height: HeightPolicy::Fixed {
                height_mm: 127.0,
                shrink_floor: 0.6,
            },
        };
        let rec = record(items(30), None, LogoBlock::Absent);
        let plan = layout(&rec, &format);
        assert!(plan.scale < 1.0);
        assert!(plan.scale >= 0.6);
        assert_eq!(plan.page_height_mm, 127.0);
        // Monotonic re-check: the re-measured content fits the page
        assert!(plan.content_bottom_mm() <= 127.0);
    }

    #[test]
    fn fixed_policy_clamps_at_floor_and_accepts_crowding() {
        let format = PageFormat {
            width_mm: 76.2,
            height: HeightPolicy::Fixed {
                height_mm: 127.0,
                shrink_floor: 0.6,
            },
        };
        let rec = record(items(200), None, LogoBlock::Absent);
        let plan = layout(&rec, &format);
        assert_eq!(plan.scale, 0.6);
        assert_eq!(plan.page_height_mm, 127.0);
    }

    #[test]
    fn fixed_policy_keeps_scale_one_when_content_fits() {
        let format = PageFormat {
            width_mm: 80.0,
            height: HeightPolicy::Fixed {
                height_mm: 127.0,
                shrink_floor: 0.6,
            },
        };
        let plan = layout(&record(items(2), None, LogoBlock::Absent), &format);
        assert_eq!(plan.scale, 1.0);
        assert!(plan.content_bottom_mm() <= 127.0);
    }

    #[test]
    fn consultation_plus_lab_test_scenario() {
        let rec = record(
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
            LogoBlock::Absent,
        );
        let plan = layout(&rec, &dynamic(80.0));

        let texts: Vec<&str> = plan
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        // No override: the sum row and the rupees row both show 800.00
        assert_eq!(texts.iter().filter(|t| **t == "800.00").count(), 2);
        assert!(texts.contains(&"Eight Hundred Rupees Only"));
        assert!(texts.contains(&"\u{2022} Consultation - Rs 500.00"));
        assert!(texts.contains(&"\u{2022} Lab Test - Rs 300.00"));
    }

    #[test]
    fn declared_total_feeds_rupees_row_and_words() {
        let rec = record(items(1), Some(750.0), LogoBlock::Absent);
        let plan = layout(&rec, &dynamic(80.0));
        let texts: Vec<&str> = plan
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"100.00")); // sum row
        assert!(texts.contains(&"750.00")); // rupees row
        assert!(texts.contains(&"Seven Hundred Fifty Rupees Only"));
    }

    #[test]
    fn item_sum_basis_ignores_declared_total_for_words() {
        let rec = record(items(1), Some(750.0), LogoBlock::Absent);
        let plan = compute_layout(
            &rec,
            CLINIC,
            ADDRESS,
            &ReceiptStyle::default(),
            &dynamic(80.0),
            WordsBasis::ItemSum,
        );
        let texts: Vec<&str> = plan
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"One Hundred Rupees Only"));
    }

    #[test]
    fn reserved_logo_keeps_downstream_offsets_stable() {
        let loaded = LogoBlock::Loaded(LogoImage {
            width_px: 10,
            height_px: 10,
            rgb: vec![255; 300],
        });
        let with_logo = layout(&record(items(2), None, loaded), &dynamic(10.0));
        let reserved = layout(&record(items(2), None, LogoBlock::Reserved), &dynamic(10.0));
        let absent = layout(&record(items(2), None, LogoBlock::Absent), &dynamic(10.0));

        // Same page height and same text offsets whether the logo loaded
        // or only reserved its space
        assert_eq!(with_logo.page_height_mm, reserved.page_height_mm);
        let first_text_y = |plan: &LayoutPlan| {
            plan.ops
                .iter()
                .find_map(|op| match op {
                    DrawOp::Text { y_mm, .. } => Some(*y_mm),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(first_text_y(&with_logo), first_text_y(&reserved));

        let style = ReceiptStyle::default();
        let logo_block = style.logo_height + style.logo_gap;
        assert!(
            (first_text_y(&reserved) - first_text_y(&absent) - logo_block).abs() < 1e-9
        );
    }

    #[test]
    fn empty_items_render_placeholder_row() {
        let plan = layout(&record(Vec::new(), None, LogoBlock::Absent), &dynamic(80.0));
        let texts: Vec<&str> = plan
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"\u{2022} \u{2014}"));
        assert!(texts.contains(&"0.00"));
        assert!(texts.contains(&"Zero Rupees Only"));
    }

    #[test]
    fn plan_is_deterministic() {
        let rec = record(items(4), Some(999.0), LogoBlock::Reserved);
        let a = layout(&rec, &dynamic(80.0));
        let b = layout(&rec, &dynamic(80.0));
        assert_eq!(a.page_height_mm, b.page_height_mm);
        assert_eq!(a.ops.len(), b.ops.len());
        for (x, y) in a.ops.iter().zip(b.ops.iter()) {
            assert!((x.y_mm() - y.y_mm()).abs() < 1e-12);
        }
    }
}
