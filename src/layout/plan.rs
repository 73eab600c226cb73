//! The computed draw plan for one receipt page. Offsets grow downward
//! from the top-left corner in mm; the PDF sink converts to the PDF
//! coordinate system when painting.

use super::font::FontWeight;

/// Horizontal anchoring of a text run at its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One positioned drawing instruction.
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// Text baseline at (x, y)
    Text {
        text: String,
        x_mm: f64,
        y_mm: f64,
        size_pt: f64,
        weight: FontWeight,
        align: Align,
    },
    /// Horizontal rule from (x, y) extending width_mm to the right
    Rule {
        x_mm: f64,
        y_mm: f64,
        width_mm: f64,
        thickness_mm: f64,
    },
    /// Logo placement; top-left corner at (x, y)
    Logo {
        x_mm: f64,
        y_mm: f64,
        width_mm: f64,
        height_mm: f64,
    },
}

impl DrawOp {
    /// Vertical offset of the instruction from the page top.
    pub fn y_mm(&self) -> f64 {
        match self {
            DrawOp::Text { y_mm, .. } | DrawOp::Rule { y_mm, .. } | DrawOp::Logo { y_mm, .. } => {
                *y_mm
            }
        }
    }
}

/// Fully determined page geometry plus its ordered draw instructions.
/// Derived from one `InvoiceRecord` and a style; used once, then
/// discarded.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// 1.0 except when the fixed-height policy shrank the content
    pub scale: f64,
    pub ops: Vec<DrawOp>,
}

impl LayoutPlan {
    /// Largest bottom edge among the draw instructions. Text extends to
    /// its baseline, images to their full height.
    pub fn content_bottom_mm(&self) -> f64 {
        self.ops
            .iter()
            .map(|op| match op {
                DrawOp::Logo {
                    y_mm, height_mm, ..
                } => y_mm + height_mm,
                other => other.y_mm(),
            })
            .fold(0.0, f64::max)
    }
}
