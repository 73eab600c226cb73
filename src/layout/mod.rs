mod engine;
mod font;
mod plan;
mod wrap;

pub use engine::{compute_layout, HeightPolicy, PageFormat, ReceiptStyle, WordsBasis};
pub use font::{text_width_mm, FontWeight, PT_TO_MM};
pub use plan::{Align, DrawOp, LayoutPlan};
pub use wrap::wrap_to_width;
