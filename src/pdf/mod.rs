//! PDF materialization of a computed layout plan, plus the logo loader
//! and the best-effort print sink. All geometry decisions were made by
//! the layout engine; this module only converts top-down mm offsets to
//! the PDF's bottom-up point system and paints.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::Command;

use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Line, Mm,
    PdfDocument, Point, Px,
};

use crate::error::{ReceiptError, Result};
use crate::layout::{text_width_mm, Align, DrawOp, FontWeight, LayoutPlan, PT_TO_MM};
use crate::receipt::{LogoBlock, LogoImage};

/// Paint `plan` into a single-page PDF at `output_path`. The logo bytes
/// travel separately from the plan; a plan can reserve logo space
/// without any image being available.
pub fn render_pdf(
    plan: &LayoutPlan,
    logo: Option<&LogoImage>,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let page_w = plan.page_width_mm as f32;
    let page_h = plan.page_height_mm as f32;
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(page_w), Mm(page_h), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);

    let font_regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReceiptError::PdfGeneration(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReceiptError::PdfGeneration(e.to_string()))?;

    for op in &plan.ops {
        match op {
            DrawOp::Text {
                text,
                x_mm,
                y_mm,
                size_pt,
                weight,
                align,
            } => {
                // Resolve the anchor to a left edge with the same
                // metrics the wrapper used
                let width = text_width_mm(text, *size_pt, *weight);
                let x = match align {
                    Align::Left => *x_mm,
                    Align::Center => x_mm - width / 2.0,
                    Align::Right => x_mm - width,
                };
                let font = match weight {
                    FontWeight::Normal => &font_regular,
                    FontWeight::Bold => &font_bold,
                };
                layer.use_text(
                    text.clone(),
                    *size_pt as f32,
                    Mm(x as f32),
                    Mm(page_h - *y_mm as f32),
                    font,
                );
            }
            DrawOp::Rule {
                x_mm,
                y_mm,
                width_mm,
                thickness_mm,
            } => {
                let y = page_h - *y_mm as f32;
                layer.set_outline_thickness((*thickness_mm / PT_TO_MM) as f32);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x_mm as f32), Mm(y)), false),
                        (Point::new(Mm((*x_mm + *width_mm) as f32), Mm(y)), false),
                    ],
                    is_closed: false,
                });
            }
            DrawOp::Logo {
                x_mm,
                y_mm,
                width_mm,
                height_mm,
            } => {
                if let Some(image) = logo {
                    embed_logo(
                        &layer,
                        image,
                        *x_mm,
                        page_h as f64 - y_mm - height_mm,
                        *width_mm,
                        *height_mm,
                    );
                }
            }
        }
    }

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ReceiptError::PdfGeneration(e.to_string()))?;

    Ok(())
}

/// Stretch the decoded logo into the block the plan reserved for it.
/// `x_mm`/`y_mm` are the bottom-left corner in PDF coordinates.
fn embed_logo(
    layer: &printpdf::PdfLayerReference,
    image: &LogoImage,
    x_mm: f64,
    y_mm: f64,
    width_mm: f64,
    height_mm: f64,
) {
    let pdf_image = Image::from(ImageXObject {
        width: Px(image.width_px as usize),
        height: Px(image.height_px as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: image.rgb.clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // At `dpi` the image's natural size is px * 25.4 / dpi mm; scale the
    // axes independently to fill the reserved block exactly.
    let dpi = 300.0_f32;
    let natural_w = image.width_px as f32 * 25.4 / dpi;
    let natural_h = image.height_px as f32 * 25.4 / dpi;

    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x_mm as f32)),
            translate_y: Some(Mm(y_mm as f32)),
            scale_x: Some(width_mm as f32 / natural_w),
            scale_y: Some(height_mm as f32 / natural_h),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

/// Load the configured logo ahead of layout. A configured path that
/// cannot be read or decoded degrades to `Reserved`: the receipt keeps
/// the blank block and every later offset stays stable.
pub fn load_logo(path: Option<&PathBuf>) -> LogoBlock {
    let Some(path) = path else {
        return LogoBlock::Absent;
    };
    match image::open(path) {
        Ok(decoded) => {
            let rgb = decoded.to_rgb8();
            let (width_px, height_px) = rgb.dimensions();
            LogoBlock::Loaded(LogoImage {
                width_px,
                height_px,
                rgb: rgb.into_raw(),
            })
        }
        Err(e) => {
            eprintln!("Warning: unable to load logo {}: {e}", path.display());
            LogoBlock::Reserved
        }
    }
}

/// Send the finished PDF to the system print spooler. Best effort:
/// printing may be unavailable on the host, in which case the failure
/// is reported and swallowed — never retried, never fatal.
pub fn print_pdf(pdf_path: &Path) {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        if let Err(e) = Command::new("lp").arg(pdf_path).spawn() {
            eprintln!("Warning: could not invoke printer: {e}");
        }
    }

    #[cfg(target_os = "windows")]
    {
        let command = format!(
            "Start-Process -FilePath '{}' -Verb Print",
            pdf_path.display()
        );
        if let Err(e) = Command::new("powershell")
            .args(["-Command", &command])
            .spawn()
        {
            eprintln!("Warning: could not invoke printer: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_configured_logo_is_absent() {
        assert!(matches!(load_logo(None), LogoBlock::Absent));
    }

    #[test]
    fn missing_logo_file_degrades_to_reserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.png");
        assert!(matches!(load_logo(Some(&path)), LogoBlock::Reserved));
    }

    #[test]
    fn undecodable_logo_file_degrades_to_reserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(load_logo(Some(&path)), LogoBlock::Reserved));
    }
}
