//! Stamps the part's QR image onto page one of the source drawing.
//!
//! The composite is additive: the QR is registered as an image XObject in
//! page one's resources and drawn by a short content block appended after
//! the page's existing content. Nothing already on the page is removed or
//! re-encoded, and pages after the first are carried through untouched.
//!
//! Callers must always stamp from the pristine source PDF. Stamping an
//! already-stamped file would composite a second QR on top of the first;
//! the pipeline guarantees this cannot happen by resolving the source fresh
//! on every run and excluding stamped outputs from resolution.

use crate::{PublishConfig, PublishError, Result, POINTS_PER_INCH};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

/// Stamp `qr_png` onto the first page of `source_pdf` and write the result
/// to `output_dir/<part>.pdf`, overwriting any prior stamped file.
///
/// Placement is physical, anchored to the drawing's title block: the QR's
/// right edge sits `gap` inches left of the title block's left edge, its
/// bottom edge `titleblock_bottom` inches above the page's bottom edge.
/// A source PDF with zero pages is fatal.
pub fn stamp(
    config: &PublishConfig,
    source_pdf: &Path,
    qr_png: &Path,
    output_dir: &Path,
    part: &str,
) -> Result<PathBuf> {
    let mut doc = Document::load(source_pdf)?;

    let first_page = *doc
        .get_pages()
        .get(&1)
        .ok_or_else(|| PublishError::EmptyPdf(source_pdf.to_path_buf()))?;

    let (width, height) = page_size(&doc, first_page)
        .ok_or_else(|| PublishError::MissingMediaBox(source_pdf.to_path_buf()))?;

    let qr_size = config.qr_size_in * POINTS_PER_INCH;
    let x = config.titleblock_left_in * POINTS_PER_INCH - qr_size - config.gap_in * POINTS_PER_INCH;
    let y = config.titleblock_bottom_in * POINTS_PER_INCH;

    draw_image(&mut doc, first_page, qr_png, x, y, qr_size)?;

    let out_pdf = output_dir.join(format!("{part}.pdf"));
    doc.save(&out_pdf)?;

    println!(
        "Stamped & saved: {} ({width:.0}x{height:.0} pt)",
        out_pdf.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(out_pdf)
}

// ── Page geometry ────────────────────────────────────────────────────────────

/// Width and height of a page in points, from its `/MediaBox` — following
/// the `/Parent` chain because the entry is inheritable from the page tree.
/// `None` when no node on the chain declares a well-formed box.
fn page_size(doc: &Document, page_id: ObjectId) -> Option<(f32, f32)> {
    let mut node_id = page_id;
    // Bounded walk; a deeper page tree than this is malformed.
    for _ in 0..64 {
        let node = doc.get_object(node_id).ok()?.as_dict().ok()?;

        if let Ok(mb) = node.get(b"MediaBox") {
            let rect = match mb.as_reference() {
                Ok(id) => doc.get_object(id).ok()?.as_array().ok()?.clone(),
                Err(_) => mb.as_array().ok()?.clone(),
            };
            if let [x0, y0, x1, y1] = rect.as_slice() {
                let (x0, y0) = (as_number(x0)?, as_number(y0)?);
                let (x1, y1) = (as_number(x1)?, as_number(y1)?);
                return Some(((x1 - x0).abs(), (y1 - y0).abs()));
            }
            return None;
        }

        match node.get(b"Parent").and_then(|p| p.as_reference()) {
            Ok(parent) => node_id = parent,
            Err(_) => break,
        }
    }
    None
}

fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// ── Image compositing ────────────────────────────────────────────────────────

/// Embed the PNG as a DeviceGray image XObject on `page_id` and append a
/// `q cm Do Q` block drawing it as a `size`-point square at `(x, y)`.
fn draw_image(
    doc: &mut Document,
    page_id: ObjectId,
    png: &Path,
    x: f32,
    y: f32,
    size: f32,
) -> Result<()> {
    let pixels = image::open(png)?.to_luma8();
    let (px_w, px_h) = pixels.dimensions();

    let xobject = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => px_w as i64,
            "Height" => px_h as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        pixels.into_raw(),
    );
    let image_id = doc.add_object(xobject);

    // Resource names only need to be unique within the page; the object
    // number is unique within the document, which is stronger.
    let name = format!("QR{}", image_id.0);
    doc.add_xobject(page_id, name.as_bytes(), image_id)?;

    let ops = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    size.into(),
                    0.into(),
                    0.into(),
                    size.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ],
    };
    doc.add_to_page_content(page_id, ops)?;
    Ok(())
}
