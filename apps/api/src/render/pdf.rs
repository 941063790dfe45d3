//! Assembles the paginated raster into an A4 PDF.
//!
//! The raster is embedded once as a Flate-compressed RGB image and drawn on
//! every page at that page's offset. Each page is clipped to its band so rows
//! that belong to the next page never show twice.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

use crate::layout::{PageConfig, Pagination};

const PT_PER_MM: f32 = 72.0 / 25.4;
const IMAGE_NAME: Name<'static> = Name(b"Im1");

fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Drops alpha and deflates the pixel rows.
fn compress_rgb(raster: &RgbaImage) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for pixel in raster.pixels() {
        encoder.write_all(&pixel.0[..3])?;
    }
    encoder.finish()
}

pub fn assemble_pdf(
    raster: &RgbaImage,
    pagination: &Pagination,
    page: &PageConfig,
) -> std::io::Result<Vec<u8>> {
    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let image_id = Ref::new(3);
    let page_ids: Vec<(Ref, Ref)> = (0..pagination.page_count() as i32)
        .map(|i| (Ref::new(4 + 2 * i), Ref::new(5 + 2 * i)))
        .collect();

    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    let compressed = compress_rgb(raster)?;
    let mut image = pdf.image_xobject(image_id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(raster.width() as i32);
    image.height(raster.height() as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();

    let paper_w = mm_to_pt(page.page_width_mm);
    let paper_h = mm_to_pt(page.paper_height_mm);
    let image_w = mm_to_pt(pagination.image_width_mm);
    let image_h = mm_to_pt(pagination.image_height_mm);

    for (placement, (page_id, content_id)) in pagination.pages.iter().zip(&page_ids) {
        let mut pdf_page = pdf.page(*page_id);
        pdf_page.media_box(Rect::new(0.0, 0.0, paper_w, paper_h));
        pdf_page.parent(tree_id);
        pdf_page.contents(*content_id);
        pdf_page.resources().x_objects().pair(IMAGE_NAME, image_id);
        pdf_page.finish();

        // PDF space grows upward from the bottom edge.
        let image_top = paper_h - mm_to_pt(placement.offset_mm);
        let (band_start, band_end) = pagination.visible_band(placement);
        let band_h = mm_to_pt(band_end - band_start);
        let mut content = Content::new();
        content.save_state();
        content.rect(0.0, paper_h - band_h, paper_w, band_h);
        content.clip_nonzero();
        content.end_path();
        content.transform([image_w, 0.0, 0.0, image_h, 0.0, image_top - image_h]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        pdf.stream(*content_id, &content.finish());
    }

    Ok(pdf.finish())
}
