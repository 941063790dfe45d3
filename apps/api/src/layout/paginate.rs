//! Slices one tall raster into A4 pages.
//!
//! The raster is scaled to the page width. If the scaled height fits within one
//! page band it becomes a single page; otherwise every further page shows the
//! same image shifted up by one band, so page `n` displays the band
//! `[n * page_height, (n + 1) * page_height)` of the image.

use serde::Serialize;
use thiserror::Error;

use crate::layout::font_metrics::PageConfig;

#[derive(Debug, Error, PartialEq)]
pub enum PaginationError {
    #[error("cannot paginate an empty raster ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
}

/// Where the scaled image is drawn on one page, in mm from the page top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PagePlacement {
    pub index: usize,
    /// Zero on the first page, negative on every later page.
    pub offset_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub image_width_mm: f32,
    pub image_height_mm: f32,
    pub page_height_mm: f32,
    pub pages: Vec<PagePlacement>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The slice of the scaled image, in mm, that lands inside a page band.
    pub fn visible_band(&self, page: &PagePlacement) -> (f32, f32) {
        let start = -page.offset_mm;
        let end = (start + self.page_height_mm).min(self.image_height_mm);
        (start, end)
    }
}

pub fn paginate(
    raster_width: u32,
    raster_height: u32,
    page: &PageConfig,
) -> Result<Pagination, PaginationError> {
    if raster_width == 0 || raster_height == 0 {
        return Err(PaginationError::EmptyRaster {
            width: raster_width,
            height: raster_height,
        });
    }

    let image_width_mm = page.page_width_mm;
    let image_height_mm = raster_height as f32 * image_width_mm / raster_width as f32;
    let page_height_mm = page.page_height_mm;

    let mut pages = vec![PagePlacement {
        index: 0,
        offset_mm: 0.0,
    }];

    if image_height_mm > page_height_mm {
        let mut height_left = image_height_mm - page_height_mm;
        // Tolerate float noise so an exact multiple does not grow an empty page.
        while height_left > 1e-3 {
            pages.push(PagePlacement {
                index: pages.len(),
                offset_mm: -(image_height_mm - height_left),
            });
            height_left -= page_height_mm;
        }
    }

    Ok(Pagination {
        image_width_mm,
        image_height_mm,
        page_height_mm,
        pages,
    })
}
