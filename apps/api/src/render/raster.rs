//! Draws a composed `Canvas` into an RGBA bitmap.
//!
//! Glyphs are rasterised with `ab_glyph` from a TrueType face found on disk.
//! Line breaking was already decided during composition, so the face only
//! affects glyph shapes. Without a usable face there is no render surface and
//! `rasterize` returns `None`.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use base64::Engine;
use image::{imageops, Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::layout::{Canvas, DrawOp, FontWeight, TextRun};
use crate::layout::template::Rgb;

const REGULAR_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
];

const BOLD_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:/Windows/Fonts/arialbd.ttf",
];

pub struct Rasterizer {
    regular: Option<FontVec>,
    bold: Option<FontVec>,
    scale: f32,
}

impl Rasterizer {
    /// Loads faces from the configured paths, then from well-known system locations.
    pub fn load(config: &Config) -> Self {
        let regular = load_first(config.font_path.as_deref(), REGULAR_FONT_PATHS);
        let bold = load_first(config.font_bold_path.as_deref(), BOLD_FONT_PATHS);
        match &regular {
            Some(_) => info!(bold = bold.is_some(), "Rasterizer fonts loaded"),
            None => warn!("No TrueType font found; exports will be skipped"),
        }
        Rasterizer {
            regular,
            bold,
            scale: config.raster_scale.max(1.0),
        }
    }

    /// A rasterizer with no faces. Every `rasterize` call yields `None`.
    pub fn unavailable() -> Self {
        Rasterizer {
            regular: None,
            bold: None,
            scale: 1.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.regular.is_some()
    }

    fn face(&self, weight: FontWeight) -> Option<&FontVec> {
        match weight {
            FontWeight::Bold => self.bold.as_ref().or(self.regular.as_ref()),
            FontWeight::Regular => self.regular.as_ref(),
        }
    }

    /// Renders the canvas at the configured magnification.
    pub fn rasterize(&self, canvas: &Canvas) -> Option<RgbaImage> {
        if !self.is_available() || canvas.width <= 0.0 || canvas.height <= 0.0 {
            return None;
        }
        let s = self.scale;
        let width = (canvas.width * s).ceil() as u32;
        let height = (canvas.height * s).ceil() as u32;
        let [r, g, b] = canvas.background;
        let mut img = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));

        for op in &canvas.ops {
            match op {
                DrawOp::Text(run) => self.draw_text(&mut img, run),
                DrawOp::Rule {
                    x,
                    y,
                    width,
                    thickness,
                    color,
                } => fill_rect(&mut img, x * s, y * s, width * s, (thickness * s).max(1.0), *color),
                DrawOp::Image {
                    x,
                    y,
                    width,
                    height,
                    source,
                } => draw_image(&mut img, source, x * s, y * s, width * s, height * s),
            }
        }

        debug!(width, height, ops = canvas.ops.len(), "Canvas rasterised");
        Some(img)
    }

    fn draw_text(&self, img: &mut RgbaImage, run: &TextRun) {
        let Some(font) = self.face(run.weight) else {
            return;
        };
        let s = self.scale;
        let px = PxScale::from(run.size_px * s);
        let scaled = font.as_scaled(px);
        let glyph_height = scaled.ascent() - scaled.descent();
        let baseline = run.y * s + (run.line_px * s - glyph_height) / 2.0 + scaled.ascent();

        let mut caret = run.x * s;
        let mut previous = None;
        for c in run.text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(px, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                blend(img, x, y, run.color, coverage);
            });
        }
    }
}

fn load_first(configured: Option<&Path>, fallbacks: &[&str]) -> Option<FontVec> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(fallbacks.iter().map(PathBuf::from));
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match std::fs::read(&path).map(FontVec::try_from_vec) {
            Ok(Ok(font)) => {
                debug!(path = %path.display(), "Loaded font");
                return Some(font);
            }
            Ok(Err(e)) => warn!(path = %path.display(), "Invalid font file: {e}"),
            Err(e) => warn!(path = %path.display(), "Failed to read font: {e}"),
        }
    }
    None
}

fn blend(img: &mut RgbaImage, x: i64, y: i64, color: Rgb, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    for (channel, target) in pixel.0.iter_mut().take(3).zip(color) {
        *channel = (*channel as f32 * (1.0 - alpha) + target as f32 * alpha).round() as u8;
    }
}

fn fill_rect(img: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
    let x0 = x.max(0.0).round() as u32;
    let y0 = y.max(0.0).round() as u32;
    let x1 = ((x + width).round().max(0.0) as u32).min(img.width());
    let y1 = ((y + height).round().max(0.0) as u32).min(img.height());
    let [r, g, b] = color;
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, Rgba([r, g, b, 255]));
        }
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URI into its raw bytes.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()
}

/// Draws the photo cover-cropped into the box. Undecodable images are skipped.
fn draw_image(img: &mut RgbaImage, source: &str, x: f32, y: f32, width: f32, height: f32) {
    let (w, h) = (width.round() as u32, height.round() as u32);
    if w == 0 || h == 0 {
        return;
    }
    let Some(bytes) = decode_data_uri(source) else {
        warn!("Profile image is not a base64 data URI; skipping");
        return;
    };
    match image::load_from_memory(&bytes) {
        Ok(photo) => {
            let fitted = photo
                .resize_to_fill(w, h, imageops::FilterType::Triangle)
                .to_rgba8();
            imageops::overlay(img, &fitted, x.round() as i64, y.round() as i64);
        }
        Err(e) => warn!("Profile image could not be decoded: {e}"),
    }
}
