//! Export pipeline: layout → canvas → raster → PDF/PNG/JPG bytes.
//!
//! Exports are CPU-bound and serialized: the `ExportGate` admits one export at a
//! time and rejects concurrent requests instead of queueing them.

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::{compose, paginate, render, Canvas, PageConfig, Template};
use crate::models::DocumentModel;
use crate::render::pdf::assemble_pdf;
use crate::render::raster::Rasterizer;

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Png,
    Jpg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
            ExportFormat::Jpg => "image/jpeg",
        }
    }

    /// Accepts `pdf`, `png`, `jpg` and `jpeg`, case-insensitively.
    pub fn parse(s: &str) -> Option<ExportFormat> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpg),
            _ => None,
        }
    }
}

/// `{type}-{fullName}.{ext}`, with `document` standing in for a blank name.
/// Characters that would break a quoted `Content-Disposition` filename are replaced.
pub fn export_file_name(model: &DocumentModel, format: ExportFormat) -> String {
    let name: String = model
        .display_name()
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\\' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    format!(
        "{}-{}.{}",
        model.document_type.as_str(),
        name,
        format.extension()
    )
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

pub struct Exporter {
    rasterizer: Rasterizer,
    page: PageConfig,
    max_pages: u32,
}

impl Exporter {
    pub fn new(rasterizer: Rasterizer, page: PageConfig, max_pages: u32) -> Self {
        Exporter {
            rasterizer,
            page,
            max_pages,
        }
    }

    pub fn is_available(&self) -> bool {
        self.rasterizer.is_available()
    }

    /// Fails with `PayloadTooLarge` when the surface spans more than `max_pages` bands.
    fn check_page_limit(&self, canvas: &Canvas) -> Result<(), AppError> {
        let band_px = self.page.min_surface_height_px();
        // One px of slack absorbs the ceil applied to the surface height.
        if canvas.height <= band_px * self.max_pages as f32 + 1.0 {
            return Ok(());
        }
        let pages = (canvas.height / band_px).ceil() as u64;
        warn!(pages, limit = self.max_pages, "Export rejected: document too long");
        Err(AppError::PayloadTooLarge(format!(
            "The document spans {pages} pages; the limit is {}",
            self.max_pages
        )))
    }

    /// Produces the exported file, or `None` when no surface is available.
    pub fn export(
        &self,
        model: &DocumentModel,
        template: Template,
        format: ExportFormat,
    ) -> Result<Option<ExportedFile>, AppError> {
        let canvas = compose(&render(model, template), &self.page);
        self.check_page_limit(&canvas)?;
        let Some(raster) = self.rasterizer.rasterize(&canvas) else {
            warn!(format = format.extension(), "Render surface unavailable; export skipped");
            return Ok(None);
        };

        let bytes = match format {
            ExportFormat::Pdf => {
                let pagination = paginate(raster.width(), raster.height(), &self.page)
                    .map_err(|e| AppError::Render(e.to_string()))?;
                info!(pages = pagination.page_count(), "Assembling PDF");
                assemble_pdf(&raster, &pagination, &self.page)
                    .map_err(|e| AppError::Render(format!("PDF assembly failed: {e}")))?
            }
            ExportFormat::Png => encode_png(raster)?,
            ExportFormat::Jpg => encode_jpeg(raster)?,
        };

        Ok(Some(ExportedFile {
            bytes,
            content_type: format.content_type(),
            file_name: export_file_name(model, format),
        }))
    }
}

fn encode_png(raster: RgbaImage) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    raster
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AppError::Render(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}

fn encode_jpeg(raster: RgbaImage) -> Result<Vec<u8>, AppError> {
    let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();
    let mut bytes = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| AppError::Render(format!("JPEG encoding failed: {e}")))?;
    Ok(bytes)
}

// ────────────────────────────────────────────────────────────────────────────
// Export gate
// ────────────────────────────────────────────────────────────────────────────

/// Admits a single export at a time.
#[derive(Clone)]
pub struct ExportGate {
    permits: Arc<Semaphore>,
}

impl Default for ExportGate {
    fn default() -> Self {
        ExportGate {
            permits: Arc::new(Semaphore::new(1)),
        }
    }
}

impl ExportGate {
    /// Fails with `ExportInProgress` while another export holds the gate.
    pub fn try_begin(&self) -> Result<OwnedSemaphorePermit, AppError> {
        self.permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| AppError::ExportInProgress)
    }

    /// Runs `work` on the blocking pool behind the gate. The permit lives inside
    /// the blocking task and is released only when `work` returns.
    pub async fn run<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self.try_begin()?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::layout::default_page_config;
    use crate::models::DocumentType;

    fn model() -> DocumentModel {
        let mut model = DocumentModel::empty("user_1", DocumentType::Resume);
        model.personal_info.full_name = "Ada Lovelace".to_string();
        model
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(ExportFormat::parse("PDF"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("jpeg"), Some(ExportFormat::Jpg));
        assert_eq!(ExportFormat::parse("gif"), None);
    }

    #[test]
    fn test_file_name_uses_type_and_name() {
        assert_eq!(
            export_file_name(&model(), ExportFormat::Pdf),
            "resume-Ada Lovelace.pdf"
        );
        let blank = DocumentModel::empty("user_1", DocumentType::Cv);
        assert_eq!(export_file_name(&blank, ExportFormat::Jpg), "cv-document.jpg");
    }

    #[test]
    fn test_file_name_strips_header_breaking_characters() {
        let mut m = model();
        m.personal_info.full_name = "Ada\nLovelace".to_string();
        assert_eq!(export_file_name(&m, ExportFormat::Pdf), "resume-Ada Lovelace.pdf");

        m.personal_info.full_name = "Ada \"The\" Count\\I".to_string();
        assert_eq!(
            export_file_name(&m, ExportFormat::Png),
            "resume-Ada 'The' Count-I.png"
        );
    }

    #[test]
    fn test_overlong_document_is_rejected_before_rasterizing() {
        let mut m = model();
        m.experience.push(crate::models::Experience {
            company: "Acme".to_string(),
            description: "Shipped a feature\n".repeat(3000),
            ..Default::default()
        });
        let exporter = Exporter::new(Rasterizer::unavailable(), default_page_config(), 20);
        let err = exporter
            .export(&m, Template::Resume, ExportFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));

        let roomy = Exporter::new(Rasterizer::unavailable(), default_page_config(), 1000);
        assert!(roomy
            .export(&m, Template::Resume, ExportFormat::Pdf)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_export_without_surface_is_noop() {
        let exporter = Exporter::new(Rasterizer::unavailable(), default_page_config(), 20);
        for format in [ExportFormat::Pdf, ExportFormat::Png, ExportFormat::Jpg] {
            assert!(exporter
                .export(&model(), Template::Resume, format)
                .unwrap()
                .is_none());
        }
    }

    #[test]
    fn test_export_formats_with_system_font() {
        let exporter = Exporter::new(Rasterizer::load(&Config::default()), default_page_config(), 20);
        if !exporter.is_available() {
            return;
        }
        let pdf = exporter
            .export(&model(), Template::Resume, ExportFormat::Pdf)
            .unwrap()
            .unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF-"));
        assert_eq!(pdf.content_type, "application/pdf");

        let png = exporter
            .export(&model(), Template::Resume, ExportFormat::Png)
            .unwrap()
            .unwrap();
        assert!(png.bytes.starts_with(&[0x89, b'P', b'N', b'G']));

        let jpg = exporter
            .export(&model(), Template::Cv, ExportFormat::Jpg)
            .unwrap()
            .unwrap();
        assert!(jpg.bytes.starts_with(&[0xFF, 0xD8]));
        assert_eq!(jpg.file_name, "resume-Ada Lovelace.jpg");
    }

    #[test]
    fn test_gate_rejects_concurrent_export() {
        let gate = ExportGate::default();
        let permit = gate.try_begin().unwrap();
        assert!(matches!(gate.try_begin(), Err(AppError::ExportInProgress)));
        drop(permit);
        assert!(gate.try_begin().is_ok());
    }

    #[tokio::test]
    async fn test_gate_stays_closed_until_abandoned_work_finishes() {
        let gate = ExportGate::default();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let task = tokio::spawn({
            let gate = gate.clone();
            async move {
                gate.run(move || {
                    let _ = started_tx.send(());
                    let _ = release_rx.recv();
                    Ok(())
                })
                .await
            }
        });
        started_rx.await.unwrap();
        task.abort();
        let _ = task.await;
        assert!(matches!(gate.try_begin(), Err(AppError::ExportInProgress)));

        release_tx.send(()).unwrap();
        for _ in 0..200 {
            if gate.try_begin().is_ok() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("gate never reopened after the work finished");
    }
}
