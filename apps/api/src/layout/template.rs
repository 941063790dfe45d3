//! The two document templates and their typography.
//!
//! `render` is pure: the same model always yields the same `Layout`, and empty
//! fields simply drop out instead of failing.

use serde::{Deserialize, Serialize};

use crate::layout::tree::Layout;
use crate::layout::{cv_template, resume_template};
use crate::models::{DocumentModel, DocumentType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Cv,
    Resume,
}

impl Template {
    pub fn document_type(&self) -> DocumentType {
        match self {
            Template::Cv => DocumentType::Cv,
            Template::Resume => DocumentType::Resume,
        }
    }

    pub fn style(&self) -> TemplateStyle {
        match self {
            Template::Cv => CV_STYLE,
            Template::Resume => RESUME_STYLE,
        }
    }
}

impl From<DocumentType> for Template {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::Cv => Template::Cv,
            DocumentType::Resume => Template::Resume,
        }
    }
}

/// Renders the model with the given template.
pub fn render(model: &DocumentModel, template: Template) -> Layout {
    match template {
        Template::Cv => cv_template::render(model),
        Template::Resume => resume_template::render(model),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typography
// ────────────────────────────────────────────────────────────────────────────

pub type Rgb = [u8; 3];

/// Fixed typography for one template. Sizes are CSS px at 96 dpi.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateStyle {
    pub base_px: f32,
    pub contact_px: f32,
    pub name_px: f32,
    pub heading_px: f32,
    pub line_height: f32,
    pub padding_px: f32,
    pub section_gap_px: f32,
    pub entry_gap_px: f32,
    pub accent: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub link: Rgb,
    pub rule: Rgb,
    pub photo_width_px: f32,
    pub photo_height_px: f32,
    /// Indent applied to entry detail lines.
    pub detail_indent_px: f32,
}

const CV_STYLE: TemplateStyle = TemplateStyle {
    base_px: 11.0,
    contact_px: 12.0,
    name_px: 24.0,
    heading_px: 14.0,
    line_height: 1.3,
    padding_px: 24.0,
    section_gap_px: 16.0,
    entry_gap_px: 12.0,
    accent: [30, 64, 175],
    text: [31, 41, 55],
    muted: [75, 85, 99],
    link: [37, 99, 235],
    rule: [147, 197, 253],
    photo_width_px: 96.0,
    photo_height_px: 128.0,
    detail_indent_px: 0.0,
};

const RESUME_STYLE: TemplateStyle = TemplateStyle {
    base_px: 10.0,
    contact_px: 12.0,
    name_px: 20.0,
    heading_px: 14.0,
    line_height: 1.2,
    padding_px: 16.0,
    section_gap_px: 12.0,
    entry_gap_px: 8.0,
    accent: [29, 78, 216],
    text: [31, 41, 55],
    muted: [75, 85, 99],
    link: [37, 99, 235],
    rule: [156, 163, 175],
    photo_width_px: 0.0,
    photo_height_px: 0.0,
    detail_indent_px: 8.0,
};
