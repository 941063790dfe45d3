//! Composition: places a `Layout` tree onto a fixed-width surface as draw instructions.
//!
//! This stands in for the browser's layout pass. The surface is one A4 page wide
//! (CSS px at 96 dpi) and as tall as its content, never shorter than one page band.
//! Text is wrapped greedily using the static metric tables.

use serde::Serialize;

use crate::layout::font_metrics::{get_metrics, FontWeight, PageConfig};
use crate::layout::template::{Rgb, TemplateStyle};
use crate::layout::tree::{Block, Emphasis, Entry, Header, Labeled, Layout, Line, Section};

// ────────────────────────────────────────────────────────────────────────────
// Canvas
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    /// Top of the line box.
    pub y: f32,
    pub size_px: f32,
    pub line_px: f32,
    pub weight: FontWeight,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text(TextRun),
    Rule {
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        color: Rgb,
    },
    /// A `data:` URI image drawn cover-cropped into the box.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        source: String,
    },
}

/// The composed surface, in CSS px.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub background: Rgb,
    pub ops: Vec<DrawOp>,
}

#[cfg(test)]
impl Canvas {
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }
}

const WHITE: Rgb = [255, 255, 255];
const BULLET: &str = "\u{2022} ";
const INLINE_GAP_PX: f32 = 16.0;
const ASIDE_GAP_PX: f32 = 8.0;

// ────────────────────────────────────────────────────────────────────────────
// Wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Greedy word-wrap at `max_width_px`. Returns the text of each printed line.
///
/// A single word wider than the line is kept whole on its own line. An empty
/// string returns no lines.
pub fn wrap_lines(text: &str, size_px: f32, weight: FontWeight, max_width_px: f32) -> Vec<String> {
    let metrics = get_metrics(weight);
    let space_w = metrics.space_width * size_px;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = metrics.measure_px(word, size_px);
        if !current.is_empty() && current_width + space_w + word_w > max_width_px {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space_w;
        }
        current.push_str(word);
        current_width += word_w;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

/// Composes the layout onto a canvas sized for `page`.
pub fn compose(layout: &Layout, page: &PageConfig) -> Canvas {
    let style = layout.template.style();
    let width = page.surface_width_px();
    let mut composer = Composer {
        style,
        left: style.padding_px,
        right: width - style.padding_px,
        y: 0.0,
        ops: Vec::new(),
    };

    composer.header(&layout.header);
    for section in &layout.sections {
        composer.section(section);
    }

    let content_bottom = composer.y + style.padding_px;
    Canvas {
        width,
        height: content_bottom.max(page.min_surface_height_px()).ceil(),
        background: WHITE,
        ops: composer.ops,
    }
}

struct Composer {
    style: TemplateStyle,
    left: f32,
    right: f32,
    y: f32,
    ops: Vec<DrawOp>,
}

impl Composer {
    fn line_px(&self, size_px: f32) -> f32 {
        size_px * self.style.line_height
    }

    fn run(&mut self, x: f32, y: f32, size_px: f32, weight: FontWeight, color: Rgb, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text(TextRun {
            x,
            y,
            size_px,
            line_px: self.line_px(size_px),
            weight,
            color,
            text: text.to_string(),
        }));
    }

    /// Wraps `text` inside `[x, x + max_width]` starting at `y`; returns the height used.
    #[allow(clippy::too_many_arguments)]
    fn paragraph(
        &mut self,
        x: f32,
        y: f32,
        max_width: f32,
        text: &str,
        size_px: f32,
        weight: FontWeight,
        color: Rgb,
    ) -> f32 {
        let line_px = self.line_px(size_px);
        let lines = wrap_lines(text, size_px, weight, max_width);
        for (i, line) in lines.iter().enumerate() {
            self.run(x, y + i as f32 * line_px, size_px, weight, color, line);
        }
        lines.len() as f32 * line_px
    }

    /// `Label: value` with the value wrapped under a hanging indent.
    fn labeled(&mut self, x: f32, y: f32, max_width: f32, item: &Labeled, size_px: f32) -> f32 {
        let label = format!("{}: ", item.label);
        let label_w = get_metrics(FontWeight::Bold).measure_px(&label, size_px);
        let text_color = self.style.text;
        self.run(x, y, size_px, FontWeight::Bold, text_color, &label);
        let value_color = if item.link { self.style.link } else { text_color };
        let used = self.paragraph(
            x + label_w,
            y,
            (max_width - label_w).max(size_px),
            &item.value,
            size_px,
            FontWeight::Regular,
            value_color,
        );
        used.max(self.line_px(size_px))
    }

    /// Several labelled values on one line, flowing onto the next line when full.
    fn inline_fields(&mut self, x: f32, y: f32, max_width: f32, items: &[Labeled], size_px: f32) -> f32 {
        let line_px = self.line_px(size_px);
        let bold = get_metrics(FontWeight::Bold);
        let regular = get_metrics(FontWeight::Regular);
        let mut cursor_x = x;
        let mut row = 0.0_f32;
        for item in items {
            let label = format!("{}: ", item.label);
            let label_w = bold.measure_px(&label, size_px);
            let value_w = regular.measure_px(&item.value, size_px);
            if cursor_x > x && cursor_x + label_w + value_w > x + max_width {
                cursor_x = x;
                row += 1.0;
            }
            let line_y = y + row * line_px;
            let value_color = if item.link { self.style.link } else { self.style.text };
            self.run(cursor_x, line_y, size_px, FontWeight::Bold, self.style.text, &label);
            self.run(cursor_x + label_w, line_y, size_px, FontWeight::Regular, value_color, &item.value);
            cursor_x += label_w + value_w + INLINE_GAP_PX;
        }
        if items.is_empty() {
            0.0
        } else {
            (row + 1.0) * line_px
        }
    }

    fn header(&mut self, header: &Header) {
        let style = self.style;
        match header {
            Header::PhotoAndContact { name, photo, contact } => {
                let top = style.padding_px;
                let mut text_x = self.left;
                let mut photo_bottom = top;
                if let Some(source) = photo {
                    self.ops.push(DrawOp::Image {
                        x: self.left,
                        y: top,
                        width: style.photo_width_px,
                        height: style.photo_height_px,
                        source: source.clone(),
                    });
                    text_x += style.photo_width_px + 24.0;
                    photo_bottom = top + style.photo_height_px;
                }
                let text_width = self.right - text_x;
                let mut y = top;
                y += self.paragraph(
                    text_x,
                    y,
                    text_width,
                    name,
                    style.name_px,
                    FontWeight::Bold,
                    style.accent,
                );
                y += 12.0;
                for item in contact {
                    y += self.labeled(text_x, y, text_width, item, style.contact_px);
                    y += 4.0;
                }
                self.y = y.max(photo_bottom) + 16.0;
            }
            Header::Centered { name, rows } => {
                let mut y = style.padding_px;
                let name_w = get_metrics(FontWeight::Bold).measure_px(name, style.name_px);
                let center = (self.left + self.right) / 2.0;
                self.run(
                    center - name_w / 2.0,
                    y,
                    style.name_px,
                    FontWeight::Bold,
                    style.accent,
                    name,
                );
                y += self.line_px(style.name_px) + 4.0;
                for row in rows {
                    y += self.centered_row(y, row, center);
                    y += 4.0;
                }
                self.y = y + 8.0;
            }
        }
    }

    fn centered_row(&mut self, y: f32, items: &[Labeled], center: f32) -> f32 {
        let size = self.style.contact_px;
        let bold = get_metrics(FontWeight::Bold);
        let regular = get_metrics(FontWeight::Regular);
        let separator = "  \u{2022}  ";
        let pieces: Vec<(String, f32, f32)> = items
            .iter()
            .map(|item| {
                let label = format!("{}: ", item.label);
                let label_w = bold.measure_px(&label, size);
                let value_w = regular.measure_px(&item.value, size);
                (label, label_w, value_w)
            })
            .collect();
        let separator_w = regular.measure_px(separator, size);
        let total: f32 = pieces.iter().map(|(_, l, v)| l + v).sum::<f32>()
            + separator_w * pieces.len().saturating_sub(1) as f32;

        let mut x = center - total / 2.0;
        for (i, (item, (label, label_w, value_w))) in items.iter().zip(pieces).enumerate() {
            if i > 0 {
                self.run(x, y, size, FontWeight::Regular, self.style.muted, separator);
                x += separator_w;
            }
            let value_color = if item.link { self.style.link } else { self.style.text };
            self.run(x, y, size, FontWeight::Bold, self.style.text, &label);
            self.run(x + label_w, y, size, FontWeight::Regular, value_color, &item.value);
            x += label_w + value_w;
        }
        self.line_px(size)
    }

    fn section(&mut self, section: &Section) {
        let style = self.style;
        let width = self.right - self.left;
        let (left, heading_y) = (self.left, self.y);
        let used = self.paragraph(
            left,
            heading_y,
            width,
            &section.heading,
            style.heading_px,
            FontWeight::Bold,
            style.accent,
        );
        let rule_y = heading_y + used + 2.0;
        self.ops.push(DrawOp::Rule {
            x: left,
            y: rule_y,
            width,
            thickness: 1.0,
            color: style.rule,
        });
        self.y = rule_y + 1.0 + 8.0;

        for (i, block) in section.blocks.iter().enumerate() {
            if i > 0 {
                self.y += match block {
                    Block::Entry(_) => style.entry_gap_px,
                    _ => 4.0,
                };
            }
            let y = self.y;
            let used = match block {
                Block::Paragraph { text } => self.paragraph(
                    left,
                    y,
                    width,
                    text,
                    style.base_px,
                    FontWeight::Regular,
                    style.text,
                ),
                Block::Field(item) => self.labeled(left, y, width, item, style.base_px),
                Block::Entry(entry) => self.entry(entry),
            };
            self.y += used;
        }
        self.y += style.section_gap_px;
    }

    fn entry(&mut self, entry: &Entry) -> f32 {
        let style = self.style;
        let size = style.base_px;
        let line_px = self.line_px(size);
        let regular = get_metrics(FontWeight::Regular);
        let top = self.y;

        // Right-aligned aside column.
        let aside_w = entry
            .aside
            .iter()
            .map(|a| regular.measure_px(a, size))
            .fold(0.0_f32, f32::max);
        for (i, text) in entry.aside.iter().enumerate() {
            let w = regular.measure_px(text, size);
            self.run(
                self.right - w,
                top + i as f32 * line_px,
                size,
                FontWeight::Regular,
                style.muted,
                text,
            );
        }
        let aside_h = entry.aside.len() as f32 * line_px;

        let main_w = if aside_w > 0.0 {
            self.right - self.left - aside_w - ASIDE_GAP_PX
        } else {
            self.right - self.left
        };
        let title_color = match entry.emphasis {
            Emphasis::Accent => style.accent,
            Emphasis::Plain => style.text,
        };

        let mut y = top;
        match &entry.title_suffix {
            Some(suffix) => {
                let title = format!("{} ", entry.title);
                let title_w = get_metrics(FontWeight::Bold).measure_px(&title, size);
                self.run(self.left, y, size, FontWeight::Bold, title_color, &title);
                let used = self.paragraph(
                    self.left + title_w,
                    y,
                    (main_w - title_w).max(size),
                    suffix,
                    size,
                    FontWeight::Regular,
                    style.text,
                );
                y += used.max(line_px);
            }
            None if !entry.title.is_empty() => {
                y += self.paragraph(
                    self.left,
                    y,
                    main_w,
                    &entry.title,
                    size,
                    FontWeight::Bold,
                    title_color,
                );
            }
            None => {}
        }
        for (text, color) in [(&entry.subtitle, style.text), (&entry.detail, style.muted)] {
            if let Some(text) = text {
                y += self.paragraph(self.left, y, main_w, text, size, FontWeight::Regular, color);
            }
        }

        let mut y = y.max(top + aside_h);
        if !entry.lines.is_empty() {
            y += 2.0;
        }
        let x = self.left + style.detail_indent_px;
        let width = self.right - x;
        for line in &entry.lines {
            y += match line {
                Line::Text { text } => {
                    self.paragraph(x, y, width, text, size, FontWeight::Regular, style.text)
                }
                Line::Bullet { text } => {
                    let bullet_w = regular.measure_px(BULLET, size);
                    self.run(x, y, size, FontWeight::Regular, style.text, BULLET);
                    let used = self.paragraph(
                        x + bullet_w,
                        y,
                        width - bullet_w,
                        text,
                        size,
                        FontWeight::Regular,
                        style.text,
                    );
                    used.max(line_px)
                }
                Line::Field(item) => self.labeled(x, y, width, item, size),
                Line::Fields { items } => self.inline_fields(x, y, width, items, size),
            };
        }
        y - top
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
