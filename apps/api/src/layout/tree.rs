//! Layout tree produced by the templates.
//!
//! The tree says *what* appears and in which order; geometry is decided later by
//! `flow::compose`.

use serde::Serialize;

use crate::layout::template::Template;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub template: Template,
    pub header: Header,
    pub sections: Vec<Section>,
}

#[cfg(test)]
impl Layout {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum Header {
    /// Photo on the left, name and labelled contact lines on the right.
    PhotoAndContact {
        name: String,
        photo: Option<String>,
        contact: Vec<Labeled>,
    },
    /// Centered name with rows of labelled contact items.
    Centered { name: String, rows: Vec<Vec<Labeled>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Skills,
    AdditionalInformation,
    Projects,
    Certifications,
    Achievements,
    Education,
    Experience,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph { text: String },
    Field(Labeled),
    Entry(Entry),
}

/// One list item: a title row with an optional right-aligned aside, then detail lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Entry {
    pub title: String,
    /// Trailing text on the title line in normal weight (`Title: description`).
    pub title_suffix: Option<String>,
    pub emphasis: Emphasis,
    pub subtitle: Option<String>,
    pub detail: Option<String>,
    pub aside: Vec<String>,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    #[default]
    Plain,
    Accent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Line {
    Text { text: String },
    Bullet { text: String },
    Field(Labeled),
    /// Several labelled values sharing one line.
    Fields { items: Vec<Labeled> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labeled {
    pub label: String,
    pub value: String,
    pub link: bool,
}

impl Labeled {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            link: false,
        }
    }

    pub fn link(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            link: true,
            ..Self::new(label, value)
        }
    }
}
