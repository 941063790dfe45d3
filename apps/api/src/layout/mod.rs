// Document layout: template rendering, composition onto a page-wide surface,
// and slicing of the rasterised surface into A4 pages.
// Composition and pagination are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod cv_template;
pub mod flow;
pub mod font_metrics;
pub mod format;
pub mod paginate;
pub mod resume_template;
pub mod template;
pub mod tree;

pub use flow::{compose, Canvas, DrawOp, TextRun};
pub use font_metrics::{default_page_config, FontWeight, PageConfig};
pub use paginate::{paginate, Pagination};
pub use template::{render, Template};
pub use tree::{Layout, SectionKind};
