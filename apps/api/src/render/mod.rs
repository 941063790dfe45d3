pub mod export;
pub mod pdf;
pub mod raster;

pub use export::{export_file_name, ExportFormat, ExportGate, ExportedFile, Exporter};
pub use raster::Rasterizer;
