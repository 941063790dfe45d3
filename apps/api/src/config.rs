use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; parse failures abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. When unset the service keeps documents in memory.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub font_path: Option<PathBuf>,
    pub font_bold_path: Option<PathBuf>,
    /// Hours a downloaded document survives before the sweeper removes it.
    pub document_ttl_hours: i64,
    pub expiry_sweep_secs: u64,
    pub max_image_bytes: usize,
    /// Longest document, in page bands, that an export will rasterise.
    pub max_export_pages: u32,
    /// Raster magnification over the 96 dpi layout.
    pub raster_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            port: 5000,
            rust_log: "info".to_string(),
            font_path: None,
            font_bold_path: None,
            document_ttl_hours: 24,
            expiry_sweep_secs: 300,
            max_image_bytes: 5 * 1024 * 1024,
            max_export_pages: 20,
            raster_scale: 3.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            font_path: optional_env("FONT_PATH").map(PathBuf::from),
            font_bold_path: optional_env("FONT_BOLD_PATH").map(PathBuf::from),
            document_ttl_hours: parse_env("DOCUMENT_TTL_HOURS", defaults.document_ttl_hours)?,
            expiry_sweep_secs: parse_env("EXPIRY_SWEEP_SECS", defaults.expiry_sweep_secs)?,
            max_image_bytes: parse_env("MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
            max_export_pages: parse_env("MAX_EXPORT_PAGES", defaults.max_export_pages)?,
            raster_scale: parse_env("RASTER_SCALE", defaults.raster_scale)?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
