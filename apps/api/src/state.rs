use std::sync::Arc;

use crate::config::Config;
use crate::render::{ExportGate, Exporter};
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres or in-memory, chosen at startup from `DATABASE_URL`.
    pub store: Arc<dyn DocumentStore>,
    pub config: Config,
    pub exporter: Arc<Exporter>,
    /// One export at a time; concurrent requests get 409.
    pub export_gate: ExportGate,
}
