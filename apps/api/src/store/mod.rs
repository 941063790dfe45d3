//! Document persistence.
//!
//! `DocumentStore` is the seam between the HTTP layer and storage. `AppState`
//! carries it as `Arc<dyn DocumentStore>`: PostgreSQL when `DATABASE_URL` is
//! set, the in-memory backend otherwise (and in tests).

pub mod expiry;
pub mod gateway;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DocumentModel, DocumentRecord};

pub use memory::InMemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts, or replaces the content of the record with the same `(userId, type)`.
    async fn upsert(&self, model: DocumentModel) -> Result<DocumentRecord, AppError>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<DocumentRecord>, AppError>;

    /// All records owned by a user, oldest first.
    async fn fetch_by_user(&self, user_id: &str) -> Result<Vec<DocumentRecord>, AppError>;

    /// Sets the downloaded flag and stamps `at`. Repeated calls refresh the stamp.
    async fn mark_downloaded(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<DocumentRecord>, AppError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Removes downloaded records stamped at or before `cutoff`.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
