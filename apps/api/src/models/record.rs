use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::document::DocumentModel;

/// A persisted document as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub model: DocumentModel,
    pub is_downloaded: bool,
    pub downloaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(id: Uuid, model: DocumentModel, now: DateTime<Utc>) -> Self {
        Self {
            id,
            model,
            is_downloaded: false,
            downloaded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the record has been downloaded and its TTL has elapsed.
    pub fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        self.is_downloaded && self.downloaded_at.is_some_and(|at| at <= cutoff)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: String,
    pub doc_type: String,
    pub data: Json<DocumentModel>,
    pub is_downloaded: bool,
    pub downloaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for DocumentRecord {
    fn from(row: DocumentRow) -> Self {
        let Json(mut model) = row.data;
        // The indexed columns are authoritative for the upsert key.
        model.user_id = row.user_id;
        if let Some(document_type) = crate::models::document::DocumentType::parse(&row.doc_type) {
            model.document_type = document_type;
        }
        Self {
            id: row.id,
            model,
            is_downloaded: row.is_downloaded,
            downloaded_at: row.downloaded_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
