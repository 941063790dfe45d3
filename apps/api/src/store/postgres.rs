use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DocumentModel, DocumentRecord, DocumentRow};
use crate::store::DocumentStore;

const COLUMNS: &str =
    "id, user_id, doc_type, data, is_downloaded, downloaded_at, created_at, updated_at";

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn upsert(&self, model: DocumentModel) -> Result<DocumentRecord, AppError> {
        let row: DocumentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO documents (id, user_id, doc_type, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, doc_type)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&model.user_id)
        .bind(model.document_type.as_str())
        .bind(Json(&model))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        let row: Option<DocumentRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM documents WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn fetch_by_user(&self, user_id: &str) -> Result<Vec<DocumentRecord>, AppError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM documents WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_downloaded(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<DocumentRecord>, AppError> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            r#"
            UPDATE documents
            SET is_downloaded = TRUE, downloaded_at = $2, updated_at = $2
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM documents WHERE is_downloaded = TRUE AND downloaded_at <= $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
