use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DocumentModel, DocumentRecord};
use crate::store::DocumentStore;

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<HashMap<Uuid, DocumentRecord>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(&self, model: DocumentModel) -> Result<DocumentRecord, AppError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let existing = records.values_mut().find(|r| {
            r.model.user_id == model.user_id && r.model.document_type == model.document_type
        });
        if let Some(record) = existing {
            record.model = model;
            record.updated_at = now;
            return Ok(record.clone());
        }
        let record = DocumentRecord::new(Uuid::new_v4(), model, now);
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn fetch_by_user(&self, user_id: &str) -> Result<Vec<DocumentRecord>, AppError> {
        let mut found: Vec<DocumentRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.model.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }

    async fn mark_downloaded(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<DocumentRecord>, AppError> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|record| {
            record.is_downloaded = true;
            record.downloaded_at = Some(at);
            record.updated_at = at;
            record.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired(cutoff));
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use chrono::Duration;

    fn model(user: &str, doc_type: DocumentType, name: &str) -> DocumentModel {
        let mut m = DocumentModel::empty(user, doc_type);
        m.personal_info.full_name = name.to_string();
        m
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_user_and_type() {
        let store = InMemoryDocumentStore::new();
        let first = store.upsert(model("u1", DocumentType::Cv, "Ada")).await.unwrap();
        let second = store.upsert(model("u1", DocumentType::Cv, "Ada L.")).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.model.personal_info.full_name, "Ada L.");
        assert_eq!(store.fetch_by_user("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_types_are_stored_separately() {
        let store = InMemoryDocumentStore::new();
        let cv = store.upsert(model("u1", DocumentType::Cv, "Ada")).await.unwrap();
        let resume = store.upsert(model("u1", DocumentType::Resume, "Ada")).await.unwrap();
        assert_ne!(cv.id, resume.id);
        store.upsert(model("u2", DocumentType::Cv, "Bob")).await.unwrap();
        assert_eq!(store.fetch_by_user("u1").await.unwrap().len(), 2);
        assert!(store.fetch_by_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_downloaded_refreshes_stamp() {
        let store = InMemoryDocumentStore::new();
        let record = store.upsert(model("u1", DocumentType::Cv, "Ada")).await.unwrap();
        let t1 = Utc::now();
        let t2 = t1 + Duration::minutes(5);
        let first = store.mark_downloaded(record.id, t1).await.unwrap().unwrap();
        let second = store.mark_downloaded(record.id, t2).await.unwrap().unwrap();
        assert!(first.is_downloaded && second.is_downloaded);
        assert_eq!(second.downloaded_at, Some(t2));
        assert!(store
            .mark_downloaded(Uuid::new_v4(), t1)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_purge_only_removes_expired_downloads() {
        let store = InMemoryDocumentStore::new();
        let old = store.upsert(model("u1", DocumentType::Cv, "Ada")).await.unwrap();
        let fresh = store.upsert(model("u1", DocumentType::Resume, "Ada")).await.unwrap();
        let untouched = store.upsert(model("u2", DocumentType::Cv, "Bob")).await.unwrap();
        let now = Utc::now();
        store.mark_downloaded(old.id, now - Duration::hours(30)).await.unwrap();
        store.mark_downloaded(fresh.id, now).await.unwrap();

        let removed = store.purge_expired(now - Duration::hours(24)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.fetch_by_id(old.id).await.unwrap().is_none());
        assert!(store.fetch_by_id(fresh.id).await.unwrap().is_some());
        assert!(store.fetch_by_id(untouched.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = InMemoryDocumentStore::new();
        let record = store.upsert(model("u1", DocumentType::Cv, "Ada")).await.unwrap();
        assert!(store.delete(record.id).await.unwrap());
        assert!(!store.delete(record.id).await.unwrap());
    }
}
