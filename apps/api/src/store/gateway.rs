//! Save and download rules layered over a `DocumentStore`.
//!
//! Validation happens here rather than in the store so every backend enforces
//! the same rules: a save needs a user id and a non-blank full name, and an
//! attached photo must be an image within the size limit. Accepted photos are
//! inlined into the document as a base64 `data:` URI.

use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DocumentModel, DocumentRecord};
use crate::store::DocumentStore;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileImageUpload {
    pub content_type: String,
    pub bytes: Bytes,
}

pub fn validate_for_save(model: &DocumentModel) -> Result<(), AppError> {
    if model.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    if model.personal_info.full_name.trim().is_empty() {
        return Err(AppError::Validation(
            "personalInfo.fullName is required".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_image(upload: &ProfileImageUpload, max_bytes: usize) -> Result<(), AppError> {
    if !upload.content_type.starts_with("image/") {
        return Err(AppError::Validation(format!(
            "profileImage must be an image, got '{}'",
            upload.content_type
        )));
    }
    if upload.bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "profileImage is {} bytes; the limit is {max_bytes}",
            upload.bytes.len()
        )));
    }
    Ok(())
}

pub fn encode_data_uri(upload: &ProfileImageUpload) -> String {
    format!(
        "data:{};base64,{}",
        upload.content_type,
        base64::engine::general_purpose::STANDARD.encode(&upload.bytes)
    )
}

/// Validates and upserts the document, replacing the stored photo when one is attached.
pub async fn save(
    store: &dyn DocumentStore,
    mut model: DocumentModel,
    image: Option<ProfileImageUpload>,
    max_image_bytes: usize,
) -> Result<DocumentRecord, AppError> {
    validate_for_save(&model)?;
    if let Some(upload) = &image {
        validate_image(upload, max_image_bytes)?;
        model.personal_info.profile_image = Some(encode_data_uri(upload));
    }
    let record = store.upsert(model).await?;
    info!(
        id = %record.id,
        user_id = %record.model.user_id,
        doc_type = record.model.document_type.as_str(),
        "Document saved"
    );
    Ok(record)
}

pub async fn fetch(store: &dyn DocumentStore, id: Uuid) -> Result<DocumentRecord, AppError> {
    store
        .fetch_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))
}

/// Idempotent; a repeated call refreshes `downloadedAt`.
pub async fn mark_downloaded(
    store: &dyn DocumentStore,
    id: Uuid,
) -> Result<DocumentRecord, AppError> {
    let record = store
        .mark_downloaded(id, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;
    info!(id = %record.id, "Document marked as downloaded");
    Ok(record)
}

pub async fn delete(store: &dyn DocumentStore, id: Uuid) -> Result<(), AppError> {
    if store.delete(id).await? {
        info!(id = %id, "Document deleted");
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Document {id} not found")))
    }
}
