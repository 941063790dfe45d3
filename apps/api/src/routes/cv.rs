use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::document::{DocumentEdit, EditorSession};
use crate::errors::AppError;
use crate::models::{DocumentModel, DocumentRecord};
use crate::state::AppState;
use crate::store::gateway::{self, ProfileImageUpload};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub message: &'static str,
    pub cv_id: Uuid,
    pub cv: DocumentRecord,
}

#[derive(Debug, Serialize)]
pub struct DownloadedResponse {
    pub message: &'static str,
    pub cv: DocumentRecord,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Ids that are not UUIDs cannot name a stored record.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Document {raw} not found")))
}

/// Reads the `cvData` JSON part and the optional `profileImage` file part.
async fn read_save_form(
    mut multipart: Multipart,
) -> Result<(DocumentModel, Option<ProfileImageUpload>), AppError> {
    let mut model = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedPayload(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("cvData") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::MalformedPayload(format!("Unreadable cvData: {e}")))?;
                let parsed: DocumentModel = serde_json::from_str(&text)
                    .map_err(|e| AppError::MalformedPayload(format!("cvData is not valid JSON: {e}")))?;
                model = Some(parsed);
            }
            Some("profileImage") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::MalformedPayload(format!("Unreadable profileImage: {e}"))
                })?;
                if !bytes.is_empty() {
                    image = Some(ProfileImageUpload {
                        content_type,
                        bytes,
                    });
                }
            }
            other => debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }

    let model =
        model.ok_or_else(|| AppError::MalformedPayload("cvData field is required".to_string()))?;
    Ok((model, image))
}

/// POST /api/cv/save
pub async fn handle_save(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SaveResponse>, AppError> {
    let (model, image) = read_save_form(multipart).await?;
    let mut session = EditorSession::from_model(model);
    if let Some(upload) = image {
        session.attach_image(upload);
    }
    let request = session.prepare_save()?;
    let record = gateway::save(
        state.store.as_ref(),
        request.model,
        request.image,
        state.config.max_image_bytes,
    )
    .await?;
    Ok(Json(SaveResponse {
        message: "CV saved successfully",
        cv_id: record.id,
        cv: record,
    }))
}

/// GET /api/cv/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, AppError> {
    let record = gateway::fetch(state.store.as_ref(), parse_id(&id)?).await?;
    Ok(Json(record))
}

/// GET /api/cv/user/:user_id
pub async fn handle_list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<DocumentRecord>>, AppError> {
    let records = state.store.fetch_by_user(&user_id).await?;
    Ok(Json(records))
}

/// PATCH /api/cv/:id/downloaded
pub async fn handle_mark_downloaded(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DownloadedResponse>, AppError> {
    let record = gateway::mark_downloaded(state.store.as_ref(), parse_id(&id)?).await?;
    Ok(Json(DownloadedResponse {
        message: "CV marked as downloaded",
        cv: record,
    }))
}

/// DELETE /api/cv/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    gateway::delete(state.store.as_ref(), parse_id(&id)?).await?;
    Ok(Json(MessageResponse {
        message: "CV deleted successfully",
    }))
}

/// POST /api/cv/:id/edits
/// Applies a batch of edits to a stored document and saves the result.
pub async fn handle_apply_edits(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(edits): Json<Vec<DocumentEdit>>,
) -> Result<Json<DocumentRecord>, AppError> {
    let record = gateway::fetch(state.store.as_ref(), parse_id(&id)?).await?;
    let mut session = EditorSession::from_model(record.model);
    for edit in edits {
        session.apply(edit)?;
    }
    let request = session.prepare_save()?;
    let record = gateway::save(
        state.store.as_ref(),
        request.model,
        request.image,
        state.config.max_image_bytes,
    )
    .await?;
    Ok(Json(record))
}
