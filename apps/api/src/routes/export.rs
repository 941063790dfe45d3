use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::layout::Template;
use crate::models::DocumentModel;
use crate::render::{ExportFormat, ExportedFile};
use crate::routes::cv::parse_id;
use crate::state::AppState;
use crate::store::gateway;

fn parse_format(raw: &str) -> Result<ExportFormat, AppError> {
    ExportFormat::parse(raw).ok_or_else(|| {
        AppError::Validation(format!("Unsupported export format '{raw}'; use pdf, png or jpg"))
    })
}

/// Runs one export behind the gate on the blocking pool.
async fn run_export(
    state: &AppState,
    model: DocumentModel,
    format: ExportFormat,
) -> Result<Option<ExportedFile>, AppError> {
    let exporter = state.exporter.clone();
    let template = Template::from(model.document_type);
    state
        .export_gate
        .run(move || exporter.export(&model, template, format))
        .await
}

fn file_response(file: Option<ExportedFile>) -> Response {
    match file {
        Some(file) => {
            info!(file_name = %file.file_name, bytes = file.bytes.len(), "Export ready");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, file.content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file.file_name),
                    ),
                ],
                Body::from(file.bytes),
            )
                .into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// POST /api/export/:format
/// Exports an unsaved draft sent as the request body.
pub async fn handle_export_draft(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(model): Json<DocumentModel>,
) -> Result<Response, AppError> {
    let format = parse_format(&format)?;
    let file = run_export(&state, model, format).await?;
    Ok(file_response(file))
}

/// GET /api/cv/:id/export/:format
/// Exports a stored document and marks it as downloaded.
pub async fn handle_export_saved(
    State(state): State<AppState>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let format = parse_format(&format)?;
    let id = parse_id(&id)?;
    let record = gateway::fetch(state.store.as_ref(), id).await?;
    let file = run_export(&state, record.model, format).await?;
    if file.is_some() {
        gateway::mark_downloaded(state.store.as_ref(), id).await?;
    }
    Ok(file_response(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::render::export_file_name;

    fn pdf_named(name: &str) -> ExportedFile {
        let mut model = DocumentModel::empty("user_1", DocumentType::Cv);
        model.personal_info.full_name = name.to_string();
        ExportedFile {
            bytes: b"%PDF-1.7".to_vec(),
            content_type: ExportFormat::Pdf.content_type(),
            file_name: export_file_name(&model, ExportFormat::Pdf),
        }
    }

    fn disposition(response: &Response) -> &str {
        response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap()
    }

    #[test]
    fn test_newline_in_name_still_yields_attachment() {
        let response = file_response(Some(pdf_named("Ada\nLovelace")));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            disposition(&response),
            "attachment; filename=\"cv-Ada Lovelace.pdf\""
        );
    }

    #[test]
    fn test_quotes_in_name_keep_header_well_formed() {
        let response = file_response(Some(pdf_named("Ada \"The\" Count")));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            disposition(&response),
            "attachment; filename=\"cv-Ada 'The' Count.pdf\""
        );
    }

    #[test]
    fn test_missing_file_is_no_content() {
        assert_eq!(file_response(None).status(), StatusCode::NO_CONTENT);
    }
}
