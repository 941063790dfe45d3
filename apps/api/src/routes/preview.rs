use axum::{extract::Path, Json};

use crate::document::EditorSession;
use crate::errors::AppError;
use crate::layout::{Layout, Template};
use crate::models::DocumentModel;

fn parse_template(raw: &str) -> Result<Template, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "cv" => Ok(Template::Cv),
        "resume" => Ok(Template::Resume),
        _ => Err(AppError::Validation(format!(
            "Unknown template '{raw}'; use cv or resume"
        ))),
    }
}

/// POST /api/preview/:template
/// Renders a draft with the chosen template and returns the layout tree.
pub async fn handle_preview(
    Path(template): Path<String>,
    Json(model): Json<DocumentModel>,
) -> Result<Json<Layout>, AppError> {
    let mut session = EditorSession::from_model(model);
    session.switch_template(parse_template(&template)?);
    Ok(Json(session.preview()))
}
