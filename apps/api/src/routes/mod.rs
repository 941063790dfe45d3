pub mod cv;
pub mod export;
pub mod health;
pub mod preview;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;

const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/users/generate-id", post(users::handle_generate_id))
        .route("/api/cv/save", post(cv::handle_save))
        .route("/api/cv/user/:user_id", get(cv::handle_list_for_user))
        .route("/api/cv/:id", get(cv::handle_get).delete(cv::handle_delete))
        .route("/api/cv/:id/downloaded", patch(cv::handle_mark_downloaded))
        .route("/api/cv/:id/edits", post(cv::handle_apply_edits))
        .route("/api/cv/:id/export/:format", get(export::handle_export_saved))
        .route("/api/export/:format", post(export::handle_export_draft))
        .route("/api/preview/:template", post(preview::handle_preview))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::layout::default_page_config;
    use crate::render::{ExportGate, Exporter, Rasterizer};
    use crate::store::InMemoryDocumentStore;

    const BOUNDARY: &str = "cvforge-test-boundary";

    fn app() -> Router {
        build_router(AppState {
            store: Arc::new(InMemoryDocumentStore::new()),
            config: Config::default(),
            exporter: Arc::new(Exporter::new(
                Rasterizer::unavailable(),
                default_page_config(),
                Config::default().max_export_pages,
            )),
            export_gate: ExportGate::default(),
        })
    }

    fn save_request(cv_data: &str, image: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cvData\"\r\n\r\n{cv_data}\r\n"
            )
            .as_bytes(),
        );
        if let Some((content_type, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"profileImage\"; filename=\"photo\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/cv/save")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn cv_data(name: &str) -> String {
        json!({
            "userId": "user_1700000000000_abc123xyz",
            "type": "cv",
            "personalInfo": { "fullName": name, "email": "ada@example.com" },
            "summary": "Mathematician",
            "skills": { "technical": ["Rust"] }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), empty_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_user_id() {
        let (status, body) = send(
            &app(),
            empty_request(Method::POST, "/api/users/generate-id"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["userId"].as_str().unwrap().starts_with("user_"));
    }

    #[tokio::test]
    async fn test_save_twice_updates_one_record() {
        let app = app();
        let (status, first) = send(&app, save_request(&cv_data("Ada"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["message"], "CV saved successfully");
        let (_, second) = send(&app, save_request(&cv_data("Ada Lovelace"), None)).await;
        assert_eq!(first["cvId"], second["cvId"]);
        assert_eq!(second["cv"]["personalInfo"]["fullName"], "Ada Lovelace");

        let (status, list) = send(
            &app,
            empty_request(Method::GET, "/api/cv/user/user_1700000000000_abc123xyz"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_then_fetch_round_trip() {
        let app = app();
        let (_, saved) = send(
            &app,
            save_request(&cv_data("Ada"), Some(("image/png", &b"\x89PNG fake"[..]))),
        )
        .await;
        let id = saved["cvId"].as_str().unwrap();
        let (status, fetched) = send(&app, empty_request(Method::GET, &format!("/api/cv/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["summary"], "Mathematician");
        assert_eq!(fetched["skills"]["technical"], json!(["Rust"]));
        assert_eq!(fetched["isDownloaded"], false);
        assert!(fetched["personalInfo"]["profileImage"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_save_replaces_browser_file_placeholder_with_upload() {
        let app = app();
        let browser_form = json!({
            "userId": "user_1",
            "type": "cv",
            "personalInfo": { "fullName": "Ada", "address": null, "profileImage": {} }
        })
        .to_string();
        let (status, saved) = send(
            &app,
            save_request(&browser_form, Some(("image/png", &b"\x89PNG fake"[..]))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let info = &saved["cv"]["personalInfo"];
        assert_eq!(info["address"], "");
        assert!(info["profileImage"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_save_rejects_bad_input() {
        let app = app();
        let (status, body) = send(&app, save_request(&cv_data("  "), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(&app, save_request("{not json", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "MALFORMED_PAYLOAD");

        let (status, _) = send(
            &app,
            save_request(&cv_data("Ada"), Some(("text/plain", &b"hello"[..]))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let app = app();
        let missing = uuid::Uuid::new_v4();
        for request in [
            empty_request(Method::GET, &format!("/api/cv/{missing}")),
            empty_request(Method::GET, "/api/cv/not-a-uuid"),
            empty_request(Method::PATCH, &format!("/api/cv/{missing}/downloaded")),
            empty_request(Method::DELETE, &format!("/api/cv/{missing}")),
        ] {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_mark_downloaded_twice_and_delete() {
        let app = app();
        let (_, saved) = send(&app, save_request(&cv_data("Ada"), None)).await;
        let id = saved["cvId"].as_str().unwrap().to_string();
        let uri = format!("/api/cv/{id}/downloaded");

        let (status, first) = send(&app, empty_request(Method::PATCH, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["message"], "CV marked as downloaded");
        assert_eq!(first["cv"]["isDownloaded"], true);
        let (status, second) = send(&app, empty_request(Method::PATCH, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cv"]["isDownloaded"], true);
        assert!(second["cv"]["downloadedAt"].is_string());

        let (status, body) = send(&app, empty_request(Method::DELETE, &format!("/api/cv/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "CV deleted successfully");
        let (status, _) = send(&app, empty_request(Method::GET, &format!("/api/cv/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_apply_edits() {
        let app = app();
        let (_, saved) = send(&app, save_request(&cv_data("Ada"), None)).await;
        let id = saved["cvId"].as_str().unwrap().to_string();
        let uri = format!("/api/cv/{id}/edits");

        let edits = json!([
            { "op": "add_item", "section": "experience" },
            { "op": "update_experience", "index": 0, "change": { "field": "company", "value": "Acme" } },
            { "op": "set_skills", "category": "tools", "raw": "Docker, Git\nNix" }
        ]);
        let (status, record) = send(&app, json_request(Method::POST, &uri, edits)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["id"], saved["cvId"]);
        assert_eq!(record["experience"][0]["company"], "Acme");
        assert_eq!(record["skills"]["tools"], json!(["Docker", "Git", "Nix"]));

        let out_of_range = json!([{ "op": "remove_item", "section": "projects", "index": 3 }]);
        let (status, _) = send(&app, json_request(Method::POST, &uri, out_of_range)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_without_surface_is_no_content() {
        let app = app();
        let draft = json!({ "type": "resume", "personalInfo": { "fullName": "Ada" } });
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/export/pdf", draft.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (status, body) = send(&app, json_request(Method::POST, "/api/export/gif", draft)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_overlong_export_is_payload_too_large() {
        let draft = json!({
            "type": "cv",
            "personalInfo": { "fullName": "Ada" },
            "experience": [{ "company": "Acme", "description": "Line\n".repeat(5000) }]
        });
        let (status, body) =
            send(&app(), json_request(Method::POST, "/api/export/png", draft)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_skipped_export_does_not_mark_downloaded() {
        let app = app();
        let (_, saved) = send(&app, save_request(&cv_data("Ada"), None)).await;
        let id = saved["cvId"].as_str().unwrap().to_string();
        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, &format!("/api/cv/{id}/export/png")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let (_, fetched) = send(&app, empty_request(Method::GET, &format!("/api/cv/{id}"))).await;
        assert_eq!(fetched["isDownloaded"], false);
    }

    #[tokio::test]
    async fn test_preview_switches_template() {
        let app = app();
        let draft = json!({
            "type": "cv",
            "personalInfo": { "fullName": "Ada" },
            "summary": "Mathematician"
        });
        let (status, cv) = send(&app, json_request(Method::POST, "/api/preview/cv", draft.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cv["template"], "cv");
        assert_eq!(cv["sections"][0]["kind"], "summary");

        let (status, resume) =
            send(&app, json_request(Method::POST, "/api/preview/resume", draft.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resume["header"]["style"], "centered");
        assert_eq!(resume["sections"], json!([]));

        let (status, _) = send(&app, json_request(Method::POST, "/api/preview/letter", draft)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = send(&app(), empty_request(Method::GET, "/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Route not found");
    }
}
