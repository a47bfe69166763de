pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route(
            "/api/v1/documents/generate/cover-letter",
            post(generation::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/documents/generate/cv",
            post(generation::handle_generate_cv),
        )
        .route(
            "/api/v1/documents/generate/pitch-deck",
            post(generation::handle_generate_pitch_deck),
        )
        .route(
            "/api/v1/documents/generate/application-file",
            post(generation::handle_generate_application_file),
        )
        // Document API
        .route("/api/v1/documents/history", get(documents::handle_history))
        .route(
            "/api/v1/documents/:id/download",
            get(documents::handle_download),
        )
        .route("/api/v1/documents/:id", delete(documents::handle_delete))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::testing::{app_state, fixture_profile, ScriptedSynthesizer, FIXTURE_OPPORTUNITY_ID};

    fn app(synth: ScriptedSynthesizer) -> Router {
        let (state, _, _) = app_state(Arc::new(synth));
        build_router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn cover_letter_body(format: &str) -> Value {
        json!({
            "user_id": fixture_profile().user_id,
            "opportunity_id": FIXTURE_OPPORTUNITY_ID,
            "company_name": "Acme",
            "position_title": "Lead",
            "format": format,
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(ScriptedSynthesizer::replying("x"));
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["service"], "dossier");
    }

    #[tokio::test]
    async fn test_generate_then_download_history_delete() {
        let app = app(ScriptedSynthesizer::replying("Madame, Monsieur,\n\nJe postule."));
        let owner = fixture_profile().user_id;

        let (status, body) = send(
            &app,
            post_json("/api/v1/documents/generate/cover-letter", cover_letter_body("pdf")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(created["document"]["kind"], "cover_letter");
        assert_eq!(created["document"]["format"], "pdf");
        assert!(created["document"].get("storage_key").is_none());
        let id = created["document"]["id"].as_str().unwrap().to_string();
        let download_url = created["download_url"].as_str().unwrap().to_string();

        let response = app.clone().oneshot(get(&download_url)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"cover_letter_"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let (status, body) = send(
            &app,
            get(&format!("/api/v1/documents/history?user_id={owner}&kind=cover_letter")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let history: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(history["total"], 1);

        let stranger = Uuid::new_v4();
        let (status, body) = send(
            &app,
            get(&format!("/api/v1/documents/history?user_id={stranger}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let history: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(history["total"], 0);

        let (status, _) = send(
            &app,
            get(&format!("/api/v1/documents/{id}/download?user_id={stranger}")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let delete = |user: Uuid| {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/documents/{id}?user_id={user}"))
                .body(Body::empty())
                .unwrap()
        };
        let (status, _) = send(&app, delete(stranger)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, delete(owner)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, delete(owner)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_format_is_415() {
        let app = app(ScriptedSynthesizer::replying("x"));
        let (status, body) = send(
            &app,
            post_json("/api/v1/documents/generate/cover-letter", cover_letter_body("pptx")),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_too_few_key_points_is_422() {
        let app = app(ScriptedSynthesizer::replying("x"));
        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/documents/generate/pitch-deck",
                json!({
                    "user_id": fixture_profile().user_id,
                    "project_name": "AgriSense",
                    "project_description": "Soil sensors",
                    "target_audience": "Investors",
                    "key_points": ["a", "b"],
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_synthesis_outage_is_503() {
        let app = app(ScriptedSynthesizer::failing_on_call(1));
        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/documents/generate/cv",
                json!({ "user_id": fixture_profile().user_id, "sector": "Agritech" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "SYNTHESIS_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_bundle_failure_is_502() {
        let app = app(ScriptedSynthesizer::failing_on_call(2));
        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/documents/generate/application-file",
                json!({
                    "user_id": fixture_profile().user_id,
                    "opportunity_id": FIXTURE_OPPORTUNITY_ID,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BUNDLE_GENERATION_FAILED");
    }

    #[tokio::test]
    async fn test_unknown_opportunity_is_422() {
        let app = app(ScriptedSynthesizer::replying("x"));
        let mut body = cover_letter_body("pdf");
        body["opportunity_id"] = json!(Uuid::new_v4());
        let (status, body) = send(
            &app,
            post_json("/api/v1/documents/generate/cover-letter", body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}
