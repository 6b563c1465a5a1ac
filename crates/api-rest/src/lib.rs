//! # API REST
//!
//! REST API implementation for LLaMAid.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

use axum::{extract::State, http::StatusCode, response::Json, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{convert, pb, HealthService};
use llamaid_assistant::Assistant;
use llamaid_core::TextEngine;
use llamaid_types::PromptText;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TextEngine>,
    pub assistant: Arc<dyn Assistant>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, annotate, classify, export_sbar, ask),
    components(schemas(
        pb::HealthRes,
        pb::AnnotateReq,
        pb::AnnotateRes,
        pb::AnnotatedLine,
        pb::Segment,
        pb::ClassifyReq,
        pb::ClassifyRes,
        pb::CaseSummary,
        pb::ExportSbarRes,
        pb::AskReq,
        pb::AskRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
///
/// The browser front end is served from a different origin, so every origin is allowed.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/annotate", post(annotate))
        .route("/classify", post(classify))
        .route("/sbar/export", post(export_sbar))
        .route("/ask", post(ask))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<pb::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/annotate",
    request_body = pb::AnnotateReq,
    responses(
        (status = 200, description = "Response text split into tagged segments per line", body = pb::AnnotateRes)
    )
)]
/// Tag urgency keywords in an assistant response
///
/// Every line of `text` becomes a list of segments. Segment texts concatenate back to the line;
/// `category` is empty for plain runs and `critical`, `caution` or `action` for tagged ones.
#[axum::debug_handler]
async fn annotate(
    State(state): State<AppState>,
    Json(req): Json<pb::AnnotateReq>,
) -> Json<pb::AnnotateRes> {
    let lines = state.engine.annotate(&req.text);
    Json(convert::annotate_res(&lines))
}

#[utoipa::path(
    post,
    path = "/classify",
    request_body = pb::ClassifyReq,
    responses(
        (status = 200, description = "Scenario and SBAR case summary", body = pb::ClassifyRes)
    )
)]
/// Classify an assistant response and structure it as an SBAR case summary
#[axum::debug_handler]
async fn classify(
    State(state): State<AppState>,
    Json(req): Json<pb::ClassifyReq>,
) -> Json<pb::ClassifyRes> {
    let (scenario, summary) = state.engine.classify(&req.text);
    Json(convert::classify_res(scenario, summary))
}

#[utoipa::path(
    post,
    path = "/sbar/export",
    request_body = pb::ClassifyReq,
    responses(
        (status = 200, description = "Plain-text SBAR export block", body = pb::ExportSbarRes)
    )
)]
/// Classify an assistant response and render the clipboard export block
#[axum::debug_handler]
async fn export_sbar(
    State(state): State<AppState>,
    Json(req): Json<pb::ClassifyReq>,
) -> Json<pb::ExportSbarRes> {
    Json(pb::ExportSbarRes {
        text: state.engine.export_summary(&req.text),
    })
}

#[utoipa::path(
    post,
    path = "/ask",
    request_body = pb::AskReq,
    responses(
        (status = 200, description = "Assistant response", body = pb::AskRes),
        (status = 400, description = "Blank prompt"),
        (status = 502, description = "Upstream assistant unavailable")
    )
)]
/// Forward a crew query to the upstream assistant
///
/// # Returns
/// * `Ok(Json<pb::AskRes>)` - The assistant's free-text answer
/// * `Err((StatusCode, &str))` - Bad request for a blank prompt, bad gateway if the upstream
///   call fails
#[axum::debug_handler]
async fn ask(
    State(state): State<AppState>,
    Json(req): Json<pb::AskReq>,
) -> Result<Json<pb::AskRes>, (StatusCode, &'static str)> {
    let prompt = PromptText::new(&req.prompt)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Prompt cannot be empty"))?;

    match state.assistant.ask(&prompt).await {
        Ok(response) => Ok(Json(pb::AskRes { response })),
        Err(e) => {
            tracing::error!("Ask error: {:?}", e);
            Err((StatusCode::BAD_GATEWAY, "Upstream assistant unavailable"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use llamaid_assistant::AssistantError;
    use tower::ServiceExt;

    struct Scripted(Option<&'static str>);

    #[async_trait::async_trait]
    impl Assistant for Scripted {
        async fn ask(&self, _prompt: &PromptText) -> Result<String, AssistantError> {
            self.0.map(str::to_owned).ok_or(AssistantError::EmptyResponse)
        }
    }

    fn app(reply: Option<&'static str>) -> Router {
        router(AppState {
            engine: Arc::new(TextEngine::default()),
            assistant: Arc::new(Scripted(reply)),
        })
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app(None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn annotate_returns_segments() {
        let (status, body) = post_json(
            app(None),
            "/annotate",
            serde_json::json!({"text": "Patient has cardiac symptoms, monitor vitals."}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: pb::AnnotateRes = serde_json::from_slice(&body).unwrap();
        let segments = &res.lines[0].segments;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].text, "monitor");
        assert_eq!(segments[1].category, "caution");
    }

    #[tokio::test]
    async fn classify_drug_interaction() {
        let (status, body) = post_json(
            app(None),
            "/classify",
            serde_json::json!({"text": "Caution: epinephrine and beta blocker together may cause issues."}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: pb::ClassifyRes = serde_json::from_slice(&body).unwrap();
        assert_eq!(res.scenario, "drug_interaction");
        assert!(res
            .summary
            .unwrap()
            .recommendation
            .starts_with("Consider reduced initial doses of epinephrine"));
    }

    #[tokio::test]
    async fn export_returns_plain_text_block() {
        let (status, body) = post_json(
            app(None),
            "/sbar/export",
            serde_json::json!({"text": "Perform CPR for infant.\nCheck airway.\nBegin compressions."}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: pb::ExportSbarRes = serde_json::from_slice(&body).unwrap();
        assert!(res
            .text
            .ends_with("RECOMMENDATION:\nCheck airway.\nBegin compressions."));
    }

    #[tokio::test]
    async fn ask_returns_assistant_text() {
        let (status, body) = post_json(
            app(Some("Check airway.")),
            "/ask",
            serde_json::json!({"prompt": "CPR steps for infant"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: pb::AskRes = serde_json::from_slice(&body).unwrap();
        assert_eq!(res.response, "Check airway.");
    }

    #[tokio::test]
    async fn ask_rejects_blank_prompt() {
        let (status, _) =
            post_json(app(Some("unused")), "/ask", serde_json::json!({"prompt": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ask_upstream_failure_is_bad_gateway() {
        let (status, body) =
            post_json(app(None), "/ask", serde_json::json!({"prompt": "Chest pain"})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, b"Upstream assistant unavailable");
    }
}
