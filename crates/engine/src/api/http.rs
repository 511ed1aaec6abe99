//! HTTP routes.
//!
//! The host adapter calls these on behalf of a signed-in user; the caller
//! identity travels in the request body.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use misrecall_domain::{
    ActorId, Caller, CreatureRecord, GameEvent, ModuleSettings, NoticeId, NoticeRecord,
    PromptTemplate, TriggerMeta,
};

use crate::app::App;
use crate::infrastructure::ports::{ChatPost, GenerationError, RepoError};
use crate::markdown;
use crate::use_cases::generation::{Generated, OrchestratorError};
use crate::use_cases::notices::{present, ActionExtra, ActionOutcome, NoticeActionError};
use crate::use_cases::settings::{ConnectionTest, SettingsError, SettingsView};
use crate::use_cases::trigger::TriggerOutcome;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/settings/reset", post(reset_settings))
        .route("/api/settings/prompt-preview", get(prompt_preview))
        .route("/api/settings/test-connection", post(test_connection))
        .route("/api/creatures/{id}", put(upsert_creature))
        .route("/api/creatures/{id}/generate", post(generate_for_creature))
        .route("/api/notices/{id}", get(get_notice))
        .route("/api/notices/{id}/actions", post(notice_action))
        .route("/api/posts/drain", post(drain_posts))
        .route("/api/events", post(game_event))
        .route("/api/render", post(render_markdown))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Settings
// =============================================================================

async fn get_settings(State(app): State<Arc<App>>) -> Result<Json<SettingsView>, ApiError> {
    Ok(Json(app.use_cases.settings.view().await?))
}

async fn update_settings(
    State(app): State<Arc<App>>,
    Json(settings): Json<ModuleSettings>,
) -> Result<Json<SettingsView>, ApiError> {
    Ok(Json(app.use_cases.settings.update_global(settings).await?))
}

async fn reset_settings(State(app): State<Arc<App>>) -> Result<Json<SettingsView>, ApiError> {
    Ok(Json(app.use_cases.settings.reset_global().await?))
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    template: Option<String>,
}

#[derive(Debug, Serialize)]
struct PreviewResponse {
    preview: String,
}

async fn prompt_preview(
    State(app): State<Arc<App>>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let preview = app
        .use_cases
        .settings
        .preview(query.template.map(PromptTemplate::new))
        .await?;
    Ok(Json(PreviewResponse { preview }))
}

async fn test_connection(State(app): State<Arc<App>>) -> Result<Json<ConnectionTest>, ApiError> {
    Ok(Json(app.use_cases.settings.test_connection().await?))
}

// =============================================================================
// Creatures
// =============================================================================

async fn upsert_creature(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(record): Json<CreatureRecord>,
) -> Result<StatusCode, ApiError> {
    if record.id.as_str() != id {
        return Err(ApiError::BadRequest(format!(
            "Body id {} does not match path id {}",
            record.id, id
        )));
    }
    app.repositories.creatures.upsert(record).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct CallerRequest {
    caller: Caller,
    /// Return as soon as the loading notice exists; the model call runs on.
    #[serde(default)]
    background: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationStarted {
    notice_id: NoticeId,
    attempt: u64,
}

async fn generate_for_creature(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(req): Json<CallerRequest>,
) -> Result<Response, ApiError> {
    let actor_id = ActorId::new(id);
    let creature = app
        .repositories
        .creatures
        .get(&actor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Creature not found: {actor_id}")))?;

    let orchestrator = app.use_cases.generation.orchestrator.clone();
    if !req.background {
        let generated: Generated = orchestrator
            .generate(&creature, TriggerMeta::manual(), &req.caller)
            .await?;
        return Ok(Json(generated).into_response());
    }

    let pending = orchestrator
        .start(&creature, TriggerMeta::manual(), &req.caller)
        .await?;
    let started = GenerationStarted {
        notice_id: pending.notice_id,
        attempt: pending.attempt,
    };
    tokio::spawn(async move {
        // Failures are already recorded on the notice.
        if let Err(e) = orchestrator.finish(pending).await {
            tracing::warn!(error = %e, "Background generation failed");
        }
    });
    Ok((StatusCode::ACCEPTED, Json(started)).into_response())
}

// =============================================================================
// Notices
// =============================================================================

#[derive(Debug, Serialize)]
struct NoticeView {
    notice: NoticeRecord,
    html: String,
}

async fn get_notice(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoticeView>, ApiError> {
    let notice_id = NoticeId::from_uuid(id);
    let notice = app
        .repositories
        .notices
        .get(notice_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Notice not found: {notice_id}")))?;
    let html = present(&notice);
    Ok(Json(NoticeView { notice, html }))
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: String,
    #[serde(default)]
    extra: ActionExtra,
    caller: Caller,
}

async fn notice_action(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let outcome = app
        .use_cases
        .notices
        .actions
        .handle(NoticeId::from_uuid(id), &req.action, req.extra, &req.caller)
        .await?;
    Ok(Json(outcome))
}

/// Hand undelivered chat posts to the host, oldest first.
async fn drain_posts(State(app): State<Arc<App>>) -> Result<Json<Vec<ChatPost>>, ApiError> {
    Ok(Json(app.repositories.notices.drain_posts().await?))
}

// =============================================================================
// Events and rendering
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRequest {
    event: GameEvent,
    caller: Caller,
    #[serde(default)]
    selected_targets: Vec<ActorId>,
}

async fn game_event(
    State(app): State<Arc<App>>,
    Json(req): Json<EventRequest>,
) -> Result<Json<TriggerOutcome>, ApiError> {
    let outcome = app
        .use_cases
        .trigger
        .auto
        .on_game_event(&req.event, &req.caller, &req.selected_targets)
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct RenderRequest {
    text: String,
    #[serde(default)]
    simple: bool,
}

#[derive(Debug, Serialize)]
struct RenderResponse {
    html: String,
}

async fn render_markdown(Json(req): Json<RenderRequest>) -> Json<RenderResponse> {
    let html = if req.simple {
        markdown::render_simple(&req.text)
    } else {
        markdown::render(&req.text)
    };
    Json(RenderResponse { html })
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Unprocessable(String),
    Unavailable(String),
    Internal(String),
    /// Generation failed after its notice was created; the notice holds the
    /// error too.
    GenerationFailed {
        notice_id: NoticeId,
        status: StatusCode,
        message: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice_id: Option<NoticeId>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::GenerationFailed {
            notice_id,
            status,
            message,
        } = self
        {
            let body = ErrorBody {
                error: message,
                notice_id: Some(notice_id),
            };
            return (status, Json(body)).into_response();
        }

        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
            ApiError::GenerationFailed { status, message, .. } => (status, message),
        };
        let body = ErrorBody {
            error: message,
            notice_id: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::Repo(e) => e.into(),
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::NotACreature(_) => ApiError::Unprocessable(e.to_string()),
            OrchestratorError::NotPrivileged => ApiError::Forbidden(e.to_string()),
            OrchestratorError::NotConfigured => ApiError::Unavailable(e.to_string()),
            OrchestratorError::NoticeNotFound(_) | OrchestratorError::CreatureNotFound(_) => {
                ApiError::NotFound(e.to_string())
            }
            OrchestratorError::Generation { notice_id, source } => {
                let status = match source {
                    GenerationError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::BAD_GATEWAY,
                };
                ApiError::GenerationFailed {
                    notice_id,
                    status,
                    message: source.to_string(),
                }
            }
            OrchestratorError::Unrecorded { .. } => ApiError::Internal(e.to_string()),
            OrchestratorError::Repo(e) => e.into(),
        }
    }
}

impl From<NoticeActionError> for ApiError {
    fn from(e: NoticeActionError) -> Self {
        match e {
            NoticeActionError::UnknownAction(_) | NoticeActionError::MissingRecipient => {
                ApiError::BadRequest(e.to_string())
            }
            NoticeActionError::NotPrivileged => ApiError::Forbidden(e.to_string()),
            NoticeActionError::NoticeNotFound(_) => ApiError::NotFound(e.to_string()),
            NoticeActionError::Unavailable { .. } => ApiError::Unprocessable(e.to_string()),
            NoticeActionError::Generation(e) => e.into(),
            NoticeActionError::Repo(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::ports::{LlmPort, LlmRequest, MockLlmPort, MockSettingsRepo};
    use crate::stores::{InMemoryCreatureDirectory, InMemoryNoticeLog};
    use axum::body::{to_bytes, Body};
    use async_trait::async_trait;
    use axum::http::{Method, Request};
    use misrecall_domain::EndpointConfig;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    fn app(llm: MockLlmPort) -> Router {
        app_with(Arc::new(llm))
    }

    fn app_with(llm: Arc<dyn LlmPort>) -> Router {
        let mut repo = MockSettingsRepo::new();
        repo.expect_get_global().returning(|| Ok(None));
        repo.expect_save_global().returning(|_| Ok(()));
        let app = App::with_ports(
            llm,
            Arc::new(repo),
            Arc::new(InMemoryNoticeLog::new()),
            Arc::new(InMemoryCreatureDirectory::new()),
            Arc::new(SystemClock::new()),
            ModuleSettings::default(),
        );
        routes().with_state(Arc::new(app))
    }

    /// Answers only once the gate is opened.
    struct GatedLlm {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl LlmPort for GatedLlm {
        async fn complete(
            &self,
            _config: &EndpointConfig,
            _request: LlmRequest,
        ) -> Result<String, GenerationError> {
            self.gate.notified().await;
            Ok("- Ghouls are afraid of moths.".to_string())
        }
    }

    fn replying(text: &'static str) -> MockLlmPort {
        let mut llm = MockLlmPort::new();
        llm.expect_complete()
            .returning(move |_, _| Ok(text.to_string()));
        llm
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request");

        let response = router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn gm() -> Value {
        json!({"id": "gm", "name": "Gamemaster", "role": "gamemaster"})
    }

    async fn put_ghoul(router: &Router) {
        let (status, _) = send(
            router,
            Method::PUT,
            "/api/creatures/ghoul",
            Some(json!({"id": "ghoul", "type": "npc", "name": "Ghoul", "level": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let router = app(MockLlmPort::new());
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .expect("request");
        let response = router.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn settings_are_returned_with_masked_key() {
        let router = app(MockLlmPort::new());

        let (status, body) = send(
            &router,
            Method::PUT,
            "/api/settings",
            Some(json!({"apiKey": "sk-secret", "promptTemplate": "Lie about {{name}} {{bogus}}"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["settings"]["apiKey"], "sk-secret");
        assert_eq!(body["unknownPlaceholders"], json!(["bogus"]));
    }

    #[tokio::test]
    async fn manual_generation_creates_a_notice() {
        let router = app(replying("- Ghouls fear salt."));
        put_ghoul(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/creatures/ghoul/generate",
            Some(json!({"caller": gm()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "- Ghouls fear salt.");

        let notice_id = body["noticeId"].as_str().expect("notice id").to_string();
        let (status, body) = send(&router, Method::GET, &format!("/api/notices/{notice_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"]["state"], "content");
        assert!(body["html"]
            .as_str()
            .expect("html")
            .contains("<li>Ghouls fear salt.</li>"));
    }

    #[tokio::test]
    async fn players_are_forbidden_from_generating() {
        let router = app(MockLlmPort::new());
        put_ghoul(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/creatures/ghoul/generate",
            Some(json!({"caller": {"id": "p1", "role": "player"}})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_bad_gateway() {
        let mut llm = MockLlmPort::new();
        llm.expect_complete()
            .returning(|_, _| Err(GenerationError::upstream(429, "Rate limited")));
        let router = app(llm);
        put_ghoul(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/creatures/ghoul/generate",
            Some(json!({"caller": gm()})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "API error: Rate limited");

        let notice_id = body["noticeId"].as_str().expect("notice id").to_string();
        let (status, body) = send(&router, Method::GET, &format!("/api/notices/{notice_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"]["state"], "error");
        assert!(body["html"]
            .as_str()
            .expect("html")
            .contains("Rate limited"));
    }

    #[tokio::test]
    async fn background_generation_shows_loading_notice_first() {
        let gate = Arc::new(Notify::new());
        let router = app_with(Arc::new(GatedLlm { gate: gate.clone() }));
        put_ghoul(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/creatures/ghoul/generate",
            Some(json!({"caller": gm(), "background": true})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["attempt"], 1);
        let uri = format!("/api/notices/{}", body["noticeId"].as_str().expect("notice id"));

        let (_, body) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(body["notice"]["state"], "loading");
        assert!(body["html"]
            .as_str()
            .expect("html")
            .contains(r#"data-action="copy" disabled"#));

        gate.notify_one();
        let mut state = Value::Null;
        for _ in 0..100 {
            let (_, body) = send(&router, Method::GET, &uri, None).await;
            state = body["notice"]["state"].clone();
            if state == "content" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(state, "content");
    }

    #[tokio::test]
    async fn shared_posts_carry_content_and_can_be_drained() {
        let router = app(replying("Ghouls **love** sunlight."));
        put_ghoul(&router).await;
        let (_, body) = send(
            &router,
            Method::POST,
            "/api/creatures/ghoul/generate",
            Some(json!({"caller": gm()})),
        )
        .await;
        let actions = format!(
            "/api/notices/{}/actions",
            body["noticeId"].as_str().expect("notice id")
        );

        let (status, body) = send(
            &router,
            Method::POST,
            &actions,
            Some(json!({"action": "share-all", "caller": gm()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["post"]["speaker"], "Ghoul");
        assert_eq!(body["post"]["audience"]["type"], "everyone");
        assert!(body["post"]["contentHtml"]
            .as_str()
            .expect("content")
            .contains("<strong>love</strong>"));

        let (status, body) = send(
            &router,
            Method::POST,
            &actions,
            Some(json!({"action": "share-player", "extra": {"recipient": "p1"}, "caller": gm()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipient"], "p1");
        assert_eq!(body["post"]["audience"], json!({"type": "whisper", "userId": "p1"}));

        let (status, body) = send(&router, Method::POST, "/api/posts/drain", None).await;
        assert_eq!(status, StatusCode::OK);
        let posts = body.as_array().expect("posts");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["audience"]["type"], "everyone");

        let (_, body) = send(&router, Method::POST, "/api/posts/drain", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn unknown_notice_is_not_found() {
        let router = app(MockLlmPort::new());
        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/api/notices/{}/actions", Uuid::new_v4()),
            Some(json!({"action": "copy", "caller": gm()})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn copy_action_returns_text() {
        let router = app(replying("Ghouls are vegetarian."));
        put_ghoul(&router).await;
        let (_, body) = send(
            &router,
            Method::POST,
            "/api/creatures/ghoul/generate",
            Some(json!({"caller": gm()})),
        )
        .await;
        let notice_id = body["noticeId"].as_str().expect("notice id").to_string();

        let (status, body) = send(
            &router,
            Method::POST,
            &format!("/api/notices/{notice_id}/actions"),
            Some(json!({"action": "copy", "caller": gm()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"action": "copy", "text": "Ghouls are vegetarian."}));
    }

    #[tokio::test]
    async fn unrelated_event_is_skipped() {
        let router = app(MockLlmPort::new());
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/events",
            Some(json!({"event": {"content": "hello"}, "caller": gm()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"outcome": "skipped", "reason": "not-recall-knowledge"}));
    }

    #[tokio::test]
    async fn render_returns_html() {
        let router = app(MockLlmPort::new());
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/render",
            Some(json!({"text": "**bold**"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["html"]
            .as_str()
            .expect("html")
            .contains("<strong>bold</strong>"));
    }

    #[tokio::test]
    async fn mismatched_creature_id_is_rejected() {
        let router = app(MockLlmPort::new());
        let (status, _) = send(
            &router,
            Method::PUT,
            "/api/creatures/ghoul",
            Some(json!({"id": "wight", "type": "npc", "name": "Wight"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
