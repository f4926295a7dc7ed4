//! HTTP transport (contract v1.0.0): `POST /generate`, `GET /version`,
//! `GET /health`.
//!
//! The transport is a thin shell over the runtime.  It validates the request
//! envelope, maps the optional `x-session-id` header onto the session
//! registry, and translates the runtime's single error into the public 500
//! envelope.  Nothing nondeterministic is ever added to a response body.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use desi_config::{AppConfig, EngineConfig};
use desi_contract::Language;
use desi_runtime::VoiceRuntime;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<VoiceRuntime>,
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub emotional_lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionBody {
    engine_name: String,
    engine_version: String,
    release_stage: String,
}

const MAX_PROMPT_CHARS: usize = 10_000;

/// Validate the request envelope: prompt 1..10000 chars, not
/// whitespace-only; `emotional_lang` restricted to the public `en`/`hi`
/// set.  `None` means the field was omitted and intent-detected language
/// routing applies.
pub fn validate_request(
    request: &GenerateRequest,
) -> Result<(String, Option<Language>), String> {
    let prompt = match &request.prompt {
        Some(prompt) => prompt.clone(),
        None => return Err("prompt is required".to_string()),
    };
    if prompt.trim().is_empty() {
        return Err("prompt must not be empty".to_string());
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(format!("prompt exceeds {MAX_PROMPT_CHARS} characters"));
    }

    let language = match request.emotional_lang.as_deref() {
        None => None,
        Some("en") => Some(Language::En),
        Some("hi") => Some(Language::Hi),
        Some(other) => {
            return Err(format!("emotional_lang {other:?} is not supported"));
        }
    };

    Ok((prompt, language))
}

fn invalid_input(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message,
            code: "INVALID_INPUT",
        }),
    )
        .into_response()
}

fn inference_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Inference failed.".to_string(),
            code: "INFERENCE_FAILED",
        }),
    )
        .into_response()
}

async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<GenerateRequest>>,
) -> Response {
    let Some(Json(request)) = body else {
        return invalid_input("request body must be a JSON object".to_string());
    };
    let (prompt, language) = match validate_request(&request) {
        Ok(validated) => validated,
        Err(message) => return invalid_input(message),
    };

    // Session identity rides an optional header; without one the turn runs
    // in a throwaway session that is destroyed immediately afterwards.
    let header_session = headers
        .get("x-session-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let (session_id, ephemeral) = match header_session {
        Some(id) if !id.trim().is_empty() => (id, false),
        _ => (Uuid::new_v4().to_string(), true),
    };

    let result = state
        .runtime
        .handle_turn(&session_id, &prompt, language)
        .await;
    if ephemeral {
        state.runtime.end_session(&session_id).await;
    }

    match result {
        Ok(output) => (StatusCode::OK, Json(output)).into_response(),
        Err(_) => inference_failed(),
    }
}

async fn version(State(state): State<AppState>) -> Json<VersionBody> {
    Json(VersionBody {
        engine_name: state.engine.name.clone(),
        engine_version: state.engine.version.clone(),
        release_stage: state.engine.release_stage.clone(),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/version", get(version))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &AppConfig, runtime: Arc<VoiceRuntime>) -> anyhow::Result<()> {
    let state = AppState {
        runtime,
        engine: config.engine.clone(),
    };
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
