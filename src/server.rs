//! HTTP front door for the DispatchManager
//!
//! Serves:
//! - `POST /generate` - JSON `{prompt, provider, model?, temperature?, top_p?, max_tokens?}`,
//!   answers `{provider, response}` or `{error}` with a status from
//!   [`LlmError::status_code`]
//! - `GET /health` - Returns "OK" for health checks
//!
//! Requires the `server` feature.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::errors::{LlmError, LlmResult};
use crate::providers::{LlmRequest, LlmResponse, ProviderType};
use crate::DispatchManager;

/// Body accepted by `POST /generate`
#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    top_p: Option<f32>,
    #[serde(default)]
    max_tokens: Option<u32>,
    /// Any other field is passed to the provider as-is
    #[serde(flatten)]
    params: HashMap<String, Value>,
}

impl GenerateBody {
    fn into_request(self) -> LlmResult<LlmRequest> {
        let prompt = self.prompt.filter(|p| !p.trim().is_empty());
        let provider = self.provider.filter(|p| !p.trim().is_empty());
        let (Some(prompt), Some(provider)) = (prompt, provider) else {
            return Err(LlmError::ValidationError("prompt and provider are required".to_string()));
        };

        let provider: ProviderType = provider.parse()?;
        let mut request = LlmRequest::new(provider, prompt);
        request.model = self.model;
        request.temperature = self.temperature;
        request.top_p = self.top_p;
        request.max_tokens = self.max_tokens;
        request.params = self.params;
        Ok(request)
    }
}

/// Terminal error rendered as `{error}`
struct ErrorResponse(LlmError);

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<LlmError> for ErrorResponse {
    fn from(err: LlmError) -> Self {
        ErrorResponse(err)
    }
}

/// Build the front-door router around a shared manager
pub fn router(manager: Arc<DispatchManager>) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/health", get(health_check))
        .with_state(manager)
}

/// Bind `addr` and serve until the listener fails
pub async fn serve(manager: Arc<DispatchManager>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("KeyRelay front door listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(manager)).await
}

async fn generate(
    State(manager): State<Arc<DispatchManager>>,
    body: Bytes,
) -> Result<Json<LlmResponse>, ErrorResponse> {
    if body.is_empty() {
        return Err(LlmError::ValidationError("No JSON body provided".to_string()).into());
    }
    let body: GenerateBody = serde_json::from_slice(&body).map_err(LlmError::from)?;
    let request = body.into_request()?;

    let response = manager.request(request).await?;
    Ok(Json(response))
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> LlmResult<LlmRequest> {
        serde_json::from_str::<GenerateBody>(body)?.into_request()
    }

    #[test]
    fn test_extra_fields_become_params() {
        let request = parse(
            r#"{"prompt": "hi", "provider": "mistral", "max_tokens": 64, "random_seed": 7, "stop": ["END"]}"#,
        )
        .unwrap();

        assert_eq!(request.max_tokens, Some(64));
        assert_eq!(request.params.len(), 2);
        assert_eq!(request.params["random_seed"], serde_json::json!(7));
        assert_eq!(request.params["stop"], serde_json::json!(["END"]));
    }

    #[test]
    fn test_known_fields_are_not_params() {
        let request = parse(r#"{"prompt": "hi", "provider": "gemini", "model": "m", "top_p": 0.5}"#).unwrap();
        assert_eq!(request.model.as_deref(), Some("m"));
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_missing_provider() {
        assert!(matches!(parse(r#"{"prompt": "hi"}"#), Err(LlmError::ValidationError(_))));
    }
}
