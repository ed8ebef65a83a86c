use crate::dispatcher::Dispatcher;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use frazeo_channels::{TelegramClient, Update};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Header Telegram echoes the webhook secret in.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// How the webhook endpoint is exposed.
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// Path segment updates are posted to (`POST /<path>`), usually the bot token.
    pub path: String,
    /// Public base URL the webhook is registered under.
    pub public_url: Option<String>,
    /// Shared secret Telegram must echo in [`SECRET_HEADER`].
    pub secret: Option<String>,
}

impl WebhookConfig {
    /// The full URL to register with Telegram, if a public URL is known.
    pub fn webhook_url(&self) -> Option<String> {
        self.public_url
            .as_deref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), self.path))
    }
}

/// Shared application state.
pub struct AppState {
    /// Routes updates to the navigator.
    pub dispatcher: Arc<Dispatcher>,
    /// Webhook exposure settings.
    pub webhook: WebhookConfig,
    /// Client used to (re)register the webhook on `GET /`.
    pub registrar: Option<Arc<TelegramClient>>,
}

/// The HTTP front door.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the router: `POST /{path}` for updates, `GET /` to register the
    /// webhook, `GET /health` for liveness.
    pub fn build(
        dispatcher: Arc<Dispatcher>,
        webhook: WebhookConfig,
        registrar: Option<Arc<TelegramClient>>,
    ) -> Router {
        let state = Arc::new(AppState {
            dispatcher,
            webhook,
            registrar,
        });

        Router::new()
            .route("/", get(register_handler))
            .route("/health", get(health_handler))
            .route("/{hook}", post(update_handler))
            .with_state(state)
    }
}

/// Validate that a request secret matches the configured secret using constant-time comparison.
pub fn validate_secret(config_secret: &str, request_secret: &str) -> bool {
    let a = config_secret.as_bytes();
    let b = request_secret.as_bytes();

    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let navigator = state.dispatcher.navigator();
    let store = navigator.store();
    Json(serde_json::json!({
        "status": "ok",
        "service": "frazeo",
        "corpus": navigator.retriever().corpus().len(),
        "snapshots": store.snapshot_count(),
        "conversations": store.conversation_count(),
    }))
}

/// Route: `GET /`
///
/// Points Telegram at this server's webhook URL.
async fn register_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (Some(client), Some(url)) = (&state.registrar, state.webhook.webhook_url()) else {
        warn!("Webhook registration requested but no public URL is configured");
        return (StatusCode::SERVICE_UNAVAILABLE, "webhook not configured");
    };
    match client.set_webhook(&url, state.webhook.secret.as_deref()).await {
        Ok(()) => (StatusCode::OK, "!"),
        Err(e) => {
            error!(error = %e, "Webhook registration failed");
            (StatusCode::BAD_GATEWAY, "webhook registration failed")
        }
    }
}

/// Route: `POST /{hook}`
///
/// Accepts an update. Anything past the secret check is answered with
/// `200 "!"`, including bodies that fail to parse, so Telegram does not
/// redeliver them.
async fn update_handler(
    Path(hook): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: String,
) -> impl IntoResponse {
    if !validate_secret(&state.webhook.path, &hook) {
        return (StatusCode::NOT_FOUND, "");
    }

    if let Some(ref secret) = state.webhook.secret {
        let request_secret = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !validate_secret(secret, request_secret) {
            warn!("Webhook secret validation failed");
            return (StatusCode::UNAUTHORIZED, "");
        }
    }

    let update: Update = match serde_json::from_str(&body) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "Unparseable update");
            return (StatusCode::OK, "!");
        }
    };

    let update_id = update.update_id;
    if let Err(e) = state.dispatcher.handle_update(update).await {
        error!(update_id, error = %e, "Failed to deliver reply");
    } else {
        info!(update_id, "Update handled");
    }
    (StatusCode::OK, "!")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_valid() {
        assert!(validate_secret("my-secret-key", "my-secret-key"));
    }

    #[test]
    fn test_validate_secret_invalid() {
        assert!(!validate_secret("my-secret-key", "wrong-key-abc"));
    }

    #[test]
    fn test_validate_secret_different_lengths() {
        assert!(!validate_secret("short", "a-much-longer-secret"));
    }

    #[test]
    fn test_webhook_url_joins_path() {
        let config = WebhookConfig {
            path: "123:abc".into(),
            public_url: Some("https://bot.example/".into()),
            secret: None,
        };
        assert_eq!(
            config.webhook_url().as_deref(),
            Some("https://bot.example/123:abc")
        );
        let config = WebhookConfig {
            public_url: None,
            ..config
        };
        assert!(config.webhook_url().is_none());
    }
}
