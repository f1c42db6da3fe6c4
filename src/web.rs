use crate::config::AppConfig;
use crate::error::GenerateError;
use crate::provider::{idea_prompt, ProviderClient};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

type SharedState = Arc<AppState>;

const MAX_IDEAS_PER_REQUEST: u32 = 20;

#[derive(Clone)]
pub struct AppState {
    pub provider: Option<ProviderClient>,
    pub theme: WebTheme,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum WebTheme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for WebTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebTheme::Light => write!(f, "light"),
            WebTheme::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Chrome {
    body_style: &'static str,
    card_style: &'static str,
    headline_style: &'static str,
    lede_style: &'static str,
    code_style: &'static str,
}

impl Chrome {
    fn new(theme: WebTheme) -> Self {
        match theme {
            WebTheme::Light => Self {
                body_style: "background:#f8fafc;color:#0f172a",
                card_style: "background:#ffffff;border:1px solid #e2e8f0;border-radius:12px;padding:24px;box-shadow:0 1px 3px rgba(15,23,42,0.08)",
                headline_style: "font-size:2.25rem;font-weight:800;letter-spacing:-0.025em;margin:0 0 8px",
                lede_style: "font-size:1.125rem;color:#475569;margin:0 0 24px",
                code_style: "background:#f1f5f9;border-radius:6px;padding:2px 6px",
            },
            WebTheme::Dark => Self {
                body_style: "background:#0f172a;color:#f8fafc",
                card_style: "background:#1e293b;border:1px solid #334155;border-radius:12px;padding:24px;box-shadow:0 1px 3px rgba(0,0,0,0.4)",
                headline_style: "font-size:2.25rem;font-weight:800;letter-spacing:-0.025em;margin:0 0 8px",
                lede_style: "font-size:1.125rem;color:#94a3b8;margin:0 0 24px",
                code_style: "background:#334155;border-radius:6px;padding:2px 6px",
            },
        }
    }
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub theme: WebTheme,
    pub app: AppConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], app.port)),
            theme: WebTheme::default(),
            app,
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let provider = ProviderClient::from_config(&config.app);
    if provider.is_none() {
        warn!("GROQ_API_KEY not set; generation requests will fail until it is configured");
    }
    let state = Arc::new(AppState {
        provider,
        theme: config.theme,
    });
    let router = build_router(state);
    info!(%config.addr, theme = ?config.theme, "Binding HTTP listener");
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn from_generate(err: GenerateError) -> Self {
        let status = match &err {
            GenerateError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            GenerateError::UpstreamStatus { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GenerateError::Transport(_) => StatusCode::BAD_GATEWAY,
            GenerateError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GenerateError::EmptyResult | GenerateError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/generate", post(generate))
        .route("/healthz", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[derive(Debug, Deserialize)]
struct GenerateParams {
    niche: Option<String>,
    style: Option<String>,
    count: Option<u32>,
}

async fn generate(
    State(state): State<SharedState>,
    Json(params): Json<GenerateParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let niche = params
        .niche
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Field `niche` is required"))?;
    let style = params
        .style
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("engaging");
    let count = params.count.unwrap_or(10).clamp(1, MAX_IDEAS_PER_REQUEST);

    let provider = state.provider.as_ref().ok_or_else(|| {
        warn!("generation request refused: no API credential configured");
        ApiError::from_generate(GenerateError::MissingCredential)
    })?;

    info!(niche, style, count, "relaying generation request");
    let messages = idea_prompt(niche, style, count);
    let envelope = provider
        .complete(&messages)
        .await
        .map_err(ApiError::from_generate)?;
    Ok(Json(envelope))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "sparkreel-web" }))
}

async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: "no such route".to_string(),
    }
}

async fn home(State(state): State<SharedState>) -> impl IntoResponse {
    Html(render_home(state.theme))
}

fn render_home(theme: WebTheme) -> String {
    let chrome = Chrome::new(theme);
    let title = "SparkReel • TikTok Idea Relay";
    let intro = "Relay service for generating short-video content ideas. POST a niche, style, and count to /generate and receive the raw completion envelope.";
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{title}</title>
  </head>
  <body style="{body_style};font-family:system-ui,sans-serif;margin:0">
    <main style="max-width:720px;margin:0 auto;padding:48px 16px">
      <div style="{card_style}">
        <p style="text-transform:uppercase;letter-spacing:0.05em;font-size:0.875rem;margin:0 0 8px">SparkReel v{version}</p>
        <h1 style="{headline_style}">Generate TikTok content ideas over one endpoint.</h1>
        <p style="{lede_style}">{intro}</p>
        <pre style="{code_style};display:block;padding:12px;overflow-x:auto">POST /generate
{{ "niche": "home cooking", "style": "funny", "count": 10 }}</pre>
        <p style="margin:16px 0 0">Health: <code style="{code_style}">GET /healthz</code></p>
      </div>
    </main>
  </body>
</html>"#,
        title = title,
        body_style = chrome.body_style,
        card_style = chrome.card_style,
        headline_style = chrome.headline_style,
        lede_style = chrome.lede_style,
        code_style = chrome.code_style,
        version = env!("CARGO_PKG_VERSION"),
        intro = intro,
    )
}
