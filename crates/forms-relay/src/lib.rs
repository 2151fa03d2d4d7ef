pub mod config;
pub mod limiter;
pub mod prompt;
pub mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, DefaultBodyLimit, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

use forms_core::wire::GenerateSummaryResponse;
use forms_core::{now_rfc3339, EntryForSummary};

pub use config::RelayConfig;
pub use limiter::RateLimiter;
pub use upstream::{AnthropicClient, Completion, UpstreamError};

const BODY_LIMIT: usize = 10 * 1024 * 1024;
const UNKNOWN_CLIENT_KEY: &str = "unknown";

// ── App State ──

pub struct RelayState {
    completion: Option<Arc<dyn Completion>>,
    limiter: RateLimiter,
    client_origin: HeaderValue,
    trust_proxy: bool,
}

impl RelayState {
    /// CORS allows `config::DEFAULT_CLIENT_URL` until `with_client_origin`.
    pub fn new(completion: Option<Arc<dyn Completion>>, limiter: RateLimiter) -> Self {
        Self {
            completion,
            limiter,
            client_origin: HeaderValue::from_static(config::DEFAULT_CLIENT_URL),
            trust_proxy: false,
        }
    }

    pub fn with_client_origin(mut self, origin: HeaderValue) -> Self {
        self.client_origin = origin;
        self
    }

    /// Rate-limit on the first `x-forwarded-for` address when present.
    pub fn trusting_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        let completion = match &config.api_key {
            Some(key) => {
                let client = AnthropicClient::new(key, &config.model, &config.api_base)?;
                Some(Arc::new(client) as Arc<dyn Completion>)
            }
            None => None,
        };
        Ok(Self::new(
            completion,
            RateLimiter::new(config.rate_limit_max, config.rate_limit_window),
        )
        .with_client_origin(HeaderValue::from_str(&config.client_url)?)
        .trusting_proxy(config.trust_proxy))
    }
}

// ── Error Handling ──

struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::RateLimited => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.",
            ),
            UpstreamError::MissingText => {
                Self::internal("Invalid response from summary service.")
            }
            UpstreamError::Status { .. } | UpstreamError::Transport(_) => {
                Self::internal("Failed to generate summary. Please try again later.")
            }
        }
    }
}

// ── Entrypoint ──

pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let state = RelayState::from_config(&config)?;
    let app = router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %addr,
        client_url = %config.client_url,
        trust_proxy = config.trust_proxy,
        api_key_configured = config.api_key.is_some(),
        "forms relay listening"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Build the router (for testing without binding to a port).
pub fn router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([state.client_origin.clone()]))
        .allow_methods(Any)
        .allow_headers(Any);
    let state = Arc::new(state);

    let api = Router::new()
        .route("/generate-summary", post(generate_summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(state)
}

// ── Health ──

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "timestamp": now_rfc3339() }))
}

// ── Rate limiting ──

fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Peer IP of the connection. `x-forwarded-for` only counts behind a
/// trusted proxy, since clients can set it freely.
fn client_key(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = forwarded_for(req.headers()) {
            return ip.to_string();
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT_KEY.to_string())
}

async fn rate_limit(State(state): State<Arc<RelayState>>, req: Request, next: Next) -> Response {
    let key = client_key(&req, state.trust_proxy);
    let decision = state.limiter.check(&key);

    let mut resp = if decision.allowed {
        next.run(req).await
    } else {
        warn!(client = %key, "rate limit exceeded");
        let mut resp = AppError::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests from this IP, please try again later.",
        )
        .into_response();
        resp.headers_mut().insert(
            HeaderName::from_static("retry-after"),
            HeaderValue::from(decision.reset_after.as_secs().max(1)),
        );
        resp
    };

    let headers = resp.headers_mut();
    headers.insert(
        HeaderName::from_static("ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );
    resp
}

// ── POST /api/generate-summary ──

/// Lenient request shape so missing fields become a 400 with a JSON body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRequest {
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default)]
    entries: Option<Vec<RawEntry>>,
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    reflection: Option<String>,
}

const INVALID_REQUEST: &str = "Invalid request. Expected projectName and entries array.";

async fn generate_summary(
    State(state): State<Arc<RelayState>>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<GenerateSummaryResponse>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::bad_request(INVALID_REQUEST))?;
    let (project_name, raw_entries) = match (req.project_name, req.entries) {
        (Some(name), Some(entries)) if !name.is_empty() => (name, entries),
        _ => return Err(AppError::bad_request(INVALID_REQUEST)),
    };
    if raw_entries.is_empty() {
        return Err(AppError::bad_request("No entries provided for summarization."));
    }
    let entries = raw_entries
        .into_iter()
        .map(|e| match (e.date, e.reflection) {
            (Some(date), Some(reflection)) if !date.is_empty() && !reflection.is_empty() => {
                Some(EntryForSummary { date, reflection })
            }
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            AppError::bad_request(
                "Invalid entry format. Each entry must have date and reflection.",
            )
        })?;

    let Some(completion) = &state.completion else {
        error!("ANTHROPIC_API_KEY not configured");
        return Err(AppError::internal("Summary service temporarily unavailable."));
    };

    info!(project = %project_name, entries = entries.len(), "generating summary");
    let prompt = prompt::summary_prompt(&project_name, &entries);
    let summary = completion.complete(&prompt).await.map_err(|e| {
        error!(project = %project_name, error = %e, "upstream call failed");
        AppError::from(e)
    })?;
    info!(project = %project_name, "summary generated");

    Ok(Json(GenerateSummaryResponse {
        summary: Some(summary),
        project_name,
        entry_count: entries.len(),
        generated_at: now_rfc3339(),
    }))
}
