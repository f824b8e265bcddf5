use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderValue,
    middleware,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use scrub_config::ServerConfig;
use scrub_core::{RedactedTicket, SourceId, Strategy};
use scrub_engine::RedactionPipeline;
use scrub_security::Redaction;

use crate::auth::require_api_key;
use crate::error::ApiError;

#[derive(Deserialize)]
struct StrategyQuery {
    #[serde(default)]
    strategy: Option<String>,
}

#[derive(Deserialize)]
struct RedactTextRequest {
    text: String,
    #[serde(default)]
    strategy: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RedactionPipeline>,
    pub api_key: Option<Arc<str>>,
}

pub struct ScrubServer;

impl ScrubServer {
    pub async fn serve(pipeline: Arc<RedactionPipeline>, config: &ServerConfig) -> anyhow::Result<()> {
        let app = router(pipeline, config);

        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!("Redaction server listening on {}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the HTTP surface around a pipeline
pub fn router(pipeline: Arc<RedactionPipeline>, config: &ServerConfig) -> Router {
    if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        warn!("No API key configured; every redaction request will be refused");
    }

    let state = AppState {
        pipeline,
        api_key: config.api_key.as_deref().map(Arc::from),
    };

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&config.allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let guarded = Router::new()
        .route("/ticket-redaction/:source/:ticket_id", post(api_redact_ticket))
        .route("/redact", post(api_redact_text))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .merge(guarded)
        .layer(cors)
        .with_state(state)
}

fn allowed_origins(configured: &[String]) -> AllowOrigin {
    if configured.iter().any(|origin| origin == "*") {
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    AllowOrigin::list(origins)
}

/// GET / - banner
async fn handle_index() -> Html<&'static str> {
    Html("<h1>PII redaction service is running</h1>")
}

/// GET /health - server info
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "scrub",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok"
    }))
}

/// POST /ticket-redaction/:source/:ticket_id - Redact a CRM ticket and write it back
async fn api_redact_ticket(
    State(state): State<AppState>,
    Path((source, ticket_id)): Path<(String, String)>,
    Query(query): Query<StrategyQuery>,
) -> Result<Json<RedactedTicket>, ApiError> {
    let source: SourceId = source.parse()?;
    let strategy = parse_strategy(query.strategy.as_deref())?;

    let ticket = state.pipeline.run(source, &ticket_id, strategy).await?;
    Ok(Json(ticket))
}

/// POST /redact - Detect and redact a single body of text
async fn api_redact_text(
    State(state): State<AppState>,
    Json(req): Json<RedactTextRequest>,
) -> Result<Json<Redaction>, ApiError> {
    let strategy = parse_strategy(req.strategy.as_deref())?
        .unwrap_or_else(|| state.pipeline.default_strategy());

    let redaction = state
        .pipeline
        .redactor()
        .redact_text(&req.text, strategy)
        .await?;
    Ok(Json(redaction))
}

fn parse_strategy(raw: Option<&str>) -> Result<Option<Strategy>, ApiError> {
    Ok(raw.map(str::parse::<Strategy>).transpose()?)
}
