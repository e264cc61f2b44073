use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tether_core::{EngineConfig, EngineResult, EventRequest, EventResponse, Page, Script};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod demo;
mod templates;

use config::WebConfig;

// --- App State ---

struct AppState {
    script: Arc<dyn Script>,
    engine_config: EngineConfig,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tether=info".parse()?))
        .init();

    let config = WebConfig::from_env()?;

    let state = Arc::new(AppState {
        script: Arc::new(demo::run),
        engine_config: config.engine_config(),
    });

    let addr = config.addr();
    info!(debug = config.debug, "Tether web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page).post(handle_event))
        .with_state(state)
        // Responses depend on the submitted chain; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only (event payloads stay out of logs)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

// --- Handlers ---

async fn index_page(State(state): State<Arc<AppState>>) -> Response {
    match render_index(&state) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::render_error()),
            )
                .into_response()
        }
    }
}

async fn handle_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Response {
    let (status, body) = match payload {
        Ok(Json(request)) => dispatch_event(&state, &request),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected event payload");
            (rejection.status(), EventResponse::Error(rejection.body_text()))
        }
    };
    (status, Json(body)).into_response()
}

/// Run the defining script and render every mounted engine.
fn render_index(state: &AppState) -> EngineResult<String> {
    let mut page = Page::build(state.script.as_ref(), state.engine_config.clone())?;
    Ok(templates::render_index(&page.scripts()))
}

/// Rebuild the page and hand `request` to the engine it addresses.
fn dispatch_event(state: &AppState, request: &EventRequest) -> (StatusCode, EventResponse) {
    let mut page = match Page::build(state.script.as_ref(), state.engine_config.clone()) {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "Defining script failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                EventResponse::Error(e.to_string()),
            );
        }
    };

    match page.listen(request) {
        Some(Ok(response)) => (StatusCode::OK, response),
        Some(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            EventResponse::Error(e.to_string()),
        ),
        None => {
            debug!(instance = ?request.instance, "Event for unknown instance");
            (
                StatusCode::NOT_FOUND,
                EventResponse::Error("Unknown instance.".to_string()),
            )
        }
    }
}
