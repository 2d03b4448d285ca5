//! HTTP surface: `GET /og/{date}.png`, `GET /og/{date}.svg` and `GET /health`.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::card::CardContent;
use crate::config::{Config, DEFAULT_CACHE_CONTROL};
use crate::ephemeris::EphemerisSnapshot;
use crate::fonts::{FontCache, FontSet};
use crate::layout::compute_wheel;
use crate::render::{RenderError, render_preview};
use crate::theme::Theme;
use crate::upstream::{UpstreamClient, UpstreamError, fetch_or_default};

static OG_FILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<date>.+)\.(?P<ext>png|svg)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OgFormat {
    Png,
    Svg,
}

/// Parsed `/og/{file}` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgRequest {
    pub date: String,
    pub format: OgFormat,
}

impl OgRequest {
    /// `None` when the segment has no recognised suffix or an empty date.
    pub fn parse(file: &str) -> Option<Self> {
        let caps = OG_FILE_RE.captures(file)?;
        let date = caps.name("date")?.as_str().trim();
        if date.is_empty() {
            return None;
        }
        let format = match caps.name("ext")?.as_str() {
            "png" => OgFormat::Png,
            _ => OgFormat::Svg,
        };
        Some(Self {
            date: date.to_string(),
            format,
        })
    }
}

/// Shared, read-only request context.
pub struct AppState {
    pub config: Config,
    pub theme: Theme,
    pub fonts: Arc<FontCache>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(
            &config.server.upstream_url,
            Duration::from_millis(config.server.upstream_timeout_ms),
        )?;
        Ok(Self {
            theme: Theme::from_fonts(&config.fonts),
            fonts: Arc::new(FontCache::new(config.fonts.clone())),
            upstream,
            config,
        })
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/og/{file}", get(og_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config)?);
    let listener = tokio::net::TcpListener::bind(&state.config.server.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        upstream = %state.upstream.base_url(),
        "listening"
    );
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutting down");
}

async fn health() -> &'static str {
    "ok"
}

async fn og_image(State(state): State<Arc<AppState>>, Path(file): Path<String>, headers: HeaderMap) -> Response {
    let Some(request) = OgRequest::parse(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match request.format {
        OgFormat::Png => og_png(state, &request.date, request_host(&headers)).await,
        OgFormat::Svg => og_svg(state, &request.date).await,
    }
}

/// Title, brand and chart for one card. Either collaborator may fail; its
/// part then falls back to the default.
pub async fn gather_card_inputs(
    state: &AppState,
    date: &str,
    host: Option<&str>,
) -> (CardContent, EphemerisSnapshot) {
    let (reading, snapshot) = tokio::join!(
        fetch_or_default("reading", date, state.upstream.fetch_reading(date)),
        fetch_or_default("ephemeris", date, state.upstream.fetch_ephemeris(date)),
    );
    let content = CardContent::new(reading.title.as_deref(), date, host, &state.config.card);
    (content, snapshot)
}

async fn og_png(state: Arc<AppState>, date: &str, host: Option<String>) -> Response {
    let ((content, snapshot), fonts) = tokio::join!(
        gather_card_inputs(&state, date, host.as_deref()),
        load_fonts(Arc::clone(&state.fonts)),
    );
    let fonts = match fonts {
        Ok(fonts) => fonts,
        Err(err) => return error_response(date, &err),
    };

    let worker_state = Arc::clone(&state);
    let rendered = tokio::task::spawn_blocking(move || {
        render_preview(&snapshot, &content, &fonts, &worker_state.theme, &worker_state.config)
    })
    .await
    .map_err(|err| RenderError::Worker(err.to_string()))
    .and_then(|result| result);

    match rendered {
        Ok(png) => image_response(png, "image/png", &state.config.server.cache_control),
        Err(err) => error_response(date, &err),
    }
}

async fn og_svg(state: Arc<AppState>, date: &str) -> Response {
    let snapshot = fetch_or_default("ephemeris", date, state.upstream.fetch_ephemeris(date)).await;
    let svg = compute_wheel(&snapshot, &state.theme, &state.config.wheel).to_svg();
    image_response(svg.into_bytes(), "image/svg+xml", &state.config.server.cache_control)
}

async fn load_fonts(cache: Arc<FontCache>) -> Result<Arc<FontSet>, RenderError> {
    // First use reads font files from disk.
    let loaded = tokio::task::spawn_blocking(move || cache.get())
        .await
        .map_err(|err| RenderError::Worker(err.to_string()))?;
    Ok(loaded?)
}

/// Origin host for the brand label: `X-Forwarded-Host` wins over `Host`.
fn request_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(HOST))
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn image_response(body: Vec<u8>, content_type: &'static str, cache_control: &str) -> Response {
    let cache_control = HeaderValue::from_str(cache_control)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CACHE_CONTROL));
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response()
}

fn error_response(date: &str, err: &RenderError) -> Response {
    tracing::error!(date, error = %err, chain = %error_chain(err), "render failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

fn error_chain(err: &RenderError) -> String {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain.join(": ")
}
