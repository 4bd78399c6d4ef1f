mod api;
mod cache;
mod color;
mod config;
mod decode;
mod error;
mod image_processing;
mod palette;
mod sampler;
mod segment;
mod source;
mod text;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::{
    BandView, DecodedView, EncodeQuery, EncodeResponse, PaletteEntryView, RunView, ScanFailure,
    ScanQuery, ScanResponse, ScanUrlRequest,
};
use crate::cache::{remote_scan_key, ScanCache};
use crate::color::Rgb;
use crate::config::Config;
use crate::decode::BandRole;
use crate::error::{AppError, ScanError};
use crate::image_processing::ScanReport;
use crate::palette::{PaletteClassifier, PaletteEntry, Tolerance};
use crate::source::{FrameSource, RemoteFrame, UploadedFrame};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    client: Client,
    cache: Arc<ScanCache>,
}

impl AppState {
    fn new(config: Config) -> Self {
        Self {
            cache: Arc::new(ScanCache::new(config.cache_ttl)),
            config: Arc::new(config),
            client: Client::new(),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Resistor Scan API",
        description = "Reads resistor color bands from camera frames and converts between band colors and resistance values",
        version = "0.1.0"
    ),
    tags(
        (name = "Scan", description = "Band detection from frames"),
        (name = "Codes", description = "Color code conversion and swatches")
    ),
    paths(health, get_palette, scan_upload, scan_url, decode_colors, encode_value, get_swatch),
    components(schemas(
        ScanResponse, BandView, RunView, DecodedView, ScanFailure, ScanUrlRequest,
        EncodeResponse, PaletteEntryView, BandRole, Tolerance, Rgb
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Config: band_fraction={}, max_upload_bytes={}, cache_ttl={:?}",
        config.band_fraction,
        config.max_upload_bytes,
        config.cache_ttl
    );

    let port = config.port;
    let app = router(AppState::new(config));

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/palette", get(get_palette))
        .route("/scan", post(scan_upload))
        .route("/scan/url", post(scan_url))
        .route("/decode/{colors}", get(decode_colors))
        .route("/encode/{ohms}", get(encode_value))
        .route("/swatch/{colors}", get(get_swatch))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route("/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health() -> &'static str {
    "ok"
}

/// Get OpenAPI JSON specification
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// List the color-code palette
///
/// Returns the 12 band colors in matching order with their reference RGB
/// values and digit, multiplier and tolerance meanings.
#[utoipa::path(
    get,
    path = "/palette",
    tag = "Codes",
    responses(
        (status = 200, description = "Palette entries", body = Vec<PaletteEntryView>)
    )
)]
async fn get_palette() -> Json<Vec<PaletteEntryView>> {
    Json(
        PaletteClassifier::resistor()
            .entries()
            .iter()
            .map(PaletteEntryView::from)
            .collect(),
    )
}

/// Acquire a frame from `source` and scan it
async fn scan_source(source: &dyn FrameSource, band_fraction: f64) -> Result<ScanReport, AppError> {
    let frame = source.acquire().await?;
    let report = image_processing::scan_frame(&frame, band_fraction)?;

    match &report.decoded {
        Ok(decoded) => tracing::info!(
            "Scan of {}: {} bands, {}",
            source.describe(),
            report.result.bands.len(),
            decoded.formatted()
        ),
        Err(e) => tracing::info!(
            "Scan of {}: {} bands, not decoded ({})",
            source.describe(),
            report.result.bands.len(),
            e
        ),
    }

    Ok(report)
}

/// Scan an uploaded frame
///
/// The request body is the raw PNG or JPEG frame, with the resistor lying
/// horizontally across the middle.
#[utoipa::path(
    post,
    path = "/scan",
    tag = "Scan",
    params(ScanQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "PNG or JPEG frame"),
    responses(
        (status = 200, description = "Scan result, decoded or with a failure reason", body = ScanResponse),
        (status = 400, description = "Invalid band fraction"),
        (status = 422, description = "Frame too small to sample"),
        (status = 500, description = "Frame could not be decoded")
    )
)]
async fn scan_upload(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
    body: Bytes,
) -> Result<Json<ScanResponse>, AppError> {
    let band_fraction = query.band_fraction.unwrap_or(state.config.band_fraction);
    let source = UploadedFrame::new(body.to_vec());
    let report = scan_source(&source, band_fraction).await?;
    Ok(Json(ScanResponse::from(&report)))
}

/// Scan a frame fetched from a URL
///
/// Results are cached per URL and band fraction.
#[utoipa::path(
    post,
    path = "/scan/url",
    tag = "Scan",
    request_body = ScanUrlRequest,
    responses(
        (status = 200, description = "Scan result, decoded or with a failure reason", body = ScanResponse),
        (status = 400, description = "Invalid URL or band fraction"),
        (status = 502, description = "Frame could not be fetched")
    )
)]
async fn scan_url(
    State(state): State<AppState>,
    Json(request): Json<ScanUrlRequest>,
) -> Result<Json<ScanResponse>, AppError> {
    let band_fraction = request.band_fraction.unwrap_or(state.config.band_fraction);
    let key = remote_scan_key(&request.url, band_fraction);

    if let Some(report) = state.cache.get_report(&key).await {
        tracing::debug!("Using cached scan for {}", request.url);
        return Ok(Json(ScanResponse::from(report.as_ref())));
    }

    let source = RemoteFrame::new(state.client.clone(), request.url)?;
    let report = Arc::new(scan_source(&source, band_fraction).await?);
    state.cache.set_report(key, report.clone()).await;

    Ok(Json(ScanResponse::from(report.as_ref())))
}

/// Resolve a swatch path segment: comma-separated colors, optional `.png`
fn parse_colors(colors: &str) -> Result<Vec<&'static PaletteEntry>, AppError> {
    let palette = PaletteClassifier::resistor();
    let colors = colors.strip_suffix(".png").unwrap_or(colors);

    colors
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|name| {
            palette
                .by_name(name)
                .ok_or_else(|| AppError::Scan(ScanError::UnknownColor(name.to_string())))
        })
        .collect()
}

/// Decode a list of band colors
///
/// Colors are comma separated, first digit first, e.g. `brown,black,red,gold`.
#[utoipa::path(
    get,
    path = "/decode/{colors}",
    tag = "Codes",
    params(
        ("colors" = String, Path, description = "Comma-separated band colors, e.g. brown,black,red,gold")
    ),
    responses(
        (status = 200, description = "Decoded value", body = DecodedView),
        (status = 400, description = "Unknown color"),
        (status = 422, description = "Too few bands, or a band without the needed value")
    )
)]
async fn decode_colors(Path(colors): Path<String>) -> Result<Json<DecodedView>, AppError> {
    let names: Vec<&str> = colors.split(',').filter(|s| !s.trim().is_empty()).collect();
    let decoded = decode::decode_names(PaletteClassifier::resistor(), &names)?;
    Ok(Json(DecodedView::from(&decoded)))
}

/// Band colors for a resistance
///
/// Values keep their two leading significant digits.
#[utoipa::path(
    get,
    path = "/encode/{ohms}",
    tag = "Codes",
    params(
        ("ohms" = f64, Path, description = "Resistance in ohms, 0.1 to 99e9"),
        EncodeQuery
    ),
    responses(
        (status = 200, description = "Band colors", body = EncodeResponse),
        (status = 400, description = "Value cannot be encoded")
    )
)]
async fn encode_value(
    Path(ohms): Path<f64>,
    Query(query): Query<EncodeQuery>,
) -> Result<Json<EncodeResponse>, AppError> {
    let palette = PaletteClassifier::resistor();
    let mut entries = decode::encode(palette, ohms)?.to_vec();

    if let Some(percent) = query.tolerance {
        let entry = Tolerance::from_percent(percent)
            .and_then(|t| palette.by_tolerance(t))
            .ok_or_else(|| AppError::InvalidPath(format!("unsupported tolerance: {}%", percent)))?;
        entries.push(entry);
    }

    let decoded = decode::decode_entries(&entries)?;

    Ok(Json(EncodeResponse {
        bands: entries.iter().map(|e| e.name.to_string()).collect(),
        ohms: decoded.ohms,
        tolerance: decoded.tolerance_label(),
        formatted: decoded.formatted(),
    }))
}

/// Render band swatches
///
/// Returns a PNG with one labelled swatch per color, left to right.
#[utoipa::path(
    get,
    path = "/swatch/{colors}",
    tag = "Codes",
    params(
        ("colors" = String, Path, description = "Comma-separated band colors, optionally ending in .png")
    ),
    responses(
        (status = 200, description = "Swatch image", content_type = "image/png"),
        (status = 400, description = "Unknown color or bad color count")
    )
)]
async fn get_swatch(
    State(state): State<AppState>,
    Path(colors): Path<String>,
) -> Result<Response, AppError> {
    let entries = parse_colors(&colors)?;
    let key = entries
        .iter()
        .map(|e| e.name)
        .collect::<Vec<_>>()
        .join(",");

    let png = match state.cache.get_swatch(&key).await {
        Some(png) => {
            tracing::debug!("Using cached swatch for {}", key);
            png
        }
        None => {
            let png = Arc::new(image_processing::render_swatches(&entries)?);
            state.cache.set_swatch(key, png.clone()).await;
            png
        }
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        (*png).clone(),
    )
        .into_response())
}
