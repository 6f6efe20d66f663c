//! Web API serving compiled token artifacts.
//!
//! A thin HTTP wrapper over [`Resolver`]: every lookup decision is made
//! there, this module only maps results onto status codes and bodies.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/tokens/brands` - List brands with compiled artifacts
//! - `GET /api/tokens/{brand}/{format}/types` - List token types for a brand and format
//! - `GET /api/tokens/{brand}/{format}` - Best available artifact (prefers color)
//! - `GET /api/tokens/{brand}/{tokenType}/{format}` - A specific artifact

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::resolver::{Listing, LookupError, ResolvedArtifact, Resolver};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Artifact resolver (read-only, shared across requests)
    resolver: Arc<Resolver>,
}

impl AppState {
    /// Creates state serving artifacts from `global_dir`
    /// (usually `<build_root>/web/global`).
    pub fn new(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(global_dir)),
        }
    }

    /// Returns the resolver.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Brand list response.
#[derive(Debug, Serialize)]
pub struct BrandListResponse {
    /// Brand identifiers.
    pub brands: Vec<String>,
}

/// Token type list response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTypeListResponse {
    /// Requested brand.
    pub brand: String,
    /// Requested format.
    pub format: String,
    /// Token types available for the brand and format.
    pub token_types: Vec<String>,
}

/// API error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Token types that do exist, for not-found lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_token_types: Option<Vec<String>>,
    /// Where the artifact was expected, for not-found lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_path: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            available_token_types: None,
            expected_path: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(error)
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

impl From<LookupError> for (StatusCode, Json<ApiError>) {
    fn from(err: LookupError) -> Self {
        let details = err.to_string();
        match err {
            LookupError::InvalidFormat { .. } => (StatusCode::BAD_REQUEST, Json(ApiError::new(details))),
            LookupError::InvalidIdentifier { .. } => (
                StatusCode::BAD_REQUEST,
                Json(ApiError::with_details("Invalid request", details)),
            ),
            LookupError::NotFound {
                available_token_types,
                expected_path,
                ..
            } => (
                StatusCode::NOT_FOUND,
                Json(ApiError {
                    available_token_types: Some(available_token_types),
                    expected_path: Some(expected_path),
                    ..ApiError::with_details("Token file not found", details)
                }),
            ),
            LookupError::FormatDirectoryMissing { .. } => (
                StatusCode::NOT_FOUND,
                Json(ApiError::with_details("Token files not found", details)),
            ),
            LookupError::NoArtifacts { .. } => (
                StatusCode::NOT_FOUND,
                Json(ApiError::with_details("No token files found", details)),
            ),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/tokens/brands - List brand directories.
///
/// An unreadable directory is logged and reported as no brands.
async fn list_brands(State(state): State<AppState>) -> ApiResult<Json<BrandListResponse>> {
    match state.resolver.list_brands() {
        Listing::Absent => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new("Global directory not found")),
        )),
        listing => {
            let mut brands = listing.into_vec();
            brands.sort();
            Ok(Json(BrandListResponse { brands }))
        }
    }
}

/// GET /api/tokens/{brand}/{format}/types - List token types.
async fn list_token_types(
    state: &AppState,
    brand: String,
    format: String,
) -> ApiResult<Json<TokenTypeListResponse>> {
    match state.resolver.list_token_types(&brand, &format)? {
        Listing::Absent => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!(
                "Format directory not found for brand '{brand}'"
            ))),
        )),
        listing => {
            let mut token_types = listing.into_vec();
            token_types.sort();
            Ok(Json(TokenTypeListResponse {
                brand,
                format,
                token_types,
            }))
        }
    }
}

/// Reads a resolved artifact and returns it with its content type.
async fn send_artifact(artifact: ResolvedArtifact) -> ApiResult<Response> {
    let body = tokio::fs::read(&artifact.path).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::with_details(
                "Error reading token files",
                e.to_string(),
            )),
        )
    })?;

    info!("Sending file: {}", artifact.path.display());
    Ok(([(header::CONTENT_TYPE, artifact.content_type())], body).into_response())
}

/// GET /api/tokens/{brand}/{format} - Best available artifact.
async fn get_best_available(
    State(state): State<AppState>,
    Path((brand, format)): Path<(String, String)>,
) -> ApiResult<Response> {
    let artifact = state.resolver.resolve(&brand, None, &format)?;
    send_artifact(artifact).await
}

/// GET /api/tokens/{brand}/{tokenType}/{format} - A specific artifact, or
/// GET /api/tokens/{brand}/{format}/types - token type listing.
///
/// Both shapes share one route because they have the same number of segments.
async fn get_token_file(
    State(state): State<AppState>,
    Path((brand, segment, tail)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    if tail == "types" {
        return list_token_types(&state, brand, segment)
            .await
            .map(IntoResponse::into_response);
    }

    let artifact = state.resolver.resolve(&brand, Some(&segment), &tail)?;
    send_artifact(artifact).await
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // Artifacts are public, read-only static content
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tokens/brands", get(list_brands))
        .route("/api/tokens/{brand}/{segment}", get(get_best_available))
        .route("/api/tokens/{brand}/{segment}/{tail}", get(get_token_file))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Logs brands, formats and artifact files available under the resolver root.
fn log_inventory(resolver: &Resolver) {
    if !resolver.global_dir().is_dir() {
        warn!("Global directory not found: {}", resolver.global_dir().display());
        return;
    }

    info!("Available brands:");
    for brand in resolver.inventory() {
        info!("- {}", brand.brand);
        let formats: Vec<&str> = brand.formats.iter().map(|(f, _)| f.as_str()).collect();
        info!("  Formats: {}", formats.join(", "));
        for (format, files) in &brand.formats {
            info!("    {}: {}", format, files.join(", "));
        }
    }
}

/// Runs the web server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(global_dir: PathBuf, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(global_dir);
    log_inventory(state.resolver());

    let app = create_router(state);

    info!("Token API is running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
