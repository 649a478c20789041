// Member Cards - Web Server
// REST surface over the card pipeline with Axum

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use member_cards::{
    render_cards_with, CardCatalog, CardDisplayModel, CardFamilies, FamilyARecord, FamilyBRecord,
    FamilyCRecord, MemberEnrichment,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    catalog: Arc<CardCatalog>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// POST /api/cards body - the three fetched families plus the session member.
/// A family the client could not fetch is sent as [] or left out.
#[derive(Deserialize)]
struct CardsRequest {
    #[serde(default)]
    primary: Vec<FamilyARecord>,
    #[serde(default)]
    secondary: Vec<FamilyBRecord>,
    #[serde(default)]
    reciprocity: Vec<FamilyCRecord>,
    #[serde(default)]
    member: MemberEnrichment,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/catalog - Active card catalog
async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.catalog.as_ref().clone()))
}

/// POST /api/cards - Normalize the three families into display cards
async fn post_cards(
    State(state): State<AppState>,
    Json(request): Json<CardsRequest>,
) -> impl IntoResponse {
    let families = CardFamilies::new(request.primary, request.secondary, request.reciprocity);
    let cards: Vec<CardDisplayModel> = render_cards_with(&state.catalog, &families, &request.member);

    log::info!("POST /api/cards: {} records → {} cards", families.total(), cards.len());

    (StatusCode::OK, Json(ApiResponse::ok(cards)))
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(get_catalog))
        .route("/cards", post(post_cards))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let state = AppState {
        catalog: Arc::new(CardCatalog::from_env().context("Failed to load card catalog")?),
    };

    let addr = std::env::var("MEMBER_CARDS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Server running on http://{}", addr);
    log::info!("   API: POST http://{}/api/cards", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
