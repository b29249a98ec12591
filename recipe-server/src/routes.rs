//! Router configuration module
//!
//! Configures all routes, middleware layers, and creates the application router.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::{header, Method, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use recipe_core::{AttributeKind, AttributePayload};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::handlers::{
    create_recipe, destroy_attribute, destroy_recipe, health, list_attributes, list_recipes,
    partial_update_attribute, partial_update_recipe, ready, retrieve_recipe, update_attribute,
    update_recipe, upload_recipe_image, ListAttributesQuery,
};
use crate::media::MEDIA_URL;
use crate::state::AppState;

/// Prefix of every recipe API route
pub const API_PREFIX: &str = "/api/recipe";

/// Create the application router with default config (for testing)
pub fn create_router() -> Router {
    create_router_with_config(&Config::default())
}

/// Create the application router with custom configuration and in-memory storage
pub fn create_router_with_config(config: &Config) -> Router {
    create_router_with_state(config, AppState::in_memory(config))
}

/// Create the application router around prepared state
pub fn create_router_with_state(config: &Config, state: AppState) -> Router {
    // Configure CORS based on allowed_origins
    let cors = match &config.allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            tracing::info!("CORS: Restricting to {} origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        }
        _ => {
            tracing::warn!("CORS: Allowing all origins (dev mode)");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    // Request body limit
    let body_limit = RequestBodyLimitLayer::new(config.body_limit_mb * 1024 * 1024);

    // Request timeout
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.timeout_secs),
    );

    let api = Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/{id}",
            get(retrieve_recipe)
                .put(update_recipe)
                .patch(partial_update_recipe)
                .delete(destroy_recipe),
        )
        // Uploads are capped by the body limit layer and the configured file size
        .route(
            "/recipes/{id}/upload-image",
            post(upload_recipe_image).layer(DefaultBodyLimit::disable()),
        )
        .merge(attribute_routes(AttributeKind::Tag))
        .merge(attribute_routes(AttributeKind::Ingredient));

    // Base router with common layers
    let router = Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(health))
        .route("/ready", get(ready))
        .nest_service(MEDIA_URL, ServeDir::new(&config.media_root))
        .with_state(state)
        .layer(cors)
        .layer(body_limit)
        .layer(timeout);

    // Conditionally apply rate limiting (disabled in tests, enabled in production)
    if !config.rate_limit_enabled {
        tracing::warn!("Rate limiting: DISABLED");
        return router.layer(TraceLayer::new_for_http());
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_sec)
        .burst_size(config.rate_limit_burst)
        .finish();

    match governor_conf {
        Some(governor_conf) => {
            tracing::info!(
                "Rate limiting: {} req/s (burst: {})",
                config.rate_limit_per_sec,
                config.rate_limit_burst
            );
            router
                .layer(GovernorLayer::new(Arc::new(governor_conf)))
                .layer(TraceLayer::new_for_http())
        }
        None => {
            tracing::error!(
                per_sec = config.rate_limit_per_sec,
                burst = config.rate_limit_burst,
                "Invalid rate limit settings, rate limiting disabled"
            );
            router.layer(TraceLayer::new_for_http())
        }
    }
}

/// Routes for one attribute kind, mounted at `/tags` or `/ingredients`
fn attribute_routes(kind: AttributeKind) -> Router<AppState> {
    let collection = format!("/{}", kind.recipe_field());
    let member = format!("{}/{{id}}", collection);

    Router::new()
        .route(
            &collection,
            get(
                move |state: State<AppState>,
                      user: AuthenticatedUser,
                      query: Query<ListAttributesQuery>| {
                    list_attributes(kind, state, user, query)
                },
            ),
        )
        .route(
            &member,
            put(
                move |state: State<AppState>,
                      user: AuthenticatedUser,
                      id: Path<String>,
                      payload: Result<Json<AttributePayload>, JsonRejection>| {
                    update_attribute(kind, state, user, id, payload)
                },
            )
            .patch(
                move |state: State<AppState>,
                      user: AuthenticatedUser,
                      id: Path<String>,
                      payload: Result<Json<AttributePayload>, JsonRejection>| {
                    partial_update_attribute(kind, state, user, id, payload)
                },
            )
            .delete(
                move |state: State<AppState>, user: AuthenticatedUser, id: Path<String>| {
                    destroy_attribute(kind, state, user, id)
                },
            ),
        )
}
