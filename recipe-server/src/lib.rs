//! Recipe Server Library - REST API for owner-scoped recipes, tags and ingredients
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod media;
pub mod multipart;
pub mod representation;
pub mod routes;
pub mod state;
pub mod validation;

pub use auth::{AuthenticatedUser, JwtKeys};
pub use config::{Config, ConfigError};
pub use db::{MemoryStore, PostgresStore, RecipeStore, StoreError};
pub use error::ApiError;
pub use representation::{AttributeRecord, RecipeBody, RecipeDetail, RecipeImage, RecipeSummary};
pub use routes::{create_router, create_router_with_config, create_router_with_state};
pub use state::AppState;
