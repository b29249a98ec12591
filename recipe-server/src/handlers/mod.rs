//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod attributes;
pub mod health;
pub mod recipes;

use recipe_core::EntityId;

use crate::error::ApiError;

pub use crate::state::AppState;
pub use attributes::{
    destroy_attribute, list_attributes, partial_update_attribute, update_attribute,
    ListAttributesQuery,
};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use recipes::{
    create_recipe, destroy_recipe, list_recipes, partial_update_recipe, retrieve_recipe,
    update_recipe, upload_recipe_image, ListRecipesQuery,
};

/// Parse a path identifier; anything that is not an id cannot name an entity
pub(crate) fn parse_entity_id(raw: &str, kind: &str) -> Result<EntityId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("{} not found", kind)))
}
