//! Recipe handlers
//!
//! List, create, retrieve, update, delete and image upload for the
//! authenticated user's recipes.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use recipe_core::{
    require_owned, resolve_recipes, AttributeKind, EntityId, OwnerId, Recipe, RecipeAction,
    RecipeFilter, RecipePayload, WriteMode,
};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::handlers::{parse_entity_id, AppState};
use crate::media::{recipe_image_path, remove_upload, save_upload};
use crate::multipart::MultipartFields;
use crate::representation::{AttributeIndex, RecipeBody};
use crate::validation::{extension_for, validate_image, IMAGE_FIELD};

/// Query parameters for listing recipes
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    /// Comma-separated tag ids; a recipe matches if it has any of them
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; a recipe matches if it has any of them
    pub ingredients: Option<String>,
}

/// GET /api/recipe/recipes
///
/// Recipes of the caller, newest first, optionally narrowed by tags and
/// ingredients. Both filters must match when both are given.
pub async fn list_recipes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListRecipesQuery>,
) -> Result<Json<Vec<RecipeBody>>, ApiError> {
    // Reject malformed filters before touching the store
    let filter = RecipeFilter::from_query(query.tags.as_deref(), query.ingredients.as_deref())?;

    let snapshot = state.store.fetch_recipes(user.owner).await?;
    let recipes = resolve_recipes(snapshot, &filter, user.owner);
    let index = attribute_index(&state, user.owner).await?;

    Ok(Json(
        recipes
            .iter()
            .map(|recipe| RecipeBody::render(RecipeAction::List, recipe, &index))
            .collect(),
    ))
}

/// POST /api/recipe/recipes
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeBody>), ApiError> {
    let Json(payload) = payload?;
    let new = payload.into_new(user.owner)?;

    let recipe = state.store.create_recipe(&new).await?;
    let body = render(&state, RecipeAction::Create, &recipe).await?;

    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/recipe/recipes/{id}
pub async fn retrieve_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<RecipeBody>, ApiError> {
    let recipe = load_owned(&state, &id, user.owner).await?;
    Ok(Json(render(&state, RecipeAction::Retrieve, &recipe).await?))
}

/// PUT /api/recipe/recipes/{id}
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<Json<RecipeBody>, ApiError> {
    write_recipe(&state, user, &id, payload, RecipeAction::Update).await
}

/// PATCH /api/recipe/recipes/{id}
pub async fn partial_update_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<Json<RecipeBody>, ApiError> {
    write_recipe(&state, user, &id, payload, RecipeAction::PartialUpdate).await
}

/// DELETE /api/recipe/recipes/{id}
pub async fn destroy_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let recipe = load_owned(&state, &id, user.owner).await?;

    if !state.store.delete_recipe(recipe.id).await? {
        return Err(ApiError::not_found("Recipe not found"));
    }

    tracing::info!(recipe_id = recipe.id, owner = %user.owner, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipe/recipes/{id}/upload-image
///
/// Accepts multipart/form-data with an `image` field holding a JPEG, PNG,
/// GIF or WebP file. A previously uploaded image is replaced.
pub async fn upload_recipe_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<RecipeBody>, ApiError> {
    let recipe = load_owned(&state, &id, user.owner).await?;

    let file = MultipartFields::parse(&mut multipart, IMAGE_FIELD, state.max_file_size)
        .await?
        .require_file()?;
    let format = validate_image(&file.data)?;

    let updated = store_image(&state, recipe.id, extension_for(format), &file.data).await?;
    if let Some(previous) = recipe.image.as_deref() {
        remove_upload(&state.media_root, previous).await;
    }

    tracing::info!(
        recipe_id = updated.id,
        owner = %user.owner,
        format = ?format,
        file_name = file.file_name.as_deref().unwrap_or(""),
        content_type = file.content_type.as_deref().unwrap_or(""),
        "Recipe image uploaded"
    );
    Ok(Json(
        render(&state, RecipeAction::UploadImage, &updated).await?,
    ))
}

/// Write the image file and point the recipe at it.
///
/// The new file is removed again when the recipe cannot be updated.
async fn store_image(
    state: &AppState,
    recipe_id: EntityId,
    extension: &str,
    data: &[u8],
) -> Result<Recipe, ApiError> {
    let relative = recipe_image_path(extension);
    save_upload(&state.media_root, &relative, data).await?;

    match state.store.set_recipe_image(recipe_id, &relative).await {
        Ok(updated) => Ok(updated),
        Err(e) => {
            remove_upload(&state.media_root, &relative).await;
            Err(e.into())
        }
    }
}

async fn write_recipe(
    state: &AppState,
    user: AuthenticatedUser,
    id: &str,
    payload: Result<Json<RecipePayload>, JsonRejection>,
    action: RecipeAction,
) -> Result<Json<RecipeBody>, ApiError> {
    let recipe = load_owned(state, id, user.owner).await?;

    let Json(payload) = payload?;
    let mode = action.write_mode().unwrap_or(WriteMode::Partial);
    let update = payload.into_update(mode, user.owner)?;

    let updated = state.store.update_recipe(recipe.id, &update).await?;
    tracing::debug!(recipe_id = updated.id, action = %action, "Recipe updated");

    Ok(Json(render(state, action, &updated).await?))
}

/// Fetch a recipe through the owner-scoped path
async fn load_owned(state: &AppState, id: &str, owner: OwnerId) -> Result<Recipe, ApiError> {
    let id: EntityId = parse_entity_id(id, "Recipe")?;
    let found = state.store.find_recipe(id).await?;
    Ok(require_owned(found, id, owner)?)
}

async fn attribute_index(state: &AppState, owner: OwnerId) -> Result<AttributeIndex, ApiError> {
    let tags = state
        .store
        .fetch_attributes(AttributeKind::Tag, owner)
        .await?;
    let ingredients = state
        .store
        .fetch_attributes(AttributeKind::Ingredient, owner)
        .await?;
    Ok(AttributeIndex::new(tags, ingredients))
}

async fn render(
    state: &AppState,
    action: RecipeAction,
    recipe: &Recipe,
) -> Result<RecipeBody, ApiError> {
    let index = attribute_index(state, recipe.owner).await?;
    Ok(RecipeBody::render(action, recipe, &index))
}
